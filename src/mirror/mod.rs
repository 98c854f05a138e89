//! Page mirroring: scan a page, plan its assets, fetch them concurrently.
//!
//! - [`engine`] drives a run and produces a [`MirrorReport`]
//! - [`state`] is the per-resource lifecycle every asset moves through

pub mod engine;
pub mod state;

pub use engine::{
    AssetOutcome, AssetPlan, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY, MirrorEngine,
    MirrorError, MirrorReport, PlannedAsset, SkipReason, UnresolvedReference, plan_assets,
};
pub use state::ResourceState;
