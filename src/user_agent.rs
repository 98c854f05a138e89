//! User-Agent string sent with every request.

/// Project URL advertised in the User-Agent.
const PROJECT_UA_URL: &str = "https://github.com/fierce/sitegrab";

/// Default User-Agent for page and asset requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("sitegrab/{version} (+{PROJECT_UA_URL})")
}
