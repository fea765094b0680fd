//! User agent selection for image fetches.
//!
//! Image hosts commonly reject non-browser clients, so requests go out with
//! a real browser user agent unless the config names one.

use std::borrow::Cow;

use chrono::Utc;

/// Config value that selects a rotating browser user agent.
pub const IMPERSONATE: &str = "impersonate";

/// Browser user agents. The first entry is the fixed default.
pub const BROWSER_USER_AGENTS: &[&str] = &[
    // Chrome / Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Chrome / macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Firefox / Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Firefox / macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Safari / macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    // Edge / Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// How the fetcher identifies itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgent {
    /// Fixed browser user agent (default).
    Browser,
    /// One of [`BROWSER_USER_AGENTS`], picked when the client is built.
    Impersonate,
    /// Verbatim string from the config.
    Custom(String),
}

impl UserAgent {
    /// Interpret the `user_agent` config value. Blank counts as unset.
    pub fn from_config(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Browser,
            Some(v) if v.eq_ignore_ascii_case(IMPERSONATE) => Self::Impersonate,
            Some(v) => Self::Custom(v.to_string()),
        }
    }

    /// The header value to send.
    pub fn header_value(&self) -> Cow<'static, str> {
        match self {
            Self::Browser => Cow::Borrowed(BROWSER_USER_AGENTS[0]),
            Self::Impersonate => {
                let pick = Utc::now().timestamp_subsec_nanos() as usize;
                Cow::Borrowed(BROWSER_USER_AGENTS[pick % BROWSER_USER_AGENTS.len()])
            }
            Self::Custom(ua) => Cow::Owned(ua.clone()),
        }
    }
}
