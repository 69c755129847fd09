//! # Client Environment
//!
//! Whether the payer runs inside a Mini App host or a standalone browser.
//! Only affects message wording and which wallet connector is tried first;
//! it carries no security weight.

use serde::{Deserialize, Serialize};

/// DOM attribute hosts set on embedded documents
pub const EMBEDDED_MARKER_ATTRIBUTE: &str = "data-farcaster";

const EMBEDDED_URL_HINTS: &[&str] = &["farcaster", "warpcast"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientEnvironment {
    /// Inside a Farcaster Mini App host with its own wallet bridge
    Embedded,
    /// Ordinary browser session
    Standalone,
}

impl ClientEnvironment {
    /// Detect from the page URL and whether the embedded marker is present.
    pub fn detect(url: &str, has_marker: bool) -> Self {
        if has_marker || EMBEDDED_URL_HINTS.iter().any(|hint| url.contains(hint)) {
            ClientEnvironment::Embedded
        } else {
            ClientEnvironment::Standalone
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ClientEnvironment::Embedded)
    }

    /// Wallet connector to attempt first
    pub fn preferred_connector(&self) -> &'static str {
        match self {
            ClientEnvironment::Embedded => "farcaster",
            ClientEnvironment::Standalone => "injected",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientEnvironment::Embedded => "embedded",
            ClientEnvironment::Standalone => "standalone",
        }
    }
}

impl Default for ClientEnvironment {
    fn default() -> Self {
        ClientEnvironment::Standalone
    }
}

impl std::fmt::Display for ClientEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_url() {
        assert_eq!(
            ClientEnvironment::detect("https://warpcast.com/~/frames/payx", false),
            ClientEnvironment::Embedded
        );
        assert_eq!(
            ClientEnvironment::detect("https://payx.example/?via=farcaster", false),
            ClientEnvironment::Embedded
        );
        assert_eq!(
            ClientEnvironment::detect("https://payx.example/", false),
            ClientEnvironment::Standalone
        );
    }

    #[test]
    fn test_detect_from_marker() {
        let env = ClientEnvironment::detect("https://payx.example/", true);
        assert!(env.is_embedded());
        assert_eq!(env.preferred_connector(), "farcaster");
    }
}
