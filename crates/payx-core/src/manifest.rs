//! # Mini App Manifest
//!
//! The document a Farcaster host fetches from `/.well-known/farcaster.json`
//! to install the paywall as a Mini App.

use serde::{Deserialize, Serialize};

/// Signed proof that the domain belongs to a Farcaster account.
/// Produced by the host's developer tools; served verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAssociation {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

/// Mini App metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMetadata {
    /// Manifest schema version
    pub version: String,

    /// Display name (e.g. "PAYx402")
    pub name: String,

    pub icon_url: String,

    /// Page the host opens
    pub home_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash_image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash_background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniAppManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_association: Option<AccountAssociation>,
    pub frame: FrameMetadata,
}

impl MiniAppManifest {
    /// Manifest for an app served from `base_url`, using its logo for
    /// icon and splash images.
    pub fn new(name: impl Into<String>, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let logo = format!("{}/logo.png", base);
        Self {
            account_association: None,
            frame: FrameMetadata {
                version: "1".to_string(),
                name: name.into(),
                icon_url: logo.clone(),
                home_url: base.to_string(),
                image_url: Some(logo.clone()),
                button_title: Some("Buy PAYX".to_string()),
                splash_image_url: Some(logo),
                splash_background_color: Some("#000814".to_string()),
                webhook_url: None,
            },
        }
    }

    /// Load from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
