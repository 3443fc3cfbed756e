//! Push notifications from the controller
//!
//! Every notification is a JSON object tagged by its `method` field.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::style_id::StyleId;
use crate::styles::{Section, StylesPayload};

/// Style fields carried by `styleAdded` / `styleUpdated`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StyleState {
    pub id: StyleId,
    #[serde(default)]
    pub enabled: bool,
    /// Present when the controller ships the new code inline
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
}

impl StyleState {
    pub fn new(id: impl Into<StyleId>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            enabled,
            sections: None,
        }
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = Some(sections);
        self
    }
}

/// Preference changes relevant to injection
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Prefs {
    #[serde(rename = "disableAll", default)]
    pub disable_all: Option<bool>,
}

/// A message pushed by the controller
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Notification {
    StyleDeleted {
        id: StyleId,
    },
    StyleUpdated {
        style: StyleState,
        /// `Some(false)` when only the enabled state changed
        #[serde(rename = "codeIsUpdated", default)]
        code_is_updated: Option<bool>,
    },
    StyleAdded {
        style: StyleState,
    },
    StyleApply {
        styles: StylesPayload,
    },
    StyleReplaceAll {
        styles: StylesPayload,
    },
    PrefChanged {
        prefs: Prefs,
    },
    Ping,
    /// Any method this engine does not handle
    #[serde(other)]
    Unknown,
}

impl Notification {
    /// Decode a notification from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Decode a notification from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The wire method name
    pub fn method(&self) -> &'static str {
        match self {
            Notification::StyleDeleted { .. } => "styleDeleted",
            Notification::StyleUpdated { .. } => "styleUpdated",
            Notification::StyleAdded { .. } => "styleAdded",
            Notification::StyleApply { .. } => "styleApply",
            Notification::StyleReplaceAll { .. } => "styleReplaceAll",
            Notification::PrefChanged { .. } => "prefChanged",
            Notification::Ping => "ping",
            Notification::Unknown => "unknown",
        }
    }
}
