//! Styles payloads
//!
//! A `getStyles` reply (and the `styles` field of `styleApply` /
//! `styleReplaceAll`) is a JSON object keyed by style id, each value being the
//! style's sections. The same object may carry a `disableAll` key with the
//! current global-disable preference.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::style_id::StyleId;

/// Key carrying the global disable flag inside a styles object
pub const DISABLE_ALL_KEY: &str = "disableAll";

/// Marker asking the receiver to fetch the styles itself
pub const DIY_MARKER: &str = "DIY";

/// One section of a style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Presentation text of this section
    #[serde(default)]
    pub code: String,
}

impl Section {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Style id to sections, in id order
pub type StyleMap = BTreeMap<StyleId, Vec<Section>>;

/// A decoded styles object
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct StyleResponse {
    /// Sections per style
    pub styles: StyleMap,
    /// Global disable flag, when the controller included it
    pub disable_all: Option<bool>,
}

impl StyleResponse {
    /// A response with only styles
    pub fn new(styles: StyleMap) -> Self {
        Self {
            styles,
            disable_all: None,
        }
    }

    /// Attach the global disable flag
    pub fn with_disable_all(mut self, disable_all: bool) -> Self {
        self.disable_all = Some(disable_all);
        self
    }

    /// Decode from a JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(object) = value else {
            return Err(Error::InvalidPayload {
                reason: "styles must be an object".to_string(),
            });
        };

        let mut response = StyleResponse::default();
        for (key, value) in object {
            if key == DISABLE_ALL_KEY {
                let flag = value.as_bool().ok_or_else(|| Error::InvalidPayload {
                    reason: format!("{} must be a boolean", DISABLE_ALL_KEY),
                })?;
                response.disable_all = Some(flag);
                continue;
            }
            let sections: Vec<Section> =
                serde_json::from_value(value).map_err(|e| Error::InvalidPayload {
                    reason: format!("style {}: {}", key, e),
                })?;
            response.styles.insert(StyleId::from(key), sections);
        }
        Ok(response)
    }
}

impl TryFrom<Value> for StyleResponse {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// The `styles` field of a push notification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum StylesPayload {
    /// Fetch the styles directly instead of receiving them inline
    Diy,
    /// `null`: the controller had nothing to send yet, ask again
    NotReady,
    /// Styles delivered inline
    Styles(StyleResponse),
}

impl TryFrom<Value> for StylesPayload {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(StylesPayload::NotReady),
            Value::String(s) if s == DIY_MARKER => Ok(StylesPayload::Diy),
            Value::String(s) => Err(Error::InvalidPayload {
                reason: format!("unexpected styles marker {:?}", s),
            }),
            other => StyleResponse::from_value(other).map(StylesPayload::Styles),
        }
    }
}

/// Concatenate section code the way it is injected: newline separated, in order
pub fn joined_code(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| s.code.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
