//! Outbound requests and replies

use serde::{Deserialize, Serialize};

use crate::style_id::StyleId;

/// Method name of the styles query
pub const GET_STYLES: &str = "getStyles";

/// Identifier the transport assigns to an outbound request
pub type RequestId = u64;

/// Query for the styles applicable to a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStylesRequest {
    pub method: String,
    pub match_url: String,
    pub enabled: bool,
    pub as_hash: bool,
    /// Restrict the answer to a single style
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StyleId>,
}

impl GetStylesRequest {
    /// Query all enabled styles matching `match_url`, keyed by id
    pub fn new(match_url: impl Into<String>) -> Self {
        Self {
            method: GET_STYLES.to_string(),
            match_url: match_url.into(),
            enabled: true,
            as_hash: true,
            id: None,
        }
    }

    /// Restrict the query to one style
    pub fn for_style(mut self, id: StyleId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Reply sent back over the channel for messages that expect one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// Plain acknowledgement
    Ack(bool),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = GetStylesRequest::new("https://a.test/");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "method": "getStyles",
                "matchUrl": "https://a.test/",
                "enabled": true,
                "asHash": true
            })
        );
    }

    #[test]
    fn test_request_with_id_override() {
        let request = GetStylesRequest::new("https://a.test/").for_style(StyleId::from(5));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["id"], json!(5));
    }

    #[test]
    fn test_ack_serializes_as_bool() {
        assert_eq!(serde_json::to_string(&Reply::Ack(true)).unwrap(), "true");
    }
}
