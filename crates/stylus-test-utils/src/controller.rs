//! In-memory stand-in for the privileged controller's style store.

use std::collections::BTreeMap;

use stylus_protocol::{GetStylesRequest, Section, StyleId, StyleMap, StyleResponse, StyleState};

use crate::builders::section;

#[derive(Debug, Clone)]
struct StoredStyle {
    enabled: bool,
    sections: Vec<Section>,
}

/// Canonical style set a test mutates, answering `getStyles` queries the way
/// the real controller does
#[derive(Debug, Clone, Default)]
pub struct Controller {
    styles: BTreeMap<StyleId, StoredStyle>,
    disable_all: Option<bool>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store (or overwrite) an enabled style
    pub fn put(&mut self, id: u64, codes: &[&str]) -> StyleState {
        let sections: Vec<Section> = codes.iter().map(|c| section(c)).collect();
        self.styles.insert(
            StyleId::from(id),
            StoredStyle {
                enabled: true,
                sections,
            },
        );
        StyleState::new(id, true)
    }

    /// Flip the enabled flag of a stored style
    pub fn set_enabled(&mut self, id: u64, enabled: bool) -> StyleState {
        if let Some(style) = self.styles.get_mut(&StyleId::from(id)) {
            style.enabled = enabled;
        }
        StyleState::new(id, enabled)
    }

    pub fn remove(&mut self, id: u64) {
        self.styles.remove(&StyleId::from(id));
    }

    /// Include the global disable flag in full answers
    pub fn set_disable_all(&mut self, disable: bool) {
        self.disable_all = Some(disable);
    }

    /// Answer a styles query: enabled styles, restricted to one id when the
    /// request asks for it
    pub fn answer(&self, request: &GetStylesRequest) -> StyleResponse {
        let styles: StyleMap = self
            .styles
            .iter()
            .filter(|(id, style)| {
                style.enabled && request.id.as_ref().is_none_or(|wanted| wanted == *id)
            })
            .map(|(id, style)| (id.clone(), style.sections.clone()))
            .collect();
        let mut response = StyleResponse::new(styles);
        if request.id.is_none() {
            response.disable_all = self.disable_all;
        }
        response
    }
}
