//! Payload shorthands.

use stylus_protocol::{Section, StyleId, StyleMap, StyleResponse};

/// One section carrying `code`
pub fn section(code: &str) -> Section {
    Section::new(code)
}

/// A styles response from `(id, [code, ...])` pairs
///
/// ```
/// use stylus_test_utils::styles;
///
/// let response = styles(&[(1, &["a{color:red}"]), (2, &["b{}", "i{}"])]);
/// assert_eq!(response.styles.len(), 2);
/// assert_eq!(response.disable_all, None);
/// ```
pub fn styles(entries: &[(u64, &[&str])]) -> StyleResponse {
    let map: StyleMap = entries
        .iter()
        .map(|(id, codes)| {
            (
                StyleId::from(*id),
                codes.iter().map(|code| section(code)).collect(),
            )
        })
        .collect();
    StyleResponse::new(map)
}
