//! Message types for the channel between the stylus injector and its
//! controller.
//!
//! - [`GetStylesRequest`]: the query the injector sends
//! - [`StyleResponse`]: the reply, a style-id to sections map
//! - [`Notification`]: pushes from the controller, tagged by `method`
//! - [`Reply`]: acknowledgements the injector sends back (`ping`)

pub mod error;
pub mod notification;
pub mod request;
pub mod style_id;
pub mod styles;

pub use error::{Error, Result};
pub use notification::{Notification, Prefs, StyleState};
pub use request::{GET_STYLES, GetStylesRequest, Reply, RequestId};
pub use style_id::StyleId;
pub use styles::{
    DIY_MARKER, DISABLE_ALL_KEY, Section, StyleMap, StyleResponse, StylesPayload, joined_code,
};
