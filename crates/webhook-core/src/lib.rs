//! Webhook feed contracts and the pure half of the viewer pipeline: payload
//! model, time formatting, message rendering and the sorted view snapshot.

pub mod error;
pub mod model;
pub mod render;
pub mod snapshot;
pub mod time_format;

pub use error::PollError;
pub use model::{Event, RelativeAge, Stats, WebhookAction, WebhookFeed};
pub use render::{render_event, render_event_in, DisplayMessage, Emphasis, Segment};
pub use snapshot::ViewSnapshot;
pub use time_format::{absolute_time, absolute_time_in, relative_age};

/// Decodes a `GET /webhook/data` body.
pub fn decode_feed(body: &[u8]) -> Result<WebhookFeed, PollError> {
    Ok(serde_json::from_slice(body)?)
}
