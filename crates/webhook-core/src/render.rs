use crate::model::{Event, WebhookAction};
use crate::time_format::{absolute_time_in, relative_age};
use chrono::{DateTime, Local, TimeZone};
use std::fmt;

pub const MISSING_FIELD: &str = "N/A";
pub const UNKNOWN_ACTION_MESSAGE: &str = "Unknown webhook action";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    /// Actor and branch names.
    Strong,
    /// The absolute-time suffix.
    Italic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub emphasis: Emphasis,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Plain,
        }
    }

    fn strong(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Strong,
        }
    }

    fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasis: Emphasis::Italic,
        }
    }
}

/// Display-ready feed card: rich content plus an optional relative-age label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub content: Vec<Segment>,
    pub time_label: Option<String>,
}

impl DisplayMessage {
    pub fn plain_text(&self) -> String {
        self.content.iter().map(|segment| segment.text.as_str()).collect()
    }
}

impl fmt::Display for DisplayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain_text())?;
        if let Some(label) = &self.time_label {
            write!(f, " ({label})")?;
        }
        Ok(())
    }
}

/// Renders an event with absolute times in the observer's local zone.
pub fn render_event<Tz: TimeZone>(event: &Event, now: &DateTime<Tz>) -> DisplayMessage {
    render_event_in(event, now, &Local)
}

pub fn render_event_in<Tz, Z>(event: &Event, now: &DateTime<Tz>, zone: &Z) -> DisplayMessage
where
    Tz: TimeZone,
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let author = field_or_missing(&event.author);
    let from = field_or_missing(&event.from_branch);
    let to = field_or_missing(&event.to_branch);

    let mut content = match &event.action {
        WebhookAction::Push => vec![
            Segment::strong(author),
            Segment::plain(" pushed to "),
            Segment::strong(to),
        ],
        WebhookAction::PullRequest => vec![
            Segment::strong(author),
            Segment::plain(" submitted a pull request from "),
            Segment::strong(from),
            Segment::plain(" to "),
            Segment::strong(to),
        ],
        WebhookAction::PullRequestMerged => vec![
            Segment::strong(author),
            Segment::plain(" merged branch "),
            Segment::strong(from),
            Segment::plain(" to "),
            Segment::strong(to),
        ],
        WebhookAction::Unknown(_) => {
            return DisplayMessage {
                content: vec![Segment::plain(UNKNOWN_ACTION_MESSAGE)],
                time_label: None,
            };
        }
    };
    content.push(Segment::italic(absolute_time_in(&event.timestamp, zone)));

    let label = relative_age(event.time.as_ref(), now);
    DisplayMessage {
        content,
        time_label: (!label.is_empty()).then_some(label),
    }
}

fn field_or_missing(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(text) if !text.is_empty() => text,
        _ => MISSING_FIELD,
    }
}
