use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Repository action a webhook record describes.
///
/// The backend tags records with a free-form string; anything outside the
/// three modeled actions is kept verbatim in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WebhookAction {
    Push,
    PullRequest,
    PullRequestMerged,
    Unknown(String),
}

impl Default for WebhookAction {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl WebhookAction {
    pub fn as_str(&self) -> &str {
        match self {
            WebhookAction::Push => "push",
            WebhookAction::PullRequest => "pull_request",
            WebhookAction::PullRequestMerged => "pull_request_merged",
            WebhookAction::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, WebhookAction::Unknown(_))
    }
}

impl From<&str> for WebhookAction {
    fn from(raw: &str) -> Self {
        match raw {
            "push" => WebhookAction::Push,
            "pull_request" => WebhookAction::PullRequest,
            "pull_request_merged" => WebhookAction::PullRequestMerged,
            other => WebhookAction::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for WebhookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WebhookAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WebhookAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(WebhookAction::from).unwrap_or_default())
    }
}

/// Backend-computed age snapshot. Each field may be missing, null, a number,
/// or a decimal string; anything unreadable counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeAge {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub days: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub hours: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub minutes: Option<i64>,
}

impl RelativeAge {
    pub fn new(days: i64, hours: i64, minutes: i64) -> Self {
        Self {
            days: Some(days),
            hours: Some(hours),
            minutes: Some(minutes),
        }
    }

    /// `days * 1440 + hours * 60 + minutes`, absent fields as zero. `None`
    /// when the encoding does not fit in an `i64`.
    pub fn encoded_minutes(&self) -> Option<i64> {
        self.days
            .unwrap_or(0)
            .checked_mul(1440)?
            .checked_add(self.hours.unwrap_or(0).checked_mul(60)?)?
            .checked_add(self.minutes.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub action: WebhookAction,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub from_branch: Option<String>,
    #[serde(default)]
    pub to_branch: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub timestamp: String,
    #[serde(default)]
    pub time: Option<RelativeAge>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl Event {
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub pushes: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub pull_requests: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub pull_request_merged: Option<i64>,
}

impl Stats {
    /// Counter labels and values in display order, absent values as zero.
    pub fn counters(&self) -> [(&'static str, i64); 4] {
        [
            ("Total", self.total.unwrap_or(0)),
            ("Pushes", self.pushes.unwrap_or(0)),
            ("Pull Requests", self.pull_requests.unwrap_or(0)),
            ("Merges", self.pull_request_merged.unwrap_or(0)),
        ]
    }
}

/// Body of `GET /webhook/data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookFeed {
    pub webhooks: Vec<Event>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub stats: Stats,
}

/// Parses an RFC 3339 timestamp, falling back to a naive ISO-8601 date-time
/// read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    Ok(match val {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(&s),
        _ => None,
    })
}

/// Integer prefix of `raw` after leading whitespace, so `"14abc"` and `"5.0"`
/// read as 14 and 5.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits = trimmed[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len() - sign_len);
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    Ok(match val {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_decodes_known_and_unknown_tags() {
        let event: Event = serde_json::from_value(json!({ "action": "pull_request_merged" }))
            .expect("decode");
        assert_eq!(event.action, WebhookAction::PullRequestMerged);

        let event: Event =
            serde_json::from_value(json!({ "action": "deploy" })).expect("decode");
        assert_eq!(event.action, WebhookAction::Unknown("deploy".to_string()));
        assert!(!event.action.is_known());

        let event: Event = serde_json::from_value(json!({ "action": null })).expect("decode");
        assert_eq!(event.action, WebhookAction::default());
    }

    #[test]
    fn relative_age_accepts_strings_numbers_and_garbage() {
        let age: RelativeAge = serde_json::from_value(json!({
            "days": "5",
            "hours": 14,
            "minutes": "soon"
        }))
        .expect("decode");
        assert_eq!(age.days, Some(5));
        assert_eq!(age.hours, Some(14));
        assert_eq!(age.minutes, None);
        assert_eq!(age.encoded_minutes(), Some(5 * 1440 + 14 * 60));
    }

    #[test]
    fn counts_read_the_leading_integer_of_a_string() {
        let age: RelativeAge = serde_json::from_value(json!({
            "days": "5.0",
            "hours": " 14abc",
            "minutes": "-3"
        }))
        .expect("decode");
        assert_eq!(age.days, Some(5));
        assert_eq!(age.hours, Some(14));
        assert_eq!(age.minutes, Some(-3));

        let age: RelativeAge = serde_json::from_value(json!({
            "days": "+",
            "hours": "",
            "minutes": "99999999999999999999"
        }))
        .expect("decode");
        assert_eq!(age, RelativeAge::default());
    }

    #[test]
    fn oversized_age_has_no_encoding() {
        let age: RelativeAge =
            serde_json::from_value(json!({ "days": "9223372036854775807" })).expect("decode");
        assert_eq!(age.days, Some(i64::MAX));
        assert_eq!(age.encoded_minutes(), None);

        let age = RelativeAge {
            days: Some(0),
            hours: Some(0),
            minutes: Some(i64::MIN),
        };
        assert_eq!(age.encoded_minutes(), Some(i64::MIN));
    }

    #[test]
    fn backend_record_with_extra_fields_decodes() {
        let event: Event = serde_json::from_value(json!({
            "_id": { "$oid": "65e7" },
            "request_id": "a1b2c3",
            "author": "octocat",
            "action": "push",
            "from_branch": null,
            "to_branch": "main",
            "timestamp": "2024-03-05T14:30:00+05:30",
            "time": { "days": "5", "hours": "14", "minutes": "30" }
        }))
        .expect("decode");
        assert_eq!(event.author.as_deref(), Some("octocat"));
        assert_eq!(event.from_branch, None);
        assert_eq!(event.request_id.as_deref(), Some("a1b2c3"));
        assert_eq!(event.time, Some(RelativeAge::new(5, 14, 30)));
    }

    #[test]
    fn feed_without_stats_defaults_counters() {
        let feed: WebhookFeed =
            serde_json::from_value(json!({ "webhooks": [], "stats": null })).expect("decode");
        assert_eq!(feed.stats, Stats::default());
        let values: Vec<i64> = feed.stats.counters().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0, 0, 0, 0]);
    }

    #[test]
    fn feed_without_webhooks_is_rejected() {
        let result = serde_json::from_value::<WebhookFeed>(json!({ "stats": {} }));
        assert!(result.is_err());
    }

    #[test]
    fn parse_timestamp_handles_offsets_and_naive_values() {
        let with_offset = parse_timestamp("2024-03-05T14:30:00+05:30").expect("rfc3339");
        assert_eq!(with_offset.to_rfc3339(), "2024-03-05T09:00:00+00:00");

        let naive = parse_timestamp("2024-03-05T14:30:00.250").expect("naive");
        assert_eq!(naive.timestamp_millis() % 1000, 250);

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
