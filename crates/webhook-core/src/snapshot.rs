use crate::model::{Event, Stats, WebhookFeed};
use std::cmp::Reverse;

/// Events and counters currently on screen. Only replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    events: Vec<Event>,
    stats: Stats,
}

impl ViewSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_feed(feed: WebhookFeed) -> Self {
        let WebhookFeed {
            webhooks: mut events,
            stats,
        } = feed;
        sort_newest_first(&mut events);
        Self { events, stats }
    }

    pub fn replace(&mut self, feed: WebhookFeed) {
        *self = Self::from_feed(feed);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

/// Orders events by timestamp, newest first. Unparseable timestamps go last
/// and ties keep their incoming order.
pub fn sort_newest_first(events: &mut [Event]) {
    events.sort_by_cached_key(|event| Reverse(event.occurred_at()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WebhookAction;

    fn at(timestamp: &str) -> Event {
        Event {
            action: WebhookAction::Push,
            timestamp: timestamp.to_string(),
            ..Event::default()
        }
    }

    fn timestamps(snapshot: &ViewSnapshot) -> Vec<&str> {
        snapshot
            .events()
            .iter()
            .map(|event| event.timestamp.as_str())
            .collect()
    }

    #[test]
    fn ingest_sorts_newest_first() {
        let snapshot = ViewSnapshot::from_feed(WebhookFeed {
            webhooks: vec![
                at("2024-03-05T10:00:00Z"),
                at("2024-03-06T09:00:00Z"),
                at("2024-03-04T23:59:59Z"),
                at("2024-03-05T12:00:00Z"),
            ],
            stats: Stats::default(),
        });
        assert_eq!(
            timestamps(&snapshot),
            vec![
                "2024-03-06T09:00:00Z",
                "2024-03-05T12:00:00Z",
                "2024-03-05T10:00:00Z",
                "2024-03-04T23:59:59Z",
            ]
        );
        let instants: Vec<_> = snapshot.events().iter().map(Event::occurred_at).collect();
        assert!(instants.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn sort_compares_instants_not_strings() {
        let mut events = vec![
            at("2024-03-05T14:30:00+05:30"),
            at("2024-03-05T10:00:00Z"),
        ];
        sort_newest_first(&mut events);
        assert_eq!(events[0].timestamp, "2024-03-05T10:00:00Z");
    }

    #[test]
    fn equal_instants_keep_payload_order() {
        let mut events = vec![
            Event {
                author: Some("first".to_string()),
                ..at("2024-03-05T09:00:00Z")
            },
            at("2024-03-05T14:30:00+05:30"),
            at("2024-03-05T12:00:00Z"),
            Event {
                author: Some("last".to_string()),
                ..at("2024-03-05T09:00:00Z")
            },
        ];
        sort_newest_first(&mut events);
        let order: Vec<_> = events
            .iter()
            .map(|event| (event.timestamp.as_str(), event.author.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("2024-03-05T12:00:00Z", None),
                ("2024-03-05T09:00:00Z", Some("first")),
                ("2024-03-05T14:30:00+05:30", None),
                ("2024-03-05T09:00:00Z", Some("last")),
            ]
        );
    }

    #[test]
    fn unparseable_timestamps_sink_to_the_end() {
        let mut events = vec![at("garbage"), at("2024-03-05T10:00:00Z"), at("")];
        sort_newest_first(&mut events);
        assert_eq!(events[0].timestamp, "2024-03-05T10:00:00Z");
        assert_eq!(events[1].timestamp, "garbage");
        assert_eq!(events[2].timestamp, "");
    }

    #[test]
    fn replace_swaps_events_and_stats_together() {
        let mut snapshot = ViewSnapshot::from_feed(WebhookFeed {
            webhooks: vec![at("2024-03-05T10:00:00Z")],
            stats: Stats {
                total: Some(1),
                ..Stats::default()
            },
        });
        snapshot.replace(WebhookFeed::default());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.stats(), &Stats::default());
    }
}
