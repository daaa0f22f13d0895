use crate::state::App;
use crate::theme::{self, icons};
use chrono::{DateTime, Local, TimeZone};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::fmt::Write as _;
use webhook_core::{render_event, Stats, ViewSnapshot};

pub const TITLE: &str = "Webhook History";
pub const EMPTY_FEED: &str = "No webhook data available.";
const REQUEST_ID_CHARS: usize = 7;

pub fn render(frame: &mut Frame, app: &App, now: &DateTime<Local>) {
    let size = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(size);
    frame.render_widget(render_header(app, size.width), layout[0]);
    render_stats(frame, app.snapshot().stats(), layout[1]);
    frame.render_widget(render_feed(app, now), layout[2]);
    if app.help_open {
        render_help_overlay(frame);
    }
}

fn panel(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .style(Style::default().bg(theme::SURFACE))
        .title(Span::styled(title, theme::TITLE_STYLE))
}

fn render_header(app: &App, width: u16) -> Paragraph<'static> {
    let updated = app
        .last_success()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "waiting for first poll".to_string());
    let status = format!(
        "Source: {}  Updated: {}  Events: {}  Polls: {}",
        app.source_label(),
        updated,
        app.snapshot().len(),
        app.successful_polls()
    );
    let inner_width = width.saturating_sub(4) as usize;

    Paragraph::new(Text::from(vec![
        Line::from(Span::styled(TITLE, theme::TITLE_STYLE)),
        Line::from(Span::styled(
            ellipsize(&status, inner_width.max(12)),
            Style::default().fg(theme::MUTED),
        )),
    ]))
    .style(Style::default().fg(theme::TEXT).bg(theme::BG))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER))
            .style(Style::default().bg(theme::BG)),
    )
}

fn render_stats(frame: &mut Frame, stats: &Stats, area: Rect) {
    let block = panel("Stats");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let counters = stats.counters();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(counters.map(|_| Constraint::Ratio(1, counters.len() as u32)))
        .split(inner);
    for ((label, value), column) in counters.iter().zip(columns.iter()) {
        let cell = Paragraph::new(Text::from(vec![
            Line::from(Span::styled(value.to_string(), theme::COUNTER_STYLE)),
            Line::from(Span::styled(*label, theme::LABEL_STYLE)),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(cell, *column);
    }
}

fn render_feed(app: &App, now: &DateTime<Local>) -> Paragraph<'static> {
    Paragraph::new(Text::from(feed_lines(app.snapshot(), now)))
        .style(Style::default().fg(theme::TEXT).bg(theme::SURFACE))
        .block(panel("Feed"))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0))
}

/// One card per event, newest first, or the placeholder when empty.
pub fn feed_lines<Tz: TimeZone>(snapshot: &ViewSnapshot, now: &DateTime<Tz>) -> Vec<Line<'static>> {
    if snapshot.is_empty() {
        return vec![Line::from(Span::styled(EMPTY_FEED, theme::PLACEHOLDER_STYLE))];
    }

    let mut lines = Vec::with_capacity(snapshot.len() * 3);
    for event in snapshot.events() {
        let edge = Span::styled(
            icons::CARD_EDGE,
            Style::default().fg(theme::action_color(&event.action)),
        );
        let message = render_event(event, now);

        let mut content = vec![edge.clone()];
        content.extend(
            message
                .content
                .into_iter()
                .map(|segment| Span::styled(segment.text, theme::segment_style(segment.emphasis))),
        );
        lines.push(Line::from(content));

        let mut meta = Vec::new();
        if let Some(label) = message.time_label {
            meta.push(Span::styled(
                format!("{}{label}", icons::CLOCK),
                Style::default().fg(theme::MUTED),
            ));
        }
        if let Some(request_id) = event.request_id.as_deref().filter(|id| !id.is_empty()) {
            if !meta.is_empty() {
                meta.push(Span::raw("  "));
            }
            meta.push(Span::styled(
                format!("#{}", short_id(request_id)),
                Style::default()
                    .fg(theme::BORDER)
                    .add_modifier(Modifier::DIM),
            ));
        }
        if !meta.is_empty() {
            let mut meta_line = vec![edge];
            meta_line.extend(meta);
            lines.push(Line::from(meta_line));
        }
        lines.push(Line::from(""));
    }
    lines
}

/// Text rendition of the whole view, used by `--once`.
pub fn plain_report<Tz: TimeZone>(snapshot: &ViewSnapshot, now: &DateTime<Tz>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let counters: Vec<String> = snapshot
        .stats()
        .counters()
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
    let _ = writeln!(out, "{}", counters.join("  "));
    let _ = writeln!(out);
    if snapshot.is_empty() {
        let _ = writeln!(out, "{EMPTY_FEED}");
        return out;
    }
    for event in snapshot.events() {
        let _ = writeln!(out, "- {}", render_event(event, now));
    }
    out
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(60, 50, frame.size());
    let lines = vec![
        Line::from(Span::styled("Controls", theme::TITLE_STYLE)),
        Line::from("  j/k      scroll feed"),
        Line::from("  PgDn/PgUp scroll a page"),
        Line::from("  g        jump to top"),
        Line::from("  r        poll now"),
        Line::from(""),
        Line::from("  ? or F1  toggle this help"),
        Line::from("  Esc      close help"),
        Line::from("  q        quit"),
    ];
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().fg(theme::TEXT).bg(theme::SURFACE))
            .block(panel("Help"))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100u16.saturating_sub(percent_y)) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100u16.saturating_sub(percent_x)) / 2),
        ])
        .split(vertical[1])[1]
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(REQUEST_ID_CHARS) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn ellipsize(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }
    let mut out: String = input.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use webhook_core::{Event, RelativeAge, WebhookAction, WebhookFeed};

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 30)).expect("terminal");
        let now = Local::now();
        terminal
            .draw(|frame| render(frame, app, &now))
            .expect("draw");
        buffer_text(terminal.backend().buffer())
    }

    fn sample_feed() -> WebhookFeed {
        WebhookFeed {
            webhooks: vec![
                Event {
                    action: WebhookAction::Push,
                    author: Some("octocat".to_string()),
                    to_branch: Some("main".to_string()),
                    timestamp: "2024-03-05T10:00:00Z".to_string(),
                    time: Some(RelativeAge::new(5, 10, 0)),
                    request_id: Some("9f1c2e4d5a6b".to_string()),
                    ..Event::default()
                },
                Event {
                    action: WebhookAction::Unknown("deploy".to_string()),
                    timestamp: "2024-03-05T11:00:00Z".to_string(),
                    ..Event::default()
                },
            ],
            stats: Stats {
                total: Some(2),
                pushes: Some(1),
                ..Stats::default()
            },
        }
    }

    #[test]
    fn empty_view_shows_placeholder_and_zero_counters() {
        let app = App::new("http://localhost:5000/webhook/data");
        let screen = draw(&app);
        assert!(screen.contains(TITLE));
        assert!(screen.contains(EMPTY_FEED));
        for label in ["Total", "Pushes", "Pull Requests", "Merges"] {
            assert!(screen.contains(label), "{label}");
        }
        assert!(screen.contains("waiting for first poll"));
        assert!(!screen.contains("Unknown webhook action"));
    }

    #[test]
    fn feed_cards_render_newest_first() {
        let mut app = App::new("backend");
        app.apply_poll(Ok(sample_feed()));
        let screen = draw(&app);

        let unknown = screen.find("Unknown webhook action").expect("unknown card");
        let push = screen.find("octocat pushed to main").expect("push card");
        assert!(unknown < push);
        assert!(screen.contains("#9f1c2e4"));
        assert!(!screen.contains(EMPTY_FEED));
    }

    #[test]
    fn help_overlay_lists_controls() {
        let mut app = App::new("backend");
        app.help_open = true;
        let screen = draw(&app);
        assert!(screen.contains("Controls"));
        assert!(screen.contains("poll now"));
    }

    #[test]
    fn feed_lines_skip_meta_for_unknown_actions() {
        let snapshot = ViewSnapshot::from_feed(WebhookFeed {
            webhooks: vec![Event {
                action: WebhookAction::Unknown("deploy".to_string()),
                ..Event::default()
            }],
            stats: Stats::default(),
        });
        let lines = feed_lines(&snapshot, &Local::now());
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn plain_report_lists_counters_and_messages() {
        let snapshot = ViewSnapshot::from_feed(sample_feed());
        let report = plain_report(&snapshot, &Local::now());
        let mut lines = report.lines();
        assert_eq!(lines.next(), Some(TITLE));
        assert_eq!(
            lines.next(),
            Some("Total: 2  Pushes: 1  Pull Requests: 0  Merges: 0")
        );
        assert!(report.contains("- Unknown webhook action"));
        assert!(report.contains("- octocat pushed to main on "));
    }

    #[test]
    fn plain_report_for_empty_snapshot() {
        let report = plain_report(&ViewSnapshot::empty(), &Local::now());
        assert!(report.ends_with(&format!("{EMPTY_FEED}\n")));
    }

    #[test]
    fn short_id_truncates_on_char_boundary() {
        assert_eq!(short_id("9f1c2e4d5a6b"), "9f1c2e4");
        assert_eq!(short_id("abc"), "abc");
    }
}
