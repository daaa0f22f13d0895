use ratatui::style::{Color, Modifier, Style};
use webhook_core::{Emphasis, WebhookAction};

pub const BG: Color = Color::Rgb(11, 18, 32);
pub const SURFACE: Color = Color::Rgb(17, 26, 46);
pub const BORDER: Color = Color::Rgb(71, 85, 105);
pub const TEXT: Color = Color::Rgb(226, 232, 240);
pub const MUTED: Color = Color::Rgb(148, 163, 184);

pub const TITLE_STYLE: Style = Style::new()
    .fg(Color::Rgb(191, 219, 254))
    .add_modifier(Modifier::BOLD);
pub const COUNTER_STYLE: Style = Style::new()
    .fg(Color::Rgb(56, 189, 248))
    .add_modifier(Modifier::BOLD);
pub const LABEL_STYLE: Style = Style::new().fg(MUTED);
pub const PLACEHOLDER_STYLE: Style = Style::new().fg(Color::Rgb(100, 116, 139));

pub fn segment_style(emphasis: Emphasis) -> Style {
    match emphasis {
        Emphasis::Plain => Style::new().fg(TEXT),
        Emphasis::Strong => Style::new().fg(TEXT).add_modifier(Modifier::BOLD),
        Emphasis::Italic => Style::new().fg(MUTED).add_modifier(Modifier::ITALIC),
    }
}

/// Color of the bar on the left edge of a feed card.
pub fn action_color(action: &WebhookAction) -> Color {
    match action {
        WebhookAction::Push => Color::Rgb(75, 108, 183),
        WebhookAction::PullRequest => Color::Rgb(245, 158, 11),
        WebhookAction::PullRequestMerged => Color::Rgb(34, 197, 94),
        WebhookAction::Unknown(_) => BORDER,
    }
}

pub mod icons {
    pub const CARD_EDGE: &str = "▌ ";
    pub const CLOCK: &str = "~ ";
}
