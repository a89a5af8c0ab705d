//! Terminal renderer for the conversation.
//!
//! Messages are rendered from their raw text on every log event: the markup
//! is parsed here, never stored.

use agro_chat::{parse, FormattedSegment, Message, Sender};
use chrono::Local;
use crossterm::style::{Color, Stylize};

/// Indentation applied to bullet items
const BULLET_INDENT: &str = "  ";

pub struct TerminalRenderer {
    plain: bool,
}

impl TerminalRenderer {
    /// `plain` disables ANSI styling.
    pub fn new(plain: bool) -> Self {
        Self { plain }
    }

    /// Header line plus rendered body, ending in a blank line.
    pub fn render_message(&self, message: &Message) -> String {
        let time = message.created_at.with_timezone(&Local).format("%H:%M");
        let header = format!("{} · {}", message.sender.display_name(), time);

        let header = if self.plain {
            header
        } else {
            match message.sender {
                Sender::User => header.cyan().bold().to_string(),
                Sender::Assistant => header.green().bold().to_string(),
            }
        };

        format!("{}\n{}\n", header, self.render_segments(&parse(&message.text)))
    }

    pub fn render_segments(&self, segments: &[FormattedSegment]) -> String {
        let mut out = String::new();

        for segment in segments {
            if segment.bullet {
                out.push_str(BULLET_INDENT);
            }

            if self.plain || segment.is_line_break() {
                out.push_str(&segment.text);
                continue;
            }

            let mut styled = segment.text.as_str().stylize();
            if segment.bold {
                styled = styled.bold();
            }
            if segment.italic {
                styled = styled.italic();
            }
            if segment.bullet {
                styled = styled.with(Color::Green);
            }
            out.push_str(&styled.to_string());
        }

        out
    }

    /// Shown while a reply is pending
    pub fn thinking_indicator(&self) -> String {
        let text = "🌿 thinking…";
        if self.plain {
            text.to_string()
        } else {
            text.dim().to_string()
        }
    }
}
