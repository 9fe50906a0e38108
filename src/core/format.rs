// gametail - core/format.rs
//
// Rendering of tailed lines for display surfaces.
//
// The output style is always passed explicitly by the caller. There is no
// process-wide "current style": a host that needs both HTML for an overlay
// and ANSI for a webhook renders the same line twice with different styles.

use crate::core::model::TaggedLine;
use std::fmt;
use std::str::FromStr;

/// Target surface for rendered lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Text exactly as read from the log.
    #[default]
    Plain,
    /// Terminal output. Escape sequences already present in the text are
    /// kept; control characters other than ESC and TAB are removed.
    Ansi,
    /// HTML fragment for rich-text widgets. Markup characters are escaped
    /// and spaces become `&nbsp;` so column alignment survives.
    Html,
}

impl FromStr for OutputStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "ansi" => Ok(Self::Ansi),
            "html" => Ok(Self::Html),
            other => Err(format!(
                "unknown output style \"{other}\" (expected plain, ansi, or html)"
            )),
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Plain => "plain",
            Self::Ansi => "ansi",
            Self::Html => "html",
        })
    }
}

impl OutputStyle {
    /// Separator placed between lines when a block of lines is rendered.
    pub fn line_separator(self) -> &'static str {
        match self {
            Self::Html => "<br>",
            Self::Plain | Self::Ansi => "\n",
        }
    }

    /// Render one line for this surface.
    ///
    /// Tagged HTML lines are wrapped in a span carrying the tag as a class so
    /// a stylesheet can colour message classes.
    pub fn render(self, line: &TaggedLine) -> String {
        match self {
            Self::Plain => line.text.clone(),
            Self::Ansi => line
                .text
                .chars()
                .filter(|c| !c.is_control() || *c == '\u{1b}' || *c == '\t')
                .collect(),
            Self::Html => {
                let body = escape_html(&line.text);
                match line.tag {
                    Some(tag) => format!("<span class=\"tag-{tag}\">{body}</span>"),
                    None => body,
                }
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            ' ' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}
