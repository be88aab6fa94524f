//! Markdown rendering of extracted intents.
//!
//! Produces one document for a sequence of intents. Each intent renders as:
//!
//! ```markdown
//! # Intent: <label>
//!
//! ## User Says:
//!
//! - <utterance>
//!
//! ## Agent Responses
//!
//! 1. <answer>
//! <img src="<url>" width="200"/>
//!
//! ## Possible User Answers
//!
//! - <quick answer>
//!
//! ```
//!
//! The last section is omitted when the intent has no quick answers. Rendering is a pure
//! function of its input.

use crate::constants::IMAGE_DISPLAY_WIDTH;
use crate::extract::{AnswerItem, ExtractedAnswers};
use url::Url;

/// Everything the renderer needs for one intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentSummary {
    /// Display label: the archive entry path for archive input, the intent name for remote input.
    pub label: String,
    pub user_says: Vec<String>,
    pub extracted: ExtractedAnswers,
}

/// Renders `intents` into a single markdown document, in input order.
pub fn render(intents: &[IntentSummary]) -> String {
    intents.iter().map(render_intent).collect()
}

/// Renders one intent block, terminated by a blank line.
pub fn render_intent(intent: &IntentSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Intent: {}\n\n", intent.label));

    output.push_str("## User Says:\n\n");
    for say in &intent.user_says {
        output.push_str(&format!("- {}\n", say));
    }
    output.push('\n');

    output.push_str("## Agent Responses\n\n");
    for answer in &intent.extracted.answers {
        output.push_str(&render_answer(answer));
    }
    output.push('\n');

    if !intent.extracted.quick_answers.is_empty() {
        output.push_str("## Possible User Answers\n\n");
        for quick in &intent.extracted.quick_answers {
            output.push_str(&format!("- {}\n", quick));
        }
        output.push('\n');
    }

    output
}

fn render_answer(answer: &AnswerItem) -> String {
    match answer {
        AnswerItem::Single(text) if looks_like_image_url(text) => format!(
            "<img src=\"{}\" width=\"{}\"/>\n",
            escape_attribute(text),
            IMAGE_DISPLAY_WIDTH
        ),
        AnswerItem::Single(text) => format!("1. {}\n", text),
        AnswerItem::Alternatives(items) => {
            let kept: Vec<&String> = items.iter().filter(|item| !item.is_empty()).collect();
            if kept.is_empty() {
                return String::new();
            }
            let mut output = String::from("- *Alternatives:*\n");
            for item in kept {
                output.push_str(&format!("    - {}\n", item));
            }
            output
        }
    }
}

/// Escapes the characters that could end the `src` attribute or open a tag.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Any absolute URL with a scheme and a host counts as an image, whatever its extension.
pub fn looks_like_image_url(text: &str) -> bool {
    Url::parse(text)
        .map(|url| url.host_str().is_some_and(|host| !host.is_empty()))
        .unwrap_or(false)
}
