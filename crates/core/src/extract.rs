//! Flattens an [`Intent`] into the answers and utterances the renderer displays.

use crate::intent::{Intent, Message};

/// One displayable bot answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerItem {
    Single(String),
    /// Interchangeable variants of one answer. Empty members are skipped when rendering.
    Alternatives(Vec<String>),
}

/// Answers and suggested user replies of one intent, in encounter order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedAnswers {
    pub answers: Vec<AnswerItem>,
    pub quick_answers: Vec<String>,
}

/// Walks every response message of `intent` in order and collects what it displays.
///
/// Text speech lines become one `Single` each (a multi-line speech is not grouped into
/// `Alternatives`), cards contribute their title, images their URL and quick replies feed
/// `quick_answers` only.
pub fn extract(intent: &Intent) -> ExtractedAnswers {
    intent
        .responses
        .iter()
        .flat_map(|block| block.messages.iter())
        .fold(ExtractedAnswers::default(), |mut acc, message| {
            match message {
                Message::TextResponse { speech } => acc
                    .answers
                    .extend(speech.iter().cloned().map(AnswerItem::Single)),
                Message::CardResponse { title, .. } => {
                    acc.answers.push(AnswerItem::Single(title.clone()))
                }
                Message::ImageResponse { image_url } => {
                    acc.answers.push(AnswerItem::Single(image_url.clone()))
                }
                Message::QuickReply { replies, .. } => {
                    acc.quick_answers.extend(replies.iter().cloned())
                }
            }
            acc
        })
}

/// User utterances of `intent`: every training-phrase fragment, in document order.
pub fn user_says(intent: &Intent) -> Vec<String> {
    intent
        .training_phrases
        .iter()
        .flat_map(|say| say.phrases.iter().cloned())
        .collect()
}
