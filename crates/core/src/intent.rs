//! Intent model and the mapper that decodes raw export documents into it.
//!
//! This module provides both domain-level types and wire models for API.AI intent documents.
//!
//! Responsibilities:
//! - Define the canonical, immutable [`Intent`] value handed to extraction and rendering
//! - Define a lenient wire model matching the export JSON (unknown keys are ignored)
//! - Decode response messages by their integer `type` tag into the closed [`Message`] enum
//! - Report missing or mistyped required fields as one [`ConvertError::Schema`] naming the path
//!
//! Notes:
//! - Message tags outside {0, 1, 2, 3} are dropped, never reported as errors
//! - Card buttons are not carried

use crate::constants::{CARD_RESPONSE_TAG, IMAGE_RESPONSE_TAG, QUICK_REPLY_TAG, TEXT_RESPONSE_TAG};
use crate::{ConvertError, ConvertResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

// ============================================================================
// Public domain-level types
// ============================================================================

/// One conversational unit from the export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Intent {
    /// Platform identifier of the intent.
    pub id: String,

    /// Intent name as declared inside the document.
    pub name: String,

    /// Input contexts required for the intent to match.
    pub contexts: Vec<String>,

    /// Example user utterances.
    pub training_phrases: Vec<UserSay>,

    /// Bot response templates.
    pub responses: Vec<ResponseBlock>,
}

/// One training phrase, as the ordered text fragments it was annotated with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSay {
    pub phrases: Vec<String>,
}

/// One templated bot reply together with its context instructions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseBlock {
    pub reset_contexts: bool,
    pub affected_contexts: Vec<AffectedContext>,
    pub parameters: Vec<Parameter>,
    pub messages: Vec<Message>,
}

/// Output context set by a response, with its lifespan in conversation turns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AffectedContext {
    pub name: String,
    pub lifespan: i64,
}

/// Slot parameter declared by a response.
///
/// Parameters are decoded for completeness; rendering does not use them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub default_value: String,
    pub required: bool,
    pub data_type: String,
    pub prompts: Vec<String>,
    pub is_list: bool,
}

/// A single displayable bot output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// Tag 0. The raw `speech` field may be a string or a list; it is always a list here.
    TextResponse { speech: Vec<String> },
    /// Tag 1.
    CardResponse { title: String, subtitle: String },
    /// Tag 2.
    QuickReply { title: String, replies: Vec<String> },
    /// Tag 3.
    ImageResponse { image_url: String },
}

/// Decodes one raw intent document into an [`Intent`].
///
/// This uses `serde_path_to_error` to surface the path (e.g. `responses[0].messages`) of the
/// first field that does not match the expected intent shape.
///
/// # Arguments
///
/// * `document` - Label of the document, used in error messages (archive path or intent name).
/// * `raw` - Parsed JSON of the intent document.
///
/// # Returns
///
/// The decoded [`Intent`]. Messages with an unrecognised `type` tag are dropped.
///
/// # Errors
///
/// Returns [`ConvertError::Schema`] if:
/// - `id`, `name`, `userSays` or `responses` is absent,
/// - a `userSays` entry lacks `data`, or a `data` fragment lacks `text`,
/// - a response block lacks `messages`,
/// - any decoded field has an unexpected JSON type.
pub fn map_intent(document: &str, raw: Value) -> ConvertResult<Intent> {
    let wire: IntentWire = decode(document, "", raw)?;

    let training_phrases = wire
        .user_says
        .into_iter()
        .map(|say| UserSay {
            phrases: say.data.into_iter().map(|fragment| fragment.text).collect(),
        })
        .collect();

    let mut responses = Vec::with_capacity(wire.responses.len());
    for (block_idx, block) in wire.responses.into_iter().enumerate() {
        let mut messages = Vec::with_capacity(block.messages.len());
        for (msg_idx, raw_message) in block.messages.into_iter().enumerate() {
            let path = format!("responses[{block_idx}].messages[{msg_idx}]");
            if let Some(message) = decode_message(document, &path, raw_message)? {
                messages.push(message);
            }
        }

        responses.push(ResponseBlock {
            reset_contexts: block.reset_contexts,
            affected_contexts: block
                .affected_contexts
                .into_iter()
                .map(|ctx| AffectedContext {
                    name: ctx.name,
                    lifespan: ctx.lifespan,
                })
                .collect(),
            parameters: block.parameters.into_iter().map(Parameter::from).collect(),
            messages,
        });
    }

    Ok(Intent {
        id: wire.id,
        name: wire.name,
        contexts: wire.contexts,
        training_phrases,
        responses,
    })
}

// ============================================================================
// Message dispatch (internal)
// ============================================================================

/// Raw `type` tag of a message, when it is an integer (or an integer written as a string).
fn message_tag(raw: &Value) -> Option<u64> {
    match raw.get("type")? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decodes one message by its tag. `Ok(None)` means the tag is not one we represent.
fn decode_message(document: &str, path: &str, raw: Value) -> ConvertResult<Option<Message>> {
    let message = match message_tag(&raw) {
        Some(TEXT_RESPONSE_TAG) => {
            let wire: TextWire = decode(document, path, raw)?;
            Message::TextResponse {
                speech: wire.speech.map(Speech::into_vec).unwrap_or_default(),
            }
        }
        Some(CARD_RESPONSE_TAG) => {
            let wire: CardWire = decode(document, path, raw)?;
            Message::CardResponse {
                title: wire.title.unwrap_or_default(),
                subtitle: wire.subtitle.unwrap_or_default(),
            }
        }
        Some(QUICK_REPLY_TAG) => {
            let wire: QuickReplyWire = decode(document, path, raw)?;
            Message::QuickReply {
                title: wire.title.unwrap_or_default(),
                replies: wire.replies.unwrap_or_default(),
            }
        }
        Some(IMAGE_RESPONSE_TAG) => {
            let wire: ImageWire = decode(document, path, raw)?;
            Message::ImageResponse {
                image_url: wire.image_url.unwrap_or_default(),
            }
        }
        other => {
            tracing::debug!(document, path, tag = ?other, "dropping unknown message type");
            return Ok(None);
        }
    };

    Ok(Some(message))
}

/// Deserialises `raw` into `T`, joining `prefix` and the failing field path on error.
fn decode<T: DeserializeOwned>(document: &str, prefix: &str, raw: Value) -> ConvertResult<T> {
    serde_path_to_error::deserialize::<_, T>(raw).map_err(|err| {
        let inner = err.path().to_string();
        let path = match (prefix.is_empty(), inner.as_str()) {
            (true, "" | ".") => "<root>".to_string(),
            (true, _) => inner.clone(),
            (false, "" | ".") => prefix.to_string(),
            (false, _) => format!("{prefix}.{inner}"),
        };
        ConvertError::Schema {
            document: document.to_string(),
            path,
            message: err.into_inner().to_string(),
        }
    })
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
struct IntentWire {
    id: String,
    name: String,
    #[serde(default)]
    contexts: Vec<String>,
    #[serde(rename = "userSays")]
    user_says: Vec<UserSayWire>,
    responses: Vec<ResponseWire>,
}

#[derive(Debug, Deserialize)]
struct UserSayWire {
    data: Vec<FragmentWire>,
}

#[derive(Debug, Deserialize)]
struct FragmentWire {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ResponseWire {
    #[serde(rename = "resetContexts", default)]
    reset_contexts: bool,
    #[serde(rename = "affectedContexts", default)]
    affected_contexts: Vec<AffectedContextWire>,
    #[serde(default)]
    parameters: Vec<ParameterWire>,
    messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct AffectedContextWire {
    name: String,
    #[serde(default)]
    lifespan: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParameterWire {
    name: String,
    value: String,
    #[serde(rename = "defaultValue")]
    default_value: String,
    required: bool,
    #[serde(rename = "dataType")]
    data_type: String,
    prompts: Vec<Prompt>,
    #[serde(rename = "isList")]
    is_list: bool,
}

/// Prompts are plain strings in older exports and `{lang, value}` objects in newer ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Prompt {
    Text(String),
    Localised { value: String },
}

impl From<ParameterWire> for Parameter {
    fn from(wire: ParameterWire) -> Self {
        Self {
            name: wire.name,
            value: wire.value,
            default_value: wire.default_value,
            required: wire.required,
            data_type: wire.data_type,
            prompts: wire
                .prompts
                .into_iter()
                .map(|prompt| match prompt {
                    Prompt::Text(text) => text,
                    Prompt::Localised { value } => value,
                })
                .collect(),
            is_list: wire.is_list,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Speech {
    One(String),
    Many(Vec<String>),
}

impl Speech {
    fn into_vec(self) -> Vec<String> {
        match self {
            Speech::One(text) => vec![text],
            Speech::Many(texts) => texts,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextWire {
    #[serde(default)]
    speech: Option<Speech>,
}

#[derive(Debug, Deserialize)]
struct CardWire {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuickReplyWire {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    replies: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ImageWire {
    #[serde(rename = "imageUrl", default)]
    image_url: Option<String>,
}
