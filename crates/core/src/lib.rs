//! # apiai2text core
//!
//! Conversion of API.AI agent exports into readable markdown.
//!
//! This crate contains the pure transformation pipeline:
//! - Reading intent documents out of an export zip (`archive`)
//! - Decoding raw intent JSON into a typed [`Intent`] (`intent`)
//! - Flattening intents into answers, quick answers and user utterances (`extract`)
//! - Rendering the result as markdown (`markdown`)
//!
//! **No transport concerns**: fetching intents from the live API belongs in
//! `apiai2text-remote`, serving HTML belongs in `api-rest`.

pub mod archive;
pub mod constants;
pub mod document;
pub mod error;
pub mod extract;
pub mod intent;
pub mod markdown;
pub mod pipeline;

pub use archive::{open_archive, read_entries, walk, ArchiveEntry};
pub use document::RawDocument;
pub use error::{ConvertError, ConvertResult};
pub use extract::{extract, user_says, AnswerItem, ExtractedAnswers};
pub use intent::{
    map_intent, AffectedContext, Intent, Message, Parameter, ResponseBlock, UserSay,
};
pub use markdown::{render, render_intent, IntentSummary};
pub use pipeline::{
    convert_archive, convert_archive_path, convert_documents, summarise, ConvertOptions,
    InvalidIntentPolicy,
};
