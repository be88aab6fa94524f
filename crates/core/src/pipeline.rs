//! End-to-end conversion: raw documents in, markdown out.

use crate::archive::{open_archive, read_entries};
use crate::document::RawDocument;
use crate::extract::{extract, user_says};
use crate::intent::map_intent;
use crate::markdown::{render, IntentSummary};
use crate::ConvertResult;
use std::io::{Read, Seek};
use std::path::Path;

/// What to do with an intent document that is not valid JSON or does not match the schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidIntentPolicy {
    /// Fail the whole conversion on the first invalid document.
    #[default]
    Abort,
    /// Log a warning and leave the document out of the output.
    Skip,
}

/// Options for a conversion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub invalid_intents: InvalidIntentPolicy,
}

impl ConvertOptions {
    pub fn skipping_invalid() -> Self {
        Self {
            invalid_intents: InvalidIntentPolicy::Skip,
        }
    }
}

/// Maps and extracts one raw document, labelling it with the document name.
///
/// # Errors
///
/// Returns [`ConvertError::Schema`] if the document does not match the intent schema.
pub fn summarise(document: RawDocument) -> ConvertResult<IntentSummary> {
    let intent = map_intent(&document.name, document.content)?;
    Ok(IntentSummary {
        user_says: user_says(&intent),
        extracted: extract(&intent),
        label: document.name,
    })
}

/// Converts already-parsed documents into one markdown document, preserving their order.
///
/// # Errors
///
/// Under [`InvalidIntentPolicy::Abort`], returns the first [`ConvertError::Schema`].
pub fn convert_documents(
    documents: impl IntoIterator<Item = RawDocument>,
    options: ConvertOptions,
) -> ConvertResult<String> {
    let parsed = documents.into_iter().map(Ok);
    convert_results(parsed, options)
}

/// Converts an export archive read from `reader`.
///
/// # Errors
///
/// Returns a `ConvertError` if:
/// - the archive cannot be read (regardless of policy),
/// - under [`InvalidIntentPolicy::Abort`], any intent entry is invalid JSON or off-schema.
pub fn convert_archive<R: Read + Seek>(reader: R, options: ConvertOptions) -> ConvertResult<String> {
    let parsed = read_entries(reader)?
        .into_iter()
        .map(|entry| RawDocument::parse(entry.name, &entry.bytes));
    convert_results(parsed, options)
}

/// Opens and converts the export archive at `path`.
///
/// # Errors
///
/// Returns [`ConvertError::ArchiveOpen`] if the file cannot be opened, otherwise the errors of
/// [`convert_archive`].
pub fn convert_archive_path(path: &Path, options: ConvertOptions) -> ConvertResult<String> {
    let file = open_archive(path)?;
    tracing::debug!(archive = %path.display(), "converting archive");
    convert_archive(file, options)
}

fn convert_results(
    documents: impl Iterator<Item = ConvertResult<RawDocument>>,
    options: ConvertOptions,
) -> ConvertResult<String> {
    let mut summaries = Vec::new();

    for document in documents {
        match document.and_then(summarise) {
            Ok(summary) => summaries.push(summary),
            Err(err)
                if err.is_document_error()
                    && options.invalid_intents == InvalidIntentPolicy::Skip =>
            {
                tracing::warn!("skipping invalid intent document: {}", err);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(render(&summaries))
}
