//! Raw intent documents, before any schema is applied.

use crate::{ConvertError, ConvertResult};
use serde_json::Value;

/// A named, parsed-but-unvalidated intent document.
///
/// Both the archive walker and the remote fetcher produce these; the mapper consumes them.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDocument {
    /// Archive entry path, or the intent name for remotely fetched documents.
    pub name: String,
    pub content: Value,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, content: Value) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Parses `bytes` as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::InvalidJson`] naming the document if `bytes` is not valid JSON.
    pub fn parse(name: impl Into<String>, bytes: &[u8]) -> ConvertResult<Self> {
        let name = name.into();
        match serde_json::from_slice(bytes) {
            Ok(content) => Ok(Self { name, content }),
            Err(source) => Err(ConvertError::InvalidJson {
                entry: name,
                source,
            }),
        }
    }
}
