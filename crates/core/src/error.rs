/// Errors raised while turning an export into text.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to open archive file: {0}")]
    ArchiveOpen(std::io::Error),
    #[error("failed to read archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("failed to read archive entry {entry}: {source}")]
    EntryRead {
        entry: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {entry}: {source}")]
    InvalidJson {
        entry: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("intent schema mismatch in {document} at {path}: {message}")]
    Schema {
        document: String,
        path: String,
        message: String,
    },
}

impl ConvertError {
    /// Whether the error concerns one intent document rather than the archive as a whole.
    ///
    /// Document-level errors are the ones the skip policy may step over.
    pub fn is_document_error(&self) -> bool {
        matches!(
            self,
            ConvertError::InvalidJson { .. } | ConvertError::Schema { .. }
        )
    }
}

pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
