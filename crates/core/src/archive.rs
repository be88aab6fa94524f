//! Reading intent documents out of an export zip.
//!
//! Only regular entries below `intents/` are considered. Entries are returned in the archive's
//! own listing order, which is not necessarily sorted.

use crate::constants::INTENTS_PREFIX;
use crate::document::RawDocument;
use crate::{ConvertError, ConvertResult};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Bytes of one archive entry below `intents/`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Opens the export archive at `path` for reading.
///
/// # Errors
///
/// Returns [`ConvertError::ArchiveOpen`] if the file cannot be opened.
pub fn open_archive(path: &Path) -> ConvertResult<File> {
    File::open(path).map_err(ConvertError::ArchiveOpen)
}

/// Reads the raw bytes of every intent entry in the archive.
///
/// # Arguments
///
/// * `reader` - Seekable reader over the zip bytes.
///
/// # Errors
///
/// Returns a `ConvertError` if:
/// - the data is not a readable zip archive ([`ConvertError::Archive`]),
/// - an entry cannot be decompressed ([`ConvertError::EntryRead`]).
pub fn read_entries<R: Read + Seek>(reader: R) -> ConvertResult<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::new();

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() || !file.name().starts_with(INTENTS_PREFIX) {
            continue;
        }

        let name = file.name().to_string();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|source| ConvertError::EntryRead {
                entry: name.clone(),
                source,
            })?;

        tracing::debug!(entry = %name, size = bytes.len(), "read intent entry");
        entries.push(ArchiveEntry { name, bytes });
    }

    Ok(entries)
}

/// Reads and parses every intent entry in the archive.
///
/// # Errors
///
/// Returns the errors of [`read_entries`], and [`ConvertError::InvalidJson`] for the first
/// entry that is not valid JSON.
pub fn walk<R: Read + Seek>(reader: R) -> ConvertResult<Vec<RawDocument>> {
    read_entries(reader)?
        .into_iter()
        .map(|entry| RawDocument::parse(entry.name, &entry.bytes))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Builds an in-memory zip with the given directories and files, in that listing order.
    pub(crate) fn build_zip(dirs: &[&str], files: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for dir in dirs {
            writer
                .add_directory(*dir, FileOptions::default())
                .expect("add directory");
        }
        for (name, content) in files {
            writer
                .start_file(*name, FileOptions::default())
                .expect("start file");
            writer.write_all(content.as_bytes()).expect("write file");
        }
        writer.finish().expect("finish zip").into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::build_zip;
    use super::*;
    use std::io::Cursor;

    #[test]
    fn filters_to_intent_files() {
        let bytes = build_zip(
            &["intents/", "entities/"],
            &[
                ("agent.json", r#"{"description": "agent"}"#),
                ("entities/size.json", r#"{"name": "size"}"#),
                ("intents/b.json", r#"{"id": "b"}"#),
                ("intents/a.json", r#"{"id": "a"}"#),
                ("package.json", r#"{"version": "1.0.0"}"#),
            ],
        );

        let docs = walk(Cursor::new(bytes)).expect("walk");
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["intents/b.json", "intents/a.json"]);
        assert_eq!(docs[0].content["id"], "b");
    }

    #[test]
    fn nested_intent_paths_are_kept() {
        let bytes = build_zip(&[], &[("intents/sub/c.json", r#"{"id": "c"}"#)]);
        let entries = read_entries(Cursor::new(bytes)).expect("read");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "intents/sub/c.json");
    }

    #[test]
    fn invalid_zip_is_archive_error() {
        let err = walk(Cursor::new(b"definitely not a zip".to_vec())).expect_err("should fail");
        assert!(matches!(err, ConvertError::Archive(_)));
        assert!(!err.is_document_error());
    }

    #[test]
    fn invalid_json_entry_fails_walk() {
        let bytes = build_zip(&[], &[("intents/bad.json", "{ nope")]);
        let err = walk(Cursor::new(bytes)).expect_err("should fail");
        assert!(matches!(err, ConvertError::InvalidJson { ref entry, .. } if entry == "intents/bad.json"));
    }

    #[test]
    fn declared_entry_size_is_not_trusted() {
        use std::io::Write;
        use zip::write::FileOptions;
        use zip::{CompressionMethod, ZipWriter};

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(
                "intents/big.json",
                FileOptions::default().compression_method(CompressionMethod::Stored),
            )
            .expect("start file");
        writer.write_all(br#"{"id": "big"}"#).expect("write file");
        let mut bytes = writer.finish().expect("finish zip").into_inner();

        // Uncompressed size field of the central directory header.
        let central = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .expect("central directory header");
        bytes[central + 24..central + 28].copy_from_slice(&0x7FFF_FFFFu32.to_le_bytes());

        let entries = read_entries(Cursor::new(bytes)).expect("read");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].bytes, br#"{"id": "big"}"#.to_vec());
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = open_archive(&dir.path().join("missing.zip")).expect_err("should fail");
        assert!(matches!(err, ConvertError::ArchiveOpen(_)));
    }
}
