use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use thiserror::Error;

use super::paths;

pub const DEFAULT_MAX_DECOMPRESSED_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("upload is not a recognized archive format")]
    UnsupportedFormat,
    #[error("archive could not be read: {0}")]
    Corrupt(String),
    #[error("decompressed archive exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },
}

impl ExtractionError {
    pub fn reason(&self) -> &'static str {
        match self {
            ExtractionError::UnsupportedFormat => "unsupported_format",
            ExtractionError::Corrupt(_) => "corrupt",
            ExtractionError::TooLarge { .. } => "too_large",
        }
    }
}

/// Unpacks a zip buffer into a cleaned `path -> text content` map.
///
/// Directory entries are skipped. File content is decoded as UTF-8; binary
/// entries are kept as an opaque placeholder instead of failing the whole
/// archive. Entry names go through `paths::clean_path` and then a set-level
/// `strip_shared_root` pass, so a synthetic wrapper folder around the real
/// project disappears. When two raw names collapse to the same cleaned
/// path, the later-enumerated entry wins.
pub fn extract_file_map(
    zip_data: &[u8],
    max_decompressed_bytes: u64,
) -> Result<BTreeMap<String, String>, ExtractionError> {
    if !zip_data.starts_with(b"PK") {
        return Err(ExtractionError::UnsupportedFormat);
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(zip_data))
        .map_err(|e| ExtractionError::Corrupt(e.to_string()))?;

    // Declared sizes first, so an oversized archive is rejected before any
    // decompression work happens.
    let mut declared_total = 0u64;
    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| ExtractionError::Corrupt(e.to_string()))?;
        if !file.is_dir() {
            declared_total = declared_total.saturating_add(file.size());
        }
    }
    if declared_total > max_decompressed_bytes {
        return Err(ExtractionError::TooLarge {
            limit: max_decompressed_bytes,
        });
    }

    let mut entries = Vec::new();
    let mut read_total = 0u64;
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractionError::Corrupt(e.to_string()))?;
        if file.is_dir() {
            continue;
        }

        let Some(cleaned) = paths::clean_path(file.name(), &[]) else {
            continue;
        };

        let mut raw = Vec::new();
        file.read_to_end(&mut raw)
            .map_err(|e| ExtractionError::Corrupt(e.to_string()))?;

        // Declared sizes can lie; count what actually came out.
        read_total = read_total.saturating_add(raw.len() as u64);
        if read_total > max_decompressed_bytes {
            return Err(ExtractionError::TooLarge {
                limit: max_decompressed_bytes,
            });
        }

        let content = match String::from_utf8(raw) {
            Ok(text) => text,
            Err(err) => format!("[binary content, {} bytes]", err.as_bytes().len()),
        };
        entries.push((cleaned, content));
    }

    let names = paths::strip_shared_root(entries.iter().map(|(n, _)| n.clone()).collect());

    let mut files = BTreeMap::new();
    for (name, (_, content)) in names.into_iter().zip(entries) {
        files.insert(name, content);
    }
    Ok(files)
}

pub fn package_zip(file_map: &BTreeMap<String, String>) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (path, content) in file_map {
            writer.start_file(path, options)?;
            writer.write_all(content.as_bytes())?;
        }
        writer.finish()?;
    }
    Ok(buffer)
}

pub fn hash_file_map(file_map: &BTreeMap<String, String>) -> String {
    let mut context = md5::Context::new();
    for (path, content) in file_map {
        context.consume(path.as_bytes());
        context.consume(content.as_bytes());
    }
    format!("{:x}", context.compute())
}
