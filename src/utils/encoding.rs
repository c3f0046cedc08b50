//! Binary detection, encoding detection and file decoding.
//!
//! Reading a file goes through three steps, none of which can fail past the
//! function boundary:
//! - classify the file as binary or text from its extension and an 8 KiB sample
//! - detect the encoding (BOM, strict UTF-8, then chardetng)
//! - decode with encoding_rs

use crate::domain::FileContent;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_SAMPLE_SIZE: usize = 8192;

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];
const UTF16_LE_BOM: &[u8] = &[0xff, 0xfe];
const UTF16_BE_BOM: &[u8] = &[0xfe, 0xff];

/// Extensions that are always treated as binary without sampling.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tif", "tiff", "psd", "heic", "zip", "gz",
    "tgz", "bz2", "xz", "7z", "rar", "tar", "jar", "war", "exe", "dll", "so", "dylib", "a", "o",
    "obj", "lib", "bin", "class", "pyc", "wasm", "ttf", "otf", "woff", "woff2", "eot", "mp3",
    "mp4", "wav", "ogg", "flac", "avi", "mov", "mkv", "webm", "pdf", "doc", "docx", "xls",
    "xlsx", "ppt", "pptx", "sqlite", "db",
];

/// Read a file and decode it, classifying binary files before any decoding.
///
/// `max_file_bytes` rejects larger files with [`FileContent::TooLarge`].
pub fn read_file_content(path: &Path, max_file_bytes: Option<u64>) -> FileContent {
    let owned = path.to_path_buf();

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("stat failed for {}: {}", path.display(), e);
            return FileContent::Unreadable { path: owned, message: e.to_string() };
        }
    };
    if !metadata.is_file() {
        return FileContent::Unreadable { path: owned, message: "not a regular file".to_string() };
    }

    // Binary files are reported as binary whatever their size.
    match is_binary_file_impl(path, DEFAULT_SAMPLE_SIZE) {
        Ok(true) => return FileContent::Binary { path: owned },
        Ok(false) => {}
        Err(e) => return FileContent::Unreadable { path: owned, message: e.to_string() },
    }

    if let Some(limit) = max_file_bytes {
        if metadata.len() > limit {
            return FileContent::TooLarge { path: owned, size: metadata.len(), limit };
        }
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => return FileContent::Unreadable { path: owned, message: e.to_string() },
    };

    let (content, encoding) = decode_bytes(&bytes);
    FileContent::Text { path: owned, content, encoding: encoding.to_string() }
}

/// Detect if a file is binary (not text).
///
/// Unreadable files count as binary.
pub fn is_binary_file(path: &Path, sample_size: usize) -> bool {
    is_binary_file_impl(path, sample_size).unwrap_or(true)
}

fn is_binary_file_impl(path: &Path, sample_size: usize) -> std::io::Result<bool> {
    if has_binary_extension(path) {
        return Ok(true);
    }
    let sample = read_sample(path, sample_size)?;
    Ok(is_binary_sample(&sample))
}

fn has_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| BINARY_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_sample(path: &Path, sample_size: usize) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut sample = Vec::with_capacity(sample_size);
    file.by_ref().take(sample_size as u64).read_to_end(&mut sample)?;
    Ok(sample)
}

fn is_binary_sample(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }

    // UTF-16 text is full of NULs; trust the BOM.
    if sample.starts_with(UTF16_LE_BOM) || sample.starts_with(UTF16_BE_BOM) {
        return false;
    }

    if sample.contains(&0) {
        return true;
    }

    // The sample may cut a multi-byte sequence in half.
    match std::str::from_utf8(sample) {
        Ok(_) => return false,
        Err(e) if e.error_len().is_none() => return false,
        Err(_) => {}
    }

    // Legacy single-byte encodings: text keeps >70% printable ASCII.
    let printable_count = sample
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || b == 9 || b == 10 || b == 13 || b >= 0xa0)
        .count();

    (printable_count as f64 / sample.len() as f64) < 0.70
}

/// Detect the most likely encoding of a byte buffer.
///
/// Strategy:
/// 1. BOM markers (most reliable)
/// 2. Strict UTF-8
/// 3. chardetng guess
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.starts_with(UTF8_BOM) {
        return UTF_8;
    }
    if bytes.starts_with(UTF16_LE_BOM) {
        return UTF_16LE;
    }
    if bytes.starts_with(UTF16_BE_BOM) {
        return UTF_16BE;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decode a byte buffer, returning the text and the label of the encoding used:
/// `utf-8`, `utf-8-sig`, `utf-16le`, `utf-16be`, or the lowercased name of the
/// guessed encoding.
pub fn decode_bytes(bytes: &[u8]) -> (String, String) {
    let encoding = detect_encoding(bytes);
    let label = encoding_label(bytes, encoding);

    // decode() sniffs and strips a BOM on its own
    let (decoded, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("replacement characters inserted while decoding as {}", used.name());
    }
    (decoded.into_owned(), label)
}

fn encoding_label(bytes: &[u8], encoding: &'static Encoding) -> String {
    if encoding == UTF_8 {
        if bytes.starts_with(UTF8_BOM) {
            "utf-8-sig".to_string()
        } else {
            "utf-8".to_string()
        }
    } else {
        encoding.name().to_lowercase()
    }
}
