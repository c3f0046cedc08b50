//! Shared helpers: file decoding, path normalization, hashing.

pub mod encoding;
pub mod hashing;
pub mod paths;

pub use encoding::{decode_bytes, is_binary_file, read_file_content};
pub use hashing::stable_hash;
pub use paths::{normalize_path, relative_slash_path};
