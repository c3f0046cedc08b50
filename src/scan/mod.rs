//! File discovery with glob inclusion and exclusion

pub mod lister;

pub use lister::list_files;
