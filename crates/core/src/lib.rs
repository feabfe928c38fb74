//! Domain types and pure logic shared by every Silhouette crate.
//!
//! Nothing in here performs I/O: vocabularies, validation, prompt
//! templates, link extraction and the data-URL codec live here so the
//! persistence, provider and HTTP layers can agree on them.

pub mod analysis;
pub mod data_url;
pub mod error;
pub mod item;
pub mod links;
pub mod preference;
pub mod prompt;
pub mod style;
pub mod types;
