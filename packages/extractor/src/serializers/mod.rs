//! Catalog Serializers
//!
//! Deterministic, lossless round-trip of catalogs to and from their
//! persisted textual form.

pub mod po;

pub use po::{read_catalog, write_catalog};
