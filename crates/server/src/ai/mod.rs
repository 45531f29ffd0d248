//! Oracle-backed filter extraction

pub mod client;
pub mod extraction;

pub use client::{Message, OracleClient};
pub use extraction::{Extraction, extract_filters};
