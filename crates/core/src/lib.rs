//! druglabel-core: Drug-label query filter types and normalization
//!
//! This crate turns the JSON an LLM produces for a free-text label query into
//! validated search filters. It has no I/O; the server crate owns the oracle
//! call, persistence and HTTP.

pub mod assemble;
pub mod error;
pub mod extract;
pub mod log;
pub mod normalize;
pub mod schema;

pub use assemble::{FilterSet, assemble};
pub use error::FilterError;
pub use extract::{locate_payload, parse_payload, recover_payload, strip_reasoning};
pub use log::QueryLogEntry;
pub use normalize::{CanonicalFilter, normalize_filter};
pub use schema::{Condition, Country, CountryScope, Operator, Param};
