//! Oracle payload -> ordered, correctly terminated filter sequence

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::FilterError;
use crate::normalize::{CanonicalFilter, normalize_filter};
use crate::schema::Operator;

/// Non-empty ordered filters produced from one user query.
///
/// Every filter but the last carries `and`/`or`; the last carries no operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet(Vec<CanonicalFilter>);

impl FilterSet {
    pub fn filters(&self) -> &[CanonicalFilter] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a set built by [`assemble`]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_filters(self) -> Vec<CanonicalFilter> {
        self.0
    }
}

/// A lone filter is sent as an object, several as an array
impl Serialize for FilterSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => single.serialize(serializer),
            filters => filters.serialize(serializer),
        }
    }
}

/// Turn a parsed oracle payload into a filter sequence.
///
/// An object is one filter; an array is several, in order. A non-terminal
/// filter without an operator is rejected since its intended link cannot be
/// known. The last filter always ends the chain, whatever the oracle said.
pub fn assemble(payload: &JsonValue) -> Result<FilterSet, FilterError> {
    let records: Vec<&JsonValue> = match payload {
        JsonValue::Object(_) => vec![payload],
        JsonValue::Array(items) => items.iter().collect(),
        other => {
            return Err(FilterError::MalformedJson {
                reason: format!("expected object or array, got {other}"),
            });
        }
    };

    let Some((last, leading)) = records.split_last() else {
        return Err(FilterError::EmptyPayload);
    };

    let mut filters = Vec::with_capacity(records.len());
    for (index, record) in leading.iter().enumerate() {
        let filter = normalize_filter(record)?;
        if filter.operator() == Operator::None {
            return Err(FilterError::InconsistentOperatorChain { index });
        }
        filters.push(filter);
    }
    filters.push(normalize_filter(last)?.terminated());

    Ok(FilterSet(filters))
}
