//! Raw oracle record -> validated filter

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::FilterError;
use crate::schema::{
    Condition, CountryScope, Operator, Param, normalize_condition, normalize_country,
    normalize_operator, normalize_param, raw_text,
};

/// One validated search condition.
///
/// Fields are private so a filter cannot change after normalization; the
/// serialized form uses the key names the label search front end expects.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalFilter {
    param: Option<Param>,
    condition: Condition,
    search_query: String,
    #[serde(rename = "operators")]
    operator: Operator,
    search_in_country: CountryScope,
}

impl CanonicalFilter {
    pub fn new(
        param: Option<Param>,
        condition: Condition,
        search_query: impl Into<String>,
        operator: Operator,
        search_in_country: CountryScope,
    ) -> Self {
        Self {
            param,
            condition,
            search_query: search_query.into(),
            operator,
            search_in_country,
        }
    }

    pub fn param(&self) -> Option<Param> {
        self.param
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn search_in_country(&self) -> &CountryScope {
        &self.search_in_country
    }

    /// Same filter closing the operator chain
    pub fn terminated(self) -> Self {
        Self {
            operator: Operator::None,
            ..self
        }
    }
}

/// Normalize one raw filter record.
///
/// Missing keys take their defaults; any invalid field rejects the whole
/// record with the field name and the raw value.
pub fn normalize_filter(raw: &JsonValue) -> Result<CanonicalFilter, FilterError> {
    let JsonValue::Object(record) = raw else {
        return Err(FilterError::InvalidParam {
            field: "filter",
            value: raw_text(raw),
        });
    };

    let param = match record.get("param") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => normalize_param(Some(s.as_str()))?,
        Some(other) => {
            return Err(FilterError::InvalidParam {
                field: "param",
                value: raw_text(other),
            });
        }
    };

    let condition = normalize_condition(record.get("condition"))?;

    let search_query = match record.get("searchQuery") {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.trim().to_string(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(FilterError::InvalidParam {
                field: "searchQuery",
                value: raw_text(other),
            });
        }
    };

    let operator = normalize_operator(record.get("operators").or_else(|| record.get("operator")))?;
    let search_in_country = normalize_country(record.get("searchInCountry"))?;

    Ok(CanonicalFilter::new(
        param,
        condition,
        search_query,
        operator,
        search_in_country,
    ))
}
