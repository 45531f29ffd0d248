//! Closed value sets for filter fields and their normalize-or-fail functions
//!
//! Every function here is pure. The lookup tables are built once per process
//! and only read afterwards.

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::error::FilterError;

/// Drug-label section a filter may be restricted to
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum Param {
    #[serde(rename = "Any Section")]
    AnySection,
    #[serde(rename = "Revision Date")]
    RevisionDate,
    #[serde(rename = "Brand Name")]
    BrandName,
    #[serde(rename = "Generic Name")]
    GenericName,
    #[serde(rename = "Manufacturer")]
    Manufacturer,
    #[serde(rename = "Label Title")]
    LabelTitle,
    #[serde(rename = "Highlights")]
    Highlights,
    #[serde(rename = "Abuse Section")]
    AbuseSection,
    #[serde(rename = "Adverse Reactions")]
    AdverseReactions,
    #[serde(rename = "Boxed Warning Section")]
    BoxedWarningSection,
    #[serde(rename = "Clinical Pharmacology/Clinical Studies")]
    ClinicalPharmacology,
    #[serde(rename = "Contraindications")]
    Contraindications,
    #[serde(rename = "Drug Interactions")]
    DrugInteractions,
    #[serde(rename = "Dosage & Administration")]
    DosageAndAdministration,
    #[serde(rename = "Dosage Form")]
    DosageForm,
    #[serde(rename = "Indications and Usage")]
    IndicationsAndUsage,
    #[serde(rename = "Information For Patients/Caregivers")]
    PatientInformation,
    #[serde(rename = "Overdosage")]
    Overdosage,
    #[serde(rename = "Preclinical Safety Data")]
    PreclinicalSafetyData,
    #[serde(rename = "Pregnancy & Lactation")]
    PregnancyAndLactation,
    #[serde(rename = "Storage & Handling")]
    StorageAndHandling,
    #[serde(rename = "Warnings & Precautions")]
    WarningsAndPrecautions,
    #[serde(rename = "Medguide Section")]
    MedguideSection,
    #[serde(rename = "PIL")]
    Pil,
    #[serde(rename = "CMI")]
    Cmi,
}

impl Param {
    pub const ALL: [Param; 25] = [
        Param::AnySection,
        Param::RevisionDate,
        Param::BrandName,
        Param::GenericName,
        Param::Manufacturer,
        Param::LabelTitle,
        Param::Highlights,
        Param::AbuseSection,
        Param::AdverseReactions,
        Param::BoxedWarningSection,
        Param::ClinicalPharmacology,
        Param::Contraindications,
        Param::DrugInteractions,
        Param::DosageAndAdministration,
        Param::DosageForm,
        Param::IndicationsAndUsage,
        Param::PatientInformation,
        Param::Overdosage,
        Param::PreclinicalSafetyData,
        Param::PregnancyAndLactation,
        Param::StorageAndHandling,
        Param::WarningsAndPrecautions,
        Param::MedguideSection,
        Param::Pil,
        Param::Cmi,
    ];

    /// Name as shown to users and sent to the search index
    pub fn display_name(self) -> &'static str {
        match self {
            Param::AnySection => "Any Section",
            Param::RevisionDate => "Revision Date",
            Param::BrandName => "Brand Name",
            Param::GenericName => "Generic Name",
            Param::Manufacturer => "Manufacturer",
            Param::LabelTitle => "Label Title",
            Param::Highlights => "Highlights",
            Param::AbuseSection => "Abuse Section",
            Param::AdverseReactions => "Adverse Reactions",
            Param::BoxedWarningSection => "Boxed Warning Section",
            Param::ClinicalPharmacology => "Clinical Pharmacology/Clinical Studies",
            Param::Contraindications => "Contraindications",
            Param::DrugInteractions => "Drug Interactions",
            Param::DosageAndAdministration => "Dosage & Administration",
            Param::DosageForm => "Dosage Form",
            Param::IndicationsAndUsage => "Indications and Usage",
            Param::PatientInformation => "Information For Patients/Caregivers",
            Param::Overdosage => "Overdosage",
            Param::PreclinicalSafetyData => "Preclinical Safety Data",
            Param::PregnancyAndLactation => "Pregnancy & Lactation",
            Param::StorageAndHandling => "Storage & Handling",
            Param::WarningsAndPrecautions => "Warnings & Precautions",
            Param::MedguideSection => "Medguide Section",
            Param::Pil => "PIL",
            Param::Cmi => "CMI",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Normalized key -> section, e.g. "dosage&administration"
static PARAM_LOOKUP: LazyLock<HashMap<String, Param>> = LazyLock::new(|| {
    Param::ALL
        .iter()
        .map(|p| (lookup_key(p.display_name()), *p))
        .collect()
});

/// Drop all whitespace and lowercase
fn lookup_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether the filter term must appear in or be absent from the section
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub enum Condition {
    #[default]
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not contains")]
    NotContains,
}

/// Link from one filter to the next; `None` terminates the chain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    #[default]
    None,
}

impl Operator {
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Operator::And => Some("and"),
            Operator::Or => Some("or"),
            Operator::None => None,
        }
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(op) => serializer.serialize_str(op),
            None => serializer.serialize_none(),
        }
    }
}

/// Supported label jurisdictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Country {
    Au,
    Ca,
    Fr,
    Uk,
    Us,
    Eu,
}

impl Country {
    pub const ALL: [Country; 6] = [
        Country::Au,
        Country::Ca,
        Country::Fr,
        Country::Uk,
        Country::Us,
        Country::Eu,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Country::Au => "au",
            Country::Ca => "ca",
            Country::Fr => "fr",
            Country::Uk => "uk",
            Country::Us => "us",
            Country::Eu => "eu",
        }
    }

    /// Case-insensitive code lookup
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Country::ALL.into_iter().find(|c| c.code() == code)
    }
}

/// Countries a filter applies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CountryScope {
    #[default]
    All,
    /// Non-empty strict subset of [`Country::ALL`], in canonical order
    Only(Vec<Country>),
}

impl CountryScope {
    /// Build a scope from arbitrary codes, collapsing the full set to `All`
    pub fn from_countries(countries: impl IntoIterator<Item = Country>) -> Self {
        let mut countries: Vec<Country> = countries.into_iter().collect();
        countries.sort();
        countries.dedup();
        if countries.is_empty() || countries.len() == Country::ALL.len() {
            CountryScope::All
        } else {
            CountryScope::Only(countries)
        }
    }

    pub fn countries(&self) -> &[Country] {
        match self {
            CountryScope::All => &Country::ALL,
            CountryScope::Only(countries) => countries,
        }
    }
}

impl fmt::Display for CountryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.countries().iter().map(|c| c.code()).collect();
        f.write_str(&codes.join(","))
    }
}

impl Serialize for CountryScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Text used in error values: strings verbatim, anything else as JSON
pub(crate) fn raw_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Map a raw section name onto the closed set.
///
/// `None` means "no section restriction" and is valid. Anything that does not
/// match a section after removing whitespace and lowercasing is rejected.
pub fn normalize_param(raw: Option<&str>) -> Result<Option<Param>, FilterError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    PARAM_LOOKUP
        .get(&lookup_key(raw))
        .copied()
        .map(Some)
        .ok_or_else(|| FilterError::InvalidParam {
            field: "param",
            value: raw.to_string(),
        })
}

/// Map a raw operator onto the closed set.
///
/// Models emit `[]`, `""`, `null` or nothing at all for "no continuation";
/// all of these become [`Operator::None`].
pub fn normalize_operator(raw: Option<&JsonValue>) -> Result<Operator, FilterError> {
    let invalid = |value: &JsonValue| FilterError::InvalidOperatorValue {
        value: raw_text(value),
    };

    match raw {
        None | Some(JsonValue::Null) => Ok(Operator::None),
        Some(JsonValue::Array(items)) if items.is_empty() => Ok(Operator::None),
        Some(value @ JsonValue::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Operator::None),
            "and" => Ok(Operator::And),
            "or" => Ok(Operator::Or),
            _ => Err(invalid(value)),
        },
        Some(value) => Err(invalid(value)),
    }
}

/// Map a raw condition onto the closed set; absent means `contains`
pub fn normalize_condition(raw: Option<&JsonValue>) -> Result<Condition, FilterError> {
    match raw {
        None | Some(JsonValue::Null) => Ok(Condition::Contains),
        Some(value @ JsonValue::String(s)) => {
            match lookup_key(s).replace('_', "").as_str() {
                "contains" => Ok(Condition::Contains),
                "notcontains" => Ok(Condition::NotContains),
                _ => Err(FilterError::InvalidParam {
                    field: "condition",
                    value: raw_text(value),
                }),
            }
        }
        Some(value) => Err(FilterError::InvalidParam {
            field: "condition",
            value: raw_text(value),
        }),
    }
}

/// Map a raw country value onto a scope; absent or blank means all countries.
///
/// Accepts a single code, a comma-separated list of codes, or an array of
/// code strings.
pub fn normalize_country(raw: Option<&JsonValue>) -> Result<CountryScope, FilterError> {
    let value = match raw {
        None | Some(JsonValue::Null) => return Ok(CountryScope::All),
        Some(value) => value,
    };
    let invalid = || FilterError::InvalidParam {
        field: "searchInCountry",
        value: raw_text(value),
    };

    let codes: Vec<&str> = match value {
        JsonValue::String(s) => s.split(',').collect(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| item.as_str().ok_or_else(invalid))
            .collect::<Result<_, _>>()?,
        _ => return Err(invalid()),
    };

    let codes: Vec<&str> = codes.into_iter().map(str::trim).filter(|c| !c.is_empty()).collect();
    if codes.is_empty() || (codes.len() == 1 && codes[0].eq_ignore_ascii_case("all")) {
        return Ok(CountryScope::All);
    }

    let countries = codes
        .into_iter()
        .map(|code| Country::from_code(code).ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CountryScope::from_countries(countries))
}
