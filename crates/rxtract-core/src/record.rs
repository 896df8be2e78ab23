use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ingest::collapse_whitespace;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Medicine {
    pub name: String,
    #[serde(default)]
    pub strength: String,
    #[serde(default)]
    pub directions: String,
}

impl Medicine {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strength: String::new(),
            directions: String::new(),
        }
    }

    #[must_use]
    pub fn with_strength(mut self, strength: impl Into<String>) -> Self {
        self.strength = strength.into();
        self
    }

    #[must_use]
    pub fn with_directions(mut self, directions: impl Into<String>) -> Self {
        self.directions = directions.into();
        self
    }

    /// Key used to collapse duplicate entries: lowercased name and strength.
    #[must_use]
    pub fn dedup_key(&self) -> (String, String) {
        (self.name.to_lowercase(), self.strength.to_lowercase())
    }

    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            name: collapse_whitespace(&self.name),
            strength: collapse_whitespace(&self.strength),
            directions: collapse_whitespace(&self.directions),
        }
    }

    #[must_use]
    pub fn alphabetic_len(&self) -> usize {
        self.name.chars().filter(char::is_ascii_alphabetic).count()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self::new(name.as_str())),
            Value::Number(n) => Some(Self::new(n.to_string())),
            Value::Object(map) => Some(Self {
                name: text_of(map.get("name")).unwrap_or_default(),
                strength: text_of(map.get("strength")).unwrap_or_default(),
                directions: text_of(map.get("directions")).unwrap_or_default(),
            }),
            _ => None,
        }
    }
}

/// Raw per-document fields as produced by an extractor, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
    pub date: Option<String>,
    pub patient_address: Option<String>,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    #[serde(default)]
    pub refills: u32,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ExtractedFields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Builds fields from a loosely-typed mapping such as the JSON emitted by
    /// another extractor. Accepts `doctor`, `name`, `address` and `refill` as
    /// aliases; the canonical key wins when both carry a value. Never fails:
    /// anything unusable degrades to the field's default.
    #[must_use]
    pub fn from_mapping(mapping: &Value) -> Self {
        let Some(map) = mapping.as_object() else {
            return Self::new().with_warning(format!(
                "field mapping is not an object (found {})",
                value_kind(mapping)
            ));
        };

        let medicines = lookup(map, &["medicines"])
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Medicine::from_value).collect())
            .unwrap_or_default();

        let warnings = lookup(map, &["warnings"])
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            doctor_name: text_of(lookup(map, &["doctor_name", "doctor"])),
            patient_name: text_of(lookup(map, &["patient_name", "name"])),
            date: text_of(lookup(map, &["date"])),
            patient_address: text_of(lookup(map, &["patient_address", "address"])),
            medicines,
            refills: lookup(map, &["refills", "refill"]).map_or(0, coerce_refills),
            warnings,
        }
    }
}

/// The canonical output record. Serializes with exactly the keys
/// `doctor_name, patient_name, date, parsed_date, patient_address,
/// medicines, refills, warnings`; absent values are written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPatientRecord {
    pub doctor_name: Option<String>,
    pub patient_name: Option<String>,
    pub date: Option<String>,
    pub parsed_date: Option<NaiveDate>,
    pub patient_address: Option<String>,
    pub medicines: Vec<Medicine>,
    pub refills: u32,
    pub warnings: Vec<String>,
}

impl NormalizedPatientRecord {
    #[must_use]
    pub fn with_warnings(warnings: Vec<String>) -> Self {
        Self {
            warnings,
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Coerces a refill count to a non-negative integer; anything else is 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn coerce_refills(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f.trunc() as u32)
            })
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_present(value))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
