//! Student record model
//!
//! `StudentRecord` is the only persisted entity. `Grade` is a closed, ordered
//! enumeration; its order (not the lexical order of its labels) is the primary
//! roster sort key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// School grade a student belongs to
///
/// Declaration order is enumeration order, so the derived `Ord` sorts
/// grade 6 before grade 10 (unlike comparing the labels as text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Eleven,
}

impl Grade {
    /// All grades in enumeration order
    pub const ALL: [Grade; 6] = [
        Grade::Six,
        Grade::Seven,
        Grade::Eight,
        Grade::Nine,
        Grade::Ten,
        Grade::Eleven,
    ];

    /// Numeric school level (6-11), also the persisted column value
    pub fn level(self) -> i64 {
        match self {
            Grade::Six => 6,
            Grade::Seven => 7,
            Grade::Eight => 8,
            Grade::Nine => 9,
            Grade::Ten => 10,
            Grade::Eleven => 11,
        }
    }

    /// Inverse of [`Grade::level`]
    pub fn from_level(level: i64) -> Option<Grade> {
        Grade::ALL.into_iter().find(|g| g.level() == level)
    }

    /// Canonical wire label ("6" .. "11")
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Six => "6",
            Grade::Seven => "7",
            Grade::Eight => "8",
            Grade::Nine => "9",
            Grade::Ten => "10",
            Grade::Eleven => "11",
        }
    }

    /// Parse a grade label
    ///
    /// Accepts the bare level ("6") and labels that follow the level with a
    /// localized suffix separated by whitespace ("6 ශ්‍රේණිය").
    pub fn parse_label(label: &str) -> Option<Grade> {
        let label = label.trim();
        let digits_end = label
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(label.len());
        if digits_end == 0 {
            return None;
        }

        let rest = &label[digits_end..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }

        label[..digits_end]
            .parse::<i64>()
            .ok()
            .and_then(Grade::from_level)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::parse_label(s).ok_or_else(|| format!("unknown grade '{}'", s))
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// A stored student record
///
/// Identifier and timestamps are assigned by the record store and never taken
/// from client input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: Uuid,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub grade: Grade,
    pub father_name: String,
    pub mother_name: String,
    pub contact: String,
    /// External photo URL (uploads are not handled)
    pub photo_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Grade value as sent by clients: either a label or a bare number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GradeInput {
    Label(String),
    Level(i64),
}

impl GradeInput {
    pub fn to_grade(&self) -> Option<Grade> {
        match self {
            GradeInput::Label(label) => Grade::parse_label(label),
            GradeInput::Level(level) => Grade::from_level(*level),
        }
    }
}

/// Student fields as supplied in a create or update request body
///
/// Every field is optional at the shape level: a missing required field is a
/// validation failure, not a malformed body. The body itself must be a JSON
/// object. Unknown fields (including `id`, `_id`, `createdAt` and `updatedAt`
/// echoed back by clients) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<GradeInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mother_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Wire shape of [`StudentInput`]
///
/// The aliases accept the field names used by the legacy admin client.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StudentFields {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    date_of_birth: Option<String>,
    #[serde(default)]
    grade: Option<GradeInput>,
    #[serde(default, alias = "parentNameFather")]
    father_name: Option<String>,
    #[serde(default, alias = "parentNameMother")]
    mother_name: Option<String>,
    #[serde(default, alias = "contactNumber")]
    contact: Option<String>,
    #[serde(default, alias = "studentPhoto")]
    photo_url: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl<'de> Deserialize<'de> for StudentInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A derived struct would also take a positional array
        let object = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let fields: StudentFields = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(serde::de::Error::custom)?;

        Ok(StudentInput {
            full_name: fields.full_name,
            date_of_birth: fields.date_of_birth,
            grade: fields.grade,
            father_name: fields.father_name,
            mother_name: fields.mother_name,
            contact: fields.contact,
            photo_url: fields.photo_url,
            notes: fields.notes,
        })
    }
}

/// Number of students per grade
///
/// Always carries every grade, so consumers never have to treat a missing
/// key as zero. Serializes as `{ "6": n, ..., "11": n }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeCounts(BTreeMap<Grade, u64>);

impl GradeCounts {
    /// Counts with every grade at zero
    pub fn zeroed() -> Self {
        Self(Grade::ALL.into_iter().map(|g| (g, 0)).collect())
    }

    /// Tally the grades of a roster
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a StudentRecord>) -> Self {
        let mut counts = Self::zeroed();
        for record in records {
            counts.add(record.grade, 1);
        }
        counts
    }

    pub fn add(&mut self, grade: Grade, n: u64) {
        *self.0.entry(grade).or_insert(0) += n;
    }

    pub fn get(&self, grade: Grade) -> u64 {
        self.0.get(&grade).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl Default for GradeCounts {
    fn default() -> Self {
        Self::zeroed()
    }
}
