use crate::grade::Grade;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

lazy_static! {
    static ref CREDITS_REGEX: Regex = Regex::new(r"^\+?(\d+(\.\d*)?|\.\d+)$").unwrap();
}

/// Placeholder course name given to freshly added rows.
pub const PLACEHOLDER_COURSE: &str = "Enter Name";

/// Courses the table starts with unless the user asks for an empty one.
pub const SAMPLE_COURSES: [(&str, u32); 6] = [
    ("Semiconductor Physics and Computational Methods", 5),
    ("Electrical and Electronics Engineering", 4),
    ("Advanced Calculus and Complex Analysis", 4),
    ("Object Oriented Design and Programming", 3),
    ("Communicative English", 3),
    ("Engineering Graphics and Design", 2),
];

/// Stable row identity, handed out from a counter and never reused while the
/// counter keeps running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(pub u64);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Credit weight exactly as the user typed it.
///
/// Nothing is rejected at entry time. [`Credits::value`] is the only place
/// the text is interpreted, and anything that is not a plain non-negative
/// decimal simply has no value.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Credits(String);

impl Credits {
    pub fn new(raw: impl Into<String>) -> Self {
        Credits(raw.into())
    }

    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Numeric credit weight, if the text is a plain non-negative decimal
    ///
    /// # Returns
    /// * `Some(f64)` for text like `4`, `4.5`, `.5` or `+3`
    /// * `None` for anything else, including empty text and negatives
    pub fn value(&self) -> Option<f64> {
        let text = self.0.trim();
        if !CREDITS_REGEX.is_match(text) {
            return None;
        }
        text.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl From<&str> for Credits {
    fn from(raw: &str) -> Self {
        Credits::new(raw)
    }
}

impl From<u32> for Credits {
    fn from(credits: u32) -> Self {
        Credits(credits.to_string())
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Credits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct CreditsVisitor;

// Numbers and strings are both accepted; the text form is what gets kept.
impl Visitor<'_> for CreditsVisitor {
    type Value = Credits;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a credit count as a number or text")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Credits, E> {
        Ok(Credits::new(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Credits, E> {
        Ok(Credits(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Credits, E> {
        Ok(Credits(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Credits, E> {
        Ok(Credits(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for Credits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CreditsVisitor)
    }
}

/// One course entry in the table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub key: RowKey,
    pub course: String,
    pub credits: Credits,
    /// `None` until the user picks a grade.
    pub grade: Option<Grade>,
}

impl Row {
    pub fn placeholder(key: RowKey) -> Self {
        Row {
            key,
            course: PLACEHOLDER_COURSE.to_string(),
            credits: Credits::from(0u32),
            grade: None,
        }
    }

    /// Whether this row contributes to the CGPA.
    pub fn is_counted(&self) -> bool {
        self.grade.is_some() && self.credits.value().is_some()
    }

    pub fn apply(&mut self, patch: &RowPatch) {
        if let Some(course) = &patch.course {
            self.course = course.clone();
        }
        if let Some(credits) = &patch.credits {
            self.credits = credits.clone();
        }
    }
}

/// Partial edit of a row's text fields. Absent fields are left alone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RowPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<Credits>,
}

impl RowPatch {
    pub fn course(course: impl Into<String>) -> Self {
        RowPatch {
            course: Some(course.into()),
            credits: None,
        }
    }

    pub fn credits(credits: impl Into<Credits>) -> Self {
        RowPatch {
            course: None,
            credits: Some(credits.into()),
        }
    }
}
