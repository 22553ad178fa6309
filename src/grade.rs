use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Letter grade on the fixed 10-point scale.
///
/// The scale is closed: a grade that is not one of these variants cannot be
/// constructed, parsed or deserialized. An ungraded row stores `None` rather
/// than a grade, so "not set yet" is never confused with `F`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Grade {
    O,
    APlus,
    A,
    BPlus,
    B,
    CPlus,
    F,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradeError {
    #[error("unknown grade label '{0}'")]
    UnknownLabel(String),
    #[error("no grade is worth {0} points")]
    UnknownPoints(u64),
}

impl Grade {
    /// Every grade, best first. This is the order the pickers show.
    pub const ALL: [Grade; 7] = [
        Grade::O,
        Grade::APlus,
        Grade::A,
        Grade::BPlus,
        Grade::B,
        Grade::CPlus,
        Grade::F,
    ];

    pub fn points(self) -> u8 {
        match self {
            Grade::O => 10,
            Grade::APlus => 9,
            Grade::A => 8,
            Grade::BPlus => 7,
            Grade::B => 6,
            Grade::CPlus => 5,
            Grade::F => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::O => "O",
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::F => "F",
        }
    }

    pub fn from_points(points: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.points() == points)
    }
}

impl FromStr for Grade {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GradeError::UnknownLabel(wanted.to_string()))
    }
}

/// `{}` prints the label, `{:#}` prints picker text such as `A+ (9)`.
impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{} ({})", self.label(), self.points())
        } else {
            f.write_str(self.label())
        }
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

struct GradeVisitor;

impl Visitor<'_> for GradeVisitor {
    type Value = Grade;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a grade label such as \"A+\" or its grade point")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Grade, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Grade, E> {
        u8::try_from(v)
            .ok()
            .and_then(Grade::from_points)
            .ok_or_else(|| E::custom(GradeError::UnknownPoints(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Grade, E> {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for Grade {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(GradeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_matches_ten_point_table() {
        let table: Vec<(&str, u8)> = Grade::ALL.iter().map(|g| (g.label(), g.points())).collect();
        assert_eq!(
            table,
            vec![("O", 10), ("A+", 9), ("A", 8), ("B+", 7), ("B", 6), ("C+", 5), ("F", 0)]
        );
    }

    #[test]
    fn parses_labels_loosely() {
        assert_eq!(" a+ ".parse::<Grade>(), Ok(Grade::APlus));
        assert_eq!("o".parse::<Grade>(), Ok(Grade::O));
        assert_eq!(
            "D".parse::<Grade>(),
            Err(GradeError::UnknownLabel("D".to_string()))
        );
    }

    #[test]
    fn points_outside_scale_are_rejected() {
        assert_eq!(Grade::from_points(7), Some(Grade::BPlus));
        assert_eq!(Grade::from_points(4), None);
        assert_eq!(Grade::from_points(1), None);
    }

    #[test]
    fn serde_uses_labels_and_accepts_points() {
        assert_eq!(serde_json::to_string(&Grade::CPlus).unwrap(), "\"C+\"");
        assert_eq!(serde_json::from_str::<Grade>("\"B+\"").unwrap(), Grade::BPlus);
        assert_eq!(serde_json::from_str::<Grade>("10").unwrap(), Grade::O);
        assert!(serde_json::from_str::<Grade>("3").is_err());
        assert!(serde_json::from_str::<Grade>("-1").is_err());
        assert!(serde_json::from_str::<Grade>("\"\"").is_err());
    }

    #[test]
    fn alternate_display_is_picker_text() {
        assert_eq!(format!("{}", Grade::APlus), "A+");
        assert_eq!(format!("{:#}", Grade::APlus), "A+ (9)");
        assert_eq!(format!("{:#}", Grade::F), "F (0)");
    }
}
