use crate::row::Row;
use log::trace;
use serde::{Serialize, Serializer};
use std::fmt;

/// Result of the CGPA computation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cgpa {
    /// Credit-weighted mean at full precision.
    Value(f64),
    /// Nothing to average: empty table, no graded rows, or zero credits.
    NoValue,
}

impl Cgpa {
    /// Two-decimal value for display, rounding half away from zero.
    pub fn rounded(self) -> Option<f64> {
        match self {
            Cgpa::Value(v) => Some((v * 100.0).round() / 100.0),
            Cgpa::NoValue => None,
        }
    }
}

impl fmt::Display for Cgpa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rounded() {
            Some(v) => write!(f, "{:.2}", v),
            None => f.write_str("-"),
        }
    }
}

impl Serialize for Cgpa {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rounded().serialize(serializer)
    }
}

/// Running sums over the graded rows of a table.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tally {
    /// Sum of credits times grade points.
    pub points: f64,
    pub credits: f64,
    /// Graded rows that contributed.
    pub counted: usize,
    /// Graded rows dropped because their credits did not parse.
    pub skipped: usize,
}

impl Tally {
    pub fn of(rows: &[Row]) -> Self {
        let mut tally = Tally::default();
        for row in rows {
            let Some(grade) = row.grade else { continue };
            match row.credits.value() {
                Some(credits) => {
                    tally.points += credits * f64::from(grade.points());
                    tally.credits += credits;
                    tally.counted += 1;
                }
                None => tally.skipped += 1,
            }
        }
        tally
    }

    pub fn cgpa(&self) -> Cgpa {
        if self.counted == 0 || self.credits <= 0.0 {
            return Cgpa::NoValue;
        }
        Cgpa::Value(self.points / self.credits)
    }
}

/// Credit-weighted mean grade point of `rows`.
///
/// Ungraded rows are ignored rather than counted as zero. A graded row whose
/// credits do not parse is left out of both sums.
///
/// # Arguments
/// * `rows` - Any snapshot of the table
///
/// # Returns
/// * `Cgpa::Value` with the full-precision mean
/// * `Cgpa::NoValue` for an empty table, no countable rows, or zero credits
///
/// # Examples
/// ```
/// use cgpa::{Cgpa, Credits, Grade, Row, RowKey, compute_cgpa};
///
/// let rows = vec![Row {
///     key: RowKey(0),
///     course: "Networks".to_string(),
///     credits: Credits::from("5"),
///     grade: Some(Grade::A),
/// }];
/// assert_eq!(compute_cgpa(&rows).to_string(), "8.00");
/// assert_eq!(compute_cgpa(&[]), Cgpa::NoValue);
/// ```
pub fn compute_cgpa(rows: &[Row]) -> Cgpa {
    let tally = Tally::of(rows);
    trace!("{:?} over {} rows", tally, rows.len());
    tally.cgpa()
}
