use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Text layouts accepted for dates that arrive as plain text
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];
const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A single non-null spreadsheet cell. Nulls are modelled as `Option<Value>::None`.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
    Bool(bool),
}

impl Value {
    /// Interprets a raw text cell: blank is null, numeric text becomes a number
    pub fn parse_cell(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return None;
        }

        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Some(Value::Number(number)),
            _ => Some(Value::Text(trimmed.to_string())),
        }
    }

    /// Interprets a cell that was stored as text: blank is null, anything else stays text
    pub fn parse_text(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            None
        } else {
            Some(Value::Text(trimmed.to_string()))
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            Value::DateTime(date_time) => Some(date_time.date()),
            Value::Text(text) => {
                let text = text.trim();

                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                    .or_else(|| {
                        DATE_TIME_FORMATS
                            .iter()
                            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                            .map(|date_time| date_time.date())
                    })
            }
            _ => None,
        }
    }

    /// Renders a date as zero-padded `MM/DD/YYYY` text. Values that are not dates come back
    /// unchanged.
    pub fn to_us_date(&self) -> Value {
        match self.to_date() {
            Some(date) => Value::Text(date.format("%m/%d/%Y").to_string()),
            None => {
                log::warn!("Value is not a recognizable date, keeping as-is: {self}");
                self.clone()
            }
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::DateTime(_) => 2,
            Value::Text(_) => 3,
        }
    }

    fn number_bits(number: f64) -> u64 {
        // -0.0 and 0.0 are the same cell value
        if number == 0.0 {
            0.0f64.to_bits()
        } else {
            number.to_bits()
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => {
                if *a == 0.0 && *b == 0.0 {
                    Ordering::Equal
                } else {
                    a.total_cmp(b)
                }
            }
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);

        match self {
            Value::Text(text) => text.hash(state),
            Value::Number(number) => Self::number_bits(*number).hash(state),
            Value::DateTime(date_time) => date_time.hash(state),
            Value::Bool(flag) => flag.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Text(text) => write!(f, "{text}"),
            Value::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{number:.0}")
            }
            Value::Number(number) => write!(f, "{number}"),
            Value::DateTime(date_time) if date_time.time() == NaiveTime::MIN => {
                write!(f, "{}", date_time.date())
            }
            Value::DateTime(date_time) => write!(f, "{date_time}"),
            Value::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn parse_cell_types() {
        assert_eq!(Value::parse_cell("  "), None);
        assert_eq!(Value::parse_cell("50"), Some(Value::Number(50.0)));
        assert_eq!(Value::parse_cell(" 12.5 "), Some(Value::Number(12.5)));
        assert_eq!(
            Value::parse_cell("SRVCHG"),
            Some(Value::Text("SRVCHG".to_string()))
        );
    }

    #[test]
    fn zero_signs_are_equal_and_hash_alike() {
        let mut seen = HashSet::new();
        seen.insert(Value::Number(0.0));

        assert!(seen.contains(&Value::Number(-0.0)));
    }

    #[test]
    fn render_us_dates() {
        let date_time = NaiveDate::from_ymd_opt(2023, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(
            Value::DateTime(date_time).to_us_date(),
            Value::Text("02/01/2023".to_string())
        );
        assert_eq!(
            Value::Text("2024-07-04".to_string()).to_us_date(),
            Value::Text("07/04/2024".to_string())
        );
        assert_eq!(
            Value::Text("2024-07-04 13:30:00".to_string()).to_us_date(),
            Value::Text("07/04/2024".to_string())
        );
        assert_eq!(
            Value::Text("someday".to_string()).to_us_date(),
            Value::Text("someday".to_string())
        );
    }

    #[test]
    fn display_whole_numbers_without_fraction() {
        assert_eq!(Value::Number(1001.0).to_string(), "1001");
        assert_eq!(Value::Number(12.5).to_string(), "12.5");
    }
}
