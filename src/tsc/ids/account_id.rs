use crate::Value;

use std::fmt;

/// Account identifier. Numeric ids order numerically and ahead of textual ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccountId {
    Numeric(i64),
    Text(String),
}

impl AccountId {
    /// Reads an identifier out of a cell, `None` if the cell can't identify an account
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number)
                if number.is_finite() && number.fract() == 0.0 && number.abs() < 9.0e15 =>
            {
                Some(AccountId::Numeric(*number as i64))
            }
            Value::Text(text) => {
                let text = text.trim();

                if text.is_empty() {
                    return None;
                }

                // text like "00123" stays text so it can't collide with 123
                match text.parse::<i64>() {
                    Ok(number) if number.to_string() == text => Some(AccountId::Numeric(number)),
                    _ => Some(AccountId::Text(text.to_string())),
                }
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            AccountId::Numeric(number) => Value::Number(*number as f64),
            AccountId::Text(text) => Value::Text(text.clone()),
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AccountId::Numeric(number) => write!(f, "{number}"),
            AccountId::Text(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_from_numbers_and_text() {
        assert_eq!(
            AccountId::from_value(&Value::Number(1001.0)),
            Some(AccountId::Numeric(1001))
        );
        assert_eq!(
            AccountId::from_value(&Value::Text(" 1001 ".to_string())),
            Some(AccountId::Numeric(1001))
        );
    }

    #[test]
    fn padded_text_ids_stay_text() {
        assert_eq!(
            AccountId::from_value(&Value::Text("00123".to_string())),
            Some(AccountId::Text("00123".to_string()))
        );
        assert_eq!(
            AccountId::from_value(&Value::Text("+5".to_string())),
            Some(AccountId::Text("+5".to_string()))
        );
        assert_eq!(
            AccountId::from_value(&Value::Text("00123".to_string())).map(|id| id.to_value()),
            Some(Value::Text("00123".to_string()))
        );
    }

    #[test]
    fn reject_unusable_ids() {
        assert_eq!(AccountId::from_value(&Value::Number(10.5)), None);
        assert_eq!(AccountId::from_value(&Value::Text("   ".to_string())), None);
        assert_eq!(AccountId::from_value(&Value::Bool(true)), None);
    }

    #[test]
    fn numeric_ids_sort_numerically() {
        let mut ids = vec![
            AccountId::Text("A-1".to_string()),
            AccountId::Numeric(10),
            AccountId::Numeric(9),
        ];
        ids.sort();

        assert_eq!(
            ids,
            vec![
                AccountId::Numeric(9),
                AccountId::Numeric(10),
                AccountId::Text("A-1".to_string()),
            ]
        );
    }
}
