use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// A monetary amount held in integer hundredths.
///
/// Grid amounts in this domain are two-decimal currency values; keeping them
/// as integer cents makes field-level equality exact, which the dirty
/// comparison relies on.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Largest representable grid amount: 99 999 999.99.
    pub const MAX_AMOUNT: Money = Money(9_999_999_999);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_major(units: i64) -> Self {
        Self(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `self + self * percent / 100`, rounded half away from zero.
    pub fn with_percent_bonus(self, percent: i64) -> Money {
        let raw = self.0 * percent;
        let half = if raw >= 0 { 50 } else { -50 };
        Money(self.0 + (raw + half) / 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(AppError::ParseError(format!("invalid amount '{}'", s)));
        }
        if frac.len() > 2 {
            return Err(AppError::ParseError(format!(
                "amount '{}' has more than two decimal places",
                s
            )));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AppError::ParseError(format!("invalid amount '{}'", s)))?
        };
        let mut cents: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse()
                .map_err(|_| AppError::ParseError(format!("invalid amount '{}'", s)))?
        };
        if frac.len() == 1 {
            cents *= 10;
        }

        Ok(Money(sign * (whole * 100 + cents)))
    }
}

/// A typed field value as seen by the change tracker.
///
/// Every tracked field of a record is projected to one of these variants so
/// that diffing and field-change events work uniformly across record types.
/// Equality is value equality; `Null` only equals `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Money(Money),
    Text(String),
    Date(NaiveDate),
    Boolean(bool),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Money(_) => "MONEY",
            Self::Text(_) => "TEXT",
            Self::Date(_) => "DATE",
            Self::Boolean(_) => "BOOLEAN",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Money(m) => write!(f, "{}", m),
            Self::Text(s) => write!(f, "{}", s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<Money> for FieldValue {
    fn from(m: Money) -> Self {
        Self::Money(m)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T> From<Option<T>> for FieldValue
where
    T: Into<FieldValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}
