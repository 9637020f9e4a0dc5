use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Longitudes permitidas para números de cuenta financiera.
pub const VALID_MINIMUM_LENGTH: usize = 8;
pub const VALID_MAXIMUM_LENGTH: usize = 30;

/// Tipo de instrumento financiero usado en la verificación de conocimiento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinanceKind {
    Ccn,
    Mortgage,
    HomeEquityLine,
    AutoLoan,
}

impl FinanceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinanceKind::Ccn => "ccn",
            FinanceKind::Mortgage => "mortgage",
            FinanceKind::HomeEquityLine => "home_equity_line",
            FinanceKind::AutoLoan => "auto_loan",
        }
    }
}

impl FromStr for FinanceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ccn" => Ok(FinanceKind::Ccn),
            "mortgage" => Ok(FinanceKind::Mortgage),
            "home_equity_line" => Ok(FinanceKind::HomeEquityLine),
            "auto_loan" => Ok(FinanceKind::AutoLoan),
            other => Err(DomainError::ValidationError(format!("unknown finance type '{}'", other))),
        }
    }
}

/// Cuenta financiera declarada por el sujeto (tipo + número).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceAccount {
    kind: FinanceKind,
    number: String,
}

impl FinanceAccount {
    pub fn new(kind: FinanceKind, number: &str) -> Result<Self, DomainError> {
        if !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::ValidationError("finance number must contain only digits".to_string()));
        }
        if number.len() < VALID_MINIMUM_LENGTH || number.len() > VALID_MAXIMUM_LENGTH {
            return Err(DomainError::ValidationError(format!(
                "finance number must be between {} and {} digits",
                VALID_MINIMUM_LENGTH, VALID_MAXIMUM_LENGTH
            )));
        }
        Ok(FinanceAccount { kind, number: number.to_string() })
    }

    pub fn kind(&self) -> FinanceKind {
        self.kind
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn last_four(&self) -> &str {
        &self.number[self.number.len() - 4..]
    }
}

impl fmt::Debug for FinanceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FinanceAccount({}, ****{})", self.kind.as_str(), self.last_four())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numbers_within_bounds() {
        assert!(FinanceAccount::new(FinanceKind::Ccn, "12345678").is_ok());
        assert!(FinanceAccount::new(FinanceKind::Mortgage, &"9".repeat(VALID_MAXIMUM_LENGTH)).is_ok());
    }

    #[test]
    fn rejects_out_of_bounds_lengths() {
        let short = "1".repeat(VALID_MINIMUM_LENGTH - 1);
        let long = "1".repeat(VALID_MAXIMUM_LENGTH + 1);
        assert!(FinanceAccount::new(FinanceKind::AutoLoan, &short).is_err());
        assert!(FinanceAccount::new(FinanceKind::AutoLoan, &long).is_err());
    }

    #[test]
    fn rejects_non_digits() {
        assert!(FinanceAccount::new(FinanceKind::Ccn, "abcd1234").is_err());
    }

    #[test]
    fn finance_kind_round_trips_from_str() {
        assert_eq!("home_equity_line".parse::<FinanceKind>().unwrap(), FinanceKind::HomeEquityLine);
        assert!("bitcoin".parse::<FinanceKind>().is_err());
    }
}
