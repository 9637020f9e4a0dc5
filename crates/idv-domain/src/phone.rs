use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Teléfono estadounidense normalizado a 10 dígitos.
///
/// Acepta separadores comunes y el prefijo de país `+1`/`1`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phone(String);

impl Phone {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let mut digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() == 11 && digits.starts_with('1') {
            digits.remove(0);
        }
        if digits.len() != 10 {
            return Err(DomainError::ValidationError("phone must be a 10-digit US number".to_string()));
        }
        // El código de área no puede empezar en 0 ni 1.
        if digits.starts_with('0') || digits.starts_with('1') {
            return Err(DomainError::ValidationError("invalid US area code".to_string()));
        }
        Ok(Phone(digits))
    }

    /// Forma de presentación `+1 (AAA) EEE-SSSS`.
    pub fn formatted(&self) -> String {
        format!("+1 ({}) {}-{}", &self.0[0..3], &self.0[3..6], &self.0[6..10])
    }

    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phone(***-***-{})", &self.0[6..10])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_country_code_and_separators() {
        let a = Phone::parse("415-555-9999").unwrap();
        let b = Phone::parse("+1 (415) 555-9999").unwrap();
        let c = Phone::parse("14155559999").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.formatted(), "+1 (415) 555-9999");
    }

    #[test]
    fn rejects_short_and_bad_area_codes() {
        assert!(Phone::parse("555-9999").is_err());
        assert!(Phone::parse("015-555-9999").is_err());
        assert!(Phone::parse("115-555-9999").is_err());
    }
}
