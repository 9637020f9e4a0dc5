use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Número de seguro social normalizado (9 dígitos, sin guiones).
///
/// La validación sigue las reglas estructurales del SSA: el área no puede
/// ser `000`, `666` ni `900-999`, y ni el grupo ni el serial pueden ser
/// todo ceros.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ssn(String);

impl Ssn {
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        let stripped: String = input.chars().filter(|c| *c != '-' && *c != ' ').collect();
        if digits.len() != 9 || stripped.len() != digits.len() {
            return Err(DomainError::ValidationError("SSN must be 9 digits".to_string()));
        }
        let area = &digits[0..3];
        let group = &digits[3..5];
        let serial = &digits[5..9];
        if area == "000" || area == "666" || area >= "900" {
            return Err(DomainError::ValidationError(format!("SSN area {} is not issuable", area)));
        }
        if group == "00" || serial == "0000" {
            return Err(DomainError::ValidationError("SSN group and serial cannot be zero".to_string()));
        }
        Ok(Ssn(digits))
    }

    /// Forma con guiones `AAA-GG-SSSS` para re-render de formularios.
    pub fn formatted(&self) -> String {
        format!("{}-{}-{}", &self.0[0..3], &self.0[3..5], &self.0[5..9])
    }

    /// Últimos 4 dígitos visibles, el resto enmascarado.
    pub fn masked(&self) -> String {
        format!("***-**-{}", &self.0[5..9])
    }

    pub fn digits(&self) -> &str {
        &self.0
    }
}

// Debug nunca muestra el valor en claro (PII).
impl fmt::Debug for Ssn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ssn({})", self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hyphens() {
        let a = Ssn::parse("123-45-6789").unwrap();
        let b = Ssn::parse("123456789").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.formatted(), "123-45-6789");
    }

    #[test]
    fn rejects_unissuable_areas() {
        assert!(Ssn::parse("666-66-6666").is_err());
        assert!(Ssn::parse("000-12-3456").is_err());
        assert!(Ssn::parse("900-12-3456").is_err());
        assert!(Ssn::parse("999-12-3456").is_err());
    }

    #[test]
    fn rejects_zero_group_or_serial() {
        assert!(Ssn::parse("123-00-6789").is_err());
        assert!(Ssn::parse("123-45-0000").is_err());
    }

    #[test]
    fn rejects_wrong_length_and_letters() {
        assert!(Ssn::parse("123-45-678").is_err());
        assert!(Ssn::parse("123-45-67890").is_err());
        assert!(Ssn::parse("12a-45-6789").is_err());
    }

    #[test]
    fn debug_is_masked() {
        let ssn = Ssn::parse("123-45-6789").unwrap();
        let rendered = format!("{:?}", ssn);
        assert!(!rendered.contains("123"));
        assert!(rendered.contains("6789"));
    }
}
