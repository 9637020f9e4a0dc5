use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Dirección postal estadounidense tal como la captura el formulario de
/// perfil. La validación es estructural; la verificación real la hace el
/// proofer externo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

impl Address {
    pub fn new(
        address1: &str,
        address2: Option<&str>,
        city: &str,
        state: &str,
        zipcode: &str,
    ) -> Result<Self, DomainError> {
        if address1.trim().is_empty() {
            return Err(DomainError::ValidationError("address1 is required".to_string()));
        }
        if city.trim().is_empty() {
            return Err(DomainError::ValidationError("city is required".to_string()));
        }
        let state = state.trim().to_ascii_uppercase();
        if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::ValidationError("state must be a 2-letter code".to_string()));
        }
        let zip_digits: String = zipcode.chars().filter(|c| c.is_ascii_digit()).collect();
        if zip_digits.len() != 5 && zip_digits.len() != 9 {
            return Err(DomainError::ValidationError("zipcode must be 5 or 9 digits".to_string()));
        }
        Ok(Address {
            address1: address1.trim().to_string(),
            address2: address2.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
            city: city.trim().to_string(),
            state,
            zipcode: zip_digits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_normalized_address() {
        let addr = Address::new("123 Main St", None, "Nowhere", "ks", "66044").unwrap();
        assert_eq!(addr.state, "KS");
        assert_eq!(addr.zipcode, "66044");
        assert!(addr.address2.is_none());
    }

    #[test]
    fn accepts_zip_plus_four() {
        let addr = Address::new("456 Other Ave", Some("Apt 2"), "Elsewhere", "MO", "66044-1234").unwrap();
        assert_eq!(addr.zipcode, "660441234");
        assert_eq!(addr.address2.as_deref(), Some("Apt 2"));
    }

    #[test]
    fn rejects_missing_or_malformed_fields() {
        assert!(Address::new("", None, "City", "KS", "66044").is_err());
        assert!(Address::new("123 Main St", None, "", "KS", "66044").is_err());
        assert!(Address::new("123 Main St", None, "City", "Kansas", "66044").is_err());
        assert!(Address::new("123 Main St", None, "City", "KS", "123").is_err());
    }
}
