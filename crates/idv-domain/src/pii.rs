use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Address, FinanceAccount, Phone, Ssn};

/// Bolsa transitoria de datos personales derivados del proofing.
///
/// Vive únicamente dentro de la `FlowSession`; los pasos van fusionando
/// fragmentos a medida que se completan y todo se descarta con la sesión.
/// `Debug` enmascara los campos sensibles.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pii {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<Address>,
    pub prev_address: Option<Address>,
    pub ssn: Option<Ssn>,
    pub phone: Option<Phone>,
    pub finance: Option<FinanceAccount>,
}

impl Pii {
    /// Fusiona `other` sobre `self`: los fragmentos más recientes ganan.
    pub fn merge(&mut self, other: Pii) {
        if other.first_name.is_some() {
            self.first_name = other.first_name;
        }
        if other.last_name.is_some() {
            self.last_name = other.last_name;
        }
        if other.dob.is_some() {
            self.dob = other.dob;
        }
        if other.address.is_some() {
            self.address = other.address;
        }
        if other.prev_address.is_some() {
            self.prev_address = other.prev_address;
        }
        if other.ssn.is_some() {
            self.ssn = other.ssn;
        }
        if other.phone.is_some() {
            self.phone = other.phone;
        }
        if other.finance.is_some() {
            self.finance = other.finance;
        }
    }

    pub fn clear(&mut self) {
        *self = Pii::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Pii::default()
    }
}

impl fmt::Debug for Pii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pii")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("dob", &self.dob.map(|_| "<redacted>"))
            .field("address", &self.address.as_ref().map(|_| "<redacted>"))
            .field("prev_address", &self.prev_address.as_ref().map(|_| "<redacted>"))
            .field("ssn", &self.ssn)
            .field("phone", &self.phone)
            .field("finance", &self.finance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_only_present_fragments() {
        let mut pii = Pii {
            first_name: Some("José".to_string()),
            last_name: Some("One".to_string()),
            ..Pii::default()
        };
        let fragment = Pii { ssn: Some(Ssn::parse("123-45-6789").unwrap()), ..Pii::default() };
        pii.merge(fragment);
        assert_eq!(pii.first_name.as_deref(), Some("José"));
        assert!(pii.ssn.is_some());

        let newer = Pii { ssn: Some(Ssn::parse("123-45-1234").unwrap()), ..Pii::default() };
        pii.merge(newer);
        assert_eq!(pii.ssn.unwrap().formatted(), "123-45-1234");
    }

    #[test]
    fn clear_discards_everything() {
        let mut pii = Pii { phone: Some(Phone::parse("415-555-9999").unwrap()), ..Pii::default() };
        pii.clear();
        assert!(pii.is_empty());
    }
}
