//! idv-domain: objetos de valor de PII y validación de campos.
//!
//! Este crate no conoce el motor de flujos; sólo define los tipos que los
//! pasos validan y fusionan en la sesión.

pub mod address;
pub mod error;
pub mod finance;
pub mod phone;
pub mod pii;
pub mod ssn;

pub use address::Address;
pub use error::DomainError;
pub use finance::{FinanceAccount, FinanceKind, VALID_MAXIMUM_LENGTH, VALID_MINIMUM_LENGTH};
pub use phone::Phone;
pub use pii::Pii;
pub use ssn::Ssn;
