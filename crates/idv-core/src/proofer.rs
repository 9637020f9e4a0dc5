//! Capability de verificación externa (Proofer).
//!
//! El motor trata a todos los vendors por igual a través de este trait. La
//! invocación es síncrona desde la perspectiva del submit, siempre con
//! timeout explícito (lo aplica el executor); un timeout o error de
//! transporte se reporta como `VendorFailure`, nunca queda pendiente.

use async_trait::async_trait;
use idv_domain::{FinanceAccount, Phone, Pii};
use thiserror::Error;
use uuid::Uuid;

/// Fragmento de PII que el paso entrega a verificar.
#[derive(Debug, Clone, PartialEq)]
pub enum ProofRequest {
    /// Resolución de identidad: nombre, dirección, fecha de nacimiento, SSN.
    Resolution(Pii),
    /// Conocimiento financiero: cuenta declarada por el sujeto.
    Finance(FinanceAccount),
    /// Posesión del teléfono declarado.
    Phone(Phone),
    /// Recuperación de identidad ya verificada en otro proveedor
    /// (inherited proofing).
    InheritedRetrieval,
}

/// Veredicto del vendor sobre el fragmento.
#[derive(Debug, Clone, PartialEq)]
pub enum ProofResult {
    /// Verificado; puede traer PII adicional/normalizada del vendor.
    Verified { pii: Pii },
    Rejected { reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProoferError {
    #[error("vendor timeout")]
    Timeout,
    #[error("vendor error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Proofer: Send + Sync {
    async fn verify(&self, request: &ProofRequest, correlation_id: Uuid) -> Result<ProofResult, ProoferError>;
}
