//! Contrato de un paso de proofing.
//!
//! Cada paso declara su scope de conteo de intentos, resuelve su política
//! desde el snapshot de configuración y valida el payload suelto hacia su
//! forma tipada. El motor es genérico sobre el grafo inyectado: no conoce
//! pasos concretos.

use idv_domain::Pii;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::IdvConfig;
use crate::limiter::AttemptPolicy;
use crate::proofer::ProofRequest;

/// Error de validación a nivel de campo, para re-render del formulario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError { field: field.to_string(), message: message.into() }
    }
}

/// Salida de una validación exitosa.
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    /// Fragmento de PII a fusionar en la sesión al completar el paso.
    pub pii: Option<Pii>,
    /// Verificación externa requerida antes de dar el paso por completado.
    pub proofing: Option<ProofRequest>,
}

impl StepOutput {
    pub fn empty() -> Self {
        StepOutput::default()
    }

    pub fn with_pii(pii: Pii) -> Self {
        StepOutput { pii: Some(pii), proofing: None }
    }

    pub fn with_proofing(pii: Option<Pii>, request: ProofRequest) -> Self {
        StepOutput { pii, proofing: Some(request) }
    }
}

/// Definición de un paso. Las implementaciones viven en `idv-adapters`;
/// deben ser puras respecto al payload + config.
pub trait StepDefinition: Send + Sync {
    /// Identificador estable y único dentro del Flow.
    fn id(&self) -> &str;

    /// Scope del contador de intentos de este paso.
    fn scope(&self) -> &str;

    /// Política de intentos resuelta desde el snapshot actual.
    fn policy(&self, config: &IdvConfig) -> AttemptPolicy;

    /// Valida el payload y lo convierte a la forma tipada del paso.
    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>>;
}
