//! Pasos de verificación de dirección: la elección de mecanismo (teléfono o
//! carta USPS) y la solicitud de carta.
//!
//! `address` es el paso Choice del flujo estándar; el grafo resuelve la rama
//! por el discriminante `address_verification_method`. La validación aquí
//! sólo exige que venga una elección — un token desconocido lo rechaza el
//! grafo para mantener la lista de ramas en un solo lugar.

use idv_core::{AttemptPolicy, FieldError, IdvConfig, StepDefinition, StepOutput};
use serde_json::Value;

use super::str_field;

pub struct AddressMethodStep;

impl StepDefinition for AddressMethodStep {
    fn id(&self) -> &str {
        "address"
    }

    fn scope(&self) -> &str {
        "proof_address"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        AttemptPolicy {
            max_attempts: config.proof_address_max_attempts,
            window: config.proof_address_window,
            strategy: config.window_strategy(),
        }
    }

    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        if str_field(payload, "address_verification_method").is_none() {
            return Err(vec![FieldError::new("address_verification_method", "choose a verification method")]);
        }
        Ok(StepOutput::empty())
    }
}

/// Solicitud de carta USPS. La carta se encola fuera del motor; el paso se
/// completa al confirmar.
pub struct UspsStep;

impl StepDefinition for UspsStep {
    fn id(&self) -> &str {
        "usps"
    }

    fn scope(&self) -> &str {
        "proof_address"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        AttemptPolicy {
            max_attempts: config.proof_address_max_attempts,
            window: config.proof_address_window,
            strategy: config.window_strategy(),
        }
    }

    fn validate(&self, _payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        Ok(StepOutput::empty())
    }
}
