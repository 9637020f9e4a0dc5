//! Paso `phone`: confirmación de posesión del teléfono declarado.

use idv_core::{AttemptPolicy, FieldError, IdvConfig, ProofRequest, StepDefinition, StepOutput};
use idv_domain::{Phone, Pii};
use serde_json::Value;

use super::str_field;

pub struct PhoneStep;

impl StepDefinition for PhoneStep {
    fn id(&self) -> &str {
        "phone"
    }

    fn scope(&self) -> &str {
        "phone_confirmation"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        AttemptPolicy {
            max_attempts: config.phone_confirmation_max_attempts,
            window: config.phone_confirmation_window,
            strategy: config.window_strategy(),
        }
    }

    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        let raw = str_field(payload, "phone")
            .ok_or_else(|| vec![FieldError::new("phone", "phone number is required")])?;
        let phone = Phone::parse(raw).map_err(|err| vec![FieldError::new("phone", err.to_string())])?;
        Ok(StepOutput::with_proofing(
            Some(Pii { phone: Some(phone.clone()), ..Pii::default() }),
            ProofRequest::Phone(phone),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_phone_requests_confirmation_proofing() {
        let output = PhoneStep.validate(&json!({"phone": "415-555-9999"})).unwrap();
        match output.proofing {
            Some(ProofRequest::Phone(phone)) => assert_eq!(phone.formatted(), "+1 (415) 555-9999"),
            other => panic!("expected phone proofing, got {:?}", other),
        }
    }

    #[test]
    fn malformed_phone_is_invalid() {
        let errors = PhoneStep.validate(&json!({"phone": "555-99"})).unwrap_err();
        assert_eq!(errors[0].field, "phone");
    }
}
