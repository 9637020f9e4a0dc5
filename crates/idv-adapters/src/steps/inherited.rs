//! Pasos del flujo `inherited_proofing`: la identidad ya fue verificada por
//! otra agencia y aquí sólo se recupera y confirma.

use idv_core::{AttemptPolicy, FieldError, IdvConfig, ProofRequest, StepDefinition, StepOutput};
use serde_json::Value;

use super::flow_level_policy;

pub struct GetStartedStep;

impl StepDefinition for GetStartedStep {
    fn id(&self) -> &str {
        "get_started"
    }

    fn scope(&self) -> &str {
        "inherited_proofing"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        flow_level_policy(config)
    }

    fn validate(&self, _payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        Ok(StepOutput::empty())
    }
}

/// Consentimiento explícito para recuperar la identidad de la otra agencia.
pub struct AgreementStep;

impl StepDefinition for AgreementStep {
    fn id(&self) -> &str {
        "agreement"
    }

    fn scope(&self) -> &str {
        "inherited_proofing"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        flow_level_policy(config)
    }

    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        match payload.get("ip_consent").and_then(Value::as_bool) {
            Some(true) => Ok(StepOutput::empty()),
            _ => Err(vec![FieldError::new("ip_consent", "consent is required to continue")]),
        }
    }
}

/// Dispara la recuperación remota de la identidad heredada.
pub struct VerifyWaitStep;

impl StepDefinition for VerifyWaitStep {
    fn id(&self) -> &str {
        "verify_wait"
    }

    fn scope(&self) -> &str {
        "inherited_proofing"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        flow_level_policy(config)
    }

    fn validate(&self, _payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        Ok(StepOutput::with_proofing(None, ProofRequest::InheritedRetrieval))
    }
}

/// Confirmación de los datos recuperados.
pub struct VerifyInfoStep;

impl StepDefinition for VerifyInfoStep {
    fn id(&self) -> &str {
        "verify_info"
    }

    fn scope(&self) -> &str {
        "inherited_proofing"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        flow_level_policy(config)
    }

    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        match payload.get("confirm").and_then(Value::as_bool) {
            Some(true) => Ok(StepOutput::empty()),
            _ => Err(vec![FieldError::new("confirm", "confirm the retrieved information")]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agreement_requires_explicit_consent() {
        assert!(AgreementStep.validate(&json!({})).is_err());
        assert!(AgreementStep.validate(&json!({"ip_consent": false})).is_err());
        assert!(AgreementStep.validate(&json!({"ip_consent": true})).is_ok());
    }

    #[test]
    fn verify_wait_requests_retrieval_proofing() {
        let output = VerifyWaitStep.validate(&json!({})).unwrap();
        assert!(matches!(output.proofing, Some(ProofRequest::InheritedRetrieval)));
        assert!(output.pii.is_none());
    }

    #[test]
    fn verify_info_requires_confirmation() {
        assert!(VerifyInfoStep.validate(&json!({"confirm": true})).is_ok());
        assert!(VerifyInfoStep.validate(&json!({"confirm": "yes"})).is_err());
    }
}
