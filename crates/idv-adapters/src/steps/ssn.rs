//! Paso `ssn`: entrada del número de seguro social.

use idv_core::{AttemptPolicy, FieldError, IdvConfig, StepDefinition, StepOutput};
use idv_domain::{Pii, Ssn};
use serde_json::Value;

use super::str_field;

pub struct SsnStep;

impl StepDefinition for SsnStep {
    fn id(&self) -> &str {
        "ssn"
    }

    fn scope(&self) -> &str {
        "proof_ssn"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        AttemptPolicy {
            max_attempts: config.proof_ssn_max_attempts,
            window: config.proof_ssn_window,
            strategy: config.window_strategy(),
        }
    }

    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        let raw = str_field(payload, "ssn")
            .ok_or_else(|| vec![FieldError::new("ssn", "SSN is required")])?;
        let ssn = Ssn::parse(raw).map_err(|err| vec![FieldError::new("ssn", err.to_string())])?;
        Ok(StepOutput::with_pii(Pii { ssn: Some(ssn), ..Pii::default() }))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use serde_json::json;

    #[test]
    fn valid_ssn_merges_into_pii() {
        let output = SsnStep.validate(&json!({"ssn": "123-45-6789"})).unwrap();
        assert_eq!(output.pii.unwrap().ssn.unwrap().formatted(), "123-45-6789");
        assert!(output.proofing.is_none());
    }

    #[test]
    fn invalid_fixture_ssn_is_rejected() {
        let errors = SsnStep.validate(&json!({"ssn": "666-66-6666"})).unwrap_err();
        assert_eq!(errors[0].field, "ssn");
    }

    #[test]
    fn missing_ssn_is_required() {
        assert!(SsnStep.validate(&json!({})).is_err());
    }

    #[test]
    fn policy_follows_config_tunables() {
        let mut config = IdvConfig::default();
        config.proof_ssn_max_attempts = 2;
        config.proof_ssn_window = Duration::from_secs(120);
        let policy = SsnStep.policy(&config);
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.window, Duration::from_secs(120));
    }
}
