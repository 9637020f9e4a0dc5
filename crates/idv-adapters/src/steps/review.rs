//! Paso `review`: confirmación final con re-entrada de contraseña. La
//! verificación real de la contraseña es del dominio de autenticación; aquí
//! sólo se exige que venga.

use idv_core::{AttemptPolicy, FieldError, IdvConfig, StepDefinition, StepOutput};
use serde_json::Value;

use super::{flow_level_policy, str_field};

pub struct ReviewStep;

impl StepDefinition for ReviewStep {
    fn id(&self) -> &str {
        "review"
    }

    fn scope(&self) -> &str {
        "idv_review"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        flow_level_policy(config)
    }

    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        if str_field(payload, "password").is_none() {
            return Err(vec![FieldError::new("password", "password is required")]);
        }
        Ok(StepOutput::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_is_required() {
        assert!(ReviewStep.validate(&json!({})).is_err());
        assert!(ReviewStep.validate(&json!({"password": "  "})).is_err());
        assert!(ReviewStep.validate(&json!({"password": "s3cret"})).is_ok());
    }
}
