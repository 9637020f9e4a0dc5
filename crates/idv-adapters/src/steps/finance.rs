//! Paso `finance`: verificación de conocimiento financiero. El tipo de
//! instrumento es un discriminante dentro del propio payload (`finance_type`)
//! y el número se lee del campo homónimo, como en el formulario original.

use idv_core::{AttemptPolicy, FieldError, IdvConfig, ProofRequest, StepDefinition, StepOutput};
use idv_domain::{FinanceAccount, FinanceKind, Pii};
use serde_json::Value;

use super::{flow_level_policy, str_field};

pub struct FinanceStep;

impl StepDefinition for FinanceStep {
    fn id(&self) -> &str {
        "finance"
    }

    fn scope(&self) -> &str {
        "proof_finance"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        flow_level_policy(config)
    }

    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        let kind: FinanceKind = str_field(payload, "finance_type")
            .ok_or_else(|| vec![FieldError::new("finance_type", "finance type is required")])?
            .parse()
            .map_err(|err: idv_domain::DomainError| vec![FieldError::new("finance_type", err.to_string())])?;

        let number = str_field(payload, kind.as_str())
            .ok_or_else(|| vec![FieldError::new(kind.as_str(), "account number is required")])?;
        let account = FinanceAccount::new(kind, number)
            .map_err(|err| vec![FieldError::new(kind.as_str(), err.to_string())])?;

        Ok(StepOutput::with_proofing(
            Some(Pii { finance: Some(account.clone()), ..Pii::default() }),
            ProofRequest::Finance(account),
        ))
    }
}
