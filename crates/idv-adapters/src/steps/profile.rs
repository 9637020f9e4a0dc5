//! Paso `profile`: captura de nombre, fecha de nacimiento y dirección, con
//! resolución de identidad contra el proofer.

use chrono::NaiveDate;
use idv_core::{AttemptPolicy, FieldError, IdvConfig, ProofRequest, StepDefinition, StepOutput};
use idv_domain::{Address, Pii};
use serde_json::Value;

use super::{flow_level_policy, str_field};

pub struct ProfileStep;

impl StepDefinition for ProfileStep {
    fn id(&self) -> &str {
        "profile"
    }

    fn scope(&self) -> &str {
        "proof_resolution"
    }

    fn policy(&self, config: &IdvConfig) -> AttemptPolicy {
        flow_level_policy(config)
    }

    fn validate(&self, payload: &Value) -> Result<StepOutput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let first_name = str_field(payload, "first_name");
        if first_name.is_none() {
            errors.push(FieldError::new("first_name", "first name is required"));
        }
        let last_name = str_field(payload, "last_name");
        if last_name.is_none() {
            errors.push(FieldError::new("last_name", "last name is required"));
        }

        let dob = match str_field(payload, "dob") {
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push(FieldError::new("dob", "date of birth must be YYYY-MM-DD"));
                    None
                }
            },
            None => {
                errors.push(FieldError::new("dob", "date of birth is required"));
                None
            }
        };

        let address = match Address::new(
            str_field(payload, "address1").unwrap_or_default(),
            str_field(payload, "address2"),
            str_field(payload, "city").unwrap_or_default(),
            str_field(payload, "state").unwrap_or_default(),
            str_field(payload, "zipcode").unwrap_or_default(),
        ) {
            Ok(address) => Some(address),
            Err(err) => {
                errors.push(FieldError::new("address", err.to_string()));
                None
            }
        };

        // dirección anterior opcional: sólo se valida si viene address1
        let prev_address = match str_field(payload, "prev_address1") {
            Some(prev_address1) => match Address::new(
                prev_address1,
                str_field(payload, "prev_address2"),
                str_field(payload, "prev_city").unwrap_or_default(),
                str_field(payload, "prev_state").unwrap_or_default(),
                str_field(payload, "prev_zipcode").unwrap_or_default(),
            ) {
                Ok(address) => Some(address),
                Err(err) => {
                    errors.push(FieldError::new("prev_address", err.to_string()));
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        let pii = Pii {
            first_name: first_name.map(str::to_string),
            last_name: last_name.map(str::to_string),
            dob,
            address,
            prev_address,
            ..Pii::default()
        };
        Ok(StepOutput::with_proofing(Some(pii.clone()), ProofRequest::Resolution(pii)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok_payload() -> Value {
        json!({
            "first_name": "José",
            "last_name": "One",
            "dob": "1970-01-01",
            "address1": "123 Main St",
            "city": "Nowhere",
            "state": "KS",
            "zipcode": "66044",
        })
    }

    #[test]
    fn valid_profile_requests_resolution_proofing() {
        let output = ProfileStep.validate(&ok_payload()).unwrap();
        let pii = output.pii.unwrap();
        assert_eq!(pii.first_name.as_deref(), Some("José"));
        assert!(matches!(output.proofing, Some(ProofRequest::Resolution(_))));
    }

    #[test]
    fn missing_fields_are_reported_per_field() {
        let errors = ProfileStep.validate(&json!({})).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"first_name"));
        assert!(fields.contains(&"dob"));
        assert!(fields.contains(&"address"));
    }

    #[test]
    fn malformed_dob_is_invalid() {
        let mut payload = ok_payload();
        payload["dob"] = json!("01/01/1970");
        let errors = ProfileStep.validate(&payload).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "dob"));
    }

    #[test]
    fn previous_address_is_optional_but_validated() {
        let mut payload = ok_payload();
        payload["prev_address1"] = json!("456 Other Ave");
        payload["prev_city"] = json!("Elsewhere");
        payload["prev_state"] = json!("MO");
        payload["prev_zipcode"] = json!("66044");
        let output = ProfileStep.validate(&payload).unwrap();
        assert!(output.pii.unwrap().prev_address.is_some());

        payload["prev_zipcode"] = json!("1");
        assert!(ProfileStep.validate(&payload).is_err());
    }
}
