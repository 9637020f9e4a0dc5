//! Proofers mock deterministas para tests y demos.
//!
//! Los valores centinela calcan los fixtures clásicos de entornos de prueba:
//! nombre "Fail", ccn todo ceros y teléfono 555-555-5555 fuerzan los caminos
//! de rechazo o de error de vendor sin tocar ningún servicio externo.

use async_trait::async_trait;
use idv_core::{ProofRequest, ProofResult, Proofer, ProoferError};
use idv_domain::Pii;
use uuid::Uuid;

fn unexpected(request: &ProofRequest) -> ProoferError {
    ProoferError::Transport(format!("unexpected proof request: {:?}", request))
}

/// Resolución de identidad. `first_name == "Fail"` simula una excepción del
/// vendor; `last_name == "Fail"` un rechazo limpio.
pub struct MockResolutionProofer;

#[async_trait]
impl Proofer for MockResolutionProofer {
    async fn verify(&self, request: &ProofRequest, _correlation_id: Uuid) -> Result<ProofResult, ProoferError> {
        let pii = match request {
            ProofRequest::Resolution(pii) => pii,
            other => return Err(unexpected(other)),
        };
        if pii.first_name.as_deref() == Some("Fail") {
            return Err(ProoferError::Transport("vendor agent raised an exception".to_string()));
        }
        if pii.last_name.as_deref() == Some("Fail") {
            return Ok(ProofResult::Rejected { reason: "identity could not be resolved".to_string() });
        }
        Ok(ProofResult::Verified { pii: Pii::default() })
    }
}

/// Conocimiento financiero. Un número todo ceros rechaza.
pub struct MockFinanceProofer;

#[async_trait]
impl Proofer for MockFinanceProofer {
    async fn verify(&self, request: &ProofRequest, _correlation_id: Uuid) -> Result<ProofResult, ProoferError> {
        let account = match request {
            ProofRequest::Finance(account) => account,
            other => return Err(unexpected(other)),
        };
        if account.number().bytes().all(|b| b == b'0') {
            return Ok(ProofResult::Rejected { reason: "account not found".to_string() });
        }
        Ok(ProofResult::Verified { pii: Pii::default() })
    }
}

/// Posesión de teléfono. 555-555-5555 rechaza.
pub struct MockPhoneProofer;

#[async_trait]
impl Proofer for MockPhoneProofer {
    async fn verify(&self, request: &ProofRequest, _correlation_id: Uuid) -> Result<ProofResult, ProoferError> {
        let phone = match request {
            ProofRequest::Phone(phone) => phone,
            other => return Err(unexpected(other)),
        };
        if phone.digits() == "5555555555" {
            return Ok(ProofResult::Rejected { reason: "phone could not be confirmed".to_string() });
        }
        Ok(ProofResult::Verified { pii: Pii::default() })
    }
}

/// Recuperación de identidad heredada: devuelve un perfil enlatado.
pub struct MockInheritedProofer;

#[async_trait]
impl Proofer for MockInheritedProofer {
    async fn verify(&self, request: &ProofRequest, _correlation_id: Uuid) -> Result<ProofResult, ProoferError> {
        if !matches!(request, ProofRequest::InheritedRetrieval) {
            return Err(unexpected(request));
        }
        let pii = Pii {
            first_name: Some("Fakey".to_string()),
            last_name: Some("McFakerson".to_string()),
            ..Pii::default()
        };
        Ok(ProofResult::Verified { pii })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idv_domain::{FinanceAccount, FinanceKind, Phone};

    #[tokio::test]
    async fn resolution_fixture_names_drive_the_verdict() {
        let ok = Pii { first_name: Some("José".to_string()), ..Pii::default() };
        let verdict = MockResolutionProofer.verify(&ProofRequest::Resolution(ok), Uuid::new_v4()).await.unwrap();
        assert!(matches!(verdict, ProofResult::Verified { .. }));

        let rejected = Pii { last_name: Some("Fail".to_string()), ..Pii::default() };
        let verdict = MockResolutionProofer.verify(&ProofRequest::Resolution(rejected), Uuid::new_v4()).await.unwrap();
        assert!(matches!(verdict, ProofResult::Rejected { .. }));

        let raises = Pii { first_name: Some("Fail".to_string()), ..Pii::default() };
        let err = MockResolutionProofer.verify(&ProofRequest::Resolution(raises), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ProoferError::Transport(_)));
    }

    #[tokio::test]
    async fn finance_rejects_all_zero_numbers() {
        let bad = FinanceAccount::new(FinanceKind::Ccn, "00000000").unwrap();
        let verdict = MockFinanceProofer.verify(&ProofRequest::Finance(bad), Uuid::new_v4()).await.unwrap();
        assert!(matches!(verdict, ProofResult::Rejected { .. }));

        let good = FinanceAccount::new(FinanceKind::Ccn, "12345678").unwrap();
        let verdict = MockFinanceProofer.verify(&ProofRequest::Finance(good), Uuid::new_v4()).await.unwrap();
        assert!(matches!(verdict, ProofResult::Verified { .. }));
    }

    #[tokio::test]
    async fn phone_rejects_the_sentinel_number() {
        let bad = Phone::parse("555-555-5555").unwrap();
        let verdict = MockPhoneProofer.verify(&ProofRequest::Phone(bad), Uuid::new_v4()).await.unwrap();
        assert!(matches!(verdict, ProofResult::Rejected { .. }));
    }

    #[tokio::test]
    async fn inherited_retrieval_returns_a_canned_profile() {
        let verdict = MockInheritedProofer.verify(&ProofRequest::InheritedRetrieval, Uuid::new_v4()).await.unwrap();
        match verdict {
            ProofResult::Verified { pii } => assert_eq!(pii.first_name.as_deref(), Some("Fakey")),
            other => panic!("expected verified, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn wrong_request_kind_is_a_transport_error() {
        let err = MockPhoneProofer.verify(&ProofRequest::InheritedRetrieval, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ProoferError::Transport(_)));
    }
}
