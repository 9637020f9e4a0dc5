//! Pasos concretos de los flujos incorporados.
//!
//! Cada paso valida el payload suelto del formulario hacia los tipos de
//! `idv-domain` y declara su scope/política de intentos. Los fallos de
//! validación devuelven errores por campo para re-render sticky.

mod address;
mod finance;
mod inherited;
mod phone;
mod profile;
mod review;
mod ssn;

pub use address::{AddressMethodStep, UspsStep};
pub use finance::FinanceStep;
pub use inherited::{AgreementStep, GetStartedStep, VerifyInfoStep, VerifyWaitStep};
pub use phone::PhoneStep;
pub use profile::ProfileStep;
pub use review::ReviewStep;
pub use ssn::SsnStep;

use idv_core::{AttemptPolicy, IdvConfig};
use serde_json::Value;

/// Política a nivel de flujo para pasos sin tunables propios.
pub(crate) fn flow_level_policy(config: &IdvConfig) -> AttemptPolicy {
    AttemptPolicy {
        max_attempts: config.idv_max_attempts,
        window: config.idv_attempt_window,
        strategy: config.window_strategy(),
    }
}

pub(crate) fn str_field<'a>(payload: &'a Value, name: &str) -> Option<&'a str> {
    payload.get(name).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}
