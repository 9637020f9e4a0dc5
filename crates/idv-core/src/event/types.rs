//! Tipos de evento de transición de paso.
//!
//! Cada `submit` emite exactamente un `StepEvent` hacia el `EventSink`
//! (analítica/auditoría). El evento nunca lleva PII ni la clave de sujeto en
//! claro: `subject_ref` es un digest pseudónimo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resultado observable de una transición.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Success,
    Invalid,
    Locked,
    VendorFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub flow_name: String,
    pub step_id: String,
    /// Digest pseudónimo de la clave de sujeto (ver [`subject_ref`]).
    pub subject_ref: String,
    pub outcome: StepOutcome,
    pub attempt_count_in_window: u32,
    pub ts: DateTime<Utc>,
}

/// Deriva la referencia pseudónima de un sujeto. Estable por clave, no
/// reversible desde el evento.
pub fn subject_ref(subject_key: &str) -> String {
    let digest = blake3::hash(subject_key.as_bytes());
    digest.to_hex()[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_ref_is_stable_and_opaque() {
        let a = subject_ref("user-1");
        let b = subject_ref("user-1");
        let c = subject_ref("user-2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
        assert!(!a.contains("user"));
    }
}
