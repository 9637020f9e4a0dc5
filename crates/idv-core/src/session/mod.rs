//! FlowSession: estado mutable por sujeto de un flujo en curso.
//!
//! Invariantes que el executor mantiene sobre esta estructura:
//! - `completed_steps` es monótono hasta un cancel/start-over explícito.
//! - `current_step` siempre tiene sus prerequisitos dentro de
//!   `completed_steps`.
//! - un paso completado no conserva `step_data` fresco; los datos que pasos
//!   posteriores necesitan viven fusionados en `pii`.

mod store;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use idv_domain::Pii;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use store::{InMemorySessionStore, SessionStore};

/// Máquina de estados de la sesión. `Completed` y `Abandoned` son
/// terminales; `InProgress` se auto-loopea en submissions fallidos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Completed,
    Abandoned,
}

/// Identificadores opacos intercambiados con los proofers externos.
///
/// Se generan una vez por sesión y son estables a través de reintentos;
/// `start_over` los preserva para no perder la correlación de señales de
/// riesgo (device fingerprinting) del lado del vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationIds {
    pub device_session_id: Uuid,
    pub request_id: Uuid,
}

impl CorrelationIds {
    pub fn generate() -> Self {
        CorrelationIds { device_session_id: Uuid::new_v4(), request_id: Uuid::new_v4() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSession {
    /// Variante de flujo activa; inmutable salvo start-over explícito.
    pub flow_path: String,
    pub current_step: String,
    /// Último payload enviado por paso (sólo el intento más reciente).
    /// Mantiene los formularios "sticky" tras un fallo.
    pub step_data: HashMap<String, Value>,
    pub completed_steps: indexmap::IndexSet<String>,
    /// Rama elegida por cada paso Choice completado (paso -> destino). El
    /// grafo la usa para cerrar los caminos no elegidos aguas abajo.
    pub chosen_branches: HashMap<String, String>,
    pub pii: Pii,
    pub correlation_ids: CorrelationIds,
    /// Último intento fallido registrado contra el scope de flujo completo.
    pub attempted_at: Option<DateTime<Utc>>,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
}

impl FlowSession {
    pub fn new(flow_path: &str, first_step: &str) -> Self {
        FlowSession {
            flow_path: flow_path.to_string(),
            current_step: first_step.to_string(),
            step_data: HashMap::new(),
            completed_steps: indexmap::IndexSet::new(),
            chosen_branches: HashMap::new(),
            pii: Pii::default(),
            correlation_ids: CorrelationIds::generate(),
            attempted_at: None,
            state: SessionState::InProgress,
            started_at: Utc::now(),
        }
    }

    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed_steps.contains(step_id)
    }

    /// Finaliza un paso: lo agrega al conjunto monótono y descarta su
    /// payload sticky (los datos validados ya viven en `pii`).
    pub fn mark_completed(&mut self, step_id: &str) {
        self.completed_steps.insert(step_id.to_string());
        self.step_data.remove(step_id);
    }

    /// Retiene el payload del intento fallido para re-render del formulario.
    pub fn retain_sticky(&mut self, step_id: &str, payload: Value) {
        self.step_data.insert(step_id.to_string(), payload);
    }

    /// Descarta todo el estado mutable y marca la sesión abandonada. No toca
    /// los registros del AttemptLimiter (viven fuera de la sesión).
    pub fn abandon(&mut self) {
        self.step_data.clear();
        self.completed_steps.clear();
        self.chosen_branches.clear();
        self.pii.clear();
        self.state = SessionState::Abandoned;
    }

    /// Sesión nueva para el mismo flujo preservando `correlation_ids`.
    pub fn restarted(&self, first_step: &str) -> FlowSession {
        let mut fresh = FlowSession::new(&self.flow_path, first_step);
        fresh.correlation_ids = self.correlation_ids.clone();
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mark_completed_clears_sticky_data() {
        let mut session = FlowSession::new("standard", "ssn");
        session.retain_sticky("ssn", json!({"ssn": "666-66-6666"}));
        assert!(session.step_data.contains_key("ssn"));

        session.mark_completed("ssn");
        assert!(session.is_completed("ssn"));
        assert!(!session.step_data.contains_key("ssn"));
    }

    #[test]
    fn abandon_clears_state_and_is_terminal() {
        let mut session = FlowSession::new("standard", "profile");
        session.mark_completed("profile");
        session.retain_sticky("ssn", json!({"ssn": "123-45-6789"}));
        session.chosen_branches.insert("address".to_string(), "phone".to_string());
        session.abandon();

        assert_eq!(session.state, SessionState::Abandoned);
        assert!(session.completed_steps.is_empty());
        assert!(session.step_data.is_empty());
        assert!(session.chosen_branches.is_empty());
        assert!(session.pii.is_empty());
    }

    #[test]
    fn restarted_preserves_correlation_ids_only() {
        let mut session = FlowSession::new("standard", "profile");
        session.mark_completed("profile");
        let original_ids = session.correlation_ids.clone();

        let fresh = session.restarted("profile");
        assert_eq!(fresh.correlation_ids, original_ids);
        assert!(fresh.completed_steps.is_empty());
        assert_eq!(fresh.current_step, "profile");
        assert_eq!(fresh.state, SessionState::InProgress);
    }
}
