//! Errores del motor (fallas de sistema y mal uso programático).
//!
//! Los resultados recuperables de cara al usuario (`Invalid`, `Locked`,
//! `VendorFailure`, `StaleStep`, `PrerequisiteNotMet`, `Conflict`) no viven
//! aquí: son datos que el executor devuelve, nunca panics.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Consulta sobre un step que el Flow no define. Error de programación.
    #[error("unknown step '{step_id}' in flow '{flow}'")]
    UnknownStep { flow: String, step_id: String },
    #[error("unknown flow '{0}'")]
    UnknownFlow(String),
    #[error("a flow is already in progress for this subject")]
    AlreadyInProgress,
    #[error("no flow session found for this subject")]
    SessionNotFound,
    #[error("flow session is no longer active")]
    FlowNotActive,
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal: {0}")]
    Internal(String),
}
