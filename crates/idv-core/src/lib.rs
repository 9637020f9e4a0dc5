//! idv-core: motor de flujos de verificación de identidad (IdV).
//!
//! Un wizard server-side con estado: secuencias de pasos ordenadas y
//! ramificables, límites de intentos con lockout por ventana, formularios
//! sticky tras fallo y pasos completados no re-entrantes. El motor es
//! genérico sobre el grafo de pasos inyectado; los pasos concretos y los
//! proofers viven en `idv-adapters`.

pub mod config;
pub mod constants;
pub mod errors;
pub mod event;
pub mod executor;
pub mod graph;
pub mod limiter;
pub mod proofer;
pub mod session;
pub mod step;

pub use config::{ConfigMap, ConfigValue, IdvConfig};
pub use errors::EngineError;
pub use event::{subject_ref, EventSink, InMemoryEventSink, StepEvent, StepOutcome};
pub use executor::{Overlap, StepExecutor, StepResult, SubmitError};
pub use graph::{build_flow_definition, Branching, FlowDefinition, NextStep, StepGraph, StepSpec};
pub use limiter::{AttemptLimiter, AttemptPolicy, Gate, WindowStrategy};
pub use proofer::{ProofRequest, ProofResult, Proofer, ProoferError};
pub use session::{CorrelationIds, FlowSession, InMemorySessionStore, SessionState, SessionStore};
pub use step::{FieldError, StepDefinition, StepOutput};
