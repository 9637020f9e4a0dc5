//! Constantes del motor.

/// Scope del contador de intentos a nivel de flujo completo. Los scopes por
/// paso los declara cada `StepDefinition`; éste es el único que el executor
/// consulta siempre.
pub const FLOW_SCOPE: &str = "idv_flow";
