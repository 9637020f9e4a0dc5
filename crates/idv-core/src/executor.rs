//! StepExecutor: orquestación de un submit de paso.
//!
//! Cadena de gates por submit, en orden: exclusión mutua por sujeto
//! (`Conflict` al perdedor), paso ya completado (`StaleStep`), prerequisitos
//! (`PrerequisiteNotMet`), lockout (scopes de flujo y de paso, gana el más
//! restrictivo), validación (`Invalid`), proofer externo con timeout
//! (`VendorFailure`) y finalmente la transición. Todo fallo registra su
//! intento antes de retornar; ningún intento se pierde en silencio.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use log::{debug, warn};
use serde_json::Value;
use thiserror::Error;

use crate::config::IdvConfig;
use crate::constants::FLOW_SCOPE;
use crate::errors::EngineError;
use crate::event::{subject_ref, EventSink, StepEvent, StepOutcome};
use crate::graph::{Branching, NextStep, StepGraph};
use crate::limiter::{AttemptLimiter, AttemptPolicy, Gate};
use crate::proofer::{ProofResult, Proofer, ProoferError};
use crate::session::{FlowSession, SessionState, SessionStore};
use crate::step::{FieldError, StepDefinition};

/// Política ante una sesión ya en curso al llamar `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Retornar la sesión existente (idempotente).
    Resume,
    /// Fallar con `AlreadyInProgress`.
    Disallow,
}

/// Resultado de un submit que llegó a evaluarse (outcome de usuario).
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// Paso completado; la sesión quedó posicionada en `next_step`.
    Advanced { next_step: String },
    /// Paso final completado; la sesión es terminal.
    Completed,
    /// Payload inválido; el formulario re-renderiza sticky con estos errores.
    Invalid { errors: Vec<FieldError> },
    /// Lockout vigente; el sticky del intento anterior queda intacto.
    Locked { retry_after: Duration },
    /// El proofer externo falló o rechazó; para el sujeto equivale a un
    /// fallo de validación, pero se distingue para observabilidad.
    VendorFailure { reason: String },
}

/// Desvíos recuperables que no llegan a evaluar el paso.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Resubmission de un paso finalizado: los datos verificados no se
    /// alteran retroactivamente. Redirigir hacia adelante.
    #[error("step '{step_id}' is already completed")]
    StaleStep { step_id: String, redirect_to: String },
    /// Navegación fuera de orden. Redirigir al paso correcto.
    #[error("prerequisites not met for step '{step_id}'")]
    PrerequisiteNotMet { step_id: String, redirect_to: String },
    /// Otro submit del mismo sujeto está en vuelo; re-leer estado y
    /// reintentar.
    #[error("concurrent submission in flight")]
    Conflict,
}

pub struct StepExecutor<S, E>
    where S: SessionStore,
          E: EventSink
{
    graph: StepGraph,
    store: S,
    sink: E,
    limiter: AttemptLimiter,
    steps: HashMap<String, Arc<dyn StepDefinition>>,
    proofers: HashMap<String, Arc<dyn Proofer>>,
    // Candados por sujeto. Las entradas viven lo que el proceso; a
    // diferencia del SessionStore no hay TTL que las reclame.
    locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl<S, E> StepExecutor<S, E>
    where S: SessionStore,
          E: EventSink
{
    pub fn new(graph: StepGraph, store: S, sink: E) -> Self {
        StepExecutor {
            graph,
            store,
            sink,
            limiter: AttemptLimiter::new(),
            steps: HashMap::new(),
            proofers: HashMap::new(),
            locks: DashMap::new(),
        }
    }

    pub fn register_step(&mut self, step: Arc<dyn StepDefinition>) {
        self.steps.insert(step.id().to_string(), step);
    }

    pub fn register_proofer(&mut self, step_id: &str, proofer: Arc<dyn Proofer>) {
        self.proofers.insert(step_id.to_string(), proofer);
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn limiter(&self) -> &AttemptLimiter {
        &self.limiter
    }

    /// Crea (o retorna) la sesión del sujeto posicionada en el primer paso
    /// aplicable del flujo.
    pub fn start(
        &self,
        flow: &str,
        subject_key: &str,
        overlap: Overlap,
        config: &IdvConfig,
    ) -> Result<FlowSession, EngineError> {
        if let Some(existing) = self.store.load(subject_key)? {
            if existing.state == SessionState::InProgress {
                // otro flujo en curso nunca se pisa: cancel/start_over primero
                if existing.flow_path != flow {
                    return Err(EngineError::AlreadyInProgress);
                }
                return match overlap {
                    Overlap::Resume => Ok(existing),
                    Overlap::Disallow => Err(EngineError::AlreadyInProgress),
                };
            }
        }
        let skipped = self.graph.skipped_steps(flow, config)?;
        let first = self.graph.first_step(flow, &skipped)?;
        let session = FlowSession::new(flow, &first);
        self.store.save(subject_key, session.clone())?;
        debug!("flow '{}' started for {} at step '{}'", flow, subject_ref(subject_key), first);
        Ok(session)
    }

    /// Evalúa un submit del paso `step_id`. A lo sumo una transición lógica
    /// por llamada concurrente: el perdedor del lock recibe `Conflict` sin
    /// tocar limiter ni sesión.
    pub async fn submit(
        &self,
        subject_key: &str,
        step_id: &str,
        payload: Value,
        config: &IdvConfig,
    ) -> Result<StepResult, SubmitError> {
        let lock = self.session_lock(subject_key);
        let Ok(_guard) = lock.try_lock() else {
            return Err(SubmitError::Conflict);
        };

        let mut session = self.store.load(subject_key)?.ok_or(EngineError::SessionNotFound)?;
        if session.state != SessionState::InProgress {
            return Err(EngineError::FlowNotActive.into());
        }
        if session.is_completed(step_id) {
            return Err(SubmitError::StaleStep {
                step_id: step_id.to_string(),
                redirect_to: session.current_step.clone(),
            });
        }

        let flow = session.flow_path.clone();
        let spec = self.graph.spec(&flow, step_id)?.clone();
        let step = self.steps
                       .get(step_id)
                       .cloned()
                       .ok_or_else(|| EngineError::UnknownStep { flow: flow.clone(), step_id: step_id.to_string() })?;

        let skipped = self.graph.skipped_steps(&flow, config)?;
        if !self.graph
                .is_reachable(&flow, step_id, &session.completed_steps, &skipped, &session.chosen_branches)?
        {
            return Err(SubmitError::PrerequisiteNotMet {
                step_id: step_id.to_string(),
                redirect_to: session.current_step.clone(),
            });
        }

        // Gates de lockout: ambos scopes se consultan sin registrar; el más
        // restrictivo decide. El sticky del intento anterior no se toca.
        let flow_policy = self.flow_policy(config);
        let step_policy = step.policy(config);
        let flow_gate = self.limiter.peek(FLOW_SCOPE, subject_key, &flow_policy);
        let step_gate = self.limiter.peek(step.scope(), subject_key, &step_policy);
        let attempts_so_far = match &step_gate {
            Gate::Allowed { count } => *count,
            Gate::Locked { .. } => step_policy.max_attempts,
        };
        if flow_gate.is_locked() || step_gate.is_locked() {
            // el lockout se contabiliza en el scope que lo impone; con
            // backoff exponencial esto extiende la ventana vigente
            let flow_gate = if flow_gate.is_locked() {
                self.limiter.check_and_record(FLOW_SCOPE, subject_key, &flow_policy)
            } else {
                flow_gate
            };
            let step_gate = if step_gate.is_locked() {
                self.limiter.check_and_record(step.scope(), subject_key, &step_policy)
            } else {
                step_gate
            };
            let retry_after = match flow_gate.most_restrictive(step_gate) {
                Gate::Locked { retry_after } => retry_after,
                Gate::Allowed { .. } => Duration::ZERO,
            };
            warn!("submit denied by lockout: flow '{}' step '{}' subject {}", flow, step_id,
                  subject_ref(subject_key));
            self.emit(&flow, step_id, subject_key, StepOutcome::Locked, attempts_so_far);
            return Ok(StepResult::Locked { retry_after });
        }

        // Validación del payload hacia la forma tipada del paso.
        let output = match step.validate(&payload) {
            Ok(output) => output,
            Err(errors) => {
                let count = self.record_failure(&mut session, subject_key, step.scope(), &flow_policy, &step_policy);
                session.retain_sticky(step_id, payload);
                self.store.save(subject_key, session)?;
                self.emit(&flow, step_id, subject_key, StepOutcome::Invalid, count);
                return Ok(StepResult::Invalid { errors });
            }
        };

        // La rama se resuelve antes del proofing: un discriminante
        // desconocido es payload inválido, no avance.
        let next = self.graph.next_step(&flow, step_id, &payload, &skipped)?;
        if let NextStep::UnknownBranch(token) = next {
            let field = match &spec.branching {
                Branching::Choice { discriminant, .. } => discriminant.clone(),
                Branching::Linear => step_id.to_string(),
            };
            let message = match token {
                Some(token) => format!("unrecognized choice '{}'", token),
                None => "a choice is required".to_string(),
            };
            let count = self.record_failure(&mut session, subject_key, step.scope(), &flow_policy, &step_policy);
            session.retain_sticky(step_id, payload);
            self.store.save(subject_key, session)?;
            self.emit(&flow, step_id, subject_key, StepOutcome::Invalid, count);
            return Ok(StepResult::Invalid { errors: vec![FieldError::new(&field, message)] });
        }

        // Verificación externa con timeout explícito; el resultado nunca
        // queda pendiente.
        let mut merged_pii = output.pii;
        if let Some(request) = &output.proofing {
            let proofer = self.proofers
                              .get(step_id)
                              .cloned()
                              .ok_or_else(|| EngineError::Internal(format!("no proofer registered for step '{}'", step_id)))?;
            let correlation_id = session.correlation_ids.device_session_id;
            let verdict = match tokio::time::timeout(config.proofer_timeout, proofer.verify(request, correlation_id)).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ProoferError::Timeout),
            };
            let rejection = match verdict {
                Ok(ProofResult::Verified { pii }) => {
                    match merged_pii.as_mut() {
                        Some(merged) => merged.merge(pii),
                        None => merged_pii = Some(pii),
                    }
                    None
                }
                Ok(ProofResult::Rejected { reason }) => Some(reason),
                Err(err) => Some(err.to_string()),
            };
            if let Some(reason) = rejection {
                warn!("proofer failure: flow '{}' step '{}': {}", flow, step_id, reason);
                let count = self.record_failure(&mut session, subject_key, step.scope(), &flow_policy, &step_policy);
                session.retain_sticky(step_id, payload);
                self.store.save(subject_key, session)?;
                self.emit(&flow, step_id, subject_key, StepOutcome::VendorFailure, count);
                return Ok(StepResult::VendorFailure { reason });
            }
        }

        // Transición: fusionar PII, finalizar el paso y avanzar.
        if let Some(pii) = merged_pii {
            session.pii.merge(pii);
        }
        if let (Branching::Choice { .. }, NextStep::Step(target)) = (&spec.branching, &next) {
            session.chosen_branches.insert(step_id.to_string(), target.clone());
        }
        session.mark_completed(step_id);
        let result = match next {
            NextStep::Step(next_id) => {
                session.current_step = next_id.clone();
                StepResult::Advanced { next_step: next_id }
            }
            NextStep::End => {
                session.state = SessionState::Completed;
                StepResult::Completed
            }
            NextStep::UnknownBranch(_) => {
                return Err(EngineError::Internal("branch resolution changed mid-submit".to_string()).into());
            }
        };
        self.store.save(subject_key, session)?;
        self.emit(&flow, step_id, subject_key, StepOutcome::Success, attempts_so_far);
        debug!("step '{}' completed for {} -> {:?}", step_id, subject_ref(subject_key), result);
        Ok(result)
    }

    /// Abandona el flujo: limpia el estado mutable de la sesión. Los
    /// registros del AttemptLimiter no se tocan.
    pub fn cancel(&self, subject_key: &str) -> Result<(), EngineError> {
        let mut session = self.store.load(subject_key)?.ok_or(EngineError::SessionNotFound)?;
        session.abandon();
        self.store.save(subject_key, session)?;
        Ok(())
    }

    /// Cancel + start preservando `correlation_ids` (las señales de riesgo
    /// del vendor sobreviven al reinicio).
    pub fn start_over(&self, subject_key: &str, config: &IdvConfig) -> Result<FlowSession, EngineError> {
        let session = self.store.load(subject_key)?.ok_or(EngineError::SessionNotFound)?;
        let skipped = self.graph.skipped_steps(&session.flow_path, config)?;
        let first = self.graph.first_step(&session.flow_path, &skipped)?;
        let fresh = session.restarted(&first);
        self.store.save(subject_key, fresh.clone())?;
        Ok(fresh)
    }

    fn session_lock(&self, subject_key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .entry(subject_key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn flow_policy(&self, config: &IdvConfig) -> AttemptPolicy {
        AttemptPolicy {
            max_attempts: config.idv_max_attempts,
            window: config.idv_attempt_window,
            strategy: config.window_strategy(),
        }
    }

    /// Registra el intento fallido en ambos scopes y marca `attempted_at`.
    /// Retorna el conteo del scope de paso para el evento.
    fn record_failure(
        &self,
        session: &mut FlowSession,
        subject_key: &str,
        step_scope: &str,
        flow_policy: &AttemptPolicy,
        step_policy: &AttemptPolicy,
    ) -> u32 {
        let _ = self.limiter.check_and_record(FLOW_SCOPE, subject_key, flow_policy);
        let gate = self.limiter.check_and_record(step_scope, subject_key, step_policy);
        session.attempted_at = Some(Utc::now());
        match gate {
            Gate::Allowed { count } => count,
            Gate::Locked { .. } => step_policy.max_attempts,
        }
    }

    fn emit(&self, flow: &str, step_id: &str, subject_key: &str, outcome: StepOutcome, count: u32) {
        self.sink.record(StepEvent {
            flow_name: flow.to_string(),
            step_id: step_id.to_string(),
            subject_ref: subject_ref(subject_key),
            outcome,
            attempt_count_in_window: count,
            ts: Utc::now(),
        });
    }
}
