//! AttemptLimiter: conteo de intentos por (scope, sujeto) con ventana fija.
//!
//! Semántica fija-con-reset: la ventana se ancla al primer intento y se
//! reinicia por completo al vencer, no desliza. Cada scope usa un contador
//! independiente; un sujeto puede estar bloqueado en un scope y permitido en
//! otro. Los registros sobreviven a los reinicios de `FlowSession` para que
//! un "start over" no borre lockouts.
//!
//! La mutación ocurre dentro del entry de un mapa sharded (`dashmap`), de
//! modo que consultar-e-incrementar es atómico frente a llamadas
//! concurrentes sobre la misma clave. Los registros viven lo que el
//! proceso: no hay sweep de expiración, sólo el reset al vencer la ventana.

mod strategy;

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

pub use strategy::WindowStrategy;

/// Parámetros de un scope de conteo, resueltos desde configuración.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptPolicy {
    pub max_attempts: u32,
    pub window: Duration,
    pub strategy: WindowStrategy,
}

impl AttemptPolicy {
    pub fn fixed(max_attempts: u32, window: Duration) -> Self {
        AttemptPolicy { max_attempts, window, strategy: WindowStrategy::Fixed }
    }
}

/// Decisión del limiter para un intento.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Intento permitido; `count` es el total registrado en la ventana.
    Allowed { count: u32 },
    /// Límite alcanzado; reintentar después de `retry_after`.
    Locked { retry_after: Duration },
}

impl Gate {
    pub fn is_locked(&self) -> bool {
        matches!(self, Gate::Locked { .. })
    }

    /// El más restrictivo de dos gates (mayor `retry_after` si ambos lockean).
    pub fn most_restrictive(self, other: Gate) -> Gate {
        match (self, other) {
            (Gate::Locked { retry_after: a }, Gate::Locked { retry_after: b }) => {
                Gate::Locked { retry_after: a.max(b) }
            }
            (locked @ Gate::Locked { .. }, _) | (_, locked @ Gate::Locked { .. }) => locked,
            (Gate::Allowed { count: a }, Gate::Allowed { count: b }) => Gate::Allowed { count: a.max(b) },
        }
    }
}

struct AttemptRecord {
    count: u32,
    window_started_at: DateTime<Utc>,
    window: Duration,
    lockouts: u32,
    lockout_counted: bool,
}

impl AttemptRecord {
    fn new(now: DateTime<Utc>, window: Duration) -> Self {
        AttemptRecord { count: 0, window_started_at: now, window, lockouts: 0, lockout_counted: false }
    }

    fn expired(&self, now: DateTime<Utc>) -> bool {
        let end = self.window_started_at + chrono::Duration::from_std(self.window).unwrap_or_default();
        now >= end
    }

    fn retry_after(&self, now: DateTime<Utc>) -> Duration {
        let end = self.window_started_at + chrono::Duration::from_std(self.window).unwrap_or_default();
        (end - now).to_std().unwrap_or(Duration::ZERO)
    }
}

#[derive(Default)]
pub struct AttemptLimiter {
    records: DashMap<(String, String), AttemptRecord>,
}

impl AttemptLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consulta e incrementa atómicamente el contador de (scope, sujeto).
    ///
    /// Con la ventana vencida el registro se reinicia; la nueva longitud la
    /// decide la estrategia en función de los lockouts previos.
    pub fn check_and_record(&self, scope: &str, subject_key: &str, policy: &AttemptPolicy) -> Gate {
        self.check_and_record_at(scope, subject_key, policy, Utc::now())
    }

    pub fn check_and_record_at(
        &self,
        scope: &str,
        subject_key: &str,
        policy: &AttemptPolicy,
        now: DateTime<Utc>,
    ) -> Gate {
        let key = (scope.to_string(), subject_key.to_string());
        let mut entry = self.records
                            .entry(key)
                            .or_insert_with(|| AttemptRecord::new(now, policy.strategy.window_for(policy.window, 0)));
        let record = entry.value_mut();

        if record.expired(now) {
            let window = policy.strategy.window_for(policy.window, record.lockouts);
            record.count = 0;
            record.window_started_at = now;
            record.window = window;
            record.lockout_counted = false;
        }

        if record.count >= policy.max_attempts {
            if !record.lockout_counted {
                record.lockouts += 1;
                record.lockout_counted = true;
                // el backoff extiende la ventana vigente al contabilizar
                // el lockout (factor^lockouts, acotado)
                record.window = policy.strategy.window_for(policy.window, record.lockouts);
            }
            return Gate::Locked { retry_after: record.retry_after(now) };
        }

        record.count += 1;
        Gate::Allowed { count: record.count }
    }

    /// Consulta sin registrar. Usada por los gates del executor para decidir
    /// si la acción procede antes de ejecutarla.
    pub fn peek(&self, scope: &str, subject_key: &str, policy: &AttemptPolicy) -> Gate {
        self.peek_at(scope, subject_key, policy, Utc::now())
    }

    pub fn peek_at(&self, scope: &str, subject_key: &str, policy: &AttemptPolicy, now: DateTime<Utc>) -> Gate {
        let key = (scope.to_string(), subject_key.to_string());
        match self.records.get(&key) {
            Some(record) if !record.expired(now) => {
                if record.count >= policy.max_attempts {
                    Gate::Locked { retry_after: record.retry_after(now) }
                } else {
                    Gate::Allowed { count: record.count }
                }
            }
            _ => Gate::Allowed { count: 0 },
        }
    }
}
