//! Snapshot de configuración inyectado en cada operación del executor.
//!
//! El registro externo entrega un mapa plano nombre -> valor tipado
//! (`ConfigMap`); `IdvConfig::resolve` lo convierte en un snapshot tipado con
//! defaults. El motor no valida el esquema: nombres desconocidos se ignoran y
//! nombres ausentes caen al default. Nada de estado global mutable — el
//! snapshot viaja como argumento.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Valor tipado del registro de configuración.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Json(serde_json::Value),
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ConfigValue::Int(i) => u32::try_from(*i).ok(),
            ConfigValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Int(i) => Some(*i as f64),
            ConfigValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }
}

pub type ConfigMap = HashMap<String, ConfigValue>;

/// Snapshot tipado de los tunables que el motor consulta.
///
/// Los nombres siguen el registro original (`idv_max_attempts`,
/// `proof_ssn_max_attempt_window_in_minutes`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct IdvConfig {
    pub idv_max_attempts: u32,
    pub idv_attempt_window: Duration,
    pub proof_ssn_max_attempts: u32,
    pub proof_ssn_window: Duration,
    pub proof_address_max_attempts: u32,
    pub proof_address_window: Duration,
    pub phone_confirmation_max_attempts: u32,
    pub phone_confirmation_window: Duration,
    /// Factor > 1.0 activa la estrategia de ventana exponencial.
    pub attempt_window_exponential_factor: f64,
    pub attempt_window_max: Duration,
    pub proofer_timeout: Duration,
    pub enable_usps_verification: bool,
    pub proofer_mock_fallback: bool,
    pub session_ttl: Duration,
}

impl Default for IdvConfig {
    fn default() -> Self {
        IdvConfig {
            idv_max_attempts: 3,
            idv_attempt_window: Duration::from_secs(24 * 60 * 60),
            proof_ssn_max_attempts: 5,
            proof_ssn_window: Duration::from_secs(60 * 60),
            proof_address_max_attempts: 5,
            proof_address_window: Duration::from_secs(6 * 60 * 60),
            phone_confirmation_max_attempts: 5,
            phone_confirmation_window: Duration::from_secs(10 * 60),
            attempt_window_exponential_factor: 1.0,
            attempt_window_max: Duration::from_secs(12 * 60 * 60),
            proofer_timeout: Duration::from_secs(10),
            enable_usps_verification: true,
            proofer_mock_fallback: false,
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl IdvConfig {
    /// Resuelve el snapshot desde un mapa plano. Claves ausentes -> default;
    /// claves con tipo inesperado se ignoran.
    pub fn resolve(map: &ConfigMap) -> Self {
        let d = IdvConfig::default();
        let u32_of = |key: &str, fallback: u32| map.get(key).and_then(ConfigValue::as_u32).unwrap_or(fallback);
        let bool_of = |key: &str, fallback: bool| map.get(key).and_then(ConfigValue::as_bool).unwrap_or(fallback);
        let f64_of = |key: &str, fallback: f64| map.get(key).and_then(ConfigValue::as_f64).unwrap_or(fallback);
        let minutes_of = |key: &str, fallback: Duration| {
            map.get(key)
               .and_then(ConfigValue::as_u32)
               .map(|m| Duration::from_secs(u64::from(m) * 60))
               .unwrap_or(fallback)
        };

        IdvConfig {
            idv_max_attempts: u32_of("idv_max_attempts", d.idv_max_attempts),
            idv_attempt_window: map.get("idv_attempt_window_in_hours")
                                   .and_then(ConfigValue::as_u32)
                                   .map(|h| Duration::from_secs(u64::from(h) * 60 * 60))
                                   .unwrap_or(d.idv_attempt_window),
            proof_ssn_max_attempts: u32_of("proof_ssn_max_attempts", d.proof_ssn_max_attempts),
            proof_ssn_window: minutes_of("proof_ssn_max_attempt_window_in_minutes", d.proof_ssn_window),
            proof_address_max_attempts: u32_of("proof_address_max_attempts", d.proof_address_max_attempts),
            proof_address_window: minutes_of("proof_address_max_attempt_window_in_minutes", d.proof_address_window),
            phone_confirmation_max_attempts: u32_of("phone_confirmation_max_attempts",
                                                    d.phone_confirmation_max_attempts),
            phone_confirmation_window: minutes_of("phone_confirmation_max_attempt_window_in_minutes",
                                                  d.phone_confirmation_window),
            attempt_window_exponential_factor: f64_of("attempt_window_exponential_factor",
                                                      d.attempt_window_exponential_factor),
            attempt_window_max: minutes_of("attempt_window_max_minutes", d.attempt_window_max),
            proofer_timeout: map.get("proofer_timeout_in_seconds")
                                .and_then(ConfigValue::as_u32)
                                .map(|s| Duration::from_secs(u64::from(s)))
                                .unwrap_or(d.proofer_timeout),
            enable_usps_verification: bool_of("enable_usps_verification", d.enable_usps_verification),
            proofer_mock_fallback: bool_of("proofer_mock_fallback", d.proofer_mock_fallback),
            session_ttl: minutes_of("session_ttl_in_minutes", d.session_ttl),
        }
    }

    /// Carga desde variables de entorno `IDV_*` (vía .env si existe).
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let mut map = ConfigMap::new();
        for (key, value) in env::vars() {
            if let Some(name) = key.strip_prefix("IDV_") {
                map.insert(name.to_ascii_lowercase(), ConfigValue::Str(value));
            }
        }
        IdvConfig::resolve(&map)
    }

    /// Estrategia de ventana del limiter según el snapshot: un factor > 1.0
    /// activa el backoff exponencial acotado por `attempt_window_max`.
    pub fn window_strategy(&self) -> crate::limiter::WindowStrategy {
        if self.attempt_window_exponential_factor > 1.0 {
            crate::limiter::WindowStrategy::ExponentialBackoff {
                factor: self.attempt_window_exponential_factor,
                max_window: self.attempt_window_max,
            }
        } else {
            crate::limiter::WindowStrategy::Fixed
        }
    }

    /// Consulta de toggles por nombre, usada por el grafo para decidir pasos
    /// no aplicables. Toggles desconocidos se consideran habilitados.
    pub fn feature_enabled(&self, name: &str) -> bool {
        match name {
            "enable_usps_verification" => self.enable_usps_verification,
            "proofer_mock_fallback" => self.proofer_mock_fallback,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_defaults() {
        let cfg = IdvConfig::resolve(&ConfigMap::new());
        assert_eq!(cfg, IdvConfig::default());
    }

    #[test]
    fn resolve_reads_typed_values() {
        let mut map = ConfigMap::new();
        map.insert("idv_max_attempts".to_string(), ConfigValue::Int(5));
        map.insert("idv_attempt_window_in_hours".to_string(), ConfigValue::Int(48));
        map.insert("attempt_window_exponential_factor".to_string(), ConfigValue::Float(2.0));
        map.insert("enable_usps_verification".to_string(), ConfigValue::Bool(false));

        let cfg = IdvConfig::resolve(&map);
        assert_eq!(cfg.idv_max_attempts, 5);
        assert_eq!(cfg.idv_attempt_window, Duration::from_secs(48 * 60 * 60));
        assert_eq!(cfg.attempt_window_exponential_factor, 2.0);
        assert!(!cfg.enable_usps_verification);
        assert!(!cfg.feature_enabled("enable_usps_verification"));
    }

    #[test]
    fn resolve_ignores_mistyped_and_unknown_keys() {
        let mut map = ConfigMap::new();
        map.insert("idv_max_attempts".to_string(), ConfigValue::Bool(true));
        map.insert("totally_unknown_setting".to_string(), ConfigValue::Int(9));

        let cfg = IdvConfig::resolve(&map);
        assert_eq!(cfg.idv_max_attempts, IdvConfig::default().idv_max_attempts);
    }

    #[test]
    fn string_values_coerce_like_env_vars() {
        let mut map = ConfigMap::new();
        map.insert("idv_max_attempts".to_string(), ConfigValue::Str("7".to_string()));
        map.insert("enable_usps_verification".to_string(), ConfigValue::Str("false".to_string()));

        let cfg = IdvConfig::resolve(&map);
        assert_eq!(cfg.idv_max_attempts, 7);
        assert!(!cfg.enable_usps_verification);
    }
}
