use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::FlowSession;
use crate::errors::EngineError;

/// Almacenamiento de sesiones por clave de sujeto autenticado (colaborador
/// externo). El TTL permite reclamar sesiones abandonadas sin intervención.
pub trait SessionStore: Send + Sync {
    fn load(&self, subject_key: &str) -> Result<Option<FlowSession>, EngineError>;
    fn save(&self, subject_key: &str, session: FlowSession) -> Result<(), EngineError>;
    fn delete(&self, subject_key: &str) -> Result<(), EngineError>;
}

struct StoredSession {
    session: FlowSession,
    expires_at: DateTime<Utc>,
}

/// Implementación en memoria con expiración por entrada. Las entradas
/// vencidas se reclaman en el acceso.
pub struct InMemorySessionStore {
    inner: DashMap<String, StoredSession>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(30 * 60))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        InMemorySessionStore { inner: DashMap::new(), ttl }
    }

    fn load_at(&self, subject_key: &str, now: DateTime<Utc>) -> Option<FlowSession> {
        // el guard del get debe soltarse antes de remover (mismo shard)
        let expired = match self.inner.get(subject_key) {
            Some(stored) if now < stored.expires_at => return Some(stored.session.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.inner.remove(subject_key);
        }
        None
    }

    fn save_at(&self, subject_key: &str, session: FlowSession, now: DateTime<Utc>) {
        let expires_at = now + chrono::Duration::from_std(self.ttl).unwrap_or_default();
        self.inner.insert(subject_key.to_string(), StoredSession { session, expires_at });
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, subject_key: &str) -> Result<Option<FlowSession>, EngineError> {
        Ok(self.load_at(subject_key, Utc::now()))
    }

    fn save(&self, subject_key: &str, session: FlowSession) -> Result<(), EngineError> {
        self.save_at(subject_key, session, Utc::now());
        Ok(())
    }

    fn delete(&self, subject_key: &str) -> Result<(), EngineError> {
        self.inner.remove(subject_key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn save_load_delete_round_trip() {
        let store = InMemorySessionStore::new();
        let session = FlowSession::new("standard", "profile");
        store.save("u1", session.clone()).unwrap();

        let loaded = store.load("u1").unwrap().unwrap();
        assert_eq!(loaded.flow_path, "standard");
        assert!(store.load("u2").unwrap().is_none());

        store.delete("u1").unwrap();
        assert!(store.load("u1").unwrap().is_none());
    }

    #[test]
    fn expired_entries_are_reclaimed_on_access() {
        let store = InMemorySessionStore::with_ttl(Duration::from_secs(60));
        let now = t0();
        store.save_at("u1", FlowSession::new("standard", "profile"), now);

        assert!(store.load_at("u1", now + chrono::Duration::seconds(59)).is_some());
        assert!(store.load_at("u1", now + chrono::Duration::seconds(61)).is_none());
        // la entrada vencida fue removida, no sólo ocultada
        assert!(store.inner.get("u1").is_none());
    }

    #[test]
    fn save_refreshes_the_ttl() {
        let store = InMemorySessionStore::with_ttl(Duration::from_secs(60));
        let now = t0();
        store.save_at("u1", FlowSession::new("standard", "profile"), now);
        store.save_at("u1", FlowSession::new("standard", "profile"), now + chrono::Duration::seconds(50));

        assert!(store.load_at("u1", now + chrono::Duration::seconds(100)).is_some());
    }
}
