use std::sync::Mutex;

use super::StepEvent;

/// Destino de eventos de transición (colaborador externo).
pub trait EventSink: Send + Sync {
    fn record(&self, event: StepEvent);
}

/// Sink en memoria para tests y el binario de demostración.
#[derive(Default)]
pub struct InMemoryEventSink {
    inner: Mutex<Vec<StepEvent>>,
}

impl InMemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StepEvent> {
        self.inner.lock().expect("event sink poisoned").clone()
    }

    pub fn events_for_step(&self, step_id: &str) -> Vec<StepEvent> {
        self.events().into_iter().filter(|e| e.step_id == step_id).collect()
    }
}

impl EventSink for InMemoryEventSink {
    fn record(&self, event: StepEvent) {
        self.inner.lock().expect("event sink poisoned").push(event);
    }
}
