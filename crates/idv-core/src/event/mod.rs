mod sink;
mod types;

pub use sink::{EventSink, InMemoryEventSink};
pub use types::{subject_ref, StepEvent, StepOutcome};
