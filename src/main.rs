//! Demo ejecutable del motor IdV: recorre el flujo estándar con los stores
//! en memoria y los proofers mock, mostrando la cadena de gates por consola.

use idv_adapters::{default_graph, register_with_mocks, STANDARD_FLOW};
use idv_core::{IdvConfig, InMemoryEventSink, InMemorySessionStore, Overlap, StepExecutor, StepResult};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = IdvConfig::from_env();
    let mut executor = StepExecutor::new(default_graph(), InMemorySessionStore::new(), InMemoryEventSink::new());
    register_with_mocks(&mut executor);

    let subject = "demo-subject";
    let session = executor.start(STANDARD_FLOW, subject, Overlap::Resume, &config)?;
    println!("== flow '{}' started at step '{}'", session.flow_path, session.current_step);

    let submissions = vec![
        ("profile", json!({
            "first_name": "Fakey",
            "last_name": "McFakerson",
            "dob": "1938-10-06",
            "address1": "123 Main St",
            "city": "Nowhere",
            "state": "KS",
            "zipcode": "66044",
        })),
        // primer intento con el SSN centinela inválido: formulario sticky
        ("ssn", json!({"ssn": "666-66-6666"})),
        ("ssn", json!({"ssn": "123-45-6789"})),
        ("finance", json!({"finance_type": "ccn", "ccn": "12345678"})),
        ("address", json!({"address_verification_method": "phone"})),
        ("phone", json!({"phone": "415-555-9999"})),
        ("review", json!({"password": "s3cret"})),
    ];

    for (step_id, payload) in submissions {
        let result = executor.submit(subject, step_id, payload, &config).await?;
        match result {
            StepResult::Advanced { next_step } => println!("   step '{}' completed -> '{}'", step_id, next_step),
            StepResult::Completed => println!("== flow completed at step '{}'", step_id),
            StepResult::Invalid { errors } => {
                println!("   step '{}' invalid: {}", step_id, errors[0].message);
            }
            StepResult::Locked { retry_after } => {
                println!("   step '{}' locked, retry after {:?}", step_id, retry_after);
            }
            StepResult::VendorFailure { reason } => println!("   step '{}' vendor failure: {}", step_id, reason),
        }
    }

    println!("\n== emitted events (pseudonymous subject_ref)");
    for event in executor.sink().events() {
        println!("   {} / {} -> {:?} (attempt {})",
                 event.flow_name, event.step_id, event.outcome, event.attempt_count_in_window);
    }

    Ok(())
}
