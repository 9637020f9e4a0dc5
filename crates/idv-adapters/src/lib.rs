//! idv-adapters: pasos concretos de proofing, flujos incorporados y
//! proofers mock deterministas.
//!
//! El motor (`idv-core`) es genérico; este crate aporta las dos variantes
//! de flujo (`standard` e `inherited_proofing`) con sus validadores de
//! formulario y los mocks de vendor para tests y demo.

pub mod flows;
pub mod proofers;
pub mod steps;

pub use flows::{default_graph, inherited_proofing_flow, register_with_mocks, standard_flow,
                INHERITED_PROOFING_FLOW, STANDARD_FLOW};
