//! Definiciones de flujo incorporadas.
//!
//! `standard` es la variante completa de proofing remoto; el paso `address`
//! ramifica por el método de verificación elegido (teléfono o carta USPS) y
//! ambas ramas convergen en `review`. `usps` queda fuera del grafo cuando
//! el toggle `enable_usps_verification` está apagado (camino de salto).

use std::sync::Arc;

use idv_core::{build_flow_definition, EventSink, FlowDefinition, SessionStore, StepDefinition, StepExecutor,
               StepGraph, StepSpec};

use crate::proofers::mock::{MockFinanceProofer, MockInheritedProofer, MockPhoneProofer, MockResolutionProofer};
use crate::steps::{AddressMethodStep, AgreementStep, FinanceStep, GetStartedStep, PhoneStep, ProfileStep,
                   ReviewStep, SsnStep, UspsStep, VerifyInfoStep, VerifyWaitStep};

pub const STANDARD_FLOW: &str = "standard";
pub const INHERITED_PROOFING_FLOW: &str = "inherited_proofing";

pub fn standard_flow() -> FlowDefinition {
    build_flow_definition(STANDARD_FLOW, vec![
        StepSpec::new("profile"),
        StepSpec::new("ssn").requires(&["profile"]),
        StepSpec::new("finance").requires(&["ssn"]),
        StepSpec::new("address")
            .requires(&["finance"])
            .choice("address_verification_method", &[("phone", "phone"), ("usps", "usps")]),
        StepSpec::new("phone").requires(&["address"]).next("review"),
        StepSpec::new("usps").requires(&["address"]).enabled_by("enable_usps_verification"),
        StepSpec::new("review").requires(&["address"]),
    ])
}

pub fn inherited_proofing_flow() -> FlowDefinition {
    build_flow_definition(INHERITED_PROOFING_FLOW, vec![
        StepSpec::new("get_started"),
        StepSpec::new("agreement").requires(&["get_started"]),
        StepSpec::new("verify_wait").requires(&["agreement"]),
        StepSpec::new("verify_info").requires(&["verify_wait"]),
    ])
}

pub fn default_graph() -> StepGraph {
    StepGraph::new(vec![standard_flow(), inherited_proofing_flow()])
}

pub fn standard_steps() -> Vec<Arc<dyn StepDefinition>> {
    vec![
        Arc::new(ProfileStep),
        Arc::new(SsnStep),
        Arc::new(FinanceStep),
        Arc::new(AddressMethodStep),
        Arc::new(PhoneStep),
        Arc::new(UspsStep),
        Arc::new(ReviewStep),
    ]
}

pub fn inherited_steps() -> Vec<Arc<dyn StepDefinition>> {
    vec![
        Arc::new(GetStartedStep),
        Arc::new(AgreementStep),
        Arc::new(VerifyWaitStep),
        Arc::new(VerifyInfoStep),
    ]
}

/// Registra ambos flujos con los proofers mock (tests y demo).
pub fn register_with_mocks<S, E>(executor: &mut StepExecutor<S, E>)
    where S: SessionStore,
          E: EventSink
{
    for step in standard_steps().into_iter().chain(inherited_steps()) {
        executor.register_step(step);
    }
    executor.register_proofer("profile", Arc::new(MockResolutionProofer));
    executor.register_proofer("finance", Arc::new(MockFinanceProofer));
    executor.register_proofer("phone", Arc::new(MockPhoneProofer));
    executor.register_proofer("verify_wait", Arc::new(MockInheritedProofer));
}
