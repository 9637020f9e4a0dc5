//! StepGraph: consultas puras sobre definiciones de flujo.
//!
//! El grafo no guarda estado mutable. Dado un flujo, responde qué paso es
//! alcanzable con el conjunto de completados actual y resuelve el sucesor de
//! un paso (lineal, por rama elegida, o saltando pasos no aplicables por
//! configuración).

mod types;

use std::collections::{HashMap, HashSet};

use serde_json::Value;

pub use types::{build_flow_definition, Branching, FlowDefinition, StepSpec};

use crate::config::IdvConfig;
use crate::errors::EngineError;

/// Resultado de resolver el sucesor de un paso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Step(String),
    /// El paso era el último del flujo.
    End,
    /// Discriminante ausente o sin rama definida; el executor lo trata como
    /// payload inválido.
    UnknownBranch(Option<String>),
}

pub struct StepGraph {
    flows: HashMap<String, FlowDefinition>,
}

impl StepGraph {
    pub fn new(definitions: Vec<FlowDefinition>) -> Self {
        let flows = definitions.into_iter().map(|d| (d.name.clone(), d)).collect();
        StepGraph { flows }
    }

    pub fn definition(&self, flow: &str) -> Result<&FlowDefinition, EngineError> {
        self.flows.get(flow).ok_or_else(|| EngineError::UnknownFlow(flow.to_string()))
    }

    pub fn spec(&self, flow: &str, step_id: &str) -> Result<&StepSpec, EngineError> {
        self.definition(flow)?.spec(step_id).ok_or_else(|| EngineError::UnknownStep {
            flow: flow.to_string(),
            step_id: step_id.to_string(),
        })
    }

    /// Pasos del flujo marcados como no aplicables por el snapshot actual.
    pub fn skipped_steps(&self, flow: &str, config: &IdvConfig) -> Result<HashSet<String>, EngineError> {
        let def = self.definition(flow)?;
        Ok(def.steps
              .iter()
              .filter(|s| s.enabled_by.as_deref().is_some_and(|t| !config.feature_enabled(t)))
              .map(|s| s.id.clone())
              .collect())
    }

    /// Primer paso aplicable del flujo.
    pub fn first_step(&self, flow: &str, skipped: &HashSet<String>) -> Result<String, EngineError> {
        let def = self.definition(flow)?;
        def.steps
           .iter()
           .find(|s| !skipped.contains(&s.id))
           .map(|s| s.id.clone())
           .ok_or_else(|| EngineError::Internal(format!("flow '{}' has no applicable steps", flow)))
    }

    /// `prerequisites ⊆ completed`, donde un prerequisito no aplicable
    /// cuenta como satisfecho (camino de salto).
    ///
    /// Un prerequisito Choice completado además restringe el camino: las
    /// ramas no elegidas quedan cerradas y los pasos posteriores a la
    /// convergencia sólo abren cuando la rama elegida se completó.
    pub fn is_reachable(
        &self,
        flow: &str,
        step_id: &str,
        completed: &indexmap::IndexSet<String>,
        skipped: &HashSet<String>,
        chosen: &HashMap<String, String>,
    ) -> Result<bool, EngineError> {
        let spec = self.spec(flow, step_id)?;
        if !spec.prerequisites.iter().all(|p| completed.contains(p) || skipped.contains(p)) {
            return Ok(false);
        }
        for prereq_id in &spec.prerequisites {
            let prereq = self.spec(flow, prereq_id)?;
            let Branching::Choice { branches, .. } = &prereq.branching else {
                continue;
            };
            if !completed.contains(prereq_id) {
                continue;
            }
            let Some(target) = chosen.get(prereq_id) else {
                continue;
            };
            if branches.values().any(|t| t == &spec.id) {
                // el paso es una rama del Choice: sólo la elegida abre
                if target != &spec.id {
                    return Ok(false);
                }
            } else if !completed.contains(target) && !skipped.contains(target) {
                // convergencia: la rama elegida debe completarse primero
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Resuelve el sucesor de `step_id` de forma determinista.
    ///
    /// Para pasos `Choice` el token se lee del payload enviado; un token
    /// desconocido (o una rama hacia un paso no aplicable) se reporta como
    /// `UnknownBranch` sin avanzar el flujo.
    pub fn next_step(
        &self,
        flow: &str,
        step_id: &str,
        payload: &Value,
        skipped: &HashSet<String>,
    ) -> Result<NextStep, EngineError> {
        let def = self.definition(flow)?;
        let spec = self.spec(flow, step_id)?;

        match &spec.branching {
            Branching::Choice { discriminant, branches } => {
                let token = payload.get(discriminant).and_then(Value::as_str);
                match token.and_then(|t| branches.get(t).map(|s| s.as_str())) {
                    Some(target) if !skipped.contains(target) => Ok(NextStep::Step(target.to_string())),
                    Some(_) | None => Ok(NextStep::UnknownBranch(token.map(|t| t.to_string()))),
                }
            }
            Branching::Linear => {
                if let Some(target) = &spec.next_override {
                    let target_spec = self.spec(flow, target)?;
                    if !skipped.contains(target) {
                        return Ok(NextStep::Step(target.clone()));
                    }
                    return Ok(Self::advance_from(def, target_spec.position, skipped));
                }
                Ok(Self::advance_from(def, spec.position, skipped))
            }
        }
    }

    fn advance_from(def: &FlowDefinition, position: usize, skipped: &HashSet<String>) -> NextStep {
        def.steps
           .iter()
           .skip(position + 1)
           .find(|s| !skipped.contains(&s.id))
           .map(|s| NextStep::Step(s.id.clone()))
           .unwrap_or(NextStep::End)
    }
}
