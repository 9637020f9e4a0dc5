//! Definición declarativa de flujos: specs de paso y flujos nombrados.
//!
//! La definición es inmutable una vez construida; el grafo sólo la consulta.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Regla de sucesión de un paso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Branching {
    /// Sucesor único: el siguiente paso en orden de posición.
    Linear,
    /// N ramas conocidas estáticamente, elegidas por un discriminante
    /// presente en el payload del paso.
    Choice {
        discriminant: String,
        /// token de rama -> id del paso destino (orden de declaración estable)
        branches: IndexMap<String, String>,
    },
}

/// Spec estática de un paso dentro de un Flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub id: String,
    /// Posición ordinal dentro del Flow; la asigna `build_flow_definition`.
    pub position: usize,
    /// Pasos que deben estar completos (o no aplicar) antes de entrar aquí.
    pub prerequisites: Vec<String>,
    pub branching: Branching,
    /// Sucesor explícito cuando el orden posicional no aplica (p. ej. las
    /// ramas de un Choice convergen más adelante).
    pub next_override: Option<String>,
    /// Toggle de configuración que habilita el paso; deshabilitado => el
    /// paso no aplica y se inserta un camino de salto sobre él.
    pub enabled_by: Option<String>,
}

impl StepSpec {
    pub fn new(id: &str) -> Self {
        StepSpec {
            id: id.to_string(),
            position: 0,
            prerequisites: Vec::new(),
            branching: Branching::Linear,
            next_override: None,
            enabled_by: None,
        }
    }

    pub fn requires(mut self, prerequisites: &[&str]) -> Self {
        self.prerequisites = prerequisites.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn choice(mut self, discriminant: &str, branches: &[(&str, &str)]) -> Self {
        self.branching = Branching::Choice {
            discriminant: discriminant.to_string(),
            branches: branches.iter().map(|(t, s)| (t.to_string(), s.to_string())).collect(),
        };
        self
    }

    pub fn next(mut self, step_id: &str) -> Self {
        self.next_override = Some(step_id.to_string());
        self
    }

    pub fn enabled_by(mut self, toggle: &str) -> Self {
        self.enabled_by = Some(toggle.to_string());
        self
    }
}

/// Flujo nombrado: secuencia ordenada (y ramificable) de specs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub name: String,
    pub steps: Vec<StepSpec>,
}

impl FlowDefinition {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn spec(&self, step_id: &str) -> Option<&StepSpec> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

/// Construye la definición asignando posiciones según el orden recibido.
pub fn build_flow_definition(name: &str, mut steps: Vec<StepSpec>) -> FlowDefinition {
    for (position, step) in steps.iter_mut().enumerate() {
        step.position = position;
    }
    FlowDefinition { name: name.to_string(), steps }
}
