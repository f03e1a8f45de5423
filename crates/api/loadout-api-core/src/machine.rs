//! Layered state-machine documents.
//!
//! A ControllerDoc is the compiler's primary output: an ordered set of layers,
//! each an independent state machine over the shared parameter table. The
//! document is backend-agnostic plain data; a host runtime re-evaluates it on
//! its own fixed tick. Layers generated by the compiler carry an explicit
//! marker so later runs (and removal) can identify them as a pure data
//! predicate rather than by naming conventions.

use serde::{Deserialize, Serialize};

use crate::params::ParamDef;

/// Machine-identifiable tag for generated layers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerMarker {
    Inventory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerDoc {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParamDef>,
    #[serde(default)]
    pub layers: Vec<LayerDoc>,
}

impl ControllerDoc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            layers: Vec::new(),
        }
    }

    pub fn find_parameter(&self, name: &str) -> Option<&ParamDef> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerDoc {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<LayerMarker>,
    /// Name of the state entered when no entry transition matches.
    pub default_state: String,
    #[serde(default)]
    pub entry_transitions: Vec<TransitionDoc>,
    #[serde(default)]
    pub any_state_transitions: Vec<TransitionDoc>,
    pub states: Vec<StateDoc>,
}

impl LayerDoc {
    pub fn state(&self, name: &str) -> Option<&StateDoc> {
        self.states.iter().find(|s| s.name == name)
    }
}

/// One state: an optional motion, the atomic set of channel writes applied on
/// entry, and its outgoing transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDoc {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion: Option<MotionRef>,
    #[serde(default)]
    pub writes: Vec<ParamWrite>,
    #[serde(default)]
    pub transitions: Vec<TransitionDoc>,
}

impl StateDoc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            motion: None,
            writes: Vec::new(),
            transitions: Vec::new(),
        }
    }
}

/// Reference to a motion asset played while a state is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum MotionRef {
    /// Path of a clip asset in the output store.
    Clip(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionDoc {
    pub target: TransitionTarget,
    /// Ordered AND-conditions; an empty list is an unconditional transition.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub has_exit_time: bool,
    #[serde(default)]
    pub exit_time: f32,
    #[serde(default)]
    pub duration: f32,
}

impl TransitionDoc {
    pub fn to_state(name: impl Into<String>) -> Self {
        Self {
            target: TransitionTarget::State(name.into()),
            conditions: Vec::new(),
            has_exit_time: false,
            exit_time: 0.0,
            duration: 0.0,
        }
    }

    pub fn exit() -> Self {
        Self {
            target: TransitionTarget::Exit,
            conditions: Vec::new(),
            has_exit_time: false,
            exit_time: 0.0,
            duration: 0.0,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn after(mut self, exit_time: f32) -> Self {
        self.has_exit_time = true;
        self.exit_time = exit_time;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum TransitionTarget {
    State(String),
    /// Leave the layer's state machine; control re-enters through the entry
    /// transitions (or the default state) on the next evaluation.
    Exit,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub param: String,
    pub test: ConditionTest,
}

impl Condition {
    pub fn int_equals(param: impl Into<String>, value: u8) -> Self {
        Self {
            param: param.into(),
            test: ConditionTest::IntEquals(value),
        }
    }

    pub fn bool_is(param: impl Into<String>, value: bool) -> Self {
        Self {
            param: param.into(),
            test: ConditionTest::BoolIs(value),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ConditionTest {
    IntEquals(u8),
    BoolIs(bool),
}

/// One channel write applied atomically on state entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamWrite {
    pub param: String,
    pub value: WriteValue,
}

impl ParamWrite {
    pub fn int(param: impl Into<String>, value: u8) -> Self {
        Self {
            param: param.into(),
            value: WriteValue::Int(value),
        }
    }

    pub fn bool(param: impl Into<String>, value: bool) -> Self {
        Self {
            param: param.into(),
            value: WriteValue::Bool(value),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum WriteValue {
    Int(u8),
    Bool(bool),
}
