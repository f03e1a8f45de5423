//! loadout-api-core: shared document model for Loadout (engine-agnostic)
//!
//! This crate defines the data that flows across the compiler boundary: clip
//! descriptors on the way in, and controller / menu / parameter documents on
//! the way out. Everything here is plain serde data with no behavior beyond
//! small helpers; the compiler crate owns all policy.

pub mod clip;
pub mod machine;
pub mod menu;
pub mod params;

pub use clip::{Clip, PropertyBinding, PropertyOwner};
pub use machine::{
    Condition, ConditionTest, ControllerDoc, LayerDoc, LayerMarker, MotionRef, ParamWrite,
    StateDoc, TransitionDoc, TransitionTarget, WriteValue,
};
pub use menu::{MenuControl, MenuDoc, MenuTarget};
pub use params::{
    flag_param_name, is_reserved_param_name, ParamDef, ParamDefault, ParamNamespace, ParamType,
    IS_LOCAL_PARAM, SELECTOR_PARAM,
};
