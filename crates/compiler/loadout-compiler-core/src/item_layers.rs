//! Per-toggle reactive layers.
//!
//! Each toggle gets an independent layer with Off/On/Idle states. Idle is the
//! default and resolves the current state from the toggle's flag without
//! waiting for a master-layer broadcast, which is what lets a newly-joining
//! observer catch up immediately. Item layers are pure readers of the control
//! channels; the master layer is the only writer.

use loadout_api_core::{
    flag_param_name, Condition, LayerDoc, LayerMarker, MotionRef, StateDoc, TransitionDoc,
    IS_LOCAL_PARAM, SELECTOR_PARAM,
};

use crate::channels::{ChannelEntry, ChannelPlan};
use crate::clips::visibility_clip_name;
use crate::preset::{SyncMode, Toggle, ToggleContent, ToggleTable};

pub fn item_layers(table: &ToggleTable<'_>, plan: &ChannelPlan, names: &[String]) -> Vec<LayerDoc> {
    table
        .iter()
        .enumerate()
        .map(|(i, slot)| item_layer(slot.toggle, i, &plan.entries[i], names[i].clone()))
        .collect()
}

fn item_layer(toggle: &Toggle, index: usize, entry: &ChannelEntry, name: String) -> LayerDoc {
    let flag = flag_param_name(index + 1);
    // Off-mode values are purely local; remote observers must ignore them.
    let local_only = toggle.sync == SyncMode::Off;
    // Toggles without a round trip through the selector react to their flag
    // directly.
    let flag_reactive = local_only || (toggle.sync == SyncMode::Auto && toggle.saved);
    let (enable_clip, disable_clip) = clip_names(toggle);

    let mut any_state_transitions = Vec::new();
    for &value in &entry.disable_values {
        any_state_transitions.push(with_local_guard(
            TransitionDoc::to_state("Off").when(Condition::int_equals(SELECTOR_PARAM, value)),
            local_only,
        ));
    }
    if flag_reactive {
        any_state_transitions.push(with_local_guard(
            TransitionDoc::to_state("Off").when(Condition::bool_is(&flag, false)),
            local_only,
        ));
    }
    for &value in &entry.enable_values {
        any_state_transitions.push(with_local_guard(
            TransitionDoc::to_state("On").when(Condition::int_equals(SELECTOR_PARAM, value)),
            local_only,
        ));
    }
    if flag_reactive {
        any_state_transitions.push(with_local_guard(
            TransitionDoc::to_state("On").when(Condition::bool_is(&flag, true)),
            local_only,
        ));
    }

    let mut off = StateDoc::new("Off");
    off.motion = Some(MotionRef::Clip(disable_clip.clone()));
    let mut on = StateDoc::new("On");
    on.motion = Some(MotionRef::Clip(enable_clip.clone()));

    let mut idle = StateDoc::new("Idle");
    idle.motion = Some(MotionRef::Clip(if toggle.initial_state {
        enable_clip
    } else {
        disable_clip
    }));
    idle.transitions
        .push(TransitionDoc::to_state("Off").when(Condition::bool_is(&flag, false)));
    idle.transitions
        .push(TransitionDoc::to_state("On").when(Condition::bool_is(&flag, true)));

    LayerDoc {
        name,
        marker: Some(LayerMarker::Inventory),
        default_state: "Idle".into(),
        entry_transitions: Vec::new(),
        any_state_transitions,
        states: vec![off, on, idle],
    }
}

fn with_local_guard(transition: TransitionDoc, local_only: bool) -> TransitionDoc {
    if local_only {
        transition.when(Condition::bool_is(IS_LOCAL_PARAM, true))
    } else {
        transition
    }
}

fn clip_names(toggle: &Toggle) -> (String, String) {
    match &toggle.content {
        ToggleContent::Clips { enable, disable } => (enable.name.clone(), disable.name.clone()),
        ToggleContent::Object { path } => (
            visibility_clip_name(path, true),
            visibility_clip_name(path, false),
        ),
    }
}
