//! Master dispatch layer.
//!
//! One shared layer routes every toggle request: an `Idle` trap that remote
//! clients never leave, an optional round-robin synchronization loop over
//! Auto+unsaved toggles, and one On/Off input-state pair per toggle reached
//! through the any-state table. Every state writes its channel updates in a
//! single atomic set; item layers only ever read.

use loadout_api_core::{
    flag_param_name, Condition, LayerDoc, LayerMarker, ParamWrite, StateDoc, TransitionDoc,
    IS_LOCAL_PARAM, SELECTOR_PARAM,
};

use crate::channels::{ChannelEntry, ChannelPlan};
use crate::preset::{SyncMode, Toggle, ToggleTable};

pub const MASTER_LAYER_NAME: &str = "Inventory Master";

pub fn master_layer(table: &ToggleTable<'_>, plan: &ChannelPlan, refresh_rate: f32) -> LayerDoc {
    let mut states: Vec<StateDoc> = Vec::new();

    // Default/entry trap. Local execution immediately exits; remote clients
    // stay here and observe channel values only.
    let mut idle = StateDoc::new("Idle");
    idle.writes.push(ParamWrite::int(SELECTOR_PARAM, 0));
    idle.transitions
        .push(TransitionDoc::exit().when(Condition::bool_is(IS_LOCAL_PARAM, true)));
    states.push(idle);

    // Synchronization loop: a chained pair of states per Auto+unsaved toggle,
    // each pair broadcasting the side currently held by the toggle's flag.
    let mut entry_transitions = Vec::new();
    let mut first_pair: Option<(String, String, String)> = None;
    let mut prev_pair: Option<(usize, usize)> = None;
    for (i, slot) in table.iter().enumerate() {
        let toggle = slot.toggle;
        if toggle.sync != SyncMode::Auto || toggle.saved {
            continue;
        }
        let n = i + 1;
        let flag = flag_param_name(n);
        let entry = &plan.entries[i];

        let mut on = StateDoc::new(format!("Syncing {n}: On"));
        on.writes
            .push(ParamWrite::int(SELECTOR_PARAM, entry.enable_values[0]));
        let mut off = StateDoc::new(format!("Syncing {n}: Off"));
        off.writes
            .push(ParamWrite::int(SELECTOR_PARAM, entry.disable_values[0]));

        let on_idx = states.len();
        states.push(on);
        let off_idx = states.len();
        states.push(off);
        let on_name = states[on_idx].name.clone();
        let off_name = states[off_idx].name.clone();

        match prev_pair {
            Some((prev_on, prev_off)) => {
                for prev in [prev_on, prev_off] {
                    states[prev].transitions.push(
                        TransitionDoc::to_state(&on_name)
                            .when(Condition::bool_is(&flag, true))
                            .after(refresh_rate),
                    );
                    states[prev].transitions.push(
                        TransitionDoc::to_state(&off_name)
                            .when(Condition::bool_is(&flag, false))
                            .after(refresh_rate),
                    );
                }
            }
            None => {
                first_pair = Some((on_name, off_name, flag.clone()));
            }
        }
        prev_pair = Some((on_idx, off_idx));
    }

    // Close the loop: the final pair exits on locality, and entry routes back
    // into the first pair according to its flag.
    if let Some((last_on, last_off)) = prev_pair {
        for idx in [last_on, last_off] {
            states[idx].transitions.push(
                TransitionDoc::exit()
                    .when(Condition::bool_is(IS_LOCAL_PARAM, true))
                    .after(refresh_rate),
            );
        }
    }
    if let Some((on_name, off_name, flag)) = first_pair {
        entry_transitions
            .push(TransitionDoc::to_state(on_name).when(Condition::bool_is(&flag, true)));
        entry_transitions
            .push(TransitionDoc::to_state(off_name).when(Condition::bool_is(&flag, false)));
    }

    // Input-state pairs, dispatched from the any-state table on the toggle's
    // primary selector value.
    let mut any_state_transitions = Vec::new();
    for (i, slot) in table.iter().enumerate() {
        let n = i + 1;
        let flag = flag_param_name(n);
        let entry = &plan.entries[i];

        for enable in [true, false] {
            let side = if enable { "On" } else { "Off" };
            let mut state = StateDoc::new(format!("Toggling {n}: {side}"));
            state.writes = toggle_writes(slot.toggle, entry, &flag, enable);
            state.transitions.push(TransitionDoc::exit().after(1.0));
            let name = state.name.clone();
            states.push(state);

            any_state_transitions.push(
                TransitionDoc::to_state(name)
                    .when(Condition::int_equals(SELECTOR_PARAM, n as u8))
                    .when(Condition::bool_is(&flag, !enable))
                    .when(Condition::bool_is(IS_LOCAL_PARAM, true)),
            );
        }
    }

    LayerDoc {
        name: MASTER_LAYER_NAME.into(),
        marker: Some(LayerMarker::Inventory),
        default_state: "Idle".into(),
        entry_transitions,
        any_state_transitions,
        states,
    }
}

/// The atomic write set of one input state. The selector carries the
/// group-shared value when one exists for this side; toggles whose state
/// rides a boolean (Off-mode and Auto+saved without groups) write the flag
/// directly and park the selector at idle.
fn toggle_writes(toggle: &Toggle, entry: &ChannelEntry, flag: &str, enable: bool) -> Vec<ParamWrite> {
    let (values, has_group) = if enable {
        (&entry.enable_values, !toggle.enable_group.is_empty())
    } else {
        (&entry.disable_values, !toggle.disable_group.is_empty())
    };
    match toggle.sync {
        SyncMode::Off => {
            if has_group {
                vec![ParamWrite::int(SELECTOR_PARAM, values[0])]
            } else {
                vec![
                    ParamWrite::int(SELECTOR_PARAM, 0),
                    ParamWrite::bool(flag, enable),
                ]
            }
        }
        SyncMode::Manual => vec![ParamWrite::int(SELECTOR_PARAM, values[0])],
        SyncMode::Auto => {
            if !toggle.saved && has_group {
                // The sync pair owns index 0; the group extra follows it.
                vec![ParamWrite::int(SELECTOR_PARAM, values[1])]
            } else if toggle.saved && !has_group {
                vec![
                    ParamWrite::int(SELECTOR_PARAM, 0),
                    ParamWrite::bool(flag, enable),
                ]
            } else {
                vec![ParamWrite::int(SELECTOR_PARAM, values[0])]
            }
        }
    }
}
