//! Channel planner: assigns selector-channel values to every toggle.
//!
//! Values `1..=n` (one per toggle) are the primary dispatch values consumed
//! by the menu and the master layer's any-state table; everything above `n`
//! is reserved here. Planning runs in two passes: a reservation pass sized by
//! each toggle's sync mode and group lists, then a resolution pass that
//! shares each triggering toggle's value into its group targets. The second
//! pass runs only after all reservations so forward references resolve.

use serde::{Deserialize, Serialize};

use crate::error::{BudgetResource, CompileError, Result};
use crate::preset::{GroupEffect, SyncMode, Toggle, ToggleTable};

/// Selector values routed into one toggle's Off/On states.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub disable_values: Vec<u8>,
    pub enable_values: Vec<u8>,
}

/// The allocation table, one entry per toggle in emission order. Built once
/// per compilation and discarded after the generators consume it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelPlan {
    pub entries: Vec<ChannelEntry>,
    /// Distinct selector values in use, idle value 0 included.
    pub used: u16,
}

pub fn plan(table: &ToggleTable<'_>, ceiling: u16) -> Result<ChannelPlan> {
    let mut next: u32 = table.len() as u32 + 1;
    let mut entries: Vec<(Vec<u32>, Vec<u32>)> = Vec::with_capacity(table.len());

    // Reservation pass.
    for slot in table.iter() {
        let toggle = slot.toggle;
        let mut disable = Vec::new();
        let mut enable = Vec::new();
        match toggle.sync {
            SyncMode::Off => {
                if !toggle.enable_group.is_empty() {
                    enable.push(next);
                    next += 1;
                }
                if !toggle.disable_group.is_empty() {
                    disable.push(next);
                    next += 1;
                }
            }
            SyncMode::Manual => {
                disable.push(next);
                enable.push(next + 1);
                next += 2;
            }
            SyncMode::Auto => {
                if !toggle.saved {
                    disable.push(next);
                    enable.push(next + 1);
                    next += 2;
                }
                if !toggle.enable_group.is_empty() {
                    enable.push(next);
                    next += 1;
                }
                if !toggle.disable_group.is_empty() {
                    disable.push(next);
                    next += 1;
                }
            }
        }
        entries.push((disable, enable));
    }

    let highest = next - 1;
    if highest > u32::from(ceiling) {
        return Err(CompileError::BudgetExceeded {
            resource: BudgetResource::SelectorValues,
            required: highest,
            available: u32::from(ceiling),
        });
    }

    // Resolution pass, in original order, after all reservations.
    for i in 0..table.len() {
        let toggle = table.get(i).toggle;
        for (own, entries_of_side) in [
            (trigger_value(toggle, &entries[i].1), &toggle.enable_group),
            (trigger_value(toggle, &entries[i].0), &toggle.disable_group),
        ] {
            let Some(own) = own else { continue };
            for entry in entries_of_side {
                let target = table.position_of(entry.target).ok_or_else(|| {
                    CompileError::invalid_input(format!(
                        "group entry of toggle '{}' targets a non-toggle",
                        toggle.name
                    ))
                })?;
                let set = match entry.effect {
                    GroupEffect::Disable => &mut entries[target].0,
                    GroupEffect::Enable => &mut entries[target].1,
                };
                if !set.contains(&own) {
                    set.push(own);
                }
            }
        }
    }

    Ok(ChannelPlan {
        entries: entries
            .into_iter()
            .map(|(disable, enable)| ChannelEntry {
                disable_values: disable.into_iter().map(|v| v as u8).collect(),
                enable_values: enable.into_iter().map(|v| v as u8).collect(),
            })
            .collect(),
        used: next as u16,
    })
}

/// The value a toggle broadcasts for one side, shared into its group targets.
/// Off-mode and Auto+saved toggles broadcast their group-reserved value,
/// Manual toggles their own round-trip value, and Auto+unsaved toggles the
/// extra reserved after the sync pair (index 1); the polling value itself
/// must never leak into group targets.
fn trigger_value(toggle: &Toggle, side: &[u32]) -> Option<u32> {
    match toggle.sync {
        SyncMode::Off | SyncMode::Manual => side.first().copied(),
        SyncMode::Auto if toggle.saved => side.first().copied(),
        SyncMode::Auto => side.get(1).copied(),
    }
}
