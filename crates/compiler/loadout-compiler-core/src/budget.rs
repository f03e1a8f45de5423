//! Parameter reconciliation and the persisted-memory budget.
//!
//! Two namespaces are reconciled before anything is emitted: the persisted
//! parameter table (budgeted: bool = 1 unit, int = 8 units, fixed ceiling)
//! and the controller's own parameter list (unbudgeted, but reserved names
//! must carry the expected types). Both checks are pre-flight; a failure here
//! must precede any store write.

use loadout_api_core::{
    flag_param_name, ControllerDoc, ParamDef, ParamNamespace, ParamType, IS_LOCAL_PARAM,
    SELECTOR_PARAM,
};

use crate::compile::{Confirm, ConfirmChoice};
use crate::error::{BudgetResource, CompileError, Result};
use crate::preset::{SyncMode, ToggleTable};

/// Outcome of reconciling the persisted namespace.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamPlan {
    /// The namespace as it will be written on success.
    pub persisted: ParamNamespace,
    /// Names newly introduced by this compilation.
    pub added: Vec<String>,
    /// Pre-existing names deleted by this compilation (stale saved flags).
    pub removed: Vec<String>,
}

/// Whether a toggle keeps its state in a persisted boolean instead of the
/// shared synchronization loop.
fn persists_flag(sync: SyncMode, saved: bool) -> bool {
    sync == SyncMode::Auto && saved
}

/// Default for a controller-level flag: saved toggles start from their
/// persisted value, everything else from the authored initial state.
pub fn flag_default(sync: SyncMode, saved: bool, initial_state: bool) -> bool {
    !persists_flag(sync, saved) && initial_state
}

pub fn reconcile_persisted(
    table: &ToggleTable<'_>,
    existing: &ParamNamespace,
    ceiling: u32,
    auto_overwrite: bool,
    confirm: &mut dyn Confirm,
) -> Result<ParamPlan> {
    let mut persisted = existing.clone();
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut delta: i64 = 0;
    let mut fresh: Vec<ParamDef> = Vec::new();

    match existing.find(SELECTOR_PARAM) {
        None => {
            delta += i64::from(ParamType::Int.cost());
            added.push(SELECTOR_PARAM.to_string());
        }
        Some(p) if p.ty != ParamType::Int => {
            return Err(CompileError::WrongParameterType {
                name: SELECTOR_PARAM.to_string(),
            });
        }
        Some(_) => {
            if !auto_overwrite
                && confirm.confirm(&format!(
                    "persisted parameter \"{SELECTOR_PARAM}\" already exists"
                )) != ConfirmChoice::Overwrite
            {
                return Err(CompileError::UserCancelled);
            }
            persisted.parameters.retain(|p| p.name != SELECTOR_PARAM);
        }
    }
    fresh.push(ParamDef::int(SELECTOR_PARAM, 0));

    for (i, slot) in table.iter().enumerate() {
        let toggle = slot.toggle;
        let name = flag_param_name(i + 1);
        let present = existing.find(&name);

        if persists_flag(toggle.sync, toggle.saved) {
            match present {
                Some(p) if p.ty != ParamType::Bool => {
                    return Err(CompileError::WrongParameterType { name });
                }
                Some(_) => {
                    if !auto_overwrite
                        && confirm
                            .confirm(&format!("persisted parameter \"{name}\" already exists"))
                            != ConfirmChoice::Overwrite
                    {
                        return Err(CompileError::UserCancelled);
                    }
                    persisted.parameters.retain(|p| p.name != name);
                }
                None => {
                    delta += i64::from(ParamType::Bool.cost());
                    added.push(name.clone());
                }
            }
            fresh.push(ParamDef::bool(&name, toggle.initial_state).saved());
        } else if let Some(p) = present {
            // A persisted flag for a toggle that no longer saves its state is
            // stale; delete it rather than leaving dead memory behind.
            if !auto_overwrite
                && confirm.confirm(&format!(
                    "conflicting persisted parameter \"{name}\" exists"
                )) != ConfirmChoice::Overwrite
            {
                return Err(CompileError::UserCancelled);
            }
            delta -= i64::from(p.ty.cost());
            persisted.parameters.retain(|p| p.name != name);
            removed.push(name);
        }
    }

    let required = i64::from(existing.total_cost()) + delta;
    if required > i64::from(ceiling) {
        return Err(CompileError::BudgetExceeded {
            resource: BudgetResource::ParameterMemory,
            required: required as u32,
            available: ceiling,
        });
    }

    persisted.parameters.extend(fresh);
    Ok(ParamPlan {
        persisted,
        added,
        removed,
    })
}

/// Pre-flight type check over the controller's parameter list: every reserved
/// name this compilation will use must already carry the expected type.
pub fn check_controller_params(controller: &ControllerDoc, toggle_count: usize) -> Result<()> {
    for param in &controller.parameters {
        let expected = if param.name == SELECTOR_PARAM {
            Some(ParamType::Int)
        } else if param.name == IS_LOCAL_PARAM {
            Some(ParamType::Bool)
        } else {
            (1..=toggle_count)
                .find(|i| param.name == flag_param_name(*i))
                .map(|_| ParamType::Bool)
        };
        if let Some(expected) = expected {
            if param.ty != expected {
                return Err(CompileError::WrongParameterType {
                    name: param.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Emission-side merge: add any missing reserved parameter and refresh flag
/// defaults. Infallible: type conflicts were rejected pre-flight.
pub fn ensure_controller_params(controller: &mut ControllerDoc, table: &ToggleTable<'_>) {
    for (i, slot) in table.iter().enumerate() {
        let toggle = slot.toggle;
        let name = flag_param_name(i + 1);
        let default = flag_default(toggle.sync, toggle.saved, toggle.initial_state);
        match controller.parameters.iter_mut().find(|p| p.name == name) {
            Some(param) => {
                param.default = loadout_api_core::ParamDefault::Bool(default);
            }
            None => controller.parameters.push(ParamDef::bool(name, default)),
        }
    }
    if controller.find_parameter(SELECTOR_PARAM).is_none() {
        controller.parameters.push(ParamDef::int(SELECTOR_PARAM, 0));
    }
    if controller.find_parameter(IS_LOCAL_PARAM).is_none() {
        controller
            .parameters
            .push(ParamDef::bool(IS_LOCAL_PARAM, false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::AlwaysOverwrite;
    use crate::preset::{Item, Page, Preset, Toggle, ToggleContent};

    fn toggle(name: &str, sync: SyncMode, saved: bool, initial_state: bool) -> Toggle {
        Toggle {
            name: name.into(),
            icon: None,
            content: ToggleContent::Object {
                path: format!("Root/{name}"),
            },
            initial_state,
            sync,
            saved,
            enable_group: Vec::new(),
            disable_group: Vec::new(),
        }
    }

    fn preset_of(toggles: Vec<Toggle>) -> Preset {
        Preset {
            name: "test".into(),
            pages: vec![Page {
                name: "Main".into(),
                icon: None,
                items: toggles.into_iter().map(Item::Toggle).collect(),
            }],
        }
    }

    #[test]
    fn fresh_namespace_gets_selector_and_saved_flags_only() {
        let preset = preset_of(vec![
            toggle("a", SyncMode::Off, false, true),
            toggle("b", SyncMode::Auto, true, true),
        ]);
        let table = ToggleTable::collect(&preset);
        let plan = reconcile_persisted(
            &table,
            &ParamNamespace::default(),
            256,
            false,
            &mut AlwaysOverwrite,
        )
        .expect("plan");

        assert_eq!(plan.added, vec!["Inventory", "Inventory 2"]);
        assert!(plan.removed.is_empty());
        assert_eq!(plan.persisted.total_cost(), 9);
        let flag = plan.persisted.find("Inventory 2").expect("saved flag");
        assert!(flag.saved);
        assert_eq!(flag.ty, ParamType::Bool);
    }

    #[test]
    fn wrong_selector_type_is_fatal() {
        let preset = preset_of(vec![toggle("a", SyncMode::Off, false, false)]);
        let table = ToggleTable::collect(&preset);
        let existing = ParamNamespace {
            parameters: vec![ParamDef::bool(SELECTOR_PARAM, false)],
        };
        assert!(matches!(
            reconcile_persisted(&table, &existing, 256, true, &mut AlwaysOverwrite),
            Err(CompileError::WrongParameterType { name }) if name == "Inventory"
        ));
    }

    #[test]
    fn stale_saved_flag_is_removed() {
        let preset = preset_of(vec![toggle("a", SyncMode::Manual, false, false)]);
        let table = ToggleTable::collect(&preset);
        let existing = ParamNamespace {
            parameters: vec![ParamDef::bool("Inventory 1", true).saved()],
        };
        let plan =
            reconcile_persisted(&table, &existing, 256, true, &mut AlwaysOverwrite).expect("plan");
        assert_eq!(plan.removed, vec!["Inventory 1"]);
        assert!(plan.persisted.find("Inventory 1").is_none());
    }

    #[test]
    fn reused_names_do_not_recost() {
        let preset = preset_of(vec![toggle("a", SyncMode::Auto, true, false)]);
        let table = ToggleTable::collect(&preset);
        let existing = ParamNamespace {
            parameters: vec![
                ParamDef::int(SELECTOR_PARAM, 0),
                ParamDef::bool("Inventory 1", false).saved(),
            ],
        };
        // Existing cost is exactly 9; reuse must fit a ceiling of 9.
        let plan =
            reconcile_persisted(&table, &existing, 9, true, &mut AlwaysOverwrite).expect("plan");
        assert!(plan.added.is_empty());
        assert_eq!(plan.persisted.total_cost(), 9);
    }

    #[test]
    fn cost_overflow_reports_budget() {
        let preset = preset_of(vec![toggle("a", SyncMode::Off, false, false)]);
        let table = ToggleTable::collect(&preset);
        let err = reconcile_persisted(&table, &ParamNamespace::default(), 4, true, &mut AlwaysOverwrite)
            .unwrap_err();
        match err {
            CompileError::BudgetExceeded {
                resource,
                required,
                available,
            } => {
                assert_eq!(resource, BudgetResource::ParameterMemory);
                assert_eq!(required, 8);
                assert_eq!(available, 4);
            }
            other => panic!("expected BudgetExceeded, got {other:?}"),
        }
    }

    #[test]
    fn cancelling_an_overwrite_prompt_aborts() {
        let preset = preset_of(vec![toggle("a", SyncMode::Off, false, false)]);
        let table = ToggleTable::collect(&preset);
        let existing = ParamNamespace {
            parameters: vec![ParamDef::int(SELECTOR_PARAM, 0)],
        };
        let mut cancel = |_: &str| ConfirmChoice::Cancel;
        assert!(matches!(
            reconcile_persisted(&table, &existing, 256, false, &mut cancel),
            Err(CompileError::UserCancelled)
        ));
    }

    #[test]
    fn controller_type_check_covers_reserved_names() {
        let preset = preset_of(vec![toggle("a", SyncMode::Off, false, false)]);
        let table = ToggleTable::collect(&preset);

        let mut controller = ControllerDoc::new("fx");
        controller.parameters.push(ParamDef::int("Inventory 1", 0));
        assert!(matches!(
            check_controller_params(&controller, table.len()),
            Err(CompileError::WrongParameterType { name }) if name == "Inventory 1"
        ));

        // A name beyond the toggle count is not reserved for this run.
        let mut other = ControllerDoc::new("fx");
        other.parameters.push(ParamDef::int("Inventory 7", 0));
        assert!(check_controller_params(&other, table.len()).is_ok());
    }

    #[test]
    fn ensure_controller_params_sets_flag_defaults() {
        let preset = preset_of(vec![
            toggle("a", SyncMode::Off, false, true),
            toggle("b", SyncMode::Auto, true, true),
        ]);
        let table = ToggleTable::collect(&preset);
        let mut controller = ControllerDoc::new("fx");
        ensure_controller_params(&mut controller, &table);

        // Unsaved toggle keeps its authored initial state; the saved one
        // defers to its persisted flag.
        let a = controller.find_parameter("Inventory 1").expect("flag 1");
        assert_eq!(a.default, loadout_api_core::ParamDefault::Bool(true));
        let b = controller.find_parameter("Inventory 2").expect("flag 2");
        assert_eq!(b.default, loadout_api_core::ParamDefault::Bool(false));
        assert!(controller.find_parameter(SELECTOR_PARAM).is_some());
        assert!(controller.find_parameter(IS_LOCAL_PARAM).is_some());
    }
}
