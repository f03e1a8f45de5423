//! Compilation pipeline.
//!
//! Stages run strictly in order (validation, compatibility, parameter
//! reconciliation, channel planning) and only then does the single output
//! transaction begin. Pre-flight failures never touch the store; failures
//! inside the transaction roll back to the byte-for-byte pre-compilation
//! state before surfacing.

use log::{debug, error, info};

use loadout_api_core::{ControllerDoc, LayerMarker, ParamNamespace};

use crate::budget::{check_controller_params, ensure_controller_params, reconcile_persisted};
use crate::channels::{self, ChannelPlan};
use crate::clips::{clip_asset_path, visibility_clip};
use crate::compat::{check_clip, BindingRestriction};
use crate::error::{CompileError, Result};
use crate::item_layers::item_layers;
use crate::master::master_layer;
use crate::menus::assemble;
use crate::naming::resolve_layer_names;
use crate::preset::{Preset, ToggleContent, ToggleTable};
use crate::store::{get_json, to_json_bytes, AssetStore};
use crate::transaction::Transaction;

/// Asset path of the persisted parameter namespace.
pub const PARAMS_ASSET_PATH: &str = "parameters.json";

pub fn controller_asset_path(preset_name: &str) -> String {
    format!("animators/{preset_name}.controller.json")
}

#[derive(Copy, Clone, Debug)]
pub struct CompileOptions {
    /// Ceiling on persisted-parameter memory cost.
    pub param_cost_ceiling: u32,
    /// Ceiling on distinct nonzero selector values.
    pub selector_ceiling: u16,
    /// Exit-time period of the synchronization loop.
    pub refresh_rate: f32,
    /// Answer every destructive prompt with Overwrite.
    pub auto_overwrite: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            param_cost_ceiling: 256,
            selector_ceiling: 255,
            refresh_rate: 0.05,
            auto_overwrite: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfirmChoice {
    Overwrite,
    Cancel,
    Skip,
}

/// Synchronous confirmation callback for destructive operations, injected by
/// the host. The description names the artifact at stake.
pub trait Confirm {
    fn confirm(&mut self, description: &str) -> ConfirmChoice;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> ConfirmChoice,
{
    fn confirm(&mut self, description: &str) -> ConfirmChoice {
        self(description)
    }
}

/// Answers every prompt with [`ConfirmChoice::Overwrite`].
pub struct AlwaysOverwrite;

impl Confirm for AlwaysOverwrite {
    fn confirm(&mut self, _description: &str) -> ConfirmChoice {
        ConfirmChoice::Overwrite
    }
}

/// What a successful compilation produced, by persisted identity.
#[derive(Clone, Debug)]
pub struct CompiledInventory {
    pub controller_path: String,
    /// The first page's menu: the tree's attachment point for a host menu.
    pub root_menu_path: String,
    pub menu_paths: Vec<String>,
    pub layers_added: Vec<String>,
    /// Names newly added to the persisted parameter namespace.
    pub parameters_added: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Compiler {
    pub options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn compile(
        &self,
        preset: &Preset,
        store: &mut dyn AssetStore,
        confirm: &mut dyn Confirm,
    ) -> Result<CompiledInventory> {
        preset.validate()?;
        let table = ToggleTable::collect(preset);
        debug!(
            "compiling preset '{}': {} pages, {} toggles",
            preset.name,
            preset.pages.len(),
            table.len()
        );

        // Compatibility gate: toggle clips may not animate movement bindings.
        for slot in table.iter() {
            if let Some((enable, disable)) = slot.toggle.clips() {
                check_clip(enable, BindingRestriction::NoMovement)?;
                check_clip(disable, BindingRestriction::NoMovement)?;
            }
        }

        // Pre-flight reads.
        let existing_namespace: ParamNamespace =
            get_json(store, PARAMS_ASSET_PATH)?.unwrap_or_default();
        let controller_path = controller_asset_path(&preset.name);
        let existing_controller: Option<ControllerDoc> = get_json(store, &controller_path)?;
        if let Some(controller) = &existing_controller {
            check_controller_params(controller, table.len())?;
        }

        // Budgets: persisted memory first, then the selector channel.
        let param_plan = reconcile_persisted(
            &table,
            &existing_namespace,
            self.options.param_cost_ceiling,
            self.options.auto_overwrite,
            confirm,
        )?;
        let plan = channels::plan(&table, self.options.selector_ceiling)?;
        info!(
            "allocation for '{}' fits: {} selector values, {} persisted units",
            preset.name,
            plan.used,
            param_plan.persisted.total_cost()
        );

        let mut txn = Transaction::new();
        let emitted = self.emit(
            preset,
            &table,
            &plan,
            &param_plan.persisted,
            param_plan.added.clone(),
            existing_controller,
            &controller_path,
            store,
            &mut txn,
            confirm,
        );
        match emitted {
            Ok(result) => {
                txn.commit();
                info!(
                    "compiled '{}': {} layers, {} menus",
                    preset.name,
                    result.layers_added.len(),
                    result.menu_paths.len()
                );
                Ok(result)
            }
            Err(err) => {
                error!("compilation of '{}' failed, rolling back: {err}", preset.name);
                txn.rollback(store);
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        preset: &Preset,
        table: &ToggleTable<'_>,
        plan: &ChannelPlan,
        persisted: &ParamNamespace,
        parameters_added: Vec<String>,
        existing_controller: Option<ControllerDoc>,
        controller_path: &str,
        store: &mut dyn AssetStore,
        txn: &mut Transaction,
        confirm: &mut dyn Confirm,
    ) -> Result<CompiledInventory> {
        // Synthesized show/hide clips for object toggles.
        for slot in table.iter() {
            if let ToggleContent::Object { path } = &slot.toggle.content {
                for visible in [true, false] {
                    let clip = visibility_clip(path, visible);
                    let asset = clip_asset_path(&clip.name);
                    if !self.overwrite_allowed(store, &asset, confirm)? {
                        continue;
                    }
                    txn.write(store, &asset, to_json_bytes(&asset, &clip)?)?;
                }
            }
        }

        // Controller: strip previously generated layers, merge parameters,
        // append the fresh master and item layers.
        let mut controller =
            existing_controller.unwrap_or_else(|| ControllerDoc::new(preset.name.clone()));
        controller
            .layers
            .retain(|layer| layer.marker != Some(LayerMarker::Inventory));
        ensure_controller_params(&mut controller, table);

        let names = resolve_layer_names(preset, table);
        let master = master_layer(table, plan, self.options.refresh_rate);
        let mut layers_added = vec![master.name.clone()];
        layers_added.extend(names.iter().cloned());
        controller.layers.push(master);
        controller.layers.extend(item_layers(table, plan, &names));
        txn.write(
            store,
            controller_path,
            to_json_bytes(controller_path, &controller)?,
        )?;

        // Menus.
        let menus = assemble(preset, table);
        let menu_paths: Vec<String> = menus.iter().map(|(path, _)| path.clone()).collect();
        for (path, doc) in &menus {
            if !self.overwrite_allowed(store, path, confirm)? {
                continue;
            }
            txn.write(store, path, to_json_bytes(path, doc)?)?;
        }

        // Persisted parameter namespace, rewritten as a whole.
        txn.write(
            store,
            PARAMS_ASSET_PATH,
            to_json_bytes(PARAMS_ASSET_PATH, persisted)?,
        )?;

        Ok(CompiledInventory {
            controller_path: controller_path.to_string(),
            root_menu_path: menu_paths[0].clone(),
            menu_paths,
            layers_added,
            parameters_added,
        })
    }

    /// Whether a write to `path` may proceed: true to (over)write, false to
    /// skip the asset, `UserCancelled` to abort the compilation.
    fn overwrite_allowed(
        &self,
        store: &dyn AssetStore,
        path: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<bool> {
        if !store.exists(path) || self.options.auto_overwrite {
            return Ok(true);
        }
        match confirm.confirm(&format!("asset '{path}' already exists")) {
            ConfirmChoice::Overwrite => Ok(true),
            ConfirmChoice::Skip => Ok(false),
            ConfirmChoice::Cancel => Err(CompileError::UserCancelled),
        }
    }
}
