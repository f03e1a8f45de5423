//! Removal of previously generated artifacts.
//!
//! Detection is a pure data predicate: layers carry the generated-layer
//! marker, parameters match the reserved-name pattern. Nothing else is ever
//! touched, and the rewrite itself is transactional.

use log::{error, info};

use loadout_api_core::{is_reserved_param_name, ControllerDoc, LayerMarker, ParamNamespace};

use crate::compile::PARAMS_ASSET_PATH;
use crate::error::Result;
use crate::store::{get_json, to_json_bytes, AssetStore};
use crate::transaction::Transaction;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RemovalPreview {
    pub layers: Vec<String>,
    pub parameters: Vec<String>,
}

/// What `remove` would take out, without touching the store.
pub fn preview_removal(
    store: &dyn AssetStore,
    controller_path: &str,
    remove_parameters: bool,
) -> Result<RemovalPreview> {
    let Some(controller) = get_json::<ControllerDoc>(store, controller_path)? else {
        return Ok(RemovalPreview::default());
    };
    let layers = controller
        .layers
        .iter()
        .filter(|layer| layer.marker == Some(LayerMarker::Inventory))
        .map(|layer| layer.name.clone())
        .collect();
    let parameters = if remove_parameters {
        controller
            .parameters
            .iter()
            .filter(|param| is_reserved_param_name(&param.name))
            .map(|param| param.name.clone())
            .collect()
    } else {
        Vec::new()
    };
    Ok(RemovalPreview { layers, parameters })
}

/// Strip generated layers (and, optionally, reserved parameters) from the
/// controller and the persisted namespace. Returns what was removed.
pub fn remove(
    store: &mut dyn AssetStore,
    controller_path: &str,
    remove_parameters: bool,
) -> Result<RemovalPreview> {
    let preview = preview_removal(store, controller_path, remove_parameters)?;
    let Some(mut controller) = get_json::<ControllerDoc>(store, controller_path)? else {
        return Ok(preview);
    };

    controller
        .layers
        .retain(|layer| layer.marker != Some(LayerMarker::Inventory));
    if remove_parameters {
        controller
            .parameters
            .retain(|param| !is_reserved_param_name(&param.name));
    }

    let mut txn = Transaction::new();
    let outcome = (|| -> Result<()> {
        txn.write(
            store,
            controller_path,
            to_json_bytes(controller_path, &controller)?,
        )?;
        if remove_parameters {
            if let Some(mut namespace) = get_json::<ParamNamespace>(store, PARAMS_ASSET_PATH)? {
                namespace
                    .parameters
                    .retain(|param| !is_reserved_param_name(&param.name));
                txn.write(
                    store,
                    PARAMS_ASSET_PATH,
                    to_json_bytes(PARAMS_ASSET_PATH, &namespace)?,
                )?;
            }
        }
        Ok(())
    })();

    match outcome {
        Ok(()) => {
            txn.commit();
            info!(
                "removed {} layers and {} parameters",
                preview.layers.len(),
                preview.parameters.len()
            );
            Ok(preview)
        }
        Err(err) => {
            error!("removal failed, rolling back: {err}");
            txn.rollback(store);
            Err(err)
        }
    }
}
