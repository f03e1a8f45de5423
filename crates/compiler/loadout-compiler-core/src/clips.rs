//! Synthesized visibility clips for object toggles.
//!
//! An object toggle carries no authored animations; it gets a show/hide clip
//! pair animating only the object's active flag. The pair is named after the
//! object's leaf name (`<leaf>_On` / `<leaf>_Off`) and written into the
//! `clips/` directory of the output store.

use loadout_api_core::{Clip, PropertyBinding, PropertyOwner};

/// Leaf segment of a scene path.
pub fn object_leaf(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn visibility_clip_name(object_path: &str, visible: bool) -> String {
    let suffix = if visible { "On" } else { "Off" };
    format!("{}_{suffix}", object_leaf(object_path))
}

pub fn visibility_clip(object_path: &str, visible: bool) -> Clip {
    Clip {
        name: visibility_clip_name(object_path, visible),
        bindings: vec![PropertyBinding {
            owner: PropertyOwner::GameObject,
            property: "is_active".to_string(),
            object: Some(object_path.to_string()),
        }],
    }
}

pub fn clip_asset_path(clip_name: &str) -> String {
    format!("clips/{clip_name}.clip.json")
}
