//! Menu documents.
//!
//! One MenuDoc per preset page. Submenu controls reference other menus by
//! persisted asset path, never by transient in-memory handle, so the tree
//! survives a reload of the output store.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuDoc {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub controls: Vec<MenuControl>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MenuControl {
    /// Writes `value` into the bound parameter while held/selected.
    Toggle {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        parameter: String,
        value: u8,
    },
    Submenu {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        target: MenuTarget,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum MenuTarget {
    /// Asset path of another generated menu document.
    Asset(String),
    /// Handle of an externally supplied menu, embedded unchanged.
    External(String),
}
