//! Preset model: the compiler's input tree.
//!
//! A preset is an ordered sequence of pages; a page is an ordered sequence of
//! items; the interesting item kind is the toggle. Presets are read-only
//! during compilation: validation happens once up front, and the generators
//! consume the flattened [`ToggleTable`] afterwards.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use loadout_api_core::Clip;

use crate::error::{CompileError, Result};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Toggle(Toggle),
    /// Link to another page of the same preset, by page index.
    PageLink { page: usize },
    /// Externally supplied menu, embedded unchanged.
    Submenu {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        menu: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Toggle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub content: ToggleContent,
    #[serde(default)]
    pub initial_state: bool,
    #[serde(default)]
    pub sync: SyncMode,
    /// Only meaningful under [`SyncMode::Auto`].
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub enable_group: Vec<GroupEntry>,
    #[serde(default)]
    pub disable_group: Vec<GroupEntry>,
}

impl Toggle {
    /// Clip pair for compatibility checking; `None` for object toggles,
    /// whose show/hide clips are synthesized and trivially compatible.
    pub fn clips(&self) -> Option<(&Clip, &Clip)> {
        match &self.content {
            ToggleContent::Clips { enable, disable } => Some((enable, disable)),
            ToggleContent::Object { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ToggleContent {
    Clips { enable: Clip, disable: Clip },
    /// Scene-object reference, rendered as a synthesized show/hide clip pair.
    Object { path: String },
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Broadcast once when toggled; remote observers keep the last value.
    #[default]
    Off,
    /// Deterministically round-tripped through the selector channel.
    Manual,
    /// Continuously polled by the synchronization loop (unless saved).
    Auto,
}

/// Address of an item inside the preset tree.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub page: usize,
    pub item: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub target: ItemRef,
    pub effect: GroupEffect,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupEffect {
    Enable,
    Disable,
}

impl Preset {
    /// Parse and validate a preset document.
    pub fn from_json(s: &str) -> Result<Preset> {
        let preset: Preset = serde_json::from_str(s)
            .map_err(|e| CompileError::invalid_input(format!("preset parse error: {e}")))?;
        preset.validate()?;
        Ok(preset)
    }

    /// Structural validation: page links in range, group targets resolving to
    /// toggles. Group targets are checked strictly; a dangling entry would
    /// desynchronize the planner's reservation pass (which counts non-empty
    /// group lists) from its resolution pass.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CompileError::invalid_input("preset has no name"));
        }
        if self.pages.is_empty() {
            return Err(CompileError::invalid_input("preset has no pages"));
        }
        for (pi, page) in self.pages.iter().enumerate() {
            for (ii, item) in page.items.iter().enumerate() {
                match item {
                    Item::PageLink { page: target } => {
                        if *target >= self.pages.len() {
                            return Err(CompileError::invalid_input(format!(
                                "page '{}' item {ii} links to nonexistent page {target}",
                                page.name
                            )));
                        }
                    }
                    Item::Toggle(toggle) => {
                        for entry in toggle.enable_group.iter().chain(&toggle.disable_group) {
                            self.check_group_target(entry.target, pi, ii)?;
                        }
                    }
                    Item::Submenu { .. } => {}
                }
            }
        }
        Ok(())
    }

    fn check_group_target(&self, target: ItemRef, page: usize, item: usize) -> Result<()> {
        let located = self
            .pages
            .get(target.page)
            .and_then(|p| p.items.get(target.item));
        match located {
            Some(Item::Toggle(_)) => Ok(()),
            Some(_) => Err(CompileError::invalid_input(format!(
                "group entry of page {page} item {item} targets a non-toggle \
                 (page {}, item {})",
                target.page, target.item
            ))),
            None => Err(CompileError::invalid_input(format!(
                "group entry of page {page} item {item} targets a nonexistent item \
                 (page {}, item {})",
                target.page, target.item
            ))),
        }
    }
}

/// One toggle in global emission order, with its location in the tree.
#[derive(Clone, Debug)]
pub struct ToggleSlot<'a> {
    pub toggle: &'a Toggle,
    pub page: usize,
    pub item: ItemRef,
}

/// Flattened view over every toggle of a preset (insertion order), with an
/// index from tree addresses back to global positions for group resolution.
#[derive(Debug)]
pub struct ToggleTable<'a> {
    slots: Vec<ToggleSlot<'a>>,
    by_ref: HashMap<ItemRef, usize>,
}

impl<'a> ToggleTable<'a> {
    pub fn collect(preset: &'a Preset) -> Self {
        let mut slots = Vec::new();
        let mut by_ref = HashMap::new();
        for (pi, page) in preset.pages.iter().enumerate() {
            for (ii, item) in page.items.iter().enumerate() {
                if let Item::Toggle(toggle) = item {
                    let item_ref = ItemRef { page: pi, item: ii };
                    by_ref.insert(item_ref, slots.len());
                    slots.push(ToggleSlot {
                        toggle,
                        page: pi,
                        item: item_ref,
                    });
                }
            }
        }
        Self { slots, by_ref }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToggleSlot<'a>> {
        self.slots.iter()
    }

    pub fn get(&self, index: usize) -> &ToggleSlot<'a> {
        &self.slots[index]
    }

    /// Global position of the toggle at a tree address; `None` for validated
    /// presets never happens, but the planner treats it defensively.
    pub fn position_of(&self, item: ItemRef) -> Option<usize> {
        self.by_ref.get(&item).copied()
    }
}
