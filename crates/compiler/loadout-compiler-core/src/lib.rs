//! loadout-compiler-core
//!
//! Compiles a declarative inventory preset (nested pages of togglable items
//! with grouping and synchronization rules) into a layered state-machine
//! document driven by one shared integer selector plus per-toggle boolean
//! flags, a parameter table, and a matching menu tree. Compilation is a
//! single transaction against the output store: it either commits every
//! artifact or rolls the store back byte-for-byte.

pub mod budget;
pub mod channels;
pub mod clips;
pub mod compat;
pub mod compile;
pub mod error;
pub mod item_layers;
pub mod master;
pub mod menus;
pub mod naming;
pub mod preset;
pub mod removal;
pub mod store;
pub mod transaction;

pub use channels::{ChannelEntry, ChannelPlan};
pub use compat::{check_clip, BindingRestriction};
pub use compile::{
    controller_asset_path, AlwaysOverwrite, CompileOptions, CompiledInventory, Compiler, Confirm,
    ConfirmChoice, PARAMS_ASSET_PATH,
};
pub use error::{BudgetResource, CompileError, Result};
pub use preset::{
    GroupEffect, GroupEntry, Item, ItemRef, Page, Preset, SyncMode, Toggle, ToggleContent,
    ToggleTable,
};
pub use removal::{preview_removal, remove, RemovalPreview};
pub use store::{AssetStore, MemoryStore};
pub use transaction::Transaction;
