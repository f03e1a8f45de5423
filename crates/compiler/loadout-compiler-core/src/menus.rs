//! Menu assembly.
//!
//! One menu document per page, built in two phases: all asset paths are
//! allocated first, then controls are wired against those persisted
//! identities. Forward page links therefore resolve without any shared
//! mutable handles, and the emitted references survive a reload of the
//! output store.

use loadout_api_core::{MenuControl, MenuDoc, MenuTarget, SELECTOR_PARAM};

use crate::preset::{Item, Preset, ToggleTable};

pub fn page_asset_path(preset_name: &str, page_name: &str) -> String {
    format!("menus/{preset_name}_{page_name}.menu.json")
}

/// Build every page's menu document, paired with its asset path. The first
/// element is the preset's root menu.
pub fn assemble(preset: &Preset, table: &ToggleTable<'_>) -> Vec<(String, MenuDoc)> {
    // Phase one: persisted identities for every page.
    let paths: Vec<String> = preset
        .pages
        .iter()
        .map(|page| page_asset_path(&preset.name, &page.name))
        .collect();

    // Phase two: controls, with toggle values following global emission order.
    let mut toggle_value = 0u8;
    let mut docs = Vec::with_capacity(preset.pages.len());
    for (pi, page) in preset.pages.iter().enumerate() {
        let mut controls = Vec::with_capacity(page.items.len());
        for item in &page.items {
            match item {
                Item::Toggle(toggle) => {
                    toggle_value += 1;
                    controls.push(MenuControl::Toggle {
                        name: toggle.name.clone(),
                        icon: toggle.icon.clone(),
                        parameter: SELECTOR_PARAM.to_string(),
                        value: toggle_value,
                    });
                }
                Item::PageLink { page: target } => {
                    let linked = &preset.pages[*target];
                    controls.push(MenuControl::Submenu {
                        name: linked.name.clone(),
                        icon: linked.icon.clone(),
                        target: MenuTarget::Asset(paths[*target].clone()),
                    });
                }
                Item::Submenu { name, icon, menu } => {
                    controls.push(MenuControl::Submenu {
                        name: name.clone(),
                        icon: icon.clone(),
                        target: MenuTarget::External(menu.clone()),
                    });
                }
            }
        }
        docs.push((
            paths[pi].clone(),
            MenuDoc {
                name: page.name.clone(),
                icon: page.icon.clone(),
                controls,
            },
        ));
    }
    debug_assert_eq!(usize::from(toggle_value), table.len());
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{Page, SyncMode, Toggle, ToggleContent};

    fn toggle(name: &str) -> Item {
        Item::Toggle(Toggle {
            name: name.into(),
            icon: None,
            content: ToggleContent::Object {
                path: format!("Root/{name}"),
            },
            initial_state: false,
            sync: SyncMode::Off,
            saved: false,
            enable_group: Vec::new(),
            disable_group: Vec::new(),
        })
    }

    #[test]
    fn toggle_values_follow_global_emission_order() {
        let preset = Preset {
            name: "demo".into(),
            pages: vec![
                Page {
                    name: "Main".into(),
                    icon: None,
                    items: vec![toggle("a"), Item::PageLink { page: 1 }],
                },
                Page {
                    name: "More".into(),
                    icon: Some("more.png".into()),
                    items: vec![toggle("b"), toggle("c")],
                },
            ],
        };
        let table = ToggleTable::collect(&preset);
        let docs = assemble(&preset, &table);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0, "menus/demo_Main.menu.json");

        let MenuControl::Toggle { value, parameter, .. } = &docs[0].1.controls[0] else {
            panic!("expected toggle control");
        };
        assert_eq!(*value, 1);
        assert_eq!(parameter, "Inventory");

        let MenuControl::Toggle { value, .. } = &docs[1].1.controls[1] else {
            panic!("expected toggle control");
        };
        assert_eq!(*value, 3);
    }

    #[test]
    fn page_links_resolve_to_persisted_paths_even_forward() {
        let preset = Preset {
            name: "demo".into(),
            pages: vec![
                Page {
                    name: "Main".into(),
                    icon: None,
                    // Link to a page that is built after this one.
                    items: vec![Item::PageLink { page: 1 }],
                },
                Page {
                    name: "Later".into(),
                    icon: Some("later.png".into()),
                    items: vec![],
                },
            ],
        };
        let table = ToggleTable::collect(&preset);
        let docs = assemble(&preset, &table);

        let MenuControl::Submenu { name, icon, target } = &docs[0].1.controls[0] else {
            panic!("expected submenu control");
        };
        assert_eq!(name, "Later");
        assert_eq!(icon.as_deref(), Some("later.png"));
        assert_eq!(
            target,
            &MenuTarget::Asset("menus/demo_Later.menu.json".into())
        );
    }

    #[test]
    fn external_submenus_are_embedded_unchanged() {
        let preset = Preset {
            name: "demo".into(),
            pages: vec![Page {
                name: "Main".into(),
                icon: None,
                items: vec![Item::Submenu {
                    name: "Emotes".into(),
                    icon: None,
                    menu: "external/emotes".into(),
                }],
            }],
        };
        let table = ToggleTable::collect(&preset);
        let docs = assemble(&preset, &table);
        let MenuControl::Submenu { target, .. } = &docs[0].1.controls[0] else {
            panic!("expected submenu control");
        };
        assert_eq!(target, &MenuTarget::External("external/emotes".into()));
    }
}
