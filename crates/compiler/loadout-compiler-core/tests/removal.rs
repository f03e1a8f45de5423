use loadout_api_core::{
    Condition, ControllerDoc, LayerDoc, ParamDef, ParamNamespace, StateDoc, TransitionDoc,
};
use loadout_compiler_core::{
    controller_asset_path, preview_removal, remove, AlwaysOverwrite, AssetStore, Compiler,
    MemoryStore, Preset, PARAMS_ASSET_PATH,
};

fn load_preset(name: &str) -> Preset {
    let text = loadout_test_fixtures::presets::json(name).expect("fixture");
    Preset::from_json(&text).expect("fixture preset parses")
}

/// A host controller that predates the compiler: one hand-authored layer and
/// two parameters, none of which removal may touch.
fn host_controller() -> ControllerDoc {
    let mut controller = ControllerDoc::new("wardrobe");
    controller.parameters.push(ParamDef::bool("Blink", false));
    controller.parameters.push(ParamDef::bool("IsLocal", false));
    controller.layers.push(LayerDoc {
        name: "Blink".into(),
        marker: None,
        default_state: "Open".into(),
        entry_transitions: vec![],
        any_state_transitions: vec![],
        states: vec![StateDoc {
            name: "Open".into(),
            motion: None,
            writes: vec![],
            transitions: vec![TransitionDoc::to_state("Open")
                .when(Condition::bool_is("Blink", true))],
        }],
    });
    controller
}

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    let controller_path = controller_asset_path("wardrobe");
    store
        .write(
            &controller_path,
            serde_json::to_vec_pretty(&host_controller()).unwrap(),
        )
        .unwrap();
    let namespace = ParamNamespace {
        parameters: vec![ParamDef::int("Volume", 3)],
    };
    store
        .write(PARAMS_ASSET_PATH, serde_json::to_vec_pretty(&namespace).unwrap())
        .unwrap();
    store
}

#[test]
fn preview_after_compile_lists_exactly_the_added_artifacts() {
    let preset = load_preset("full_wardrobe");
    let mut store = seeded_store();
    let controller_path = controller_asset_path("wardrobe");

    let compiled = Compiler::default()
        .compile(&preset, &mut store, &mut AlwaysOverwrite)
        .expect("compile");

    let preview = preview_removal(&store, &controller_path, true).expect("preview");
    assert_eq!(preview.layers, compiled.layers_added);
    // Controller-level reserved parameters: one flag per toggle plus the
    // selector. Never the host's Blink or IsLocal.
    assert_eq!(
        preview.parameters,
        vec![
            "Inventory 1".to_string(),
            "Inventory 2".to_string(),
            "Inventory 3".to_string(),
            "Inventory 4".to_string(),
            "Inventory".to_string(),
        ]
    );
}

#[test]
fn remove_restores_the_pre_compile_layer_and_parameter_sets() {
    let preset = load_preset("full_wardrobe");
    let mut store = seeded_store();
    let controller_path = controller_asset_path("wardrobe");

    Compiler::default()
        .compile(&preset, &mut store, &mut AlwaysOverwrite)
        .expect("compile");
    let removed = remove(&mut store, &controller_path, true).expect("remove");
    assert_eq!(removed.layers.len(), 5);

    let controller: ControllerDoc = read_json(&store, &controller_path);
    let baseline = host_controller();
    assert_eq!(controller.layers, baseline.layers);
    assert_eq!(controller.parameters, baseline.parameters);

    let namespace: ParamNamespace = read_json(&store, PARAMS_ASSET_PATH);
    assert_eq!(namespace.parameters, vec![ParamDef::int("Volume", 3)]);

    // A second preview finds nothing left to remove.
    let preview = preview_removal(&store, &controller_path, true).expect("preview");
    assert!(preview.layers.is_empty());
    assert!(preview.parameters.is_empty());
}

#[test]
fn preview_without_parameter_removal_lists_layers_only() {
    let preset = load_preset("full_wardrobe");
    let mut store = seeded_store();
    let controller_path = controller_asset_path("wardrobe");

    Compiler::default()
        .compile(&preset, &mut store, &mut AlwaysOverwrite)
        .expect("compile");
    let preview = preview_removal(&store, &controller_path, false).expect("preview");
    assert_eq!(preview.layers.len(), 5);
    assert!(preview.parameters.is_empty());
}

#[test]
fn preview_on_a_store_without_controller_is_empty() {
    let store = MemoryStore::new();
    let preview = preview_removal(&store, "animators/none.controller.json", true).expect("preview");
    assert!(preview.layers.is_empty());
    assert!(preview.parameters.is_empty());
}

fn read_json<T: serde::de::DeserializeOwned>(store: &MemoryStore, path: &str) -> T {
    let bytes = store.read(path).expect("read").expect("asset present");
    serde_json::from_slice(&bytes).expect("valid document")
}
