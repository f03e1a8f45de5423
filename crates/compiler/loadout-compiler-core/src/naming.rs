//! Layer-name resolution: toggles on different pages may share a display
//! name, but emitted layer names must be unique across the whole controller.

use crate::preset::{Preset, ToggleTable};

/// One unique layer name per toggle, in emission order. A bare name is kept
/// until it collides; on collision both toggles gain their owning page's name
/// in parentheses (the earlier one is renamed in place), and if even the
/// qualified form collides a numeric suffix counts up from 0.
pub fn resolve_layer_names(preset: &Preset, table: &ToggleTable<'_>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(table.len());

    for slot in table.iter() {
        let base = slot.toggle.name.clone();
        let page_name = &preset.pages[slot.page].name;
        let qualified = format!("{base} ({page_name})");

        let name = if names.contains(&qualified) {
            suffixed(&names, &qualified)
        } else if let Some(other) = names.iter().position(|n| *n == base) {
            let other_slot = table.get(other);
            let other_page = &preset.pages[other_slot.page].name;
            names[other] = format!("{} ({other_page})", other_slot.toggle.name);
            // Same-page duplicates qualify to the same form; fall through to
            // the numeric suffix in that case.
            if names.contains(&qualified) {
                suffixed(&names, &qualified)
            } else {
                qualified
            }
        } else {
            base
        };
        names.push(name);
    }
    names
}

fn suffixed(names: &[String], qualified: &str) -> String {
    let mut occurrence = 0usize;
    while names.contains(&format!("{qualified} {occurrence}")) {
        occurrence += 1;
    }
    format!("{qualified} {occurrence}")
}
