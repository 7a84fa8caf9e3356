use gloo_storage::Storage;
use rivermap_shared::{Catalogue, SelectedRiver, VisibleLayers};

/// Catalogue document, served next to the app bundle.
pub const CATALOGUE_URL: &str = "/catalogue.json";

/// Element the map engine renders into.
pub const MAP_CONTAINER_ID: &str = "map";

/// Global object the map engine glue installs on `window`.
pub const ENGINE_GLOBAL: &str = "rivermapEngine";

pub const SETTINGS_KEY: &str = "rivermap_settings";

/// User state persisted across reloads.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub selected_river: Option<SelectedRiver>,
    pub visible_layers: VisibleLayers,
    pub sidebar_open: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            selected_river: None,
            visible_layers: VisibleLayers::new(),
            sidebar_open: true,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = gloo_storage::LocalStorage::set(SETTINGS_KEY, self) {
            web_sys::console::warn_1(&format!("Failed to save settings: {e}").into());
        }
    }

    /// Drop a saved selection the catalogue no longer lists.
    /// Returns `true` if the selection was discarded.
    pub fn retain_known_selection(&mut self, catalogue: &Catalogue) -> bool {
        match &self.selected_river {
            Some(selected) if !catalogue.contains(selected) => {
                self.selected_river = None;
                true
            }
            _ => false,
        }
    }
}
