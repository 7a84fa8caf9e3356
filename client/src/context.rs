use leptos::prelude::*;
use rivermap_shared::{SelectedRiver, VisibleLayers, geojson_url};

/// Shared river selection and layer visibility.
///
/// Installed once by the root component with [`provide_river_context`].
#[derive(Clone, Copy)]
pub struct RiverContext {
    pub selected_river: RwSignal<Option<SelectedRiver>>,
    pub visible_layers: RwSignal<VisibleLayers>,
    geojson_url: Memo<Option<String>>,
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("river context requested outside of a component tree that provides one")]
pub struct MissingRiverContext;

impl RiverContext {
    pub fn new(selected_river: Option<SelectedRiver>, visible_layers: VisibleLayers) -> Self {
        let selected_river = RwSignal::new(selected_river);
        let url = Memo::new(move |_| selected_river.with(|s| geojson_url(s.as_ref())));
        Self {
            selected_river,
            visible_layers: RwSignal::new(visible_layers),
            geojson_url: url,
        }
    }

    pub fn select_river(&self, category: &str, prefecture: &str, scale: &str, river: &str) {
        self.selected_river
            .set(Some(SelectedRiver::new(category, prefecture, scale, river)));
    }

    pub fn toggle_layer_visibility(&self, layer_id: &str) {
        self.visible_layers.update(|layers| {
            layers.toggle(layer_id);
        });
    }

    /// Download URL of the selected river, recomputed only when the selection changes.
    pub fn selected_river_geojson_url(&self) -> Memo<Option<String>> {
        self.geojson_url
    }
}

pub fn provide_river_context(context: RiverContext) {
    provide_context(context);
}

pub fn use_river_context() -> Result<RiverContext, MissingRiverContext> {
    use_context::<RiverContext>().ok_or(MissingRiverContext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_url_follows_selection() {
        let context = RiverContext::new(None, VisibleLayers::new());
        assert_eq!(context.selected_river_geojson_url().get_untracked(), None);

        context.select_river("flood", "Tokyo", "1/50000", "Tama");
        assert_eq!(
            context.selected_river_geojson_url().get_untracked().as_deref(),
            Some("https://d35i4h3qfw3o9a.cloudfront.net/flood/Tokyo/1%2F50000/Tama.geojson")
        );

        context.selected_river.set(None);
        assert_eq!(context.selected_river_geojson_url().get_untracked(), None);
    }

    #[test]
    fn selecting_replaces_the_whole_value() {
        let context = RiverContext::new(
            Some(SelectedRiver::new("flood", "Tokyo", "1/50000", "Tama")),
            VisibleLayers::new(),
        );
        context.select_river("inundation", "Aichi", "1/10000", "Kiso");
        assert_eq!(
            context.selected_river.get_untracked(),
            Some(SelectedRiver::new("inundation", "Aichi", "1/10000", "Kiso"))
        );
    }

    #[test]
    fn toggling_twice_restores_visibility() {
        let context = RiverContext::new(None, ["a"].into_iter().collect());
        context.toggle_layer_visibility("b");
        assert!(context.visible_layers.with_untracked(|v| v.is_visible("b")));
        context.toggle_layer_visibility("b");
        context.toggle_layer_visibility("a");
        context.toggle_layer_visibility("a");
        assert_eq!(
            context.visible_layers.get_untracked(),
            ["a"].into_iter().collect::<VisibleLayers>()
        );
    }

    #[test]
    fn lookup_without_provider_is_an_error() {
        assert!(matches!(use_river_context(), Err(MissingRiverContext)));
    }
}
