use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::geometry::{LngLat, coordinates_from_geometry};
use crate::river::RiverData;

/// A feature picked by the map engine under the pointer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PickedFeature {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Raw geometry as reported by the engine. Joined layers may omit it.
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Pointer event forwarded from the map engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPointerEvent {
    #[serde(default)]
    pub features: Vec<PickedFeature>,
    #[serde(rename = "lngLat")]
    pub lng_lat: LngLat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupMode {
    Hover,
    Click,
}

/// Contents of a visible popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPopup {
    pub feature: PickedFeature,
    pub river_data: RiverData,
    pub anchor: LngLat,
    pub mode: PopupMode,
}

impl OpenPopup {
    pub fn is_clicked(&self) -> bool {
        self.mode == PopupMode::Click
    }
}

/// Hover/click popup state machine.
///
/// Either closed, or open with a feature, its river and an anchor all set.
/// Hover events always replace the content, even over a clicked popup; only
/// `handle_mouse_leave` tells the two modes apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopupManager {
    state: Option<OpenPopup>,
}

impl PopupManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the popup on the first picked feature. Returns `false` and leaves
    /// the state untouched when the event picked nothing.
    pub fn show_popup(
        &mut self,
        event: &MapPointerEvent,
        river_data: &RiverData,
        mode: PopupMode,
    ) -> bool {
        let Some(feature) = event.features.first() else {
            return false;
        };
        let anchor =
            coordinates_from_geometry(feature.geometry.as_ref()).unwrap_or(event.lng_lat);
        self.state = Some(OpenPopup {
            feature: feature.clone(),
            river_data: river_data.clone(),
            anchor,
            mode,
        });
        true
    }

    pub fn handle_mouse_move(&mut self, event: &MapPointerEvent, river_data: &RiverData) -> bool {
        self.show_popup(event, river_data, PopupMode::Hover)
    }

    pub fn handle_click(&mut self, event: &MapPointerEvent, river_data: &RiverData) -> bool {
        self.show_popup(event, river_data, PopupMode::Click)
    }

    /// Closes a hover popup. Clicked popups stay until `close_popup`.
    pub fn handle_mouse_leave(&mut self) -> bool {
        if self.is_clicked() {
            return false;
        }
        self.close_popup()
    }

    /// Returns whether a popup was open.
    pub fn close_popup(&mut self) -> bool {
        self.state.take().is_some()
    }

    pub fn is_popup_visible(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&OpenPopup> {
        self.state.as_ref()
    }

    pub fn feature(&self) -> Option<&PickedFeature> {
        self.state.as_ref().map(|open| &open.feature)
    }

    pub fn river_data(&self) -> Option<&RiverData> {
        self.state.as_ref().map(|open| &open.river_data)
    }

    pub fn anchor(&self) -> Option<LngLat> {
        self.state.as_ref().map(|open| open.anchor)
    }

    pub fn is_clicked(&self) -> bool {
        self.state.as_ref().is_some_and(OpenPopup::is_clicked)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::river::SelectedRiver;

    fn tama() -> RiverData {
        RiverData::from_selection(&SelectedRiver::new("flood", "Tokyo", "1/50000", "Tama"))
    }

    fn arakawa() -> RiverData {
        RiverData::from_selection(&SelectedRiver::new("flood", "Tokyo", "1/50000", "Arakawa"))
    }

    fn event(raw: Value) -> MapPointerEvent {
        serde_json::from_value(raw).expect("valid event")
    }

    fn line_event() -> MapPointerEvent {
        event(json!({
            "features": [{
                "id": 7,
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": [[139.3, 35.6], [139.4, 35.7]] },
                "properties": { "name": "Tama" },
                "layer": { "id": "flood/Tokyo/1%2F50000/Tama" }
            }],
            "lngLat": { "lng": 139.35, "lat": 35.65 },
            "point": { "x": 10, "y": 20 }
        }))
    }

    fn empty_event() -> MapPointerEvent {
        event(json!({ "features": [], "lngLat": { "lng": 1.0, "lat": 2.0 } }))
    }

    #[test]
    fn starts_closed() {
        let manager = PopupManager::new();
        assert!(!manager.is_popup_visible());
        assert!(!manager.is_clicked());
        assert_eq!(manager.feature(), None);
        assert_eq!(manager.river_data(), None);
        assert_eq!(manager.anchor(), None);
    }

    #[test]
    fn hover_anchors_on_first_vertex() {
        let mut manager = PopupManager::new();
        assert!(manager.handle_mouse_move(&line_event(), &tama()));
        assert!(manager.is_popup_visible());
        assert!(!manager.is_clicked());
        assert_eq!(manager.anchor(), Some(LngLat::new(139.3, 35.6)));
        assert_eq!(manager.river_data(), Some(&tama()));
        let feature = manager.feature().expect("feature");
        assert_eq!(feature.id, Some(json!(7)));
        assert_eq!(feature.properties.get("name"), Some(&json!("Tama")));
    }

    #[test]
    fn falls_back_to_pointer_location_without_geometry() {
        let mut manager = PopupManager::new();
        let no_geometry = event(json!({
            "features": [{ "properties": null }],
            "lngLat": { "lng": 138.0, "lat": 36.0 }
        }));
        assert!(manager.handle_click(&no_geometry, &tama()));
        assert_eq!(manager.anchor(), Some(LngLat::new(138.0, 36.0)));
        assert!(manager.feature().expect("feature").properties.is_empty());

        let empty_geometry = event(json!({
            "features": [{ "geometry": { "type": "Polygon", "coordinates": [[]] } }],
            "lngLat": { "lng": 137.0, "lat": 35.0 }
        }));
        manager.handle_mouse_move(&empty_geometry, &tama());
        assert_eq!(manager.anchor(), Some(LngLat::new(137.0, 35.0)));
    }

    #[test]
    fn no_picked_feature_is_a_no_op() {
        let mut closed = PopupManager::new();
        assert!(!closed.handle_mouse_move(&empty_event(), &tama()));
        assert_eq!(closed, PopupManager::new());

        let mut clicked = PopupManager::new();
        clicked.handle_click(&line_event(), &tama());
        let before = clicked.clone();
        assert!(!clicked.handle_click(&empty_event(), &arakawa()));
        assert!(!clicked.handle_mouse_move(&empty_event(), &arakawa()));
        assert_eq!(clicked, before);
    }

    #[test]
    fn missing_features_field_is_a_no_op() {
        let mut manager = PopupManager::new();
        let bare = event(json!({ "lngLat": { "lng": 1.0, "lat": 2.0 } }));
        assert!(!manager.handle_click(&bare, &tama()));
        assert!(!manager.is_popup_visible());
    }

    #[test]
    fn clicked_popup_survives_mouse_leave() {
        let mut manager = PopupManager::new();
        manager.handle_click(&line_event(), &tama());
        assert!(!manager.handle_mouse_leave());
        assert!(manager.is_popup_visible());
        assert!(manager.is_clicked());
    }

    #[test]
    fn hovered_popup_closes_on_mouse_leave() {
        let mut manager = PopupManager::new();
        manager.handle_mouse_move(&line_event(), &tama());
        assert!(manager.handle_mouse_leave());
        assert!(!manager.is_popup_visible());
        assert!(!manager.handle_mouse_leave());
    }

    #[test]
    fn hover_overwrites_clicked_popup() {
        let mut manager = PopupManager::new();
        manager.handle_click(&line_event(), &tama());
        manager.handle_mouse_move(&line_event(), &arakawa());
        assert!(!manager.is_clicked());
        assert_eq!(manager.river_data(), Some(&arakawa()));
        assert!(manager.handle_mouse_leave());
        assert!(!manager.is_popup_visible());
    }

    #[test]
    fn close_popup_always_hides() {
        let mut manager = PopupManager::new();
        assert!(!manager.close_popup());
        assert!(!manager.is_popup_visible());

        manager.handle_click(&line_event(), &tama());
        assert!(manager.close_popup());
        assert!(!manager.is_popup_visible());
        assert!(!manager.is_clicked());
        assert_eq!(manager.state(), None);
    }
}
