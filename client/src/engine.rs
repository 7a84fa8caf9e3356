//! Glue between the app and the external map engine.
//!
//! Inbound, the engine's layer event handlers call the exported
//! `rivermap_*` functions with the picked layer id and a plain
//! `{ features, lngLat }` object. Outbound, the app calls optional hooks on
//! `window.rivermapEngine` when a river finishes loading or a layer is
//! toggled, and to project a popup anchor to screen pixels. A missing hook
//! means no engine is attached and is not an error.

use std::cell::RefCell;

use indexmap::IndexMap;
use js_sys::{Function, Reflect};
use leptos::prelude::*;
use rivermap_shared::{LngLat, MapPointerEvent, RiverData};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::ENGINE_GLOBAL;
use crate::popup::PopupController;

/// River layers fetched this session, keyed by layer id, in load order.
#[derive(Clone, Copy)]
pub struct LoadedLayers(pub RwSignal<IndexMap<String, RiverData>>);

impl Default for LoadedLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadedLayers {
    pub fn new() -> Self {
        Self(RwSignal::new(IndexMap::new()))
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.0.with_untracked(|loaded| loaded.contains_key(layer_id))
    }

    pub fn get(&self, layer_id: &str) -> Option<RiverData> {
        self.0.with_untracked(|loaded| loaded.get(layer_id).cloned())
    }

    /// Record a fetched river. Reloading an id keeps its original position.
    pub fn register(&self, river: RiverData) {
        self.0.update(|loaded| {
            loaded.insert(river.id.clone(), river);
        });
    }
}

/// Pixel offset within the map container, as returned by the engine's `project` hook.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("map bridge called before the app was mounted")]
    NotMounted,
    #[error("no loaded layer with id {0:?}")]
    UnknownLayer(String),
    #[error("malformed pointer event: {0}")]
    BadEvent(String),
    #[error("engine hook {hook} failed: {message}")]
    Hook { hook: &'static str, message: String },
}

#[derive(Clone, Copy)]
struct MapBridge {
    popup: PopupController,
    layers: LoadedLayers,
}

thread_local! {
    static MAP_BRIDGE: RefCell<Option<MapBridge>> = const { RefCell::new(None) };
}

/// Route engine events to this popup controller and layer registry.
/// A remount replaces the previous binding.
pub fn install_bridge(popup: PopupController, layers: LoadedLayers) {
    MAP_BRIDGE.with(|slot| {
        *slot.borrow_mut() = Some(MapBridge { popup, layers });
    });
}

fn with_bridge(f: impl FnOnce(MapBridge) -> Result<(), BridgeError>) -> Result<(), BridgeError> {
    let bridge = MAP_BRIDGE
        .with(|slot| *slot.borrow())
        .ok_or(BridgeError::NotMounted)?;
    f(bridge)
}

fn resolve(
    bridge: &MapBridge,
    layer_id: &str,
    event: JsValue,
) -> Result<(MapPointerEvent, RiverData), BridgeError> {
    let river = bridge
        .layers
        .get(layer_id)
        .ok_or_else(|| BridgeError::UnknownLayer(layer_id.to_owned()))?;
    let event = serde_wasm_bindgen::from_value::<MapPointerEvent>(event)
        .map_err(|e| BridgeError::BadEvent(e.to_string()))?;
    Ok((event, river))
}

fn report(result: Result<(), BridgeError>) {
    if let Err(e) = result {
        web_sys::console::warn_1(&format!("map bridge: {e}").into());
    }
}

#[wasm_bindgen]
pub fn rivermap_mouse_move(layer_id: &str, event: JsValue) {
    report(with_bridge(|bridge| {
        let (event, river) = resolve(&bridge, layer_id, event)?;
        bridge.popup.handle_mouse_move(&event, &river);
        Ok(())
    }));
}

#[wasm_bindgen]
pub fn rivermap_click(layer_id: &str, event: JsValue) {
    report(with_bridge(|bridge| {
        let (event, river) = resolve(&bridge, layer_id, event)?;
        bridge.popup.handle_click(&event, &river);
        Ok(())
    }));
}

#[wasm_bindgen]
pub fn rivermap_mouse_leave() {
    report(with_bridge(|bridge| {
        bridge.popup.handle_mouse_leave();
        Ok(())
    }));
}

#[wasm_bindgen]
pub fn rivermap_close_popup() {
    report(with_bridge(|bridge| {
        bridge.popup.close_popup();
        Ok(())
    }));
}

fn engine_hook(name: &str) -> Option<(JsValue, Function)> {
    let window = web_sys::window()?;
    let engine = Reflect::get(window.as_ref(), &JsValue::from_str(ENGINE_GLOBAL)).ok()?;
    if engine.is_undefined() || engine.is_null() {
        return None;
    }
    let hook = Reflect::get(&engine, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    Some((engine, hook))
}

fn call_hook(
    hook: &'static str,
    args: (&JsValue, &JsValue),
) -> Result<Option<JsValue>, BridgeError> {
    let Some((engine, function)) = engine_hook(hook) else {
        return Ok(None);
    };
    function
        .call2(&engine, args.0, args.1)
        .map(Some)
        .map_err(|e| BridgeError::Hook {
            hook,
            message: format!("{e:?}"),
        })
}

/// Hand a freshly loaded river to the engine for drawing.
pub fn show_layer(river: &RiverData, geojson: &serde_json::Value) {
    let payload = match geojson.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
        Ok(payload) => payload,
        Err(e) => {
            web_sys::console::warn_1(&format!("Failed to convert {}: {e}", river.id).into());
            return;
        }
    };
    report(call_hook("showLayer", (&JsValue::from_str(&river.id), &payload)).map(|_| ()));
}

pub fn set_layer_visibility(layer_id: &str, visible: bool) {
    report(
        call_hook(
            "setLayerVisibility",
            (&JsValue::from_str(layer_id), &JsValue::from_bool(visible)),
        )
        .map(|_| ()),
    );
}

/// Screen position of `anchor`, or `None` when no engine can project it.
pub fn project(anchor: LngLat) -> Option<ScreenPoint> {
    let projected = match call_hook(
        "project",
        (&JsValue::from_f64(anchor.lng), &JsValue::from_f64(anchor.lat)),
    ) {
        Ok(projected) => projected?,
        Err(e) => {
            report(Err(e));
            return None;
        }
    };
    if projected.is_undefined() || projected.is_null() {
        return None;
    }
    match serde_wasm_bindgen::from_value::<ScreenPoint>(projected) {
        Ok(point) => Some(point),
        Err(e) => {
            report(Err(BridgeError::Hook {
                hook: "project",
                message: e.to_string(),
            }));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_reports_unmounted_calls() {
        let result = with_bridge(|_| Ok(()));
        assert!(matches!(result, Err(BridgeError::NotMounted)));
    }

    fn tama() -> RiverData {
        RiverData::from_selection(&rivermap_shared::SelectedRiver::new(
            "flood", "Tokyo", "1/50000", "Tama",
        ))
    }

    #[test]
    fn loaded_layers_register_once_per_id() {
        let layers = LoadedLayers::new();
        let river = tama();
        assert!(!layers.contains(&river.id));

        layers.register(river.clone());
        layers.register(river.clone());
        assert!(layers.contains(&river.id));
        assert_eq!(layers.get(&river.id), Some(river.clone()));
        assert_eq!(layers.0.with_untracked(IndexMap::len), 1);
        assert_eq!(layers.get("flood/Tokyo/1%2F50000/Arakawa"), None);
    }

    #[test]
    fn bridge_errors_name_the_problem() {
        assert_eq!(
            BridgeError::UnknownLayer("flood/Tokyo/1%2F50000/Tama".into()).to_string(),
            r#"no loaded layer with id "flood/Tokyo/1%2F50000/Tama""#
        );
        assert_eq!(
            BridgeError::Hook {
                hook: "showLayer",
                message: "TypeError".into()
            }
            .to_string(),
            "engine hook showLayer failed: TypeError"
        );
    }
}
