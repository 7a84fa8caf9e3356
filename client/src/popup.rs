use leptos::prelude::*;
use rivermap_shared::{
    LngLat, MapPointerEvent, OpenPopup, PopupManager, RiverData, VisibleLayers,
};
use serde_json::{Map, Value};

use crate::context::use_river_context;
use crate::engine::{self, ScreenPoint};

const POPUP_BOX_STYLE: &str = "position: absolute; z-index: 100; min-width: 220px; max-width: 320px; background: #161921; border: 1px solid #282c3e; border-radius: 6px; box-shadow: 0 4px 16px rgba(0,0,0,0.5); padding: 8px 10px; font-family: 'Inter', system-ui, sans-serif;";

/// Reactive handle on the popup state machine. Operations that leave the
/// state unchanged do not notify subscribers.
#[derive(Clone, Copy)]
pub struct PopupController(RwSignal<PopupManager>);

impl Default for PopupController {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupController {
    pub fn new() -> Self {
        Self(RwSignal::new(PopupManager::new()))
    }

    pub fn handle_mouse_move(&self, event: &MapPointerEvent, river_data: &RiverData) {
        self.0
            .maybe_update(|popup| popup.handle_mouse_move(event, river_data));
    }

    pub fn handle_click(&self, event: &MapPointerEvent, river_data: &RiverData) {
        self.0.maybe_update(|popup| popup.handle_click(event, river_data));
    }

    pub fn handle_mouse_leave(&self) {
        self.0.maybe_update(PopupManager::handle_mouse_leave);
    }

    pub fn close_popup(&self) {
        self.0.maybe_update(PopupManager::close_popup);
    }

    /// Close the popup if its layer is no longer visible. Returns whether it closed.
    pub fn close_if_layer_hidden(&self, visible: &VisibleLayers) -> bool {
        let mut closed = false;
        self.0.maybe_update(|popup| {
            let hidden = popup
                .river_data()
                .is_some_and(|river| !visible.is_visible(&river.id));
            closed = hidden && popup.close_popup();
            closed
        });
        closed
    }

    /// Untracked; for event handlers.
    pub fn is_popup_visible(&self) -> bool {
        self.0.with_untracked(PopupManager::is_popup_visible)
    }

    pub fn popup(&self) -> Option<OpenPopup> {
        self.0.with(|popup| popup.state().cloned())
    }
}

/// Five decimals is roughly a metre, finer than any pointer pick.
pub fn format_lng_lat(anchor: LngLat) -> String {
    format!("{:.5}, {:.5}", anchor.lng, anchor.lat)
}

fn format_property(value: &Value) -> String {
    match value {
        Value::Null => "-".to_owned(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Placement of the popup box: above its anchor when the engine can project
/// it, otherwise the bottom-left corner of the map.
pub fn popup_placement(screen: Option<ScreenPoint>) -> String {
    match screen {
        Some(ScreenPoint { x, y }) => format!(
            "left: {x:.1}px; top: {y:.1}px; transform: translate(-50%, calc(-100% - 12px));"
        ),
        None => "left: 16px; bottom: 16px;".to_owned(),
    }
}

/// Feature properties as display rows, in the order the feature lists them.
pub fn property_rows(properties: &Map<String, Value>) -> Vec<(String, String)> {
    properties
        .iter()
        .map(|(key, value)| (key.clone(), format_property(value)))
        .collect()
}

/// Panel describing the hovered or clicked feature.
#[component]
pub fn MapPopup() -> impl IntoView {
    let Some(controller) = use_context::<PopupController>() else {
        web_sys::console::warn_1(&"MapPopup mounted without a popup controller".into());
        return ().into_any();
    };
    let context = match use_river_context() {
        Ok(context) => context,
        Err(e) => {
            web_sys::console::warn_1(&format!("MapPopup: {e}").into());
            return ().into_any();
        }
    };

    let popup = Memo::new(move |_| controller.popup());

    view! {
        {move || {
            let Some(open) = popup.get() else {
                return view! { <div style="display:none;" /> }.into_any();
            };
            let clicked = open.is_clicked();
            let rows = property_rows(&open.feature.properties);
            let placement = format!("{POPUP_BOX_STYLE} {}", popup_placement(engine::project(open.anchor)));
            let anchor = format_lng_lat(open.anchor);
            let river = open.river_data;
            let subtitle = format!("{} \u{00B7} {} \u{00B7} {}", river.category, river.prefecture, river.scale);
            let target = river.selection();
            let is_selected = context.selected_river.with(|s| s.as_ref() == Some(&target));
            view! {
                <div
                    class="map-popup"
                    style=placement
                    style:pointer-events=if clicked { "auto" } else { "none" }
                >
                    <div style="display: flex; align-items: baseline; justify-content: space-between; gap: 8px;">
                        <span style="font-size: 0.85rem; font-weight: 700; color: #e2e0d8;">{river.river.clone()}</span>
                        {clicked.then(|| view! {
                            <button
                                title="Close"
                                style="background: none; border: none; color: #5a5860; cursor: pointer; font-size: 0.9rem; line-height: 1;"
                                on:click=move |_| controller.close_popup()
                            >
                                "\u{00D7}"
                            </button>
                        })}
                    </div>
                    <div style="font-size: 0.68rem; color: #9a9590; margin-top: 2px;">{subtitle}</div>
                    <div style="font-size: 0.65rem; color: #5a5860; font-family: 'JetBrains Mono', monospace; margin-top: 2px;">{anchor}</div>
                    {(!rows.is_empty()).then(|| view! {
                        <table style="margin-top: 6px; padding-top: 4px; border-top: 1px solid rgba(40,44,62,0.5); font-size: 0.65rem; border-collapse: collapse; width: 100%;">
                            {rows.into_iter().map(|(key, value)| view! {
                                <tr>
                                    <td style="color: #9a9590; padding: 1px 8px 1px 0; vertical-align: top;">{key}</td>
                                    <td style="color: #e2e0d8; font-family: 'JetBrains Mono', monospace; word-break: break-all;">{value}</td>
                                </tr>
                            }).collect_view()}
                        </table>
                    })}
                    {(clicked && !is_selected).then(|| view! {
                        <button
                            style="margin-top: 6px; width: 100%; padding: 3px 0; background: #1a1d2a; border: 1px solid #282c3e; border-radius: 4px; color: #f5c542; cursor: pointer; font-size: 0.65rem;"
                            on:click=move |_| context.selected_river.set(Some(target.clone()))
                        >
                            "Select this river"
                        </button>
                    })}
                </div>
            }.into_any()
        }}
    }
    .into_any()
}
