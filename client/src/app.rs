use std::cell::RefCell;

use leptos::prelude::*;
use rivermap_shared::{Catalogue, RiverData};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::config::{MAP_CONTAINER_ID, Settings};
use crate::context::{RiverContext, provide_river_context};
use crate::engine::{self, LoadedLayers, install_bridge};
use crate::fetch::{GeojsonRequests, fetch_catalogue, fetch_geojson};
use crate::popup::{MapPopup, PopupController};
use crate::sidebar::Sidebar;

pub(crate) const SIDEBAR_WIDTH: f64 = 320.0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CatalogueState {
    Loading,
    Ready(Catalogue),
    Failed(String),
}

impl CatalogueState {
    /// A saved selection can only be trusted once the catalogue has loaded or failed.
    pub(crate) fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[derive(Clone, Copy)]
pub(crate) struct SidebarOpen(pub RwSignal<bool>);

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

fn current_settings(context: RiverContext, sidebar_open: RwSignal<bool>) -> Settings {
    Settings {
        selected_river: context.selected_river.get_untracked(),
        visible_layers: context.visible_layers.get_untracked(),
        sidebar_open: sidebar_open.get_untracked(),
    }
}

/// Root application component. Owns the river context, the popup
/// controller and the loaded-layer registry.
#[component]
pub fn App() -> impl IntoView {
    let saved = Settings::load();
    let context = RiverContext::new(saved.selected_river, saved.visible_layers);
    let popup = PopupController::new();
    let layers = LoadedLayers::new();
    let catalogue: RwSignal<CatalogueState> = RwSignal::new(CatalogueState::Loading);
    let sidebar_open: RwSignal<bool> = RwSignal::new(saved.sidebar_open);
    let requests = GeojsonRequests::new();

    provide_river_context(context);
    provide_context(popup);
    provide_context(SidebarOpen(sidebar_open));
    install_bridge(popup, layers);

    spawn_local(async move {
        match fetch_catalogue().await {
            Ok(loaded) => {
                if loaded.is_empty() {
                    web_sys::console::warn_1(&"Catalogue lists no rivers".into());
                } else {
                    web_sys::console::info_1(&format!("catalogue_rivers={}", loaded.len()).into());
                }
                let mut settings = current_settings(context, sidebar_open);
                if settings.retain_known_selection(&loaded) {
                    web_sys::console::warn_1(
                        &"Saved river is no longer in the catalogue; clearing selection".into(),
                    );
                    context.selected_river.set(settings.selected_river);
                }
                catalogue.set(CatalogueState::Ready(loaded));
            }
            Err(e) => {
                web_sys::console::warn_1(&format!("Catalogue fetch failed: {e}").into());
                catalogue.set(CatalogueState::Failed(e.to_string()));
            }
        }
    });

    // Persist user state whenever it changes.
    Effect::new(move || {
        context.selected_river.track();
        context.visible_layers.track();
        sidebar_open.track();
        current_settings(context, sidebar_open).save();
    });

    // Fetch the selected river whenever its download URL changes, once the
    // catalogue has had a chance to drop a saved selection it no longer lists.
    let geojson_url = context.selected_river_geojson_url();
    Effect::new(move || {
        let url = geojson_url.get();
        if catalogue.with(CatalogueState::is_loading) {
            return;
        }
        let ticket = requests.supersede();
        let Some(url) = url else {
            return;
        };
        let Some(selected) = context.selected_river.get_untracked() else {
            return;
        };
        let river = RiverData::from_selection(&selected);
        if layers.contains(&river.id) {
            context.visible_layers.update(|visible| {
                visible.show(&river.id);
            });
            return;
        }

        spawn_local(async move {
            let result = fetch_geojson(&url).await;
            if !requests.is_current(ticket) {
                return;
            }
            match result {
                Ok(body) => {
                    layers.register(river.clone());
                    engine::show_layer(&river, &body);
                    context.visible_layers.update(|visible| {
                        visible.show(&river.id);
                    });
                    web_sys::console::info_1(&format!("loaded_layer={}", river.id).into());
                }
                Err(e) => {
                    web_sys::console::warn_1(
                        &format!("GeoJSON fetch failed for {}: {e}", river.id).into(),
                    );
                }
            }
        });
    });

    // Push visibility to the engine; a popup on a hidden layer goes away with it.
    Effect::new(move || {
        let visible = context.visible_layers.get();
        layers.0.with(|loaded| {
            for id in loaded.keys() {
                engine::set_layer_visibility(id, visible.is_visible(id));
            }
        });
        popup.close_if_layer_hidden(&visible);
    });

    // Escape closes the popup, clicked or not.
    Effect::new(move || {
        use wasm_bindgen::prelude::*;

        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                if e.key() == "Escape" && popup.is_popup_visible() {
                    popup.close_popup();
                }
            });
        let _ = window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref());
        KEYDOWN_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(KeydownBinding {
                window,
                _handler: handler,
            });
        });
    });

    view! {
        <div style="position: relative; width: 100vw; height: 100vh; overflow: hidden; background: #0c0e17;">
            <div id=MAP_CONTAINER_ID style="position: absolute; inset: 0;" />
            <div
                style="position: absolute; top: 0; right: 0; height: 100%; z-index: 10;"
                style:width=move || {
                    if sidebar_open.get() { format!("{SIDEBAR_WIDTH}px") } else { "0px".to_owned() }
                }
            >
                <SidebarToggle />
                <Show when=move || sidebar_open.get()>
                    <Sidebar context=context catalogue=catalogue layers=layers />
                </Show>
            </div>
            <MapPopup />
        </div>
    }
}

/// Toggle button for showing/hiding the sidebar. Attached to the sidebar's left edge.
#[component]
fn SidebarToggle() -> impl IntoView {
    let SidebarOpen(sidebar_open) = expect_context();

    view! {
        <button
            class="sidebar-toggle"
            title=move || if sidebar_open.get() { "Hide sidebar" } else { "Show sidebar" }
            style="position: absolute; top: 16px; left: -44px; z-index: 11; width: 32px; height: 32px; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; cursor: pointer; display: flex; align-items: center; justify-content: center; color: #5a5860; font-family: 'JetBrains Mono', monospace; font-size: 1.1rem; line-height: 1;"
            on:click=move |_| sidebar_open.update(|v| *v = !*v)
        >
            {move || if sidebar_open.get() { "\u{00BB}" } else { "\u{00AB}" }}
        </button>
    }
}
