use leptos::prelude::*;
use rivermap_shared::{Catalogue, SelectedRiver};

use crate::app::CatalogueState;
use crate::context::RiverContext;
use crate::engine::LoadedLayers;

const SECTION_HEADER_STYLE: &str = "padding: 12px 20px 6px; font-family: 'JetBrains Mono', monospace; font-size: 0.62rem; text-transform: uppercase; letter-spacing: 0.12em; color: #5a5860;";

/// Catalogue browser and loaded-layer list.
#[component]
pub fn Sidebar(
    context: RiverContext,
    catalogue: RwSignal<CatalogueState>,
    layers: LoadedLayers,
) -> impl IntoView {
    view! {
        <div
            class="sidebar-inner"
            style="width: 100%; height: 100%; background: #13161f; border-left: 1px solid #282c3e; display: flex; flex-direction: column; box-shadow: -4px 0 20px rgba(0,0,0,0.4);"
        >
            <div style="padding: 20px 20px 14px; border-bottom: 1px solid #282c3e;">
                <div style="font-family: 'Silkscreen', monospace; font-size: 1.1rem; font-weight: 700; letter-spacing: 0.18em; color: #f5c542;">"RIVER MAP"</div>
                <div style="font-family: 'Inter', system-ui, sans-serif; font-size: 0.7rem; color: #5a5860; margin-top: 3px;">
                    {move || match context.selected_river.get() {
                        Some(s) => format!("{} \u{00B7} {} \u{00B7} {}", s.river, s.prefecture, s.scale),
                        None => "No river selected".to_owned(),
                    }}
                </div>
            </div>
            <div class="scrollbar-thin" style="flex: 1; overflow-y: auto;">
                <div style=SECTION_HEADER_STYLE>"Layers"</div>
                <LayerList context=context layers=layers />
                <div style=SECTION_HEADER_STYLE>"Catalogue"</div>
                {move || catalogue.with(|state| match state {
                    CatalogueState::Loading => view! {
                        <div style="padding: 4px 20px; font-size: 0.72rem; color: #5a5860;">"Loading catalogue\u{2026}"</div>
                    }.into_any(),
                    CatalogueState::Failed(message) => view! {
                        <div style="padding: 4px 20px; font-size: 0.72rem; color: #e06c5a;">
                            {format!("Catalogue unavailable ({message})")}
                        </div>
                    }.into_any(),
                    CatalogueState::Ready(catalogue) => catalogue_tree(catalogue, context).into_any(),
                })}
            </div>
        </div>
    }
}

fn catalogue_tree(catalogue: &Catalogue, context: RiverContext) -> impl IntoView + use<> {
    catalogue
        .categories()
        .map(|category| {
            let prefectures = catalogue
                .prefectures(category)
                .map(|prefecture| {
                    let scales = catalogue
                        .scales(category, prefecture)
                        .map(|scale| {
                            let rivers = catalogue
                                .rivers(category, prefecture, scale)
                                .iter()
                                .map(|river| {
                                    let target = SelectedRiver::new(category, prefecture, scale, river);
                                    view! { <RiverRow target=target context=context /> }
                                })
                                .collect_view();
                            view! {
                                <div style="padding: 2px 0 4px 12px;">
                                    <div style="font-family: 'JetBrains Mono', monospace; font-size: 0.62rem; color: #3a3f5c;">{scale.to_owned()}</div>
                                    {rivers}
                                </div>
                            }
                        })
                        .collect_view();
                    view! {
                        <details open=true style="padding: 2px 0 2px 8px;">
                            <summary style="cursor: pointer; font-size: 0.78rem; color: #9a9590;">{prefecture.to_owned()}</summary>
                            {scales}
                        </details>
                    }
                })
                .collect_view();
            view! {
                <div style="padding: 4px 12px 8px;">
                    <div style="font-family: 'Inter', system-ui, sans-serif; font-size: 0.82rem; font-weight: 600; color: #e2e0d8; padding: 4px 8px;">{category.to_owned()}</div>
                    {prefectures}
                </div>
            }
        })
        .collect_view()
}

#[component]
fn RiverRow(target: SelectedRiver, context: RiverContext) -> impl IntoView {
    let label = target.river.clone();
    let watched = target.clone();
    let is_selected = move || context.selected_river.with(|s| s.as_ref() == Some(&watched));
    let on_click = move |_| {
        context.select_river(&target.category, &target.prefecture, &target.scale, &target.river);
    };

    view! {
        <div
            style=move || {
                if is_selected() {
                    "padding: 3px 10px; margin: 1px 0; border-radius: 4px; cursor: pointer; font-size: 0.78rem; color: #f5c542; background: #1a1d2a; border-left: 2px solid #f5c542;"
                } else {
                    "padding: 3px 10px; margin: 1px 0; border-radius: 4px; cursor: pointer; font-size: 0.78rem; color: #e2e0d8; border-left: 2px solid transparent;"
                }
            }
            on:click=on_click
        >
            {label}
        </div>
    }
}

#[component]
fn LayerList(context: RiverContext, layers: LoadedLayers) -> impl IntoView {
    let LoadedLayers(loaded) = layers;
    let is_empty = move || loaded.with(|l| l.is_empty());

    view! {
        <div style="padding: 0 12px 8px;">
            <Show when=is_empty>
                <div style="padding: 4px 8px; font-size: 0.72rem; color: #5a5860;">"Select a river to load it."</div>
            </Show>
            <For
                each=move || loaded.with(|l| l.values().cloned().collect::<Vec<_>>())
                key=|river| river.id.clone()
                children=move |river| {
                    let toggle_id = river.id.clone();
                    let watched_id = river.id.clone();
                    let checked = move || context.visible_layers.with(|v| v.is_visible(&watched_id));
                    view! {
                        <label style="display: flex; align-items: center; gap: 8px; padding: 4px 8px; cursor: pointer; font-size: 0.78rem; color: #e2e0d8;">
                            <input
                                type="checkbox"
                                prop:checked=checked
                                on:change=move |_| context.toggle_layer_visibility(&toggle_id)
                            />
                            <span>{river.river.clone()}</span>
                            <span style="margin-left: auto; font-family: 'JetBrains Mono', monospace; font-size: 0.62rem; color: #5a5860;">{river.scale.clone()}</span>
                        </label>
                    }
                }
            />
        </div>
    }
}
