//! ペグボード盤面
//!
//! 座標は `BayLayout` のものをそのまま使う。ここでは計算しない。

use crate::api::storage::LocalStore;
use crate::gesture::{swipe_direction, Swipe, SWIPE_THRESHOLD_PX};
use leptos::prelude::*;
use pegboard_common::{CompletionTracker, PegGeometry, Session};

/// 描画用の1商品
#[derive(Debug, Clone, PartialEq)]
struct BoxView {
    key: (u64, usize),
    code: String,
    product_code: String,
    description: String,
    image: Option<String>,
    geometry: PegGeometry,
}

fn box_views(session: &Session) -> Vec<BoxView> {
    let layout = session.bay_layout();
    layout
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| BoxView {
            key: (layout.generation, i),
            code: item.record.normalized_code.clone(),
            product_code: item.record.product_code.clone(),
            description: item.record.description.clone(),
            image: session.image_for(&item.record.product_code).map(String::from),
            geometry: item.geometry,
        })
        .collect()
}

fn box_style(geometry: &PegGeometry) -> String {
    let rect = &geometry.rect;
    format!(
        "left: {}px; top: {}px; width: {}px; height: {}px;",
        rect.left, rect.top, rect.width, rect.height
    )
}

/// タッチイベントの最初の接触点
fn touch_point(ev: &web_sys::TouchEvent) -> Option<(f64, f64)> {
    ev.changed_touches()
        .get(0)
        .map(|t| (t.client_x() as f64, t.client_y() as f64))
}

#[component]
pub fn Board<F, FS>(
    session: RwSignal<Option<Session>>,
    tracker: RwSignal<CompletionTracker<LocalStore>>,
    on_toggle: F,
    on_swipe: FS,
) -> impl IntoView
where
    F: Fn(String) + 'static + Clone + Send + Sync,
    FS: Fn(Swipe) + 'static + Send + Sync,
{
    let touch_start = RwSignal::new(None::<(f64, f64)>);

    let board_style = move || {
        session.with(|s| {
            s.as_ref()
                .map(|s| {
                    let board = s.bay_layout().board;
                    format!("width: {}px; height: {}px;", board.width, board.height)
                })
                .unwrap_or_default()
        })
    };

    view! {
        <div
            class="board-scroll"
            on:touchstart=move |ev| touch_start.set(touch_point(&ev))
            on:touchend=move |ev| {
                let start = touch_start.get_untracked();
                touch_start.set(None);
                if let (Some((x0, y0)), Some((x1, y1))) = (start, touch_point(&ev)) {
                    if let Some(swipe) = swipe_direction(x1 - x0, y1 - y0, SWIPE_THRESHOLD_PX) {
                        on_swipe(swipe);
                    }
                }
            }
        >
            <div id="grid-view-container" class="board" style=board_style>
                <For
                    each=move || session.with(|s| s.as_ref().map(box_views).unwrap_or_default())
                    key=|b| b.key
                    children=move |b: BoxView| {
                        let on_toggle = on_toggle.clone();
                        let code = b.code.clone();
                        let class_code = b.code.clone();
                        let class = move || {
                            let mut class = String::from("product-box");
                            if tracker.with(|t| t.is_done(&class_code)) {
                                class.push_str(" completed");
                            }
                            session.with(|s| {
                                if let Some(s) = s {
                                    if s.is_highlighted(&class_code) {
                                        class.push_str(" highlight");
                                    }
                                    let filter = s.search_filter();
                                    if filter.is_match(&class_code) {
                                        class.push_str(" matched");
                                    } else if filter.is_dimmed(&class_code) {
                                        class.push_str(" dimmed");
                                    }
                                }
                            });
                            class
                        };
                        let defaulted = b.geometry.used_default_width || b.geometry.used_default_height;
                        let dot_style = format!(
                            "left: {}px; top: {}px;",
                            b.geometry.support.x, b.geometry.support.y
                        );
                        let label = b.product_code.clone();

                        view! {
                            <div class="frog-dot" style=dot_style />
                            <div
                                class=class
                                class:defaulted=defaulted
                                style=box_style(&b.geometry)
                                data-upc=b.code.clone()
                                title=b.description.clone()
                                on:click=move |_| on_toggle(code.clone())
                            >
                                {match b.image.clone() {
                                    Some(src) => view! { <img src=src loading="lazy" alt=label /> }.into_any(),
                                    None => view! { <span class="upc-label">{label}</span> }.into_any(),
                                }}
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}
