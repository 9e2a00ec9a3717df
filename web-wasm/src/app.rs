//! メインアプリケーションコンポーネント
//!
//! 状態は `Session`（店舗・ベイ・強調予約）と `CompletionTracker`（完了済み）の
//! 2つのシグナルに集約する。盤面の座標はすべて `Session` が計算する。

use crate::api::loader::load_dataset;
use crate::api::storage::LocalStore;
use crate::components::{
    bay_nav::BayNav, board::Board, header::Header, pdf_modal::PdfModal,
    progress_bar::ProgressBar, scanner_modal::ScannerModal, search_bar::SearchBar,
    store_modal::StoreModal,
};
use crate::gesture::Swipe;
use crate::scanner;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use leptos::leptos_dom::helpers::request_animation_frame;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pegboard_common::storage::clear_last_store;
use pegboard_common::{
    CompletionTracker, Dataset, Highlight, Session, ViewConfig, HIGHLIGHT_DURATION_MS,
};
use std::sync::Arc;
use web_sys::{ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};

/// データの読み込み状態
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// 現在のウィンドウ幅での表示条件
fn current_view() -> ViewConfig {
    let mut view = ViewConfig::default();
    if let Some(width) = web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|w| w.as_f64())
    {
        view.viewport_width = width;
    }
    view
}

/// 強調した商品を画面中央へ
fn scroll_to_item(normalized_code: &str) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let selector = format!("[data-upc=\"{}\"]", normalized_code);
    if let Ok(Some(element)) = document.query_selector(&selector) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Center);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

/// カメラを開けなかったときはモーダルを閉じ、表示するメッセージを返す
fn camera_failure(set_scanner_open: WriteSignal<bool>, detail: &str) -> String {
    set_scanner_open.set(false);
    format!("Camera unavailable: {}", detail)
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let (load_state, set_load_state) = signal(LoadState::Loading);
    let dataset = RwSignal::new(None::<Arc<Dataset>>);
    let session = RwSignal::new(None::<Session>);
    let tracker = RwSignal::new(CompletionTracker::load(LocalStore));

    let (store_modal_open, set_store_modal_open) = signal(false);
    let (store_error, set_store_error) = signal(None::<String>);
    let (scanner_open, set_scanner_open) = signal(false);
    let (pdf_url, set_pdf_url) = signal(None::<String>);
    let (search_term, set_search_term) = signal(String::new());

    // 起動: 3リソースを読み、保存済みの店舗があれば復元
    spawn_local(async move {
        match load_dataset().await {
            Ok(loaded) => {
                let loaded = Arc::new(loaded);
                for issue in &loaded.issues {
                    gloo::console::warn!(issue.to_string());
                }
                match Session::restore(Arc::clone(&loaded), current_view(), &LocalStore) {
                    Some(restored) => session.set(Some(restored)),
                    None => set_store_modal_open.set(true),
                }
                dataset.set(Some(loaded));
                set_load_state.set(LoadState::Ready);
            }
            Err(e) => {
                gloo::console::error!(e.to_string());
                set_load_state.set(LoadState::Failed(e.to_string()));
            }
        }
    });

    // ウィンドウ幅が変わったら再レイアウト
    if let Some(window) = web_sys::window() {
        EventListener::new(&window, "resize", move |_| {
            let width = current_view().viewport_width;
            session.update(|s| {
                if let Some(s) = s {
                    s.resize(width);
                }
            });
        })
        .forget();
    }

    // 強調予約があれば、その世代が描画された次のフレームで強調する
    Effect::new(move |_| {
        let generation = session.with(|s| {
            s.as_ref()
                .and_then(|s| s.pending_ticket().map(|_| s.generation()))
        });
        let Some(generation) = generation else {
            return;
        };

        request_animation_frame(move || {
            let mut result = None;
            session.update(|s| {
                if let Some(s) = s {
                    tracker.update_untracked(|t| result = Some(s.render_complete(generation, t)));
                }
            });
            tracker.notify();

            match result {
                Some(Ok(Some(Highlight { ticket, .. }))) => {
                    scroll_to_item(&ticket.code);
                    let ticket_id = ticket.id;
                    Timeout::new(HIGHLIGHT_DURATION_MS, move || {
                        session.update(|s| {
                            if let Some(s) = s {
                                s.clear_highlight(ticket_id);
                            }
                        });
                    })
                    .forget();
                }
                Some(Err(e)) => gloo::console::error!(e.to_string()),
                _ => {}
            }
        });
    });

    // ============================================
    // ハンドラ
    // ============================================

    let select_store = move |store_id: String| {
        let Some(loaded) = dataset.get_untracked() else {
            return;
        };
        let mut kv = LocalStore;
        match Session::select(loaded, &store_id, current_view(), &mut kv) {
            Ok(opened) => {
                session.set(Some(opened));
                set_search_term.set(String::new());
                set_store_error.set(None);
                set_store_modal_open.set(false);
            }
            Err(e) => set_store_error.set(Some(e.to_string())),
        }
    };

    let change_store = move |_: ()| {
        scanner::close();
        set_scanner_open.set(false);
        if let Err(e) = clear_last_store(&mut LocalStore) {
            gloo::console::error!(e.to_string());
        }
        session.set(None);
        set_search_term.set(String::new());
        set_store_error.set(None);
        set_store_modal_open.set(true);
    };

    let go_to_bay = move |bay: u32| {
        let mut changed = false;
        session.update(|s| {
            if let Some(s) = s {
                changed = s.go_to(bay).is_changed();
            }
        });
        if changed {
            set_search_term.set(String::new());
        }
    };

    let prev_bay = move |_: ()| {
        let mut changed = false;
        session.update(|s| {
            if let Some(s) = s {
                changed = s.prev().is_changed();
            }
        });
        if changed {
            set_search_term.set(String::new());
        }
    };

    let next_bay = move |_: ()| {
        let mut changed = false;
        session.update(|s| {
            if let Some(s) = s {
                changed = s.next().is_changed();
            }
        });
        if changed {
            set_search_term.set(String::new());
        }
    };

    // 左スワイプで次、右スワイプで前（端では動かない）
    let swipe = move |direction: Swipe| match direction {
        Swipe::Left => next_bay(()),
        Swipe::Right => prev_bay(()),
    };

    let toggle = move |code: String| {
        tracker.update(|t| {
            if let Err(e) = t.toggle(&code) {
                gloo::console::error!(e.to_string());
            }
        });
    };

    let search = move |term: String| {
        session.update(|s| {
            if let Some(s) = s {
                s.search(&term);
            }
        });
        set_search_term.set(term);
    };

    let locate = move |code: String| {
        scanner::close();
        set_scanner_open.set(false);

        let mut outcome = None;
        session.update(|s| {
            if let Some(s) = s {
                outcome = Some(s.locate(&code));
            }
        });
        match outcome {
            Some(Ok(located)) => {
                if located.bay_switched {
                    set_search_term.set(String::new());
                }
            }
            Some(Err(e)) => gloo::dialogs::alert(&e.to_string()),
            None => {}
        }
    };

    let open_scanner = move |_: ()| {
        set_scanner_open.set(true);
        // モーダルの reader 要素が描画されてからカメラを開く
        request_animation_frame(move || {
            scanner::open(locate, move |message| {
                gloo::dialogs::alert(&camera_failure(set_scanner_open, &message));
            });
        });
    };

    let close_scanner = move |_: ()| {
        scanner::close();
        set_scanner_open.set(false);
    };

    let show_pdf = move |_: ()| {
        let target = session.with_untracked(|s| {
            s.as_ref()
                .map(|s| (s.pdf().map(String::from), s.planogram_id().to_string()))
        });
        match target {
            Some((Some(url), _)) => set_pdf_url.set(Some(url)),
            Some((None, planogram_id)) => {
                gloo::dialogs::alert(&format!("PDF not available for POG {}", planogram_id))
            }
            None => {}
        }
    };

    // ============================================
    // 派生シグナル
    // ============================================

    let store_id = Signal::derive(move || {
        session.with(|s| s.as_ref().map(|s| s.store_id().to_string()))
    });
    let planogram_id = Signal::derive(move || {
        session.with(|s| s.as_ref().map(|s| s.planogram_id().to_string()))
    });
    let bays = Signal::derive(move || {
        session.with(|s| {
            s.as_ref()
                .map(|s| s.navigator().bays().to_vec())
                .unwrap_or_default()
        })
    });
    let current_bay = Signal::derive(move || session.with(|s| s.as_ref().map(|s| s.current_bay())));
    let progress = Signal::derive(move || {
        session.with(|s| {
            s.as_ref()
                .map(|s| tracker.with(|t| s.bay_progress(t)))
                .unwrap_or_default()
        })
    });
    let match_count = Signal::derive(move || {
        session.with(|s| {
            s.as_ref().and_then(|s| {
                let filter = s.search_filter();
                filter.is_active().then(|| filter.match_count())
            })
        })
    });

    view! {
        <div class="app">
            <Header
                store_id=store_id
                planogram_id=planogram_id
                on_scan=open_scanner
                on_pdf=show_pdf
                on_change_store=change_store
            />

            <main class="main-content">
                {move || match load_state.get() {
                    LoadState::Loading => view! {
                        <p class="status">"Loading planogram data..."</p>
                    }.into_any(),
                    LoadState::Failed(message) => view! {
                        <p class="status error">{format!("Failed to load data: {}", message)}</p>
                    }.into_any(),
                    LoadState::Ready => view! {
                        <Show when=move || session.with(|s| s.is_some())>
                            <ProgressBar progress=progress />
                            <BayNav
                                bays=bays
                                current=current_bay
                                on_select=go_to_bay
                                on_prev=prev_bay
                                on_next=next_bay
                            />
                            <SearchBar term=search_term on_input=search match_count=match_count />
                            <Board session=session tracker=tracker on_toggle=toggle on_swipe=swipe />
                        </Show>
                    }.into_any(),
                }}
            </main>

            <Show when=move || store_modal_open.get()>
                <StoreModal error=store_error on_submit=select_store />
            </Show>

            <Show when=move || scanner_open.get()>
                <ScannerModal on_locate=locate on_close=close_scanner />
            </Show>

            {move || pdf_url.get().map(|url| view! {
                <PdfModal url=url on_close=move |_| set_pdf_url.set(None) />
            })}
        </div>
    }
}
