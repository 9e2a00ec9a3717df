//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header<FS, FP, FR>(
    store_id: Signal<Option<String>>,
    planogram_id: Signal<Option<String>>,
    on_scan: FS,
    on_pdf: FP,
    on_change_store: FR,
) -> impl IntoView
where
    FS: Fn(()) + 'static + Clone,
    FP: Fn(()) + 'static + Clone,
    FR: Fn(()) + 'static + Clone,
{
    view! {
        <header class="header">
            <div class="header-info">
                <h1 id="store-display">
                    {move || store_id.get().map(|id| format!("Store #{}", id)).unwrap_or_else(|| "Pegboard Restock".into())}
                </h1>
                <span id="pog-display" class="text-muted">
                    {move || planogram_id.get().map(|id| format!("POG: {}", id)).unwrap_or_default()}
                </span>
            </div>
            <div class="header-actions">
                <button class="btn btn-primary" on:click=move |_| on_scan(())>"Scan"</button>
                <button class="btn btn-secondary" on:click=move |_| on_pdf(())>"PDF"</button>
                <button class="btn btn-tertiary" on:click=move |_| on_change_store(())>"Change Store"</button>
            </div>
        </header>
    }
}
