//! 表示中ベイの検索

use leptos::prelude::*;

#[component]
pub fn SearchBar<F>(term: ReadSignal<String>, on_input: F, match_count: Signal<Option<usize>>) -> impl IntoView
where
    F: Fn(String) + 'static,
{
    view! {
        <div class="search-bar">
            <input
                type="search"
                id="search-input"
                placeholder="UPC・商品名で検索..."
                prop:value=move || term.get()
                on:input=move |ev| on_input(event_target_value(&ev))
            />
            <span class="search-count">
                {move || match_count.get().map(|n| format!("{}件", n)).unwrap_or_default()}
            </span>
        </div>
    }
}
