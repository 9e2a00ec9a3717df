//! ベイ切り替えボタン

use leptos::prelude::*;

#[component]
pub fn BayNav<FG, FP, FN>(
    bays: Signal<Vec<u32>>,
    current: Signal<Option<u32>>,
    on_select: FG,
    on_prev: FP,
    on_next: FN,
) -> impl IntoView
where
    FG: Fn(u32) + 'static + Clone + Send + Sync,
    FP: Fn(()) + 'static + Clone,
    FN: Fn(()) + 'static + Clone,
{
    let is_first = move || current.get() == bays.with(|b| b.first().copied());
    let is_last = move || current.get() == bays.with(|b| b.last().copied());

    view! {
        <nav id="bay-nav" class="bay-nav">
            <button class="btn btn-small" disabled=is_first on:click=move |_| on_prev(())>"◀"</button>
            <For
                each=move || bays.get()
                key=|bay| *bay
                children=move |bay| {
                    let on_select = on_select.clone();
                    view! {
                        <button
                            class="bay-btn"
                            class:active=move || current.get() == Some(bay)
                            on:click=move |_| on_select(bay)
                        >
                            {format!("Bay {}", bay)}
                        </button>
                    }
                }
            />
            <button class="btn btn-small" disabled=is_last on:click=move |_| on_next(())>"▶"</button>
        </nav>
    }
}
