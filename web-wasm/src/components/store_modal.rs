//! 店舗番号の入力モーダル

use leptos::prelude::*;

#[component]
pub fn StoreModal<F>(error: ReadSignal<Option<String>>, on_submit: F) -> impl IntoView
where
    F: Fn(String) + 'static + Clone,
{
    let (input, set_input) = signal(String::new());

    let submit = {
        let on_submit = on_submit.clone();
        move || {
            let value = input.get_untracked().trim().to_string();
            if !value.is_empty() {
                on_submit(value);
            }
        }
    };
    let submit_on_enter = submit.clone();

    view! {
        <div id="store-modal" class="modal">
            <div class="modal-content">
                <h2>"Enter Store Number"</h2>
                <input
                    type="text"
                    id="store-input"
                    inputmode="numeric"
                    prop:value=move || input.get()
                    on:input=move |ev| set_input.set(event_target_value(&ev))
                    on:keydown=move |ev| {
                        if ev.key() == "Enter" {
                            submit_on_enter();
                        }
                    }
                />
                <button id="btn-load-store" class="btn btn-primary" on:click=move |_| submit()>
                    "Load Store"
                </button>
                <Show when=move || error.get().is_some()>
                    <p id="error-msg" class="error">{move || error.get().unwrap_or_default()}</p>
                </Show>
            </div>
        </div>
    }
}
