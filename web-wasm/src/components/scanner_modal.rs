//! バーコードスキャンのモーダル
//!
//! カメラが使えない場合に備えてコードの手入力も受け付ける。

use crate::scanner::READER_ELEMENT_ID;
use leptos::prelude::*;

#[component]
pub fn ScannerModal<FL, FC>(on_locate: FL, on_close: FC) -> impl IntoView
where
    FL: Fn(String) + 'static + Clone,
    FC: Fn(()) + 'static + Clone,
{
    let (manual, set_manual) = signal(String::new());

    let submit = move || {
        let code = manual.get_untracked().trim().to_string();
        if !code.is_empty() {
            set_manual.set(String::new());
            on_locate(code);
        }
    };
    let submit_on_enter = submit.clone();

    view! {
        <div id="scanner-modal" class="modal">
            <div class="modal-content">
                <div id=READER_ELEMENT_ID class="reader" />
                <div class="manual-entry">
                    <input
                        type="text"
                        inputmode="numeric"
                        placeholder="UPCを入力..."
                        prop:value=move || manual.get()
                        on:input=move |ev| set_manual.set(event_target_value(&ev))
                        on:keydown=move |ev| {
                            if ev.key() == "Enter" {
                                submit_on_enter();
                            }
                        }
                    />
                    <button class="btn btn-primary" on:click=move |_| submit()>"Find"</button>
                </div>
                <button class="btn btn-tertiary" on:click=move |_| on_close(())>"Close"</button>
            </div>
        </div>
    }
}
