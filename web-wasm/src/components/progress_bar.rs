//! プログレスバーコンポーネント

use leptos::prelude::*;
use pegboard_common::Progress;

#[component]
pub fn ProgressBar(progress: Signal<Progress>) -> impl IntoView {
    view! {
        <div class="progress-container">
            <div class="progress-bar">
                <div
                    id="progress-bar"
                    class="progress-fill"
                    style=move || format!("width: {}%", progress.get().percent())
                />
            </div>
            <p id="progress-count" class="progress-text">
                {move || progress.get().to_string()}
            </p>
        </div>
    }
}
