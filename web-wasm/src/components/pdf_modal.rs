//! 棚割りPDFの表示

use leptos::prelude::*;

#[component]
pub fn PdfModal<F>(url: String, on_close: F) -> impl IntoView
where
    F: Fn(()) + 'static,
{
    view! {
        <div id="pdf-modal" class="modal modal-full">
            <div class="modal-content">
                <button class="btn btn-tertiary modal-close" on:click=move |_| on_close(())>"Close"</button>
                <iframe id="pdf-frame" src=url title="Planogram PDF" />
            </div>
        </div>
    }
}
