//! カメラスキャナー（html5-qrcode ブリッジ）
//!
//! カメラは `CameraLease` が持ち、閉じる・失敗する・デコードする、の
//! どの経路でも解放される。デコード結果は `ScannerGate` を通し、
//! 1回のスキャンにつき最初の1件だけを受け付ける。

use crate::api::loader::js_error_text;
use pegboard_common::scanner::ScannerState;
use pegboard_common::{CameraFeed, CameraLease, ScannerGate};
use std::cell::RefCell;
use std::future::Future;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};

/// カメラ映像を描画する要素の id
pub const READER_ELEMENT_ID: &str = "reader";

#[wasm_bindgen(module = "/js/scanner.js")]
extern "C" {
    #[wasm_bindgen(js_name = "startScanner", catch)]
    async fn start_scanner_js(
        element_id: &str,
        on_decoded: &Closure<dyn FnMut(String)>,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_name = "stopScanner")]
    fn stop_scanner_js(scanner: &JsValue) -> js_sys::Promise;
}

/// 起動済みの html5-qrcode インスタンス
struct JsScanner {
    handle: JsValue,
    // スキャナーが止まるまでコールバックを生かしておく
    on_decoded: Option<Closure<dyn FnMut(String)>>,
}

impl CameraFeed for JsScanner {
    fn release(&mut self) {
        let stopped = JsFuture::from(stop_scanner_js(&self.handle));
        // 停止完了までは html5-qrcode がまだコールバックを呼びうる
        spawn_local(hold_until(stopped, self.on_decoded.take()));
    }
}

/// `settled` が終わるまで `value` を破棄しない
async fn hold_until<T>(settled: impl Future, value: T) {
    settled.await;
    drop(value);
}

#[derive(Default)]
struct Scanner {
    gate: ScannerGate,
    lease: Option<CameraLease<JsScanner>>,
}

thread_local! {
    static STATE: RefCell<Scanner> = RefCell::new(Scanner::default());
}

/// スキャンを開始する
///
/// `on_decoded` は受け付けたコードで1回だけ呼ばれる。カメラを開けなければ
/// `on_error` にメッセージを渡す。
pub fn open<D, E>(on_decoded: D, on_error: E)
where
    D: Fn(String) + Clone + 'static,
    E: Fn(String) + 'static,
{
    close();
    let session = STATE.with(|s| s.borrow_mut().gate.start());

    let closure = Closure::<dyn FnMut(String)>::new(move |text: String| {
        let accepted = STATE.with(|s| s.borrow_mut().gate.accept(session, &text));
        if let Some(code) = accepted {
            let on_decoded = on_decoded.clone();
            // コールバック実行中に自分自身を破棄しないよう次のタスクで閉じる
            spawn_local(async move {
                close();
                on_decoded(code);
            });
        }
    });

    spawn_local(async move {
        let opened = start_scanner_js(READER_ELEMENT_ID, &closure).await;
        let lease = CameraLease::acquire(move || {
            opened
                .map(|handle| JsScanner {
                    handle,
                    on_decoded: Some(closure),
                })
                .map_err(|e| js_error_text(&e))
        });

        match lease {
            Ok(lease) => {
                let unwanted = STATE.with(|s| {
                    let mut state = s.borrow_mut();
                    if matches!(state.gate.state(), ScannerState::Scanning { session: current } if current == session) {
                        state.lease = Some(lease);
                        None
                    } else {
                        Some(lease)
                    }
                });
                // 起動待ちの間に閉じられていたら即解放
                drop(unwanted);
            }
            Err(e) => {
                STATE.with(|s| s.borrow_mut().gate.stop());
                gloo::console::error!(e.to_string());
                on_error(e.to_string());
            }
        }
    });
}

/// スキャンを終了しカメラを解放する
pub fn close() {
    let lease = STATE.with(|s| {
        let mut state = s.borrow_mut();
        state.gate.stop();
        state.lease.take()
    });
    // RefCell の借用を外してから解放する
    drop(lease);
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::FutureExt;
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropCounter(Rc<Cell<u32>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_hold_until_keeps_value_until_settled() {
        let drops = Rc::new(Cell::new(0));
        let (tx, rx) = oneshot::channel::<()>();
        let mut held = Box::pin(hold_until(rx, DropCounter(Rc::clone(&drops))));

        // 停止がまだ終わっていない
        assert!(held.as_mut().now_or_never().is_none());
        assert_eq!(drops.get(), 0);

        tx.send(()).expect("送信失敗");
        assert!(held.as_mut().now_or_never().is_some());
        assert_eq!(drops.get(), 1);
    }
}
