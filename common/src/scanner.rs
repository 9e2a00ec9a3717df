//! バーコードスキャナーの状態管理
//!
//! カメラ本体の操作は各シェル（ブラウザなど）が行う。ここでは
//! - 1回のスキャンで受け付けるデコード結果は最初の1件だけ
//! - 開いたカメラはどの経路で抜けても必ず解放する
//! の2点を型で保証する。

use crate::error::{Error, Result};

/// 開いているカメラ入力
pub trait CameraFeed {
    /// カメラを停止して資源を返す
    fn release(&mut self);
}

/// カメラの貸し出し。drop 時に必ず解放する
pub struct CameraLease<F: CameraFeed> {
    feed: Option<F>,
}

impl<F: CameraFeed> CameraLease<F> {
    /// カメラを開く。失敗は `CameraAccess` にする
    pub fn acquire<E: std::fmt::Display>(open: impl FnOnce() -> std::result::Result<F, E>) -> Result<Self> {
        match open() {
            Ok(feed) => Ok(Self { feed: Some(feed) }),
            Err(e) => Err(Error::CameraAccess(e.to_string())),
        }
    }

    /// 既に開いたカメラを預かる
    pub fn new(feed: F) -> Self {
        Self { feed: Some(feed) }
    }

    pub fn feed(&self) -> Option<&F> {
        self.feed.as_ref()
    }

    /// 明示的に解放する
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.release();
            tracing::debug!("camera released");
        }
    }
}

impl<F: CameraFeed> Drop for CameraLease<F> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// スキャンの受付状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScannerState {
    #[default]
    Idle,
    Scanning { session: u64 },
}

/// デコード結果の受付ゲート
///
/// カメラは毎フレームのようにデコード結果を送ってくる。最初の1件で
/// スキャンを閉じ、それ以降（前回セッションの遅れた通知を含む）は捨てる。
#[derive(Debug, Clone, Default)]
pub struct ScannerGate {
    state: ScannerState,
    sessions: u64,
}

impl ScannerGate {
    /// スキャン開始。セッション番号を返す
    pub fn start(&mut self) -> u64 {
        self.sessions += 1;
        self.state = ScannerState::Scanning {
            session: self.sessions,
        };
        self.sessions
    }

    /// デコード結果を受け付ける。受け付けたらスキャンを閉じる
    pub fn accept(&mut self, session: u64, decoded: &str) -> Option<String> {
        match self.state {
            ScannerState::Scanning { session: current } if current == session => {
                let code = decoded.trim();
                if code.is_empty() {
                    return None;
                }
                self.state = ScannerState::Idle;
                Some(code.to_string())
            }
            _ => {
                tracing::debug!(session, "ignoring decode outside active scan");
                None
            }
        }
    }

    /// スキャンを閉じる（キャンセル・エラー時）
    pub fn stop(&mut self) {
        self.state = ScannerState::Idle;
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, ScannerState::Scanning { .. })
    }
}
