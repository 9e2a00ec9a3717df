//! 店舗セッション
//!
//! 店舗を選んでから別の店舗を選ぶまでの状態をまとめて持つ。
//! 表示中ベイ・レイアウト・検索・照合ハイライトはすべてここを通して変わる。
//!
//! 照合の流れ:
//! 1. `locate` がベイを切り替え、`HighlightTicket` を発行する（まだ強調しない）
//! 2. シェルは新しいレイアウトを画面に反映したら `render_complete(世代)` を呼ぶ
//! 3. 世代が一致すれば強調を開始し、未完了なら完了にする
//! 4. 一定時間後に `clear_highlight(チケットID)` で消す
//!
//! ベイ切替のたびに世代が進むので、古いレイアウトに対して強調が
//! 走ることはない。

use crate::completion::{CompletionTracker, Progress};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::layout::{BayLayout, BoardSpec, RectPx, DEFAULT_VIEWPORT_MARGIN_PX};
use crate::locate::{duplicate_codes, find_match};
use crate::navigator::{BayChange, BayNavigator};
use crate::search::SearchFilter;
use crate::storage::{load_last_store, save_last_store, KeyValueStore};
use crate::types::PlacementRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 強調表示の時間（ミリ秒）
pub const HIGHLIGHT_DURATION_MS: u32 = 2000;

/// 既定のビューポート幅（px）
pub const DEFAULT_VIEWPORT_WIDTH_PX: f64 = 800.0;

/// 表示条件
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    pub board: BoardSpec,
    pub viewport_width: f64,
    pub margin: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            board: BoardSpec::default(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH_PX,
            margin: DEFAULT_VIEWPORT_MARGIN_PX,
        }
    }
}

impl ViewConfig {
    pub fn scale(&self) -> f64 {
        self.board.scale_for_viewport(self.viewport_width, self.margin)
    }
}

/// セッション状態のスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub current_store_id: String,
    pub current_planogram_id: String,
    pub current_bay: u32,
    pub ordered_bay_list: Vec<u32>,
}

/// 強調予約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightTicket {
    pub id: u64,
    /// このレイアウト世代が描画されたら強調する
    pub generation: u64,
    /// 正規化コード
    pub code: String,
    pub bay: u32,
}

/// 照合結果
#[derive(Debug, Clone, PartialEq)]
pub struct LocateOutcome {
    pub record: PlacementRecord,
    pub bay_switched: bool,
    pub ticket: HighlightTicket,
}

/// 開始した強調
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub ticket: HighlightTicket,
    pub rect: RectPx,
    /// この強調で新たに完了にした
    pub newly_completed: bool,
}

/// 店舗セッション
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Arc<Dataset>,
    store_id: String,
    planogram_id: String,
    view: ViewConfig,
    navigator: BayNavigator,
    generation: u64,
    layout: BayLayout,
    search: SearchFilter,
    pending: Option<HighlightTicket>,
    active: Option<HighlightTicket>,
    next_ticket: u64,
}

impl Session {
    /// 店舗番号でセッションを開く
    ///
    /// # Errors
    /// - 対応表にない店舗: `StoreNotFound`
    /// - 棚割りにレコードがない: `NoBaysForPlanogram`
    pub fn open(dataset: Arc<Dataset>, store_id: &str, view: ViewConfig) -> Result<Self> {
        let store_id = store_id.trim().to_string();
        let planogram_id = dataset.planogram_for_store(&store_id)?.to_string();
        let bays = dataset.bays_for_planogram(&planogram_id)?;
        let navigator = BayNavigator::new(bays)
            .ok_or_else(|| Error::NoBaysForPlanogram(planogram_id.clone()))?;

        let duplicates = duplicate_codes(dataset.records_for_planogram(&planogram_id));
        if !duplicates.is_empty() {
            tracing::warn!(
                planogram = %planogram_id,
                codes = ?duplicates,
                "duplicate UPCs in planogram, locate uses the first occurrence"
            );
        }

        let layout = BayLayout::compute(
            dataset.records_for_bay(&planogram_id, navigator.current()),
            navigator.current(),
            &view.board,
            view.scale(),
            0,
        );

        tracing::info!(store = %store_id, planogram = %planogram_id, bays = navigator.bays().len(), "session opened");

        Ok(Self {
            dataset,
            store_id,
            planogram_id,
            view,
            navigator,
            generation: 0,
            layout,
            search: SearchFilter::default(),
            pending: None,
            active: None,
            next_ticket: 1,
        })
    }

    /// 店舗を選択し、最後に選んだ店舗として保存する
    pub fn select(
        dataset: Arc<Dataset>,
        store_id: &str,
        view: ViewConfig,
        kv: &mut impl KeyValueStore,
    ) -> Result<Self> {
        let session = Self::open(dataset, store_id, view)?;
        save_last_store(kv, &session.store_id)?;
        Ok(session)
    }

    /// 保存済みの店舗でセッションを復元する
    ///
    /// 保存がない、または対応表から消えていれば None。
    pub fn restore(dataset: Arc<Dataset>, view: ViewConfig, kv: &impl KeyValueStore) -> Option<Self> {
        let store_id = load_last_store(kv)?;
        match Self::open(dataset, &store_id, view) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(store = %store_id, error = %e, "saved store can no longer be opened");
                None
            }
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn store_id(&self) -> &str {
        &self.store_id
    }

    pub fn planogram_id(&self) -> &str {
        &self.planogram_id
    }

    pub fn navigator(&self) -> &BayNavigator {
        &self.navigator
    }

    pub fn current_bay(&self) -> u32 {
        self.navigator.current()
    }

    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    /// 現在のレイアウト世代
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 表示中ベイの描画データ
    pub fn bay_layout(&self) -> &BayLayout {
        &self.layout
    }

    pub fn search_filter(&self) -> &SearchFilter {
        &self.search
    }

    /// 描画待ちの強調予約
    pub fn pending_ticket(&self) -> Option<&HighlightTicket> {
        self.pending.as_ref()
    }

    /// 強調中の予約
    pub fn active_highlight(&self) -> Option<&HighlightTicket> {
        self.active.as_ref()
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            current_store_id: self.store_id.clone(),
            current_planogram_id: self.planogram_id.clone(),
            current_bay: self.navigator.current(),
            ordered_bay_list: self.navigator.bays().to_vec(),
        }
    }

    /// 表示中ベイのレコード（読み込み順）
    pub fn current_records(&self) -> impl Iterator<Item = &PlacementRecord> {
        self.dataset
            .records_for_bay(&self.planogram_id, self.navigator.current())
    }

    // ============================================
    // ベイ移動
    // ============================================

    pub fn next(&mut self) -> BayChange {
        let change = self.navigator.next();
        self.after_bay_change(change);
        change
    }

    pub fn prev(&mut self) -> BayChange {
        let change = self.navigator.prev();
        self.after_bay_change(change);
        change
    }

    pub fn go_to(&mut self, bay: u32) -> BayChange {
        let change = self.navigator.go_to(bay);
        self.after_bay_change(change);
        change
    }

    /// ビューポート幅の変更。ベイ・検索はそのまま、世代だけ進める
    pub fn resize(&mut self, viewport_width: f64) {
        self.view.viewport_width = viewport_width;
        self.relayout();
        if self.search.is_active() {
            let term = self.search.term().to_string();
            self.search = SearchFilter::apply(&self.layout, &term);
        }
    }

    fn after_bay_change(&mut self, change: BayChange) {
        if change.is_changed() {
            self.active = None;
            self.search = SearchFilter::default();
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        self.generation += 1;
        let bay = self.navigator.current();
        self.layout = BayLayout::compute(
            self.dataset.records_for_bay(&self.planogram_id, bay),
            bay,
            &self.view.board,
            self.view.scale(),
            self.generation,
        );

        // 同じベイの予約は新しい世代の描画を待つ。別ベイの予約は捨てる
        let generation = self.generation;
        self.pending = self.pending.take().and_then(|mut ticket| {
            if ticket.bay == bay {
                ticket.generation = generation;
                Some(ticket)
            } else {
                tracing::debug!(ticket = ticket.id, "dropping highlight for another bay");
                None
            }
        });
    }

    // ============================================
    // 照合
    // ============================================

    /// スキャン・入力コードを棚割り全体から探す
    ///
    /// 見つかればそのベイへ移動し、強調予約を返す。強調そのものは
    /// `render_complete` で始まる。見つからなければ状態は変えない。
    pub fn locate(&mut self, raw_code: &str) -> Result<LocateOutcome> {
        let dataset = Arc::clone(&self.dataset);
        let record = find_match(dataset.records_for_planogram(&self.planogram_id), raw_code)
            .record()
            .cloned()
            .ok_or_else(|| Error::ScanNotFound(raw_code.trim().to_string()))?;

        let change = self.navigator.go_to(record.bay);
        self.after_bay_change(change);

        let ticket = HighlightTicket {
            id: self.next_ticket,
            generation: self.generation,
            code: record.normalized_code.clone(),
            bay: record.bay,
        };
        self.next_ticket += 1;

        if let Some(old) = self.pending.replace(ticket.clone()) {
            tracing::debug!(old = old.id, new = ticket.id, "pending highlight superseded");
        }
        tracing::debug!(upc = %record.normalized_code, bay = record.bay, switched = change.is_changed(), "located");

        Ok(LocateOutcome {
            record,
            bay_switched: change.is_changed(),
            ticket,
        })
    }

    /// 指定世代のレイアウトが画面に反映された
    ///
    /// 予約があり世代が一致すれば強調を始め、未完了なら完了にする。
    /// 古い世代の通知は無視する（予約は次の通知まで残る）。
    pub fn render_complete<S: KeyValueStore>(
        &mut self,
        generation: u64,
        tracker: &mut CompletionTracker<S>,
    ) -> Result<Option<Highlight>> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "stale render notification");
            return Ok(None);
        }
        let Some(ticket) = self.pending.take() else {
            return Ok(None);
        };
        if ticket.generation != generation {
            tracing::debug!(ticket = ticket.id, "dropping highlight for an old layout");
            return Ok(None);
        }

        let Some(item) = self.layout.item(&ticket.code) else {
            // 座標不正で描画されていない
            tracing::warn!(upc = %ticket.code, bay = ticket.bay, "located item is not drawn, nothing to highlight");
            return Ok(None);
        };
        let rect = item.geometry.rect;

        let newly_completed = tracker.mark_done(&ticket.code)?;
        self.active = Some(ticket.clone());

        Ok(Some(Highlight {
            ticket,
            rect,
            newly_completed,
        }))
    }

    /// 強調を消す。そのチケットがまだ強調中のときだけ消える
    pub fn clear_highlight(&mut self, ticket_id: u64) -> bool {
        match &self.active {
            Some(t) if t.id == ticket_id => {
                self.active = None;
                true
            }
            _ => false,
        }
    }

    /// 正規化コードが強調中か
    pub fn is_highlighted(&self, normalized_code: &str) -> bool {
        self.active.as_ref().is_some_and(|t| t.code == normalized_code)
    }

    // ============================================
    // 検索
    // ============================================

    pub fn search(&mut self, term: &str) -> &SearchFilter {
        self.search = SearchFilter::apply(&self.layout, term);
        &self.search
    }

    pub fn clear_search(&mut self) {
        self.search = SearchFilter::default();
    }

    // ============================================
    // 進捗・参照資料
    // ============================================

    /// 表示中ベイの進捗
    pub fn bay_progress<S: KeyValueStore>(&self, tracker: &CompletionTracker<S>) -> Progress {
        tracker.progress(self.current_records())
    }

    /// 棚割り全体の進捗
    pub fn planogram_progress<S: KeyValueStore>(&self, tracker: &CompletionTracker<S>) -> Progress {
        tracker.progress(self.dataset.records_for_planogram(&self.planogram_id))
    }

    /// 棚割りPDFのパス
    pub fn pdf(&self) -> Option<&str> {
        self.dataset.file_index.pdf_for(&self.planogram_id)
    }

    /// 商品画像のパス
    pub fn image_for(&self, product_code: &str) -> Option<&str> {
        self.dataset.file_index.image_for(product_code)
    }
}
