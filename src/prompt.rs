//! 対話式の店舗選択
//!
//! 保存済みの店舗がないときだけ使う。見つからない店舗番号は
//! エラーを表示して入力し直してもらう。

use crate::error::{PegboardError, Result};
use dialoguer::Input;
use pegboard_common::{Dataset, Error, KeyValueStore, Session, ViewConfig};
use std::sync::Arc;

/// 候補として表示する店舗数
const CANDIDATE_LIMIT: usize = 10;

/// 対話アクション
#[derive(Debug, PartialEq, Eq)]
pub enum StoreAction {
    /// 店舗番号を入力
    Select(String),
    /// 中止
    Quit,
}

/// 入力文字列を解釈
pub fn parse_store_input(input: &str) -> StoreAction {
    match input.trim() {
        "" | "q" | "Q" => StoreAction::Quit,
        id => StoreAction::Select(id.to_string()),
    }
}

/// 店舗番号を尋ねてセッションを開く（選んだ店舗は保存する）
pub fn prompt_store_session(
    dataset: Arc<Dataset>,
    view: ViewConfig,
    kv: &mut impl KeyValueStore,
) -> Result<Session> {
    let stores = dataset.store_ids();
    println!("🏬 店舗番号を入力してください（{}店舗）", stores.len());
    if !stores.is_empty() {
        let shown: Vec<&str> = stores.iter().take(CANDIDATE_LIMIT).copied().collect();
        let more = if stores.len() > CANDIDATE_LIMIT { ", ..." } else { "" };
        println!("  候補: {}{}", shown.join(", "), more);
    }

    loop {
        let input: String = Input::new()
            .with_prompt("店舗番号 (q:終了)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PegboardError::Prompt(e.to_string()))?;

        let store_id = match parse_store_input(&input) {
            StoreAction::Quit => return Err(PegboardError::NoStoreSelected),
            StoreAction::Select(id) => id,
        };

        match Session::select(Arc::clone(&dataset), &store_id, view, kv) {
            Ok(session) => return Ok(session),
            Err(e @ (Error::StoreNotFound(_) | Error::NoBaysForPlanogram(_))) => {
                println!("⚠ {}", e);
            }
            Err(e) => return Err(e.into()),
        }
    }
}
