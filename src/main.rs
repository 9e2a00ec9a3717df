use clap::Parser;
use pegboard_common::storage::clear_last_store;
use pegboard_common::{CompletionTracker, Dataset, JsonFileStore, Session, ViewConfig};
use pegboard_restock::{cli, config, error, export, file_list, loader, prompt};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログレベルを上書きする環境変数
const LOG_ENV: &str = "PEGBOARD_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    let view = config.view_config();

    // データ不要のコマンド
    match &cli.command {
        Commands::Reset => {
            let mut kv = JsonFileStore::open(&Config::state_path()?);
            clear_last_store(&mut kv)?;
            println!("✔ 保存した店舗を消去しました");
            return Ok(());
        }

        Commands::Index { folder, output } => {
            println!("🗂 pegboard - ファイル一覧生成\n");
            let files = file_list::scan_assets(folder)?;
            let output = output
                .clone()
                .unwrap_or_else(|| folder.join(pegboard_common::FILE_INDEX_RESOURCE));
            file_list::write_file_list(&files, &output)?;
            println!("✔ {}件を出力: {}", files.len(), output.display());
            return Ok(());
        }

        Commands::Config { set_data_dir, show } => {
            if let Some(dir) = set_data_dir {
                config.set_data_dir(dir.clone())?;
                println!("✔ データフォルダを設定しました: {}", dir.display());
            }

            if *show || set_data_dir.is_none() {
                println!("設定:");
                println!("  データフォルダ: {}", config.data_dir().display());
                println!("  盤面: {}×{} 穴", config.board_width_holes, config.board_height_holes);
                println!("  ビューポート幅: {}px（余白 {}px）", config.viewport_width_px, config.viewport_margin_px);
                println!("  倍率: {:.2} px/穴", view.scale());
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
            return Ok(());
        }

        _ => {}
    }

    // 3リソースの読み込み（失敗は致命的）
    let data_dir = config.data_dir();
    let dataset = match loader::load_dataset(&data_dir).await {
        Ok(dataset) => Arc::new(dataset),
        Err(e) => {
            eprintln!("❌ データを読み込めませんでした（{}）", data_dir.display());
            return Err(e.into());
        }
    };
    if !dataset.issues.is_empty() && cli.verbose {
        println!("⚠ データの問題: {}件", dataset.issues.len());
        for issue in &dataset.issues {
            println!("  {}", issue);
        }
    }

    let mut kv = JsonFileStore::open(&Config::state_path()?);

    match cli.command {
        Commands::Stores => {
            for store in &dataset.stores {
                println!("{}\tPOG {}", store.store_id, store.planogram_id);
            }
        }

        Commands::Select { store } => {
            let session = Session::select(Arc::clone(&dataset), &store, view, &mut kv)?;
            println!("✔ 店舗 {} を選択しました（POG {}、ベイ {}個）",
                session.store_id(),
                session.planogram_id(),
                session.navigator().bays().len()
            );
        }

        Commands::Bays => {
            let session = open_session(&dataset, view, &mut kv)?;
            let tracker = CompletionTracker::load(kv.clone());
            println!("店舗 {} / POG {}", session.store_id(), session.planogram_id());
            for bay in session.navigator().bays() {
                let progress = tracker.progress(dataset.records_for_bay(session.planogram_id(), *bay));
                println!("  Bay {:>3}  {:>9}  {:>3}%", bay, progress.to_string(), progress.percent());
            }
        }

        Commands::Layout { bay, width, json } => {
            let mut session = open_session(&dataset, view, &mut kv)?;
            if let Some(width) = width {
                session.resize(width);
            }
            go_to_bay(&mut session, bay)?;
            let tracker = CompletionTracker::load(kv.clone());
            let layout = session.bay_layout();

            if json {
                println!("{}", serde_json::to_string_pretty(layout)?);
            } else {
                println!("Bay {}  倍率 {:.2}  盤面 {:.0}×{:.0}px", layout.bay, layout.scale, layout.board.width, layout.board.height);
                for item in &layout.items {
                    let rect = &item.geometry.rect;
                    let defaulted = item.geometry.used_default_width || item.geometry.used_default_height;
                    println!(
                        "  {} R{:02} C{:02}  {:<14} {:<32} ({:.0},{:.0} {:.0}×{:.0}){}",
                        if tracker.is_done(&item.record.normalized_code) { "✓" } else { " " },
                        item.record.peg_row,
                        item.record.peg_col,
                        item.record.product_code,
                        item.record.description,
                        rect.left,
                        rect.top,
                        rect.width,
                        rect.height,
                        if defaulted { " *既定寸法" } else { "" }
                    );
                }
                for issue in &layout.skipped {
                    println!("  ⚠ {}", issue);
                }
            }
        }

        Commands::Locate { code } => {
            let mut session = open_session(&dataset, view, &mut kv)?;
            let mut tracker = CompletionTracker::load(kv);
            let outcome = session.locate(&code)?;
            let record = &outcome.record;

            println!("📍 {} {}", record.product_code, record.description);
            println!("  Bay {}  R{:02} C{:02}{}", record.bay, record.peg_row, record.peg_col,
                if outcome.bay_switched { "（ベイ移動）" } else { "" });

            // CLI ではレイアウトは即座に確定している
            match session.render_complete(outcome.ticket.generation, &mut tracker)? {
                Some(highlight) if highlight.newly_completed => println!("✔ 完了にしました"),
                Some(_) => println!("  既に完了済み"),
                None => println!("⚠ 座標が不正なため盤面に表示されません"),
            }
        }

        Commands::Toggle { code } => {
            let session = open_session(&dataset, view, &mut kv)?;
            let mut tracker = CompletionTracker::load(kv);
            let now_done = tracker.toggle(&code)?;
            println!("{} {}", if now_done { "✔ 完了:" } else { "↺ 未完了:" }, code.trim());
            println!("  POG {} 全体: {}", session.planogram_id(), session.planogram_progress(&tracker));
        }

        Commands::Search { term, bay } => {
            let mut session = open_session(&dataset, view, &mut kv)?;
            go_to_bay(&mut session, bay)?;
            let filter = session.search(&term).clone();
            let layout = session.bay_layout();

            println!("🔍 Bay {} で \"{}\": {}件", layout.bay, term.trim(), filter.match_count());
            for item in layout.items.iter().filter(|i| filter.is_match(&i.record.normalized_code)) {
                println!("  R{:02} C{:02}  {:<14} {}", item.record.peg_row, item.record.peg_col, item.record.product_code, item.record.description);
            }
        }

        Commands::Progress => {
            let session = open_session(&dataset, view, &mut kv)?;
            let tracker = CompletionTracker::load(kv.clone());
            let total = session.planogram_progress(&tracker);
            println!("POG {}: {} ({}%)", session.planogram_id(), total, total.percent());
            for bay in session.navigator().bays() {
                let progress = tracker.progress(dataset.records_for_bay(session.planogram_id(), *bay));
                println!("  Bay {:>3}  {}", bay, progress_bar(progress.ratio(), 20));
            }
        }

        Commands::Pdf => {
            let session = open_session(&dataset, view, &mut kv)?;
            match session.pdf() {
                Some(pdf) => println!("{}", data_dir.join(pdf).display()),
                None => println!("PDF not available for POG {}", session.planogram_id()),
            }
        }

        Commands::Export { output } => {
            println!("📄 pegboard - チェックリスト出力\n");
            let session = open_session(&dataset, view, &mut kv)?;
            let tracker = CompletionTracker::load(kv.clone());
            let output_path = export::output_path(output.as_deref(), session.planogram_id());
            export::export_checklist(&dataset, session.planogram_id(), &tracker, &output_path)?;
            println!("✔ Excel出力: {}", output_path.display());
        }

        Commands::Reset | Commands::Index { .. } | Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// 保存済み店舗で開く。なければ対話で選ぶ
fn open_session(
    dataset: &Arc<Dataset>,
    view: ViewConfig,
    kv: &mut JsonFileStore,
) -> Result<Session> {
    match Session::restore(Arc::clone(dataset), view, kv) {
        Some(session) => Ok(session),
        None => prompt::prompt_store_session(Arc::clone(dataset), view, kv),
    }
}

fn go_to_bay(session: &mut Session, bay: Option<u32>) -> Result<()> {
    if let Some(bay) = bay {
        if !session.navigator().bays().contains(&bay) {
            return Err(error::PegboardError::InvalidArgument(format!(
                "Bay {} は POG {} にありません（{:?}）",
                bay,
                session.planogram_id(),
                session.navigator().bays()
            )));
        }
        session.go_to(bay);
    }
    Ok(())
}

fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}] {:>3.0}%", "#".repeat(filled), "-".repeat(width - filled.min(width)), ratio * 100.0)
}
