use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pegboard")]
#[command(about = "ペグボード補充支援ツール（棚割りマップ・UPC検索・チェックリスト）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// データフォルダ（設定・環境変数より優先）
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 店舗番号の一覧
    Stores,

    /// 店舗を選択して保存
    Select {
        /// 店舗番号
        #[arg(required = true)]
        store: String,
    },

    /// 保存した店舗を消去
    Reset,

    /// 選択中の店舗のベイ一覧と進捗
    Bays,

    /// ベイのレイアウト（箱の座標）を表示
    Layout {
        /// ベイ番号（省略時は最初のベイ）
        #[arg(short, long)]
        bay: Option<u32>,

        /// ビューポート幅（px）
        #[arg(short, long)]
        width: Option<f64>,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// UPCで商品を探し、完了にする
    Locate {
        /// スキャン・入力したコード
        #[arg(required = true)]
        code: String,
    },

    /// 商品の完了状態を切り替え
    Toggle {
        /// UPC
        #[arg(required = true)]
        code: String,
    },

    /// ベイ内をUPC・商品名で検索
    Search {
        /// 検索語
        #[arg(required = true)]
        term: String,

        /// ベイ番号（省略時は最初のベイ）
        #[arg(short, long)]
        bay: Option<u32>,
    },

    /// ベイごとの進捗
    Progress,

    /// 棚割りPDFのパスを表示
    Pdf,

    /// 参照資料フォルダからファイル一覧を生成
    Index {
        /// 画像・PDFのフォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力ファイル（デフォルト: フォルダ/githubfiles.csv）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// ベイごとのチェックリスト（xlsx）を出力
    Export {
        /// 出力ファイル（デフォルト: checklist_<POG>.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// データフォルダを設定
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
