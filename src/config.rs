//! CLI設定
//!
//! `~/.config/pegboard/config.json` に保存する。データフォルダは
//! 環境変数 `PEGBOARD_DATA_DIR` が最優先。

use crate::error::{PegboardError, Result};
use pegboard_common::layout::{DEFAULT_BOARD_HEIGHT_HOLES, DEFAULT_BOARD_WIDTH_HOLES, DEFAULT_VIEWPORT_MARGIN_PX};
use pegboard_common::session::DEFAULT_VIEWPORT_WIDTH_PX;
use pegboard_common::{BoardSpec, ViewConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// データフォルダを上書きする環境変数
pub const DATA_DIR_ENV: &str = "PEGBOARD_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 3リソースを置いたフォルダ
    pub data_dir: Option<PathBuf>,
    pub board_width_holes: u32,
    pub board_height_holes: u32,
    pub viewport_width_px: f64,
    pub viewport_margin_px: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            board_width_holes: DEFAULT_BOARD_WIDTH_HOLES,
            board_height_holes: DEFAULT_BOARD_HEIGHT_HOLES,
            viewport_width_px: DEFAULT_VIEWPORT_WIDTH_PX,
            viewport_margin_px: DEFAULT_VIEWPORT_MARGIN_PX,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込む。ファイルがなければ既定値
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PegboardError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("pegboard"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 完了状態・最後の店舗を保存するファイル
    pub fn state_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("state.json"))
    }

    /// データフォルダ（環境変数 > 設定 > カレント）
    pub fn data_dir(&self) -> PathBuf {
        Self::resolve_data_dir(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from), self.data_dir.as_deref())
    }

    fn resolve_data_dir(env: Option<PathBuf>, configured: Option<&Path>) -> PathBuf {
        env.filter(|p| !p.as_os_str().is_empty())
            .or_else(|| configured.map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn set_data_dir(&mut self, dir: PathBuf) -> Result<()> {
        if !dir.is_dir() {
            return Err(PegboardError::FolderNotFound(dir.display().to_string()));
        }
        self.data_dir = Some(dir);
        self.save()
    }

    pub fn view_config(&self) -> ViewConfig {
        ViewConfig {
            board: BoardSpec::new(self.board_width_holes, self.board_height_holes),
            viewport_width: self.viewport_width_px,
            margin: self.viewport_margin_px,
        }
    }
}
