//! ファイル一覧（画像・PDF）の索引
//!
//! 商品画像や棚割りPDFをファイル名の前方一致・部分一致で探す。
//! ファイル名規約に依存した推測であり、確実な結合キーではない。

use crate::upc::normalize;
use std::collections::HashMap;

/// 参照用ファイル一覧
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    files: Vec<String>,
    /// ファイル名先頭のコード（正規化済み）→ 最初に現れた位置
    by_code: HashMap<String, usize>,
}

impl FileIndex {
    /// ファイル名一覧から索引を構築（一覧の順序を保つ）
    pub fn new(files: Vec<String>) -> Self {
        let mut by_code = HashMap::new();
        for (i, name) in files.iter().enumerate() {
            let key = normalize(leading_code(name));
            if !key.is_empty() {
                by_code.entry(key).or_insert(i);
            }
        }
        Self { files, by_code }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// 商品コードに対応する画像ファイルを探す
    ///
    /// 1. ファイル名先頭のコードを正規化した索引で引く（ゼロ埋めの違いを吸収）
    /// 2. 見つからなければ生のコードで前方一致の線形探索
    pub fn image_for(&self, product_code: &str) -> Option<&str> {
        let raw = product_code.trim();
        if raw.is_empty() {
            return None;
        }

        let key = normalize(raw);
        if let Some(&i) = self.by_code.get(&key) {
            return Some(&self.files[i]);
        }

        self.files
            .iter()
            .find(|f| f.starts_with(raw))
            .map(|f| f.as_str())
    }

    /// 棚割りIDを含むPDFファイルを探す
    pub fn pdf_for(&self, planogram_id: &str) -> Option<&str> {
        let id = planogram_id.trim();
        if id.is_empty() {
            return None;
        }
        self.files
            .iter()
            .find(|f| f.contains(id) && f.to_lowercase().ends_with(".pdf"))
            .map(|f| f.as_str())
    }
}

/// ファイル名先頭の英数字部分（"00414123_front.jpg" → "00414123"）
///
/// パス区切りがあれば最後の要素を見る。
fn leading_code(file_name: &str) -> &str {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    let end = base
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(base.len());
    &base[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FileIndex {
        FileIndex::new(vec![
            "README.md".to_string(),
            "00414123_front.jpg".to_string(),
            "images/71234.png".to_string(),
            "5551234.jpg".to_string(),
            "POG_8386824_v2.pdf".to_string(),
            "8386824_notes.txt".to_string(),
        ])
    }

    #[test]
    fn test_leading_code() {
        assert_eq!(leading_code("00414123_front.jpg"), "00414123");
        assert_eq!(leading_code("images/71234.png"), "71234");
        assert_eq!(leading_code("_x.jpg"), "");
    }

    #[test]
    fn test_image_lookup_tolerates_zero_padding() {
        let idx = index();
        assert_eq!(idx.image_for("414123"), Some("00414123_front.jpg"));
        assert_eq!(idx.image_for("00414123"), Some("00414123_front.jpg"));
        assert_eq!(idx.image_for("0071234"), Some("images/71234.png"));
    }

    #[test]
    fn test_image_lookup_falls_back_to_prefix_scan() {
        let idx = index();
        // 先頭コードは "5551234" だが生コードの前方一致で拾う
        assert_eq!(idx.image_for("555"), Some("5551234.jpg"));
    }

    #[test]
    fn test_image_lookup_misses() {
        let idx = index();
        assert_eq!(idx.image_for("999"), None);
        assert_eq!(idx.image_for(""), None);
        assert_eq!(idx.image_for("   "), None);
    }

    #[test]
    fn test_pdf_lookup() {
        let idx = index();
        assert_eq!(idx.pdf_for("8386824"), Some("POG_8386824_v2.pdf"));
        assert_eq!(idx.pdf_for("9000001"), None);
        assert_eq!(idx.pdf_for(""), None);
    }

    #[test]
    fn test_first_entry_wins_for_duplicate_codes() {
        let idx = FileIndex::new(vec!["0123_a.jpg".to_string(), "123_b.jpg".to_string()]);
        assert_eq!(idx.image_for("123"), Some("0123_a.jpg"));
    }
}
