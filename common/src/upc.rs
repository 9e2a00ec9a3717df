//! UPC正規化モジュール
//!
//! カメラで読んだバーコード（ゼロ埋めされがち）とスプレッドシート出力
//! （数値変換で先頭ゼロが落ちがち）を同じ形に揃えて比較する。
//!
//! 先頭ゼロの間や直後の空白もゼロと一緒に落とす（`"00 12"` は `"12"`）。
//! 空白だけ残すと正規化を2回かけた結果が変わってしまう。

/// UPC/商品コードを比較用の形に正規化する
///
/// 前後の空白を除き、先頭のゼロをすべて取り除く。残りはそのまま返す
/// （末尾の英字などもそのまま。数値パースではない）。
///
/// 先頭ゼロの直後に空白が続く場合はその空白も落とす。そうしないと
/// `normalize(normalize(x)) == normalize(x)` が成り立たない。
///
/// # Examples
/// ```
/// use pegboard_common::normalize;
///
/// assert_eq!(normalize("00414123"), "414123");
/// assert_eq!(normalize("  0012A "), "12A");
/// assert_eq!(normalize("00 12"), "12");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(code: &str) -> String {
    code.trim_start_matches(|c: char| c == '0' || c.is_whitespace())
        .trim_end()
        .to_string()
}

/// 検索語を正規化する（小文字化してから[`normalize`]）
pub fn normalize_search_term(term: &str) -> String {
    normalize(&term.to_lowercase())
}
