//! 3リソースの取得
//!
//! 並列に取得し、1つでも失敗したら全体を失敗にする（部分的なデータでは
//! 操作を始めない）。キャッシュを避けるため `?t=<ミリ秒>` を付ける。

use js_sys::Date;
use pegboard_common::dataset::{FILE_INDEX_RESOURCE, PLACEMENTS_RESOURCE, STORE_MAP_RESOURCE};
use pegboard_common::{Dataset, Error, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, RequestMode, Response};

/// キャッシュ回避用のURL
pub fn cache_busted_url(resource: &str, timestamp_ms: u64) -> String {
    format!("{}?t={}", resource, timestamp_ms)
}

/// JsValue のエラーを文字列に
pub fn js_error_text(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

/// 1リソースをテキストで取得
async fn fetch_text(resource: &str, timestamp_ms: u64) -> Result<String> {
    let fetch_error = |detail: String| Error::DataFetch(format!("{}: {}", resource, detail));
    let url = cache_busted_url(resource, timestamp_ms);

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);
    opts.set_cache(RequestCache::NoStore);

    let request = Request::new_with_str_and_init(&url, &opts)
        .map_err(|e| fetch_error(js_error_text(&e)))?;

    let window = web_sys::window().ok_or_else(|| fetch_error("no window".into()))?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| fetch_error(js_error_text(&e)))?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|e| fetch_error(js_error_text(&e)))?;

    if !resp.ok() {
        return Err(fetch_error(format!("HTTP {}", resp.status())));
    }

    let text = JsFuture::from(resp.text().map_err(|e| fetch_error(js_error_text(&e)))?)
        .await
        .map_err(|e| fetch_error(js_error_text(&e)))?;

    text.as_string()
        .ok_or_else(|| fetch_error("response is not text".into()))
}

/// 3リソースを取得してデータを構築
pub async fn load_dataset() -> Result<Dataset> {
    let timestamp_ms = Date::now() as u64;

    let (files, placements, store_map) = futures::try_join!(
        fetch_text(FILE_INDEX_RESOURCE, timestamp_ms),
        fetch_text(PLACEMENTS_RESOURCE, timestamp_ms),
        fetch_text(STORE_MAP_RESOURCE, timestamp_ms),
    )?;

    Dataset::from_sources(&files, &placements, &store_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_busted_url() {
        assert_eq!(
            cache_busted_url("githubfiles.csv", 1700000000000),
            "githubfiles.csv?t=1700000000000"
        );
    }
}
