use crate::error::AppError;
use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// HTTP GETを1回だけ実行する。
/// 成功時はレスポンスボディをバイト列として返す (gzipのままの場合もある)。
async fn fetch_once(client: &Client, url: &str) -> Result<Vec<u8>, AppError> {
    let resp = client.get(url).send().await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    Ok(bytes.to_vec())
}

/// HTTP GETによるデータ取得を、リトライ+指数バックオフ付きで行う。
/// retry_attempts回失敗した場合、エラーを返す。
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    retry_attempts: u32,
    max_backoff_secs: u64,
) -> Result<Vec<u8>, AppError> {
    let attempts = retry_attempts.max(1);
    let mut last_error = None;

    for i in 0..attempts {
        match fetch_once(client, url).await {
            Ok(bytes) => {
                debug!(url, bytes = bytes.len(), "downloaded");
                return Ok(bytes);
            }
            Err(e) => {
                warn!(
                    "[fetch_with_retry] Error on attempt {}/{}: {}",
                    i + 1,
                    attempts,
                    e
                );
                if i + 1 < attempts {
                    sleep(calc_exponential_backoff_duration(i, max_backoff_secs)).await;
                }
                last_error = Some(e);
            }
        }
    }

    let reason = last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string());
    Err(AppError::Other(format!(
        "Failed to fetch data from {} after {} attempts: {}",
        url, attempts, reason
    )))
}

/// 指数バックオフのスリープ時間を計算するヘルパー関数
/// min(2^retry_count, max_backoff_secs) 秒 + 0〜1秒のジッター
pub fn calc_exponential_backoff_duration(retry_count: u32, max_backoff_secs: u64) -> Duration {
    let mut rng = rand::rng();
    let random_part: f64 = rng.random();

    let base = 2u64.saturating_pow(retry_count).min(max_backoff_secs);
    let backoff_seconds = (base as f64) + random_part;
    Duration::from_secs_f64(backoff_seconds)
}
