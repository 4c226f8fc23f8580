use crate::error::AppError;
use crate::fetch::fetch_with_retry;
use crate::parse::{AsInfoMap, LogProgress, parse_asinfo_bytes, parse_asinfo_file};
use crate::policy::Policy;
use crate::route::{RouteBatch, RouteSink, build_announcements};
use futures::stream::{self, TryStreamExt};
use reqwest::Client;
use std::path::PathBuf;
use tracing::info;

/// http(s) のURLかどうか
pub fn is_remote_source(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// ASNデータベースを読み込む。
/// URLの場合はダウンロードしてから、ローカルパスの場合はそのまま、
/// ブロッキングスレッド上でパースする。
pub async fn load_database(
    client: &Client,
    source: &str,
    retry_attempts: u32,
    max_backoff_secs: u64,
) -> Result<AsInfoMap, AppError> {
    let db = if is_remote_source(source) {
        info!(url = source, "Downloading ASN database");
        let bytes = fetch_with_retry(client, source, retry_attempts, max_backoff_secs).await?;
        tokio::task::spawn_blocking(move || parse_asinfo_bytes(&bytes, Some(&LogProgress)))
            .await??
    } else {
        let path = PathBuf::from(source);
        info!(path = %path.display(), "Loading ASN database");
        tokio::task::spawn_blocking(move || parse_asinfo_file(&path, Some(&LogProgress))).await??
    };
    Ok(db)
}

/// 各ポリシーのASNをデータベースから引き、経路のまとまりを作る。
/// データベースに無いASNが1つでもあればエラー。
pub fn resolve_policies(db: &AsInfoMap, policies: &[Policy]) -> Result<Vec<RouteBatch>, AppError> {
    let mut batches = Vec::with_capacity(policies.len() * 2);

    for policy in policies {
        let info = db.get(&policy.asn).ok_or_else(|| {
            AppError::NotFound(format!("ASN {} not found in database", policy.asn))
        })?;

        info!(
            "Configuring policy: {} prefixes to ASN {} ({}) nexthop v4 {} and v6 {}",
            info.prefixes.len(),
            policy.asn,
            info.organization,
            policy.ipv4_next_hop,
            policy
                .ipv6_next_hop
                .map(|nh| nh.to_string())
                .unwrap_or_else(|| "-".to_string())
        );

        batches.extend(build_announcements(policy, info));
    }

    Ok(batches)
}

/// 経路のまとまりを sink へ渡す。同時に処理するのは最大 `concurrency` 件
pub async fn announce_all<S: RouteSink>(
    sink: &S,
    batches: &[RouteBatch],
    concurrency: usize,
) -> Result<(), AppError> {
    let max_concurrent = if concurrency == 0 { 1 } else { concurrency };

    stream::iter(batches.iter().map(Ok::<_, AppError>))
        .try_for_each_concurrent(max_concurrent, |batch| sink.announce(batch))
        .await
}
