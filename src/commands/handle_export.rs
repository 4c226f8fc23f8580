use crate::cli::Cli;
use crate::common::{OutputFormat, WriteMode};
use crate::error::AppError;
use crate::output::FileSink;
use crate::policy::parse_policies;
use crate::process::{announce_all, load_database, resolve_policies};
use reqwest::Client;
use tracing::info;

/// データベースを読み込み、ポリシーごとの経路をファイルへ書き出す。
/// Ctrl-C を受け取った場合は `AppError::Aborted` で中断する。
pub async fn run_export(args: &Cli, client: &Client) -> Result<(), AppError> {
    let db_source = args
        .dbpath
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("--dbpath is required for export".into()))?;

    // データベースを読む前にポリシーを検証する
    let policies = parse_policies(&args.policies)?;
    info!("Parsed {} policies", policies.len());

    let sink = FileSink::new(
        &args.output_dir,
        OutputFormat::from_str(&args.output_format),
        WriteMode::from_str(&args.mode),
    );
    tokio::fs::create_dir_all(sink.output_dir()).await?;

    let work = async {
        let db = load_database(client, db_source, args.max_retries, args.max_backoff_sec).await?;
        let batches = resolve_policies(&db, &policies)?;
        announce_all(&sink, &batches, args.concurrency).await
    };

    tokio::select! {
        res = work => res,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            Err(AppError::Aborted)
        }
    }
}
