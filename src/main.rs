use asroute::cli::Cli;
use asroute::commands::{handle_export::run_export, handle_range::run_range};
use asroute::error::AppError;
use clap::Parser;
use reqwest::Client;
use std::process::ExitCode;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// ログ出力の初期化。
/// --verbose なら DEBUG、それ以外は RUST_LOG (既定は INFO)。
/// 標準出力はCIDRの出力に使うため、ログは標準エラーへ出す。
fn init_logging(verbose: bool) {
    let log_level = if verbose {
        Level::DEBUG
    } else {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse::<Level>().ok())
            .unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
    }
}

/// アプリケーションのメインロジック
async fn run(args: Cli) -> Result<(), AppError> {
    // --range オプション
    if let Some(range) = &args.range {
        let (start, end) = match range.as_slice() {
            [start, end] => (start, end),
            _ => return Err(AppError::InvalidInput("--range takes START and END".into())),
        };
        let stdout = std::io::stdout();
        run_range(start, end, &mut stdout.lock())?;
        return Ok(());
    }

    // --dbpath オプション
    let client = Client::new();
    run_export(&args, &client).await
}
