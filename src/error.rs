use std::{io, num::ParseIntError};
use thiserror::Error;
use tokio::task::JoinError;

/// 範囲→CIDR分解の入力検証エラー
/// いずれも再試行不可で、出力を一切生成する前に検出される
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    // アドレスとして解釈できない値
    #[error("{value:?} is not a valid IP address")]
    InvalidAddress { value: String },

    // 始点と終点のファミリが異なる
    #[error("start ({start}) and end ({end}) must be of the same IP family")]
    FamilyMismatch { start: String, end: String },

    // 始点 > 終点
    #[error("start ({start}) must not be greater than end ({end})")]
    InvertedRange { start: String, end: String },

    // プレフィックス長が範囲外、またはホスト部が0でない
    #[error("{value} is not a valid network prefix")]
    InvalidPrefix { value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    // IOまわりのエラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ネットワーク関係のエラー (reqwest 等)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    // CSVのレコード分割エラー
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // JSON出力のシリアライズ失敗
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // 範囲→CIDR分解の入力検証エラー
    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    // データベースの特定行で発生したエラー (行番号は1始まり)
    #[error("line {line}: {source}")]
    Record {
        line: u64,
        #[source]
        source: Box<AppError>,
    },

    // 汎用的なパースエラー
    #[error("Parse error: {0}")]
    ParseError(String),

    // 特定の入力が不正だった場合など
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // データベースに該当エントリが無い
    #[error("Not found: {0}")]
    NotFound(String),

    // その他、文字列メッセージだけを格納した汎用エラー
    #[error("{0}")]
    Other(String),

    // Ctrl-C による中断
    #[error("Session aborted")]
    Aborted,

    // tokio::spawn(…).await? のエラー
    #[error("Task join error: {0}")]
    JoinError(#[from] JoinError),

    // 文字列 → 数値パース失敗
    #[error("Integer parse error: {0}")]
    ParseIntError(#[from] ParseIntError),
}

impl AppError {
    /// 行番号付きのエラーに包む
    pub fn at_line(line: u64, source: impl Into<AppError>) -> Self {
        AppError::Record {
            line,
            source: Box::new(source.into()),
        }
    }

    /// プロセス終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Aborted => 130,
            _ => 1,
        }
    }
}
