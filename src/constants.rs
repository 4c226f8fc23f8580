//! 定数の共通化

/// gzipのマジックナンバー
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// 進捗ログを出す間隔 (行数)
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// ASパスに載せるASNの上限 (4バイトAS)
pub const MAX_ASN: u64 = u32::MAX as u64;

pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 30;
