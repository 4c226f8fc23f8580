use crate::common::WriteMode;
use crate::error::AppError;
use crate::route::RouteAnnouncement;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// nftの define 名に使える最大長
const MAX_IDENTIFIER_LEN: usize = 64;

/// 汎用ヘッダー生成
pub fn make_header(now_str: &str, as_number: &str, organization: &str, next_hop: &str) -> String {
    format!(
        "# Generated at: {}\n# AS Number: {}\n# Organization: {}\n# Next Hop: {}\n\n",
        now_str, as_number, organization, next_hop
    )
}

/// nftの識別子として使えるよう `[A-Za-z0-9_]` のみに整える。
/// 英数字が1文字も残らない場合は `UNKNOWN`。
pub fn sanitize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.chars().any(|c| c.is_ascii_alphanumeric()) {
        return "UNKNOWN".to_string();
    }
    trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(MAX_IDENTIFIER_LEN)
        .collect()
}

/// TXT出力用の共通ヘルパー (1行1プレフィックス)
pub async fn write_list_txt<P: AsRef<Path>>(
    path: P,
    routes: &[RouteAnnouncement],
    mode: WriteMode,
    header: &str,
) -> Result<(), AppError> {
    let body = routes
        .iter()
        .map(|r| r.prefix.to_string())
        .collect::<Vec<_>>()
        .join("\n");

    let content = format!("{}{}\n", header, body);
    write_content(path.as_ref(), &content, mode).await
}

/// NFT 出力用の共通ヘルパー
pub async fn write_list_nft<P: AsRef<Path>>(
    path: P,
    routes: &[RouteAnnouncement],
    mode: WriteMode,
    header: &str,
) -> Result<(), AppError> {
    let file_path = path.as_ref();
    let define_name = sanitize_identifier(
        file_path
            .file_stem()
            .and_then(|os| os.to_str())
            .unwrap_or("unknown_define"),
    );

    let mut content = String::new();
    content.push_str(header);
    content.push_str(&format!("define {} = {{\n", define_name));
    for r in routes {
        content.push_str(&format!("    {},\n", r.prefix));
    }
    content.push_str("}\n");

    write_content(file_path, &content, mode).await
}

/// JSON 出力用の共通ヘルパー。
/// 追記モードでは1回の書き込みごとに1つのJSON配列が追加される。
pub async fn write_list_json<P: AsRef<Path>>(
    path: P,
    routes: &[RouteAnnouncement],
    mode: WriteMode,
) -> Result<(), AppError> {
    let mut content = serde_json::to_string_pretty(routes)?;
    content.push('\n');
    write_content(path.as_ref(), &content, mode).await
}

async fn write_content(path: &Path, content: &str, mode: WriteMode) -> Result<(), AppError> {
    match mode {
        WriteMode::Append => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(content.as_bytes()).await?;
        }
        WriteMode::Overwrite => {
            // まるごと書き込む場合
            fs::write(path, content).await?;
        }
    }
    Ok(())
}
