use crate::common::{IpFamily, OutputFormat, WriteMode};
use crate::error::AppError;
use crate::output_common::{make_header, write_list_json, write_list_nft, write_list_txt};
use crate::route::{RouteBatch, RouteSink};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

/// 経路をファイルへ書き出す RouteSink
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
    format: OutputFormat,
    mode: WriteMode,
}

impl FileSink {
    pub fn new<P: Into<PathBuf>>(output_dir: P, format: OutputFormat, mode: WriteMode) -> Self {
        FileSink {
            output_dir: output_dir.into(),
            format,
            mode,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// AS{asn}_{IPv4|IPv6}.{txt|nft|json}
    pub fn file_path(&self, asn: u32, family: IpFamily) -> PathBuf {
        self.output_dir.join(format!(
            "AS{}_{}.{}",
            asn,
            family.as_str(),
            self.format.extension()
        ))
    }
}

impl RouteSink for FileSink {
    async fn announce(&self, batch: &RouteBatch) -> Result<(), AppError> {
        let asn = batch.policy.asn;
        if batch.routes.is_empty() {
            info!("No {} routes for AS{}", batch.family, asn);
            return Ok(());
        }

        let path = self.file_path(asn, batch.family);
        let next_hop = match batch.family {
            IpFamily::V4 => batch.policy.ipv4_next_hop.to_string(),
            IpFamily::V6 => batch
                .policy
                .ipv6_next_hop
                .map(|nh| nh.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        };
        let now_str = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let header = make_header(&now_str, &format!("AS{asn}"), &batch.organization, &next_hop);

        match self.format {
            OutputFormat::Txt => write_list_txt(&path, &batch.routes, self.mode, &header).await?,
            OutputFormat::Nft => write_list_nft(&path, &batch.routes, self.mode, &header).await?,
            OutputFormat::Json => write_list_json(&path, &batch.routes, self.mode).await?,
        }

        info!(
            "[output] Wrote {} {} routes for AS{} ({}) to {}",
            batch.routes.len(),
            batch.family,
            asn,
            batch.organization,
            path.display()
        );
        Ok(())
    }
}
