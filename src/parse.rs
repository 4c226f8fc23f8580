use crate::address::Address;
use crate::cidr::{Prefix, ip_range_to_cidrs};
use crate::constants::{GZIP_MAGIC, PROGRESS_INTERVAL};
use crate::error::AppError;
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, info, warn};

/// 1つのASに紐づく組織名とプレフィックス
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsInfo {
    pub organization: String,
    pub prefixes: Vec<Prefix>,
}

/// ASN → AsInfo
pub type AsInfoMap = HashMap<u32, AsInfo>;

/// 大きな入力を読み込む間の進捗通知先
pub trait ProgressObserver {
    /// `lines` 行読み込んだ時点で呼ばれる
    fn on_progress(&self, lines: u64);

    /// 読み込み完了時に呼ばれる
    fn on_finish(&self, _lines: u64, _asns: usize) {}
}

/// 進捗を tracing でログ出力する
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, lines: u64) {
        info!("Parsed {} lines so far", lines);
    }

    fn on_finish(&self, lines: u64, asns: usize) {
        info!(total_asns = asns, total_lines = lines, "Finished parsing ASN database");
    }
}

/// `start_ip,end_ip,asn,organization` 形式のCSVを読み込み、ASNごとにプレフィックスを集める。
///
/// 各行の範囲はCIDR列に分解され、行の順序のまま追加される (結合・重複除去はしない)。
/// エラーは1始まりの行番号付きで返す。
pub fn parse_asinfo_csv<R: Read>(
    reader: R,
    observer: Option<&dyn ProgressObserver>,
) -> Result<AsInfoMap, AppError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut asn_map = AsInfoMap::new();
    let mut line_number: u64 = 0;

    debug!("Starting to parse CSV lines");
    for result in csv_reader.records() {
        line_number += 1;
        let record = result.map_err(|e| AppError::at_line(line_number, e))?;

        if line_number % PROGRESS_INTERVAL == 0 {
            if let Some(obs) = observer {
                obs.on_progress(line_number);
            }
        }

        if record.len() != 4 {
            return Err(AppError::at_line(
                line_number,
                AppError::ParseError(format!("expected 4 fields, got {}", record.len())),
            ));
        }

        let start = record[0]
            .parse::<Address>()
            .map_err(|e| AppError::at_line(line_number, e))?;
        let end = record[1]
            .parse::<Address>()
            .map_err(|e| AppError::at_line(line_number, e))?;
        let asn = record[2]
            .trim()
            .parse::<u32>()
            .map_err(|e| AppError::at_line(line_number, e))?;

        // 組織名の前後の引用符を除去
        let org_name = record[3].trim_matches('"');

        let prefixes =
            ip_range_to_cidrs(start, end).map_err(|e| AppError::at_line(line_number, e))?;

        let info = asn_map.entry(asn).or_insert_with(|| AsInfo {
            organization: org_name.to_string(),
            prefixes: Vec::with_capacity(prefixes.len()),
        });
        if info.organization != org_name {
            warn!(
                line = line_number,
                "ASN {} has multiple organizations: {:?} and {:?}",
                asn,
                info.organization,
                org_name
            );
        }
        info.prefixes.extend(prefixes);
    }

    if let Some(obs) = observer {
        obs.on_finish(line_number, asn_map.len());
    }
    Ok(asn_map)
}

/// メモリ上のCSV (gzip圧縮も可) を読み込む
pub fn parse_asinfo_bytes(
    bytes: &[u8],
    observer: Option<&dyn ProgressObserver>,
) -> Result<AsInfoMap, AppError> {
    if is_gzip(bytes) {
        debug!("detected gzipped data, using gzip reader");
        parse_asinfo_csv(GzDecoder::new(bytes), observer)
    } else {
        parse_asinfo_csv(bytes, observer)
    }
}

/// ファイルからCSV (またはCSV.gz) を読み込む。
/// 先頭2バイトのマジックナンバーでgzipかどうかを判定する。
pub fn parse_asinfo_file<P: AsRef<Path>>(
    path: P,
    observer: Option<&dyn ProgressObserver>,
) -> Result<AsInfoMap, AppError> {
    let path = path.as_ref();
    // io::Error のまま、パスをメッセージに含める
    let mut file = File::open(path)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;

    let mut header = [0u8; 2];
    let n = read_header(&mut file, &mut header)?;

    // 判定に使った先頭から読み直す
    file.seek(SeekFrom::Start(0))?;
    let reader = BufReader::new(file);

    if is_gzip(&header[..n]) {
        debug!(path = %path.display(), "detected gzipped file, using gzip reader");
        parse_asinfo_csv(GzDecoder::new(reader), observer)
    } else {
        parse_asinfo_csv(reader, observer)
    }
}

// EOFまでに読めたバイト数を返す
fn read_header(file: &mut File, buf: &mut [u8]) -> Result<usize, AppError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC
}
