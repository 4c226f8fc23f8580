use crate::error::AppError;
use crate::ip_utils::parse_range_to_cidrs;
use std::io::Write;
use tracing::debug;

/// 1つの範囲をCIDR列に分解し、1行1プレフィックスで書き出す。
/// 書き出したプレフィックス数を返す。
pub fn run_range<W: Write>(start: &str, end: &str, out: &mut W) -> Result<usize, AppError> {
    let nets = parse_range_to_cidrs(start, end)?;
    debug!(start, end, count = nets.len(), "decomposed range");

    for net in &nets {
        writeln!(out, "{}", net)?;
    }
    out.flush()?;
    Ok(nets.len())
}
