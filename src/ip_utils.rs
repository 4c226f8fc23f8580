use crate::address::Address;
use crate::cidr::{AddressRange, Prefix, decompose};
use crate::error::AppError;
use ipnet::IpNet;

/// `start` から始まり `end` を超えない最大のCIDRプレフィックス長を閉形式で求める。
///
/// ホスト部に使えるビット数は「start の末尾ゼロビット数」と
/// 「残りアドレス数の floor(log2)」の小さい方になる。
/// 線形探索版 (`cidr::find_largest_prefix`) と常に同じ値を返す。
/// 前提: `start <= end` かつ同一ファミリ。
pub fn largest_block_prefix_len(start: Address, end: Address) -> u8 {
    let width = start.bit_width() as u32;
    let start_bits = start.to_bits();
    let end_bits = end.to_bits();
    debug_assert!(start_bits <= end_bits, "start must be <= end");

    // start の末尾ゼロビットの数 (0 の場合はビット幅全体)
    let tz = start_bits.trailing_zeros().min(width);
    // 残りのアドレス範囲に収まるビット数 (IPv6全体の 2^128 のみ溢れる)
    let span = match (end_bits - start_bits).checked_add(1) {
        Some(count) => count.ilog2(),
        None => 128,
    };

    let host_bits = tz.min(span);
    (width - host_bits) as u8
}

/// プレフィックス列を ipnet の型に変換する
pub fn to_ipnets(prefixes: &[Prefix]) -> Vec<IpNet> {
    prefixes.iter().copied().map(IpNet::from).collect()
}

/// テキストの始点・終点から、範囲を覆うCIDR列を返す
pub fn parse_range_to_cidrs(start_str: &str, end_str: &str) -> Result<Vec<IpNet>, AppError> {
    let range = AddressRange::parse(start_str, end_str)?;
    Ok(to_ipnets(&decompose(&range)))
}
