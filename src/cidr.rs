//! アドレス範囲を、範囲をちょうど覆う最小個数のCIDRプレフィックス列に分解する。
//!
//! 分解は以下の3つの操作からなる。
//! - [`last_address`]: プレフィックスの最終アドレス (ホスト部を全て1にしたもの)
//! - [`find_largest_prefix`]: 始点ちょうどから始まり、終点を超えない最大のプレフィックス
//! - [`decompose`]: 上記を繰り返して範囲全体を覆う
//!
//! 出力はネットワークアドレスの昇順で、隙間も重なりも無い。
//! 別の呼び出しで得たプレフィックス同士の結合や重複除去は行わない。

use crate::address::Address;
use crate::common::IpFamily;
use crate::error::RangeError;
use crate::ip_utils::largest_block_prefix_len;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt;
use std::str::FromStr;

/// CIDRプレフィックス。
/// `network` のホスト部は常に0 (ネットワークアドレス) であることを保証する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prefix {
    network: Address,
    prefix_len: u8,
}

impl Prefix {
    /// ホスト部が0でない場合やプレフィックス長が範囲外の場合はエラー
    pub fn new(network: Address, prefix_len: u8) -> Result<Self, RangeError> {
        if prefix_len > network.bit_width() || !network.is_aligned(prefix_len) {
            return Err(RangeError::InvalidPrefix {
                value: format!("{network}/{prefix_len}"),
            });
        }
        Ok(Prefix {
            network,
            prefix_len,
        })
    }

    /// ホスト部を切り捨ててプレフィックスを作る
    pub fn new_masked(addr: Address, prefix_len: u8) -> Result<Self, RangeError> {
        if prefix_len > addr.bit_width() {
            return Err(RangeError::InvalidPrefix {
                value: format!("{addr}/{prefix_len}"),
            });
        }
        Ok(Prefix {
            network: addr.mask(prefix_len),
            prefix_len,
        })
    }

    /// 単一ホストのプレフィックス (/32, /128)
    pub fn host(addr: Address) -> Self {
        Prefix {
            network: addr,
            prefix_len: addr.bit_width(),
        }
    }

    pub fn network(&self) -> Address {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn family(&self) -> IpFamily {
        self.network.family()
    }

    pub fn last_address(&self) -> Address {
        last_address(self)
    }

    pub fn contains(&self, addr: &Address) -> bool {
        addr.family() == self.family() && addr.mask(self.prefix_len) == self.network
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Prefix {
    type Err = RangeError;

    /// `a.b.c.d/n` や `2001:db8::/n` を受け付ける。ホスト部が0でないものは拒否する
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RangeError::InvalidPrefix {
            value: s.to_string(),
        };
        let (addr_str, len_str) = s.trim().split_once('/').ok_or_else(invalid)?;
        let network = addr_str.parse::<Address>()?;
        let prefix_len = len_str.parse::<u8>().map_err(|_| invalid())?;
        Prefix::new(network, prefix_len)
    }
}

impl From<Prefix> for IpNet {
    fn from(prefix: Prefix) -> Self {
        // prefix_len はビット幅以下であることがコンストラクタで保証されている
        match prefix.network {
            Address::V4(a) => IpNet::V4(Ipv4Net::new_assert(a, prefix.prefix_len)),
            Address::V6(a) => IpNet::V6(Ipv6Net::new_assert(a, prefix.prefix_len)),
        }
    }
}

impl TryFrom<IpNet> for Prefix {
    type Error = RangeError;

    fn try_from(net: IpNet) -> Result<Self, Self::Error> {
        Prefix::new(Address::from(net.addr()), net.prefix_len())
    }
}

/// 始点・終点を含む閉区間。
/// 同一ファミリかつ `start <= end` であることをコンストラクタで検証する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    start: Address,
    end: Address,
}

impl AddressRange {
    /// ファミリ → 大小 の順で検証する
    pub fn new(start: Address, end: Address) -> Result<Self, RangeError> {
        if start.compare(&end)?.is_gt() {
            return Err(RangeError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(AddressRange { start, end })
    }

    /// 文字列の始点・終点から範囲を作る。始点のパースエラーが優先される
    pub fn parse(start: &str, end: &str) -> Result<Self, RangeError> {
        let start = start.parse::<Address>()?;
        let end = end.parse::<Address>()?;
        AddressRange::new(start, end)
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn family(&self) -> IpFamily {
        self.start.family()
    }

    /// 範囲に含まれるアドレス数。IPv6全体 (2^128) のみ `None`
    pub fn address_count(&self) -> Option<u128> {
        (self.end.to_bits() - self.start.to_bits()).checked_add(1)
    }

    pub fn contains(&self, addr: &Address) -> bool {
        matches!(
            (self.start.compare(addr), addr.compare(&self.end)),
            (Ok(a), Ok(b)) if a.is_le() && b.is_le()
        )
    }

    /// 範囲を覆うプレフィックスを昇順に返すイテレータ
    pub fn prefixes(&self) -> Prefixes {
        Prefixes {
            current: Some(self.start),
            end: self.end,
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// [`AddressRange::prefixes`] のイテレータ
#[derive(Debug, Clone)]
pub struct Prefixes {
    current: Option<Address>,
    end: Address,
}

impl Iterator for Prefixes {
    type Item = Prefix;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        let (prefix, last) = largest_prefix_from(current, self.end);

        // last < end の場合のみ次へ進むため、next_after が溢れることはない
        self.current = if last == self.end {
            None
        } else {
            last.next_after()
        };
        Some(prefix)
    }
}

impl std::iter::FusedIterator for Prefixes {}

/// プレフィックスの最終アドレス (ホスト部を全て1にしたもの)。
/// ホストプレフィックスの場合はネットワークアドレスそのもの。
pub fn last_address(prefix: &Prefix) -> Address {
    let network = prefix.network();
    Address::from_bits(
        network.family(),
        network.to_bits() | network.host_mask(prefix.prefix_len()),
    )
}

/// `start` ちょうどから始まり、最終アドレスが `end` を超えない最大のプレフィックスを返す。
/// 併せてそのプレフィックスの最終アドレスも返す。
///
/// ファミリが異なる場合は `FamilyMismatch`、`start > end` の場合は `InvertedRange` を返す。
pub fn find_largest_prefix(
    start: Address,
    end: Address,
) -> Result<(Prefix, Address), RangeError> {
    let range = AddressRange::new(start, end)?;
    Ok(largest_prefix_from(range.start, range.end))
}

/// `find_largest_prefix` の本体。呼び出し側で `start <= end` かつ同一ファミリを保証すること。
///
/// ホストプレフィックスから始めてプレフィックス長を1ずつ短くしていき、
/// マスク後のアドレスが `start` からずれた時点、または最終アドレスが `end` を
/// 超えた時点で、直前の候補を返す。
fn largest_prefix_from(start: Address, end: Address) -> (Prefix, Address) {
    let mut best = Prefix::host(start);
    let mut best_last = start;

    for prefix_len in (0..start.bit_width()).rev() {
        let network = start.mask(prefix_len);
        if network != start {
            break;
        }

        let candidate = Prefix {
            network,
            prefix_len,
        };
        let last = last_address(&candidate);
        // ファミリ不一致は比較不能として打ち切る
        if !matches!(last.compare(&end), Ok(o) if o.is_le()) {
            break;
        }

        best = candidate;
        best_last = last;
    }

    debug_assert_eq!(best.prefix_len, largest_block_prefix_len(start, end));
    (best, best_last)
}

/// 検証済みの範囲を、昇順のプレフィックス列に分解する
pub fn decompose(range: &AddressRange) -> Vec<Prefix> {
    range.prefixes().collect()
}

/// `start`..=`end` を最小個数のCIDRプレフィックスに分解する。
///
/// ファミリが異なる場合、または `start > end` の場合はエラーを返し、
/// 部分的な結果は返さない。`start == end` の場合はホストプレフィックス1つになる。
pub fn ip_range_to_cidrs(start: Address, end: Address) -> Result<Vec<Prefix>, RangeError> {
    let range = AddressRange::new(start, end)?;
    Ok(decompose(&range))
}
