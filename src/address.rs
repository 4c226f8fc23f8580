//! IPv4 / IPv6 を1つの型で扱うためのアドレス値。
//!
//! 異なるファミリ同士の比較は `PartialOrd` が `None` を返すため、
//! `<` や `>` はどちらも偽になる。ファミリの不一致をエラーとして扱いたい場合は
//! [`Address::compare`] を使う。

use crate::common::IpFamily;
use crate::error::RangeError;
use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// ファミリタグ付きのIPアドレス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl Address {
    pub fn family(&self) -> IpFamily {
        match self {
            Address::V4(_) => IpFamily::V4,
            Address::V6(_) => IpFamily::V6,
        }
    }

    pub fn bit_width(&self) -> u8 {
        self.family().bit_width()
    }

    /// アドレスを符号なし整数として返す (IPv4は下位32bitのみ使用)
    pub fn to_bits(&self) -> u128 {
        match self {
            Address::V4(a) => u32::from(*a) as u128,
            Address::V6(a) => u128::from(*a),
        }
    }

    /// 整数値からアドレスを組み立てる。
    /// IPv4の場合、32bitを超える上位ビットは捨てられる。
    pub fn from_bits(family: IpFamily, bits: u128) -> Self {
        match family {
            IpFamily::V4 => Address::V4(Ipv4Addr::from(bits as u32)),
            IpFamily::V6 => Address::V6(Ipv6Addr::from(bits)),
        }
    }

    /// 下位 `bit_width - prefix_len` ビットが1のマスク
    pub fn host_mask(&self, prefix_len: u8) -> u128 {
        host_mask(self.family(), prefix_len)
    }

    /// プレフィックス長でマスクしたネットワークアドレス
    pub fn mask(&self, prefix_len: u8) -> Address {
        debug_assert!(prefix_len <= self.bit_width(), "prefix length out of range");
        Address::from_bits(self.family(), self.to_bits() & !self.host_mask(prefix_len))
    }

    /// ホスト部が全て0かどうか
    pub fn is_aligned(&self, prefix_len: u8) -> bool {
        self.to_bits() & self.host_mask(prefix_len) == 0
    }

    /// 次のアドレス。ファミリの最大値の場合は `None`
    pub fn next_after(&self) -> Option<Address> {
        let next = self.to_bits().checked_add(1)?;
        if next > self.family().max_bits() {
            return None;
        }
        Some(Address::from_bits(self.family(), next))
    }

    pub fn is_max(&self) -> bool {
        self.to_bits() == self.family().max_bits()
    }

    /// 同一ファミリであれば大小比較し、異なる場合はエラーを返す
    pub fn compare(&self, other: &Address) -> Result<Ordering, RangeError> {
        self.partial_cmp(other)
            .ok_or_else(|| RangeError::FamilyMismatch {
                start: self.to_string(),
                end: other.to_string(),
            })
    }
}

/// `family` のビット幅で、下位 `width - prefix_len` ビットを立てたマスク
pub fn host_mask(family: IpFamily, prefix_len: u8) -> u128 {
    let width = family.bit_width();
    let host_bits = width.saturating_sub(prefix_len) as u32;
    match host_bits {
        0 => 0,
        128 => u128::MAX,
        n => (1u128 << n) - 1,
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Address::V4(a), Address::V4(b)) => Some(a.cmp(b)),
            (Address::V6(a), Address::V6(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::V4(a) => fmt::Display::fmt(a, f),
            Address::V6(a) => fmt::Display::fmt(a, f),
        }
    }
}

impl FromStr for Address {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<IpAddr>()
            .map(Address::from)
            .map_err(|_| RangeError::InvalidAddress {
                value: s.to_string(),
            })
    }
}

impl From<IpAddr> for Address {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(a) => Address::V4(a),
            IpAddr::V6(a) => Address::V6(a),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(addr: Ipv4Addr) -> Self {
        Address::V4(addr)
    }
}

impl From<Ipv6Addr> for Address {
    fn from(addr: Ipv6Addr) -> Self {
        Address::V6(addr)
    }
}

impl From<Address> for IpAddr {
    fn from(addr: Address) -> Self {
        match addr {
            Address::V4(a) => IpAddr::V4(a),
            Address::V6(a) => IpAddr::V6(a),
        }
    }
}
