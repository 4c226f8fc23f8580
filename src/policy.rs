use crate::constants::MAX_ASN;
use crate::error::AppError;
use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// ポリシールーティングの設定1件。
/// 指定ASのプレフィックスを、ファミリごとのネクストホップ宛てに広告する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub asn: u32,
    pub ipv4_next_hop: Ipv4Addr,
    pub ipv6_next_hop: Option<Ipv6Addr>,
}

impl FromStr for Policy {
    type Err = AppError;

    /// `<asn>,<ipv4_nexthop>[,<ipv6_nexthop>]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.splitn(3, ',').collect();
        if parts.len() < 2 {
            return Err(AppError::InvalidInput(format!(
                "invalid policy format {s:?}. Expected <asn>,<ipv4_nexthop>[,<ipv6_nexthop>]"
            )));
        }

        let asn = parts[0]
            .trim()
            .parse::<u64>()
            .map_err(|e| AppError::InvalidInput(format!("invalid ASN in policy {s:?}: {e}")))?;
        if asn == 0 || asn > MAX_ASN {
            return Err(AppError::InvalidInput(format!(
                "ASN {asn} in policy {s:?} is out of valid range"
            )));
        }

        let ipv4_next_hop = match parts[1].trim().parse::<IpAddr>() {
            Ok(IpAddr::V4(a)) => a,
            _ => {
                return Err(AppError::InvalidInput(format!(
                    "invalid IPv4 nexthop {:?} in policy {s:?}",
                    parts[1]
                )));
            }
        };

        let ipv6_next_hop = match parts.get(2).map(|p| p.trim()) {
            None | Some("") => None,
            Some(p) => match p.parse::<IpAddr>() {
                Ok(IpAddr::V6(a)) => Some(a),
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "invalid IPv6 nexthop {p:?} in policy {s:?}"
                    )));
                }
            },
        };

        Ok(Policy {
            asn: asn as u32,
            ipv4_next_hop,
            ipv6_next_hop,
        })
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AS{} via {}", self.asn, self.ipv4_next_hop)?;
        if let Some(v6) = self.ipv6_next_hop {
            write!(f, " / {v6}")?;
        }
        Ok(())
    }
}

/// 複数のポリシー文字列をまとめてパースする。
///
/// 空の場合と、同じASNが複数回指定された場合はエラー。
/// 出力先はASNとファミリで決まるため、ASNごとにポリシーは1件に限る。
pub fn parse_policies(policy_strings: &[String]) -> Result<Vec<Policy>, AppError> {
    let policies = policy_strings
        .iter()
        .map(|s| s.parse::<Policy>())
        .collect::<Result<Vec<_>, _>>()?;

    if policies.is_empty() {
        return Err(AppError::InvalidInput(
            "No policies provided. Use --policy to specify at least one policy.".into(),
        ));
    }

    let mut seen = HashSet::new();
    for policy in &policies {
        if !seen.insert(policy.asn) {
            return Err(AppError::InvalidInput(format!(
                "duplicate policy for AS{}. Specify each ASN only once.",
                policy.asn
            )));
        }
    }
    Ok(policies)
}
