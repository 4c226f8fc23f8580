use crate::common::IpFamily;
use crate::error::AppError;
use crate::parse::AsInfo;
use crate::policy::Policy;
use ipnet::IpNet;
use serde::Serialize;
use std::net::IpAddr;
use tracing::debug;

/// BGP ORIGIN 属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Igp,
    Egp,
    Incomplete,
}

/// 広告する経路1件 (プレフィックス + 経路属性)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteAnnouncement {
    pub prefix: IpNet,
    pub next_hop: IpAddr,
    pub origin: Origin,
    pub as_path: Vec<u32>,
}

/// ポリシーと1つのファミリに対応する経路のまとまり
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBatch {
    pub policy: Policy,
    pub organization: String,
    pub family: IpFamily,
    pub routes: Vec<RouteAnnouncement>,
}

/// 経路の受け取り先。BGPスピーカーやファイル出力がこれを実装する
pub trait RouteSink {
    fn announce(&self, batch: &RouteBatch) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// ポリシーとASの情報から、ファミリごとの経路リストを作る。
///
/// IPv4プレフィックスはIPv4ネクストホップ、IPv6プレフィックスはIPv6ネクストホップへ向ける。
/// IPv6ネクストホップが未設定の場合、IPv6プレフィックスは広告しない。
pub fn build_announcements(policy: &Policy, info: &AsInfo) -> Vec<RouteBatch> {
    let mut v4_routes = Vec::new();
    let mut v6_routes = Vec::new();
    let mut skipped_v6 = 0usize;

    for prefix in &info.prefixes {
        let next_hop = match prefix.family() {
            IpFamily::V4 => IpAddr::V4(policy.ipv4_next_hop),
            IpFamily::V6 => match policy.ipv6_next_hop {
                Some(nh) => IpAddr::V6(nh),
                None => {
                    skipped_v6 += 1;
                    continue;
                }
            },
        };

        let route = RouteAnnouncement {
            prefix: IpNet::from(*prefix),
            next_hop,
            origin: Origin::Igp,
            as_path: vec![policy.asn],
        };
        match prefix.family() {
            IpFamily::V4 => v4_routes.push(route),
            IpFamily::V6 => v6_routes.push(route),
        }
    }

    if skipped_v6 > 0 {
        debug!(
            "Skipping {} IPv6 paths for ASN {} ({}) because IPv6 nexthop is not configured",
            skipped_v6, policy.asn, info.organization
        );
    }

    [(IpFamily::V4, v4_routes), (IpFamily::V6, v6_routes)]
        .into_iter()
        .map(|(family, routes)| RouteBatch {
            policy: *policy,
            organization: info.organization.clone(),
            family,
            routes,
        })
        .collect()
}
