use asroute::error::AppError;
use asroute::policy::{Policy, parse_policies};
use std::net::{Ipv4Addr, Ipv6Addr};

fn policy(s: &str) -> Policy {
    s.parse().unwrap_or_else(|e| panic!("failed to parse {s}: {e}"))
}

#[test]
fn parses_v4_only_and_dual_stack_policies() {
    let p = policy("64500,192.0.2.1");
    assert_eq!(p.asn, 64500);
    assert_eq!(p.ipv4_next_hop, Ipv4Addr::new(192, 0, 2, 1));
    assert_eq!(p.ipv6_next_hop, None);

    let p = policy("4200000000,192.0.2.1,2001:db8::1");
    assert_eq!(p.asn, 4_200_000_000);
    let v6: Ipv6Addr = "2001:db8::1".parse().unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(p.ipv6_next_hop, Some(v6));

    // 空のIPv6ネクストホップは未設定扱い
    assert_eq!(policy("64500,192.0.2.1,").ipv6_next_hop, None);
}

#[test]
fn rejects_malformed_policies() {
    let cases = [
        "64500",
        "0,192.0.2.1",
        "4294967296,192.0.2.1",
        "AS64500,192.0.2.1",
        "64500,2001:db8::1",
        "64500,192.0.2.1,192.0.2.2",
        "64500,192.0.2.999",
    ];
    for s in cases {
        assert!(
            matches!(s.parse::<Policy>(), Err(AppError::InvalidInput(_))),
            "{s} should be rejected"
        );
    }
}

#[test]
fn empty_policy_list_is_rejected() {
    assert!(matches!(parse_policies(&[]), Err(AppError::InvalidInput(_))));
    let list = vec![
        "64500,192.0.2.1".to_string(),
        "64501,198.51.100.1,2001:db8::1".to_string(),
    ];
    let parsed = parse_policies(&list).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[1].to_string(), "AS64501 via 198.51.100.1 / 2001:db8::1");
}

#[test]
fn duplicate_asn_is_rejected() {
    let list = vec!["64500,192.0.2.1".to_string(), "64500,192.0.2.1,2001:db8::1".to_string()];
    assert!(matches!(parse_policies(&list), Err(AppError::InvalidInput(_))));
}
