use asroute::cli::Cli;
use asroute::commands::handle_export::run_export;
use asroute::commands::handle_range::run_range;
use asroute::error::AppError;
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;
use tokio::fs;

#[test]
fn cli_parses_range() {
    let cli = Cli::parse_from(["asroute", "-r", "10.0.0.1", "10.0.1.254"]);
    assert_eq!(
        cli.range,
        Some(vec!["10.0.0.1".to_string(), "10.0.1.254".to_string()])
    );
    assert!(cli.dbpath.is_none());
    assert_eq!(cli.output_format, "txt");
    assert_eq!(cli.mode, "overwrite");
    assert!(!cli.verbose);
}

#[test]
fn cli_parses_export_options() {
    let cli = Cli::parse_from([
        "asroute",
        "-d",
        "dbip-asn-lite.csv.gz",
        "-p",
        "64500,192.0.2.1",
        "64501,192.0.2.1,2001:db8::1",
        "--policy",
        "64502,192.0.2.2",
        "-f",
        "nft",
        "--concurrency",
        "3",
        "-v",
    ]);
    assert_eq!(cli.dbpath.as_deref(), Some("dbip-asn-lite.csv.gz"));
    assert_eq!(cli.policies.len(), 3);
    assert_eq!(cli.output_format, "nft");
    assert_eq!(cli.concurrency, 3);
    assert!(cli.verbose);
}

#[test]
fn cli_requires_range_or_dbpath() {
    assert!(Cli::try_parse_from(["asroute"]).is_err());
    // --dbpath には --policy が必要
    assert!(Cli::try_parse_from(["asroute", "-d", "db.csv"]).is_err());
    let both = [
        "asroute", "-r", "10.0.0.1", "10.0.0.2", "-d", "db.csv", "-p", "1,1.1.1.1",
    ];
    assert!(Cli::try_parse_from(both).is_err());
    assert!(Cli::try_parse_from(["asroute", "-r", "10.0.0.1", "-f", "xml"]).is_err());
}

#[test]
fn run_range_prints_one_prefix_per_line() {
    let mut out = Vec::new();
    let count =
        run_range("192.168.1.254", "192.168.2.1", &mut out).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(count, 2);
    assert_eq!(
        String::from_utf8(out).unwrap_or_else(|e| panic!("{e}")),
        "192.168.1.254/31\n192.168.2.0/31\n"
    );

    let mut out = Vec::new();
    assert!(matches!(
        run_range("192.168.1.1", "2001:db8::1", &mut out),
        Err(AppError::Range(_))
    ));
    assert!(out.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn run_export_writes_route_files() {
    let dir = PathBuf::from("target/test-output").join(format!("export_{}", rand::random::<u64>()));
    if let Err(e) = fs::create_dir_all(&dir).await {
        panic!("mkdir failed: {e}")
    }
    let db_path = dir.join("asn.csv");
    let csv = concat!(
        "10.0.0.0,10.0.0.255,64500,Example Org\n",
        "2001:db8::,2001:db8::ffff,64500,Example Org\n",
    );
    if let Err(e) = fs::write(&db_path, csv).await {
        panic!("write db failed: {e}")
    }

    let db_arg = db_path.to_string_lossy().to_string();
    let out_arg = dir.to_string_lossy().to_string();
    let cli = Cli::parse_from([
        "asroute",
        "-d",
        db_arg.as_str(),
        "-p",
        "64500,192.0.2.1,2001:db8:ffff::1",
        "-f",
        "json",
        "--output-dir",
        out_arg.as_str(),
    ]);

    if let Err(e) = run_export(&cli, &Client::new()).await {
        panic!("export failed: {e}")
    }

    let v4 = fs::read_to_string(dir.join("AS64500_IPv4.json"))
        .await
        .unwrap_or_else(|e| panic!("read v4: {e}"));
    let v6 = fs::read_to_string(dir.join("AS64500_IPv6.json"))
        .await
        .unwrap_or_else(|e| panic!("read v6: {e}"));
    assert!(v4.contains("\"10.0.0.0/24\""));
    assert!(v6.contains("\"2001:db8::/112\""));

    // データベースに無いASN
    let cli = Cli::parse_from([
        "asroute",
        "-d",
        db_arg.as_str(),
        "-p",
        "64999,192.0.2.1",
        "--output-dir",
        out_arg.as_str(),
    ]);
    assert!(matches!(
        run_export(&cli, &Client::new()).await,
        Err(AppError::NotFound(_))
    ));

    let _ = fs::remove_dir_all(&dir).await;
}
