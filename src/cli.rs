use crate::constants::{DEFAULT_CONCURRENCY, DEFAULT_MAX_BACKOFF_SECS, DEFAULT_RETRY_ATTEMPTS};
use clap::Parser;
use std::path::PathBuf;

/// CLIの定義
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "This tool converts the IP ranges of an ASN database into minimal CIDR prefixes and exports them as policy routes."
)]
pub struct Cli {
    #[arg(
        short = 'r',
        long = "range",
        num_args = 2,
        value_names = ["START", "END"],
        required_unless_present = "dbpath",
        conflicts_with = "dbpath",
        help = "Decompose a single inclusive address range into CIDR prefixes.\nExample: 10.0.0.1 10.0.1.254"
    )]
    pub range: Option<Vec<String>>,

    #[arg(
        short = 'd',
        long = "dbpath",
        required_unless_present = "range",
        requires = "policies",
        help = "ASN database (start_ip,end_ip,asn,organization) as csv or csv.gz.\nA local path or an http(s) URL."
    )]
    pub dbpath: Option<String>,

    #[arg(
        short = 'p',
        long = "policy",
        num_args = 1..,
        help = "Routing policy to export.\nFormat: <asn>,<ipv4_nexthop>[,<ipv6_nexthop>]\nExample: 64500,192.0.2.1,2001:db8::1"
    )]
    pub policies: Vec<String>,

    #[arg(
        short = 'f',
        long = "format",
        default_value = "txt",
        value_parser = ["txt", "nft", "json"],
        hide_default_value = true,
        help = "Select output format: 'txt', 'nft' or 'json'.\ndefault: txt"
    )]
    pub output_format: String,

    #[arg(
        short = 'm',
        long = "mode",
        default_value = "overwrite",
        value_parser = ["append", "overwrite"],
        hide_default_value = true,
        help = "Select file output mode: 'append' or 'overwrite'.\ndefault: overwrite"
    )]
    pub mode: String,

    #[arg(
        long = "output-dir",
        default_value = ".",
        help = "Directory to write the route files to."
    )]
    pub output_dir: PathBuf,

    #[arg(
        long = "concurrency",
        default_value_t = DEFAULT_CONCURRENCY,
        help = "Maximum number of route files written concurrently."
    )]
    pub concurrency: usize,

    #[arg(
        long = "max-retries",
        default_value_t = DEFAULT_RETRY_ATTEMPTS,
        help = "Download attempts when --dbpath is a URL."
    )]
    pub max_retries: u32,

    #[arg(
        long = "max-backoff-sec",
        default_value_t = DEFAULT_MAX_BACKOFF_SECS,
        help = "Upper bound of the exponential backoff between download attempts."
    )]
    pub max_backoff_sec: u64,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose logging.")]
    pub verbose: bool,
}
