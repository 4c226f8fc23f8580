pub mod address;
pub mod cidr;
pub mod cli;
pub mod commands;
pub mod common;
pub mod constants;
pub mod error;
pub mod fetch;
pub mod ip_utils;
pub mod output;
pub mod output_common;
pub mod parse;
pub mod policy;
pub mod process;
pub mod route;

pub use address::Address;
pub use cidr::{
    AddressRange, Prefix, decompose, find_largest_prefix, ip_range_to_cidrs, last_address,
};
pub use error::{AppError, RangeError};
