pub mod handle_export;
pub mod handle_range;
