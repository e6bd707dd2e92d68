//! Infrastructure layer: file-backed repositories, loaders and exports

pub mod booked_dates_csv;
pub mod customer_csv;
pub mod export;
pub mod persistence;
pub mod rate_table_loader;

pub use booked_dates_csv::{load_booked_dates, read_booked_dates};
pub use customer_csv::{export_customers_csv, write_customers_csv};
pub use export::export_quote_workbook;
pub use persistence::FileRecordRepository;
pub use rate_table_loader::{load_rate_table, parse_rate_table, rate_table_to_toml};
