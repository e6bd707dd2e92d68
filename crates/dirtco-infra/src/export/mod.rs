//! Export functionality

mod quote_workbook;

pub use quote_workbook::export_quote_workbook;
