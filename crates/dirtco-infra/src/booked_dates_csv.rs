//! Booked-date import from CSV
//!
//! The first column of each row holds a date (`YYYY-MM-DD` or an ISO
//! timestamp). A header row whose first cell is "date" is skipped; any
//! further columns, such as a job name, are ignored.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use dirtco_domain::service::parse_booked_dates;
use dirtco_types::{Error, Result};

pub fn load_booked_dates(path: &Path) -> Result<BTreeSet<NaiveDate>> {
    let file = std::fs::File::open(path)?;
    read_booked_dates(file)
}

pub fn read_booked_dates<R: Read>(reader: R) -> Result<BTreeSet<NaiveDate>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut raw = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|e| Error::Csv(e.to_string()))?;
        let Some(cell) = record.get(0) else {
            continue;
        };
        if cell.is_empty() || (index == 0 && cell.eq_ignore_ascii_case("date")) {
            continue;
        }
        raw.push(cell.to_string());
    }

    Ok(parse_booked_dates(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_with_header_and_extra_columns() {
        let csv = "date,job\n2026-10-20,Lopez trench\n2026-10-21T08:00:00Z,Lopez trench\n\n";
        let dates = read_booked_dates(csv.as_bytes()).unwrap();
        assert_eq!(dates.len(), 2);
        assert!(dates.contains(&date(2026, 10, 20)));
        assert!(dates.contains(&date(2026, 10, 21)));
    }

    #[test]
    fn test_headerless_duplicates_collapse() {
        let dates = read_booked_dates("2026-11-02\n2026-11-02\n2026-11-03\n".as_bytes()).unwrap();
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn test_malformed_date() {
        let err = read_booked_dates("date\nnext tuesday\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Quote(_)));
    }
}
