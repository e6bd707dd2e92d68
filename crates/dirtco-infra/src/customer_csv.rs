//! Customer list export as CSV

use std::io::Write;
use std::path::Path;

use dirtco_domain::model::Customer;
use dirtco_types::{Error, Result};
use tracing::info;

const HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Email",
    "Phone",
    "Company",
    "Total Jobs",
    "Total Revenue",
    "Created",
];

pub fn write_customers_csv<W: Write>(writer: W, customers: &[Customer]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(HEADERS)
        .map_err(|e| Error::Csv(e.to_string()))?;

    for customer in customers {
        let total_jobs = customer.total_jobs.to_string();
        let total_revenue = customer.total_revenue.to_string();
        let created = customer.created_at.format("%Y-%m-%d").to_string();
        csv_writer
            .write_record([
                customer.id.as_str(),
                customer.name.as_str(),
                customer.email.as_str(),
                customer.phone.as_str(),
                customer.company.as_str(),
                total_jobs.as_str(),
                total_revenue.as_str(),
                created.as_str(),
            ])
            .map_err(|e| Error::Csv(e.to_string()))?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn export_customers_csv(path: &Path, customers: &[Customer]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_customers_csv(file, customers)?;
    info!(path = %path.display(), count = customers.len(), "exported customers");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_quoting() {
        let mut customer = Customer::new(
            "Lopez, Maria".to_string(),
            "maria@example.com".to_string(),
            "951-555-0101".to_string(),
        );
        customer.total_jobs = 2;
        customer.total_revenue = 7280;

        let mut buffer = Vec::new();
        write_customers_csv(&mut buffer, &[customer.clone()]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "ID,Name,Email,Phone,Company,Total Jobs,Total Revenue,Created"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with(&format!("{},\"Lopez, Maria\",", customer.id)));
        assert!(row.contains(",2,7280,"));
        assert!(lines.next().is_none());
    }
}
