//! Excel export of a quote

use std::path::Path;

use dirtco_domain::model::QuoteRecord;
use dirtco_domain::service::QuoteDocument;
use dirtco_types::{Error, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::info;

fn xlsx_err(e: rust_xlsxwriter::XlsxError) -> Error {
    Error::Excel(e.to_string())
}

/// Write a workbook with a customer-facing "Quote" sheet and an internal
/// "Costs" sheet
pub fn export_quote_workbook(
    quote: &QuoteRecord,
    document: &QuoteDocument,
    output_path: &Path,
) -> Result<()> {
    let mut workbook = Workbook::new();

    let quote_sheet = workbook.add_worksheet();
    write_quote_sheet(quote_sheet, document)?;

    let costs_sheet = workbook.add_worksheet();
    write_costs_sheet(costs_sheet, quote)?;

    workbook.save(output_path).map_err(xlsx_err)?;
    info!(
        path = %output_path.display(),
        quote_number = %quote.quote_number,
        "exported quote workbook"
    );
    Ok(())
}

fn write_quote_sheet(sheet: &mut Worksheet, doc: &QuoteDocument) -> Result<()> {
    sheet.set_name("Quote").map_err(xlsx_err)?;

    let header_format = Format::new().set_bold();
    let money_format = Format::new().set_num_format("$#,##0.00");
    let total_format = Format::new().set_bold().set_num_format("$#,##0.00");
    let date_fmt = "%b %-d, %Y";

    sheet
        .write_string_with_format(0, 0, "Temecula Valley Dirt Co. - Quote", &header_format)
        .map_err(xlsx_err)?;

    let info_rows = [
        ("Quote #:", doc.quote_number.clone()),
        ("Date:", doc.quote_date.format(date_fmt).to_string()),
        ("Valid Until:", doc.valid_until.format(date_fmt).to_string()),
        ("Customer:", doc.customer_name.clone()),
        ("Company:", doc.customer_company.clone().unwrap_or_default()),
        ("Email:", doc.customer_email.clone().unwrap_or_default()),
        ("Phone:", doc.customer_phone.clone().unwrap_or_default()),
        ("Job:", doc.job_label.clone()),
    ];
    let mut row: u32 = 2;
    for (label, value) in info_rows {
        sheet.write_string(row, 0, label).map_err(xlsx_err)?;
        sheet.write_string(row, 1, &value).map_err(xlsx_err)?;
        row += 1;
    }

    row += 1;
    for (col, header) in ["Description", "Detail", "Amount"].iter().enumerate() {
        sheet
            .write_string_with_format(row, col as u16, *header, &header_format)
            .map_err(xlsx_err)?;
    }
    row += 1;

    for item in &doc.line_items {
        sheet.write_string(row, 0, &item.description).map_err(xlsx_err)?;
        sheet
            .write_string(row, 1, item.detail.as_deref().unwrap_or(""))
            .map_err(xlsx_err)?;
        sheet
            .write_number_with_format(row, 2, item.amount, &money_format)
            .map_err(xlsx_err)?;
        row += 1;
    }

    row += 1;
    sheet
        .write_string_with_format(row, 0, "TOTAL QUOTE:", &header_format)
        .map_err(xlsx_err)?;
    sheet
        .write_number_with_format(row, 2, doc.total as f64, &total_format)
        .map_err(xlsx_err)?;

    if let Some(deposit) = doc.deposit {
        row += 1;
        sheet
            .write_string(row, 0, "Security Deposit Required:")
            .map_err(xlsx_err)?;
        sheet
            .write_number_with_format(row, 2, deposit, &money_format)
            .map_err(xlsx_err)?;
        if doc.coi_on_file {
            row += 1;
            sheet
                .write_string(row, 0, "Reduced deposit - Certificate of Insurance on file")
                .map_err(xlsx_err)?;
        }
    }

    row += 2;
    sheet
        .write_string_with_format(row, 0, "Terms & Conditions", &header_format)
        .map_err(xlsx_err)?;
    for term in &doc.terms {
        row += 1;
        sheet.write_string(row, 0, term).map_err(xlsx_err)?;
    }

    sheet.set_column_width(0, 44).map_err(xlsx_err)?;
    sheet.set_column_width(1, 36).map_err(xlsx_err)?;
    sheet.set_column_width(2, 14).map_err(xlsx_err)?;
    Ok(())
}

fn write_costs_sheet(sheet: &mut Worksheet, quote: &QuoteRecord) -> Result<()> {
    sheet.set_name("Costs").map_err(xlsx_err)?;

    let header_format = Format::new().set_bold();
    let money_format = Format::new().set_num_format("$#,##0.00");
    let costs = &quote.pricing.costs;
    let profit = &quote.pricing.profit;

    sheet
        .write_string_with_format(0, 0, "Internal Costs", &header_format)
        .map_err(xlsx_err)?;

    let money_rows = [
        ("Machine wear", costs.machine_wear_cost as f64),
        ("Fuel", costs.fuel_cost as f64),
        ("Labor", costs.labor_cost as f64),
        ("Materials", costs.material_cost as f64),
        ("Dump fees", costs.dump_fees as f64),
        ("Mobilization", costs.mobilization_fee),
        ("Total internal cost", costs.total_internal_cost as f64),
        ("Final price", quote.pricing.final_price as f64),
        ("Gross profit", profit.gross_profit as f64),
    ];

    sheet.write_string(2, 0, "Estimated hours").map_err(xlsx_err)?;
    sheet
        .write_number(2, 1, f64::from(costs.estimated_hours))
        .map_err(xlsx_err)?;

    let mut row: u32 = 3;
    for (label, amount) in money_rows {
        sheet.write_string(row, 0, label).map_err(xlsx_err)?;
        sheet
            .write_number_with_format(row, 1, amount, &money_format)
            .map_err(xlsx_err)?;
        row += 1;
    }

    sheet.write_string(row, 0, "Margin %").map_err(xlsx_err)?;
    sheet
        .write_number(row, 1, profit.margin_percent)
        .map_err(xlsx_err)?;
    row += 1;
    sheet.write_string(row, 0, "Status").map_err(xlsx_err)?;
    sheet
        .write_string(row, 1, profit.status.label())
        .map_err(xlsx_err)?;

    sheet.set_column_width(0, 24).map_err(xlsx_err)?;
    sheet.set_column_width(1, 16).map_err(xlsx_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dirtco_domain::model::{Customer, JobRequest, SitePrepJob};
    use dirtco_domain::service::{build_quote_document, PricingCalculator};
    use tempfile::TempDir;

    #[test]
    fn test_workbook_written() {
        let request = JobRequest::SitePrep(SitePrepJob {
            is_full_day: true,
            distance_miles: 12.0,
            add_ons: vec!["compaction-pass".to_string()],
        });
        let pricing = PricingCalculator::default().quote(&request).unwrap();
        let customer = Customer::new("Ana".into(), "ana@example.com".into(), "555".into());
        let quote =
            QuoteRecord::new("Q261019-001".into(), &customer, request, pricing, Utc::now(), 7);
        let doc = build_quote_document(&quote, Some(&customer));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quote.xlsx");
        export_quote_workbook(&quote, &doc, &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
