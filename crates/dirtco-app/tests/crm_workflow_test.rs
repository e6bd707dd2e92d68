//! End-to-end CRM workflow over file-backed repositories

use chrono::NaiveDate;
use dirtco_app::app::{CustomerUpdate, NewCustomer};
use dirtco_app::CrmService;
use dirtco_domain::model::{
    Access, BrushClearingJob, Density, EquipmentRentalJob, EquipmentType, JobRequest,
    PipelineStage, ProbabilityLabel, QuoteStatus, SitePrepJob, SoilType, TrenchDepth,
    TrenchingJob,
};
use dirtco_domain::PricingCalculator;
use dirtco_types::{Error, QuoteError};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open(dir: &std::path::Path) -> CrmService {
    CrmService::open(dir, PricingCalculator::default())
        .unwrap()
        .with_author("Test Author")
}

fn maria() -> NewCustomer {
    NewCustomer {
        name: "Maria Lopez".to_string(),
        email: "maria@example.com".to_string(),
        phone: "951-555-0101".to_string(),
        company: "Lopez Ranch".to_string(),
        ..Default::default()
    }
}

fn brush_request() -> JobRequest {
    JobRequest::BrushClearing(BrushClearingJob {
        acreage: 2.0,
        density: Density::Medium,
        access: Access::Easy,
        distance_miles: 0.0,
        add_ons: vec![],
    })
}

fn trench_request() -> JobRequest {
    JobRequest::Trenching(TrenchingJob {
        linear_feet: 400.0,
        depth: TrenchDepth::In18,
        soil_type: SoilType::Normal,
        distance_miles: 30.0,
        add_ons: vec![],
    })
}

#[test]
fn test_quote_to_completed_job() {
    let dir = tempdir().unwrap();
    let crm = open(dir.path());

    let customer = crm.add_customer(maria()).unwrap();
    let quote = crm.generate_quote(&customer.id, brush_request()).unwrap();
    assert_eq!(quote.status, QuoteStatus::Sent);
    assert_eq!(quote.pricing.final_price, 6600);
    assert_eq!((quote.expires_at - quote.created_at).num_days(), 7);
    assert!(quote.quote_number.starts_with('Q'));
    assert_eq!(quote.quote_number.len(), "Q261019-042".len());

    // Monday 2026-10-19: a 4-day job can start Mon or Tue, then not until the next Monday
    let job = crm.accept_quote_on(&quote.id, date(2026, 10, 19)).unwrap();
    assert_eq!(job.stage, PipelineStage::Accepted);
    let starts: Vec<NaiveDate> = job.estimated_start_dates.iter().map(|s| s.date).collect();
    assert_eq!(starts, vec![date(2026, 10, 19), date(2026, 10, 20), date(2026, 10, 26)]);

    let accepted = crm.get_quote(&quote.id).unwrap();
    assert_eq!(accepted.status, QuoteStatus::Accepted);
    assert!(matches!(
        crm.accept_quote_on(&quote.id, date(2026, 10, 19)),
        Err(Error::Duplicate(_))
    ));

    let customer = crm.get_customer(&customer.id).unwrap();
    assert_eq!(customer.total_jobs, 1);
    assert_eq!(customer.total_revenue, 6600);

    crm.update_job_stage(&job.id, PipelineStage::InProgress).unwrap();
    assert_eq!(crm.customer_lifetime_value(&customer.id).unwrap(), 6600);

    let done = crm.update_job_stage(&job.id, PipelineStage::Completed).unwrap();
    assert!(done.completed_date.is_some());

    let revenue = crm.revenue_by_stage().unwrap();
    let completed = revenue
        .iter()
        .find(|r| r.stage == PipelineStage::Completed)
        .unwrap();
    assert_eq!(completed.revenue, 6600);
    assert_eq!(crm.gross_profit().unwrap(), 3030);
}

#[test]
fn test_scheduled_jobs_block_later_starts() {
    let dir = tempdir().unwrap();
    let crm = open(dir.path());
    let customer = crm.add_customer(maria()).unwrap();

    let first = crm.generate_quote(&customer.id, trench_request()).unwrap();
    let first_job = crm.accept_quote_on(&first.id, date(2026, 10, 19)).unwrap();
    crm.schedule_job(&first_job.id, date(2026, 10, 19)).unwrap();

    let booked = crm.booked_dates().unwrap();
    assert!(booked.contains(&date(2026, 10, 19)));
    assert!(booked.contains(&date(2026, 10, 20)));

    // A second two-day job cannot overlap the booked Monday and Tuesday
    let second = crm.generate_quote(&customer.id, trench_request()).unwrap();
    let second_job = crm.accept_quote_on(&second.id, date(2026, 10, 19)).unwrap();
    assert_eq!(second_job.estimated_start_dates[0].date, date(2026, 10, 21));

    let clash = crm.schedule_job(&second_job.id, date(2026, 10, 20));
    assert!(matches!(
        clash,
        Err(Error::Quote(QuoteError::InvalidParameter { .. }))
    ));
    let friday = crm.schedule_job(&second_job.id, date(2026, 10, 23));
    assert!(friday.is_err());
}

#[test]
fn test_close_probability_for_quote() {
    let dir = tempdir().unwrap();
    let crm = open(dir.path());
    let customer = crm.add_customer(maria()).unwrap();

    let first = crm.generate_quote(&customer.id, brush_request()).unwrap();
    let score = crm
        .quote_close_probability_on(&first.id, date(2026, 10, 19))
        .unwrap();
    // new customer, 6600 > 3000, 0 mi, 45.9% margin, starts today
    assert_eq!(score.score, 55);
    assert_eq!(score.label, ProbabilityLabel::Medium);

    crm.accept_quote_on(&first.id, date(2026, 10, 19)).unwrap();
    let second = crm.generate_quote(&customer.id, brush_request()).unwrap();
    let score = crm
        .quote_close_probability_on(&second.id, date(2026, 10, 19))
        .unwrap();
    assert_eq!(score.score, 75);
    assert_eq!(score.label, ProbabilityLabel::High);
}

#[test]
fn test_leads_and_customers() {
    let dir = tempdir().unwrap();
    let crm = open(dir.path());

    let lead = crm
        .add_lead("Sam Ortiz", "sam@example.com", "951-555-0144", None)
        .unwrap();
    assert_eq!(lead.source, "Website");
    let lead = crm.update_lead_stage(&lead.id, PipelineStage::Contacted).unwrap();
    assert_eq!(lead.stage, PipelineStage::Contacted);

    let customer = crm.convert_lead(&lead.id).unwrap();
    assert_eq!(customer.tags, vec!["Converted Lead".to_string()]);
    assert!(crm.list_leads().unwrap().is_empty());
    assert!(matches!(crm.get_lead(&lead.id), Err(Error::NotFound(_))));

    let updated = crm
        .update_customer(
            &customer.id,
            CustomerUpdate {
                company: Some("Ortiz Grading".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.company, "Ortiz Grading");
    assert!(updated.last_updated.is_some());

    let noted = crm.add_customer_note(&customer.id, "Wants a spring start").unwrap();
    assert_eq!(noted.notes[0].author, "Test Author");
    assert!(noted.last_contacted.is_some());

    let with_follow_up = crm
        .schedule_follow_up(&customer.id, "Call about site visit", date(2026, 11, 2))
        .unwrap();
    assert!(!with_follow_up.follow_ups[0].completed);
    let done = crm.complete_follow_up(&customer.id, 0).unwrap();
    assert!(done.follow_ups[0].completed);
    assert!(matches!(
        crm.complete_follow_up(&customer.id, 5),
        Err(Error::NotFound(_))
    ));

    assert_eq!(crm.search_customers("ortiz").unwrap().len(), 1);
    assert_eq!(crm.search_customers("555-0144").unwrap().len(), 1);
    assert!(crm.search_customers("nobody").unwrap().is_empty());

    crm.delete_customer(&customer.id).unwrap();
    assert!(matches!(
        crm.delete_customer(&customer.id),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let customer_id;
    {
        let crm = open(dir.path());
        let customer = crm.add_customer(maria()).unwrap();
        customer_id = customer.id.clone();
        let request = JobRequest::SitePrep(SitePrepJob {
            is_full_day: false,
            distance_miles: 5.0,
            add_ons: vec!["compaction-pass".to_string()],
        });
        crm.generate_quote(&customer.id, request).unwrap();
    }

    let crm = open(dir.path());
    assert_eq!(crm.get_customer(&customer_id).unwrap().name, "Maria Lopez");
    let quotes = crm.list_quotes().unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].pricing.final_price, 1160);
}

#[test]
fn test_pipeline_search_and_exports() {
    let dir = tempdir().unwrap();
    let crm = open(dir.path());
    let customer = crm.add_customer(maria()).unwrap();

    let rental = JobRequest::EquipmentRental(EquipmentRentalJob {
        equipment_type: EquipmentType::MiniExcavator,
        rental_days: 10,
        damage_waiver: false,
        has_coi: false,
        needs_delivery: false,
        delivery_distance: 0.0,
    });
    let quote = crm.generate_quote(&customer.id, rental).unwrap();
    let job = crm.accept_quote_on(&quote.id, date(2026, 10, 19)).unwrap();
    // rentals go out any calendar day, however long they run
    let starts: Vec<NaiveDate> = job.estimated_start_dates.iter().map(|s| s.date).collect();
    assert_eq!(starts, vec![date(2026, 10, 19), date(2026, 10, 20), date(2026, 10, 21)]);

    let overview = crm.pipeline_overview().unwrap();
    assert_eq!(overview.len(), 8);
    let accepted = overview
        .iter()
        .find(|s| s.stage == PipelineStage::Accepted)
        .unwrap();
    assert_eq!(accepted.jobs.len(), 1);
    assert_eq!(accepted.jobs[0].final_price, 3500);

    assert_eq!(crm.search_jobs("equipment").unwrap().len(), 1);
    assert_eq!(crm.search_jobs("lopez").unwrap().len(), 1);
    assert_eq!(crm.jobs_by_customer(&customer.id).unwrap().len(), 1);

    let csv_path = dir.path().join("customers.csv");
    assert_eq!(crm.export_customers(&csv_path).unwrap(), 1);
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("ID,Name,Email,Phone,Company,Total Jobs,Total Revenue,Created"));

    let doc = crm.quote_document(&quote.id).unwrap();
    assert_eq!(doc.deposit, Some(1000.0));
    assert_eq!(doc.customer_company.as_deref(), Some("Lopez Ranch"));

    let xlsx_path = dir.path().join("quote.xlsx");
    crm.export_quote_workbook(&quote.id, &xlsx_path).unwrap();
    assert!(xlsx_path.exists());

    let report = crm.report().unwrap();
    assert_eq!(report.customers, 1);
    assert_eq!(report.jobs, 1);
    assert_eq!(report.open_quotes, 0);
}

fn rental_request(rental_days: u32) -> JobRequest {
    JobRequest::EquipmentRental(EquipmentRentalJob {
        equipment_type: EquipmentType::MiniExcavator,
        rental_days,
        damage_waiver: false,
        has_coi: true,
        needs_delivery: false,
        delivery_distance: 0.0,
    })
}

#[test]
fn test_week_long_rental_schedules_without_crew() {
    let dir = tempdir().unwrap();
    let crm = open(dir.path());
    let customer = crm.add_customer(maria()).unwrap();

    let quote = crm.generate_quote(&customer.id, rental_request(7)).unwrap();
    let job = crm.accept_quote_on(&quote.id, date(2026, 10, 19)).unwrap();
    assert_eq!(job.estimated_start_dates.len(), 3);
    assert_eq!(job.estimated_start_dates[0].date, date(2026, 10, 19));

    // Saturday pickup is fine for a rental
    let job = crm.schedule_job(&job.id, date(2026, 10, 24)).unwrap();
    assert_eq!(job.scheduled_date, Some(date(2026, 10, 24)));
    let job = crm.schedule_job(&job.id, date(2026, 10, 19)).unwrap();
    assert!(job.booked_dates().is_empty());
    assert!(crm.booked_dates().unwrap().is_empty());

    // the crew calendar is untouched, so a brush job still starts Monday
    let brush = crm.generate_quote(&customer.id, brush_request()).unwrap();
    let brush_job = crm.accept_quote_on(&brush.id, date(2026, 10, 19)).unwrap();
    let starts: Vec<NaiveDate> = brush_job.estimated_start_dates.iter().map(|s| s.date).collect();
    assert_eq!(starts, vec![date(2026, 10, 19), date(2026, 10, 20), date(2026, 10, 26)]);
    crm.schedule_job(&brush_job.id, date(2026, 10, 19)).unwrap();

    // and a booked crew does not hold back the next rental
    let second = crm.generate_quote(&customer.id, rental_request(3)).unwrap();
    let second_job = crm.accept_quote_on(&second.id, date(2026, 10, 19)).unwrap();
    assert_eq!(second_job.estimated_start_dates[0].date, date(2026, 10, 19));
    crm.schedule_job(&second_job.id, date(2026, 10, 20)).unwrap();
}

#[test]
fn test_missing_records_and_bad_input() {
    let dir = tempdir().unwrap();
    let crm = open(dir.path());
    assert!(matches!(
        crm.generate_quote("C-missing", brush_request()),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(crm.accept_quote("Q-missing"), Err(Error::NotFound(_))));
    assert!(matches!(
        crm.update_job_stage("J-missing", PipelineStage::Completed),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        crm.add_customer(NewCustomer::default()),
        Err(Error::Quote(QuoteError::InvalidParameter { .. }))
    ));

    let customer = crm.add_customer(maria()).unwrap();
    let bad = JobRequest::BrushClearing(BrushClearingJob {
        acreage: -1.0,
        density: Density::Light,
        access: Access::Easy,
        distance_miles: 0.0,
        add_ons: vec![],
    });
    assert!(matches!(
        crm.generate_quote(&customer.id, bad),
        Err(Error::Quote(QuoteError::InvalidParameter { .. }))
    ));
    assert!(crm.list_quotes().unwrap().is_empty());
}
