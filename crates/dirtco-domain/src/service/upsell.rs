//! Add-on suggestions per job type

use crate::model::{JobType, RateTable, UpsellSuggestion};

struct Candidate {
    id: &'static str,
    name: &'static str,
    benefit: &'static str,
}

const BRUSH_CLEARING: [Candidate; 2] = [
    Candidate {
        id: "haul-away-per-load",
        name: "Haul Away Service",
        benefit: "We remove all debris - site left clean",
    },
    Candidate {
        id: "fine-grading-finish",
        name: "Fine Grading Finish",
        benefit: "Smooth, level finish ready for landscaping",
    },
];

const TRENCHING: [Candidate; 2] = [
    Candidate {
        id: "backfill-compaction",
        name: "Backfill & Compaction",
        benefit: "Proper compaction prevents settling",
    },
    Candidate {
        id: "spoil-removal",
        name: "Spoil Removal",
        benefit: "We haul away all excavated material",
    },
];

const SITE_PREP: [Candidate; 2] = [
    Candidate {
        id: "compaction-pass",
        name: "Compaction Pass",
        benefit: "Ensures stable, solid base",
    },
    Candidate {
        id: "fine-grading-finish",
        name: "Fine Grading Finish",
        benefit: "Professional smooth finish",
    },
];

fn candidates(job_type: JobType) -> &'static [Candidate] {
    match job_type {
        JobType::BrushClearing => &BRUSH_CLEARING,
        JobType::Trenching => &TRENCHING,
        JobType::SitePrep => &SITE_PREP,
        JobType::Custom | JobType::EquipmentRental => &[],
    }
}

/// Add-ons worth offering that the customer has not already selected,
/// in priority order. Candidates missing from the rate table are skipped.
pub fn suggest_upsells<S: AsRef<str>>(
    rates: &RateTable,
    job_type: JobType,
    selected: &[S],
) -> Vec<UpsellSuggestion> {
    candidates(job_type)
        .iter()
        .filter(|c| !selected.iter().any(|s| s.as_ref() == c.id))
        .filter_map(|c| {
            rates.add_on_price(c.id).map(|cost| UpsellSuggestion {
                id: c.id.to_string(),
                name: c.name.to_string(),
                cost,
                benefit: c.benefit.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_suggestions_in_order() {
        let upsells = suggest_upsells::<&str>(&RateTable::default(), JobType::BrushClearing, &[]);
        let ids: Vec<&str> = upsells.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["haul-away-per-load", "fine-grading-finish"]);
        assert!((upsells[0].cost - 450.0).abs() < f64::EPSILON);
        assert_eq!(upsells[0].name, "Haul Away Service");
    }

    #[test]
    fn test_selected_add_on_not_suggested() {
        let upsells =
            suggest_upsells(&RateTable::default(), JobType::Trenching, &["backfill-compaction"]);
        assert_eq!(upsells.len(), 1);
        assert_eq!(upsells[0].id, "spoil-removal");
    }

    #[test]
    fn test_site_prep_benefit_text() {
        let upsells = suggest_upsells::<&str>(&RateTable::default(), JobType::SitePrep, &[]);
        assert_eq!(upsells[1].benefit, "Professional smooth finish");
    }

    #[test]
    fn test_no_suggestions_for_custom_and_rental() {
        let rates = RateTable::default();
        assert!(suggest_upsells::<&str>(&rates, JobType::Custom, &[]).is_empty());
        assert!(suggest_upsells::<&str>(&rates, JobType::EquipmentRental, &[]).is_empty());
    }

    #[test]
    fn test_candidate_missing_from_rates_skipped() {
        let mut rates = RateTable::default();
        rates.add_ons.remove("haul-away-per-load");
        let upsells = suggest_upsells::<&str>(&rates, JobType::BrushClearing, &[]);
        assert_eq!(upsells.len(), 1);
        assert_eq!(upsells[0].id, "fine-grading-finish");
    }
}
