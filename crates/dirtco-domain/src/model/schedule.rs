//! Scheduling output types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A feasible job start date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableStart {
    pub date: NaiveDate,
    /// e.g. "Oct 19, 2026"
    pub formatted: String,
    pub days_from_today: i64,
}
