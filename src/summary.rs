/*!
 * Summaries of the scan history of a field.
 */
use crate::scan::ScanReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The headline figures of a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanStatistic {
    pub scanned_at: DateTime<Utc>,
    #[serde(rename = "yield")]
    pub yield_estimate: f64,
    pub urea_required: f64,
    pub fertilizer_sacks: f64,
    /// Mean of the decidable levels.
    pub mean_level: f64,
}

impl From<&ScanReport> for ScanStatistic {
    fn from(report: &ScanReport) -> Self {
        ScanStatistic {
            scanned_at: report.scanned_at,
            yield_estimate: report.yield_estimate,
            urea_required: report.urea_required,
            fertilizer_sacks: report.fertilizer_sacks,
            mean_level: report.mean_level(),
        }
    }
}

/// The most recent scan of a field and the history of all its scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub field_id: Option<String>,
    /// Figures from the most recent scan.
    pub latest: ScanStatistic,
    /// Every scan, oldest first.
    pub statistics: Vec<ScanStatistic>,
}

impl FieldSummary {
    /**
     * Summarize the scans of a field.
     *
     * #Arguments
     * reports - the scans in any order.
     *
     * #Returns
     * `None` if there are no reports.
     */
    pub fn from_reports(reports: &[ScanReport]) -> Option<FieldSummary> {
        let (latest, mut statistics) = reports.iter().fold(
            (None::<&ScanReport>, Vec::<ScanStatistic>::with_capacity(reports.len())),
            |(latest, mut statistics), report| {
                statistics.push(ScanStatistic::from(report));

                let latest = match latest {
                    Some(prev) if prev.scanned_at >= report.scanned_at => prev,
                    _ => report,
                };

                (Some(latest), statistics)
            },
        );

        let latest = latest?;
        statistics.sort_by_key(|stat| stat.scanned_at);

        Some(FieldSummary {
            field_id: latest.field_id.clone(),
            latest: ScanStatistic::from(latest),
            statistics,
        })
    }

    pub fn num_scans(&self) -> usize {
        self.statistics.len()
    }

    /// Change in estimated yield between the two most recent scans.
    pub fn yield_change(&self) -> Option<f64> {
        match self.statistics.as_slice() {
            [.., prev, last] => Some(last.yield_estimate - prev.yield_estimate),
            _ => None,
        }
    }
}
