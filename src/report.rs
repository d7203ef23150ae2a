//! Print-friendly single-region report.
//!
//! The report is built from the same [`RegionDetailView`] the dashboard
//! panel shows, so both always print identical numbers.

use crate::chart::{region_charts, ChartSpec};
use crate::detail::{project, project_result};
use crate::error::Result;
use crate::service::FeatureService;
use crate::types::{IndicatorTableRow, RegionDetailView, RiskRecord};
use crate::util::format_report_date;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;
use tabled::{settings::Style, Table};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    pub generated_on: String,
    pub detail: RegionDetailView,
    pub charts: Vec<ChartSpec>,
}

pub fn build_report(record: &RiskRecord, date: NaiveDate) -> Result<RegionReport> {
    Ok(RegionReport {
        generated_on: format_report_date(date),
        detail: project(record)?,
        charts: region_charts(record)?,
    })
}

/// Look up `region_id` (the report page's `id` parameter) and build its report.
pub fn fetch_report<S: FeatureService + ?Sized>(
    service: &S,
    region_id: &str,
    date: NaiveDate,
) -> Result<RegionReport> {
    let records = service.query_region(region_id)?;
    // not-found is decided by the projector so the dashboard and report agree
    let detail = project_result(region_id, &records)?;
    Ok(RegionReport {
        generated_on: format_report_date(date),
        detail,
        charts: region_charts(&records[0])?,
    })
}

pub fn render_markdown(report: &RegionReport) -> String {
    let d = &report.detail;
    let mut out = String::new();
    let _ = writeln!(out, "# Risk Report: {}\n", d.region_label);
    let _ = writeln!(out, "_Generated {}_\n", report.generated_on);
    let _ = writeln!(out, "## Summary\n");
    let _ = writeln!(
        out,
        "Risk score **{}** out of 10 ({})\n",
        d.composite.score.scaled_text(),
        d.composite.score.class_label()
    );
    let _ = writeln!(out, "{}\n", d.description);
    let _ = writeln!(out, "{}\n", Table::new(d.score_rows()).with(Style::markdown()));
    let _ = writeln!(
        out,
        "Population: {} (male {}, female {}), households: {}\n",
        d.population, d.male, d.female, d.households
    );

    for group in &d.indicators {
        let _ = writeln!(out, "## {}\n", group.title);
        if let Some(score) = d.dimension(group.dimension) {
            let _ = writeln!(
                out,
                "{} score **{}** ({})\n",
                group.title,
                score.score.scaled_text(),
                score.score.class_label()
            );
        }
        let rows: Vec<IndicatorTableRow> = group
            .lines
            .iter()
            .map(|l| IndicatorTableRow {
                indicator: l.label.clone(),
                value: l.value.clone(),
            })
            .collect();
        let _ = writeln!(out, "{}\n", Table::new(rows).with(Style::markdown()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MemoryFeatureService;
    use crate::types::AuxValue;
    use std::collections::BTreeMap;

    fn record() -> RiskRecord {
        let mut auxiliary = BTreeMap::new();
        auxiliary.insert("Ep1".to_string(), AuxValue::Value(0.125));
        RiskRecord {
            region_id: "88".into(),
            region_name: "Kunar".into(),
            parent_name: "East".into(),
            hazard: 0.5,
            vulnerability: 0.2,
            exposure: 0.9,
            risk: 0.7,
            population: 45_210,
            male: 22_000,
            female: 23_210,
            households: 6_100,
            auxiliary,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn report_matches_dashboard_detail() {
        let report = build_report(&record(), date()).unwrap();
        assert_eq!(report.detail, project(&record()).unwrap());
        assert_eq!(report.generated_on, "October 18, 2026");
        assert_eq!(report.charts.len(), 5);
    }

    #[test]
    fn markdown_contains_scores_and_no_data() {
        let md = render_markdown(&build_report(&record(), date()).unwrap());
        assert!(md.contains("# Risk Report: Kunar, East"));
        assert!(md.contains("Risk score **7.3** out of 10 (High)"));
        assert!(md.contains("Hazard score **5.5** (Moderate)"));
        assert!(md.contains("45,210"));
        assert!(md.contains("NoData"));
        assert!(md.contains("0.13") || md.contains("0.12"));
    }

    #[test]
    fn fetch_report_by_id() {
        let svc = MemoryFeatureService::new(vec![record()]);
        assert!(fetch_report(&svc, "88", date()).is_ok());
        assert!(matches!(
            fetch_report(&svc, "1", date()),
            Err(crate::error::RiskError::RegionNotFound(_))
        ));
    }
}
