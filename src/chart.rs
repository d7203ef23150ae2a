//! Chart data for the dashboard and the report.
//!
//! These are plain data descriptions; whatever draws them maps each
//! [`ChartSpec`] variant onto its own chart type.

use crate::error::Result;
use crate::indicators::GROUPS;
use crate::score::{class_range, display_score};
use crate::types::{Dimension, RiskClass, RiskRecord};
use serde::Serialize;

pub const RISK_COLORS: [&str; 5] = ["#FFFDFB", "#F5C5AB", "#E19884", "#DB6857", "#C93636"];
pub const HAZARD_COLORS: [&str; 5] = ["#FFFDFB", "#FFF1E2", "#FEDCBA", "#FCB16C", "#F78721"];
pub const VULNERABILITY_COLORS: [&str; 5] = ["#FCFBFD", "#EDE8F4", "#CFC4E0", "#A68FC5", "#75559B"];
pub const EXPOSURE_COLORS: [&str; 5] = ["#F0F8FF", "#C2E0FF", "#7EB8FF", "#3A8CFF", "#0062CC"];

const GAUGE_TRACK: &str = "#F3F3F3";

/// Five-step ramp, lightest for `VeryLow`.
pub fn color_ramp(dimension: Dimension) -> &'static [&'static str; 5] {
    match dimension {
        Dimension::Risk => &RISK_COLORS,
        Dimension::Hazard => &HAZARD_COLORS,
        Dimension::Vulnerability => &VULNERABILITY_COLORS,
        Dimension::Exposure => &EXPOSURE_COLORS,
    }
}

/// Strongest color of the ramp, used for single-series charts.
pub fn accent_color(dimension: Dimension) -> &'static str {
    color_ramp(dimension)[4]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChartSpec {
    Gauge {
        value: f64,
        remainder: f64,
        colors: [String; 2],
    },
    Bar {
        labels: Vec<String>,
        values: Vec<f64>,
        colors: Vec<String>,
    },
    Polar {
        title: String,
        labels: Vec<String>,
        values: Vec<f64>,
        color: String,
    },
}

/// Half-ring gauge of the composite score out of 10.
pub fn gauge_chart(record: &RiskRecord) -> Result<ChartSpec> {
    let score = display_score(Dimension::Risk, record.risk)?;
    Ok(ChartSpec::Gauge {
        value: score.scaled,
        remainder: 10.0 - score.scaled,
        colors: [accent_color(Dimension::Risk).to_string(), GAUGE_TRACK.to_string()],
    })
}

/// Raw hazard, vulnerability and exposure values side by side.
pub fn dimensions_bar_chart(record: &RiskRecord) -> Result<ChartSpec> {
    let mut labels = Vec::new();
    let mut values = Vec::new();
    let mut colors = Vec::new();
    for dim in Dimension::COMPONENTS {
        let score = display_score(dim, record.value(dim))?;
        labels.push(dim.label().to_string());
        values.push(score.raw);
        colors.push(accent_color(dim).to_string());
    }
    Ok(ChartSpec::Bar { labels, values, colors })
}

/// One polar chart per indicator group. Gaps are plotted as zero.
pub fn indicator_polar_charts(record: &RiskRecord) -> Vec<ChartSpec> {
    GROUPS
        .iter()
        .map(|group| ChartSpec::Polar {
            title: group.title.to_string(),
            labels: group.indicators.iter().map(|(_, l)| l.to_string()).collect(),
            values: group
                .indicators
                .iter()
                .map(|(key, _)| record.aux(key).present().unwrap_or(0.0))
                .collect(),
            color: accent_color(group.dimension).to_string(),
        })
        .collect()
}

/// Every chart shown for a selected region, gauge first.
pub fn region_charts(record: &RiskRecord) -> Result<Vec<ChartSpec>> {
    let mut charts = vec![gauge_chart(record)?, dimensions_bar_chart(record)?];
    charts.extend(indicator_polar_charts(record));
    Ok(charts)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub class: RiskClass,
    pub label: String,
    pub color: String,
}

/// Legend for the five fixed bands, e.g. `Very Low (0.00 - 0.20)`.
pub fn legend(dimension: Dimension) -> Vec<LegendEntry> {
    let ramp = color_ramp(dimension);
    RiskClass::ALL
        .iter()
        .map(|class| {
            let (lo, hi) = class_range(*class);
            LegendEntry {
                class: *class,
                label: format!("{} ({:.2} - {:.2})", class.label(), lo, hi),
                color: ramp[class.index()].to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuxValue;
    use std::collections::BTreeMap;

    fn record() -> RiskRecord {
        let mut auxiliary = BTreeMap::new();
        auxiliary.insert("Hz1".to_string(), AuxValue::Value(0.8));
        auxiliary.insert("Ep2".to_string(), AuxValue::NoData);
        RiskRecord {
            region_id: "5".into(),
            region_name: "Delta".into(),
            parent_name: "East".into(),
            hazard: 0.5,
            vulnerability: 0.2,
            exposure: 0.9,
            risk: 0.5,
            population: 10,
            male: 5,
            female: 5,
            households: 2,
            auxiliary,
        }
    }

    #[test]
    fn gauge_splits_ten() {
        match gauge_chart(&record()).unwrap() {
            ChartSpec::Gauge { value, remainder, .. } => {
                assert!((value - 5.5).abs() < 1e-9);
                assert!((value + remainder - 10.0).abs() < 1e-9);
            }
            other => panic!("expected gauge, got {:?}", other),
        }
    }

    #[test]
    fn bar_uses_raw_component_values() {
        match dimensions_bar_chart(&record()).unwrap() {
            ChartSpec::Bar { labels, values, .. } => {
                assert_eq!(labels, ["Hazard", "Vulnerability", "Exposure"]);
                assert_eq!(values, [0.5, 0.2, 0.9]);
            }
            other => panic!("expected bar, got {:?}", other),
        }
    }

    #[test]
    fn polar_charts_follow_indicator_groups() {
        let charts = indicator_polar_charts(&record());
        assert_eq!(charts.len(), 3);
        match &charts[0] {
            ChartSpec::Polar { title, labels, values, .. } => {
                assert_eq!(title, "Hazard");
                assert_eq!(labels.len(), 6);
                assert_eq!(values[0], 0.8);
                assert_eq!(values[1], 0.0);
            }
            other => panic!("expected polar, got {:?}", other),
        }
        assert_eq!(region_charts(&record()).unwrap().len(), 5);
    }

    #[test]
    fn legend_labels_and_colors() {
        let entries = legend(Dimension::Hazard);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].label, "Very Low (0.00 - 0.20)");
        assert_eq!(entries[4].label, "Very High (0.80 - 1.00)");
        assert_eq!(entries[4].color, "#F78721");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(gauge_chart(&record()).unwrap()).unwrap();
        assert_eq!(json["kind"], "gauge");
    }
}
