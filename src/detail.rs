//! Region detail projection shared by the dashboard panel and the print report.

use crate::error::{Result, RiskError};
use crate::indicators::GROUPS;
use crate::score::display_score;
use crate::types::{
    AuxValue, Dimension, DimensionScore, IndicatorGroupView, IndicatorLine, RegionDetailView,
    RiskRecord, ScoreTableRow,
};
use crate::util::{format_int, format_number};
use tracing::debug;

pub const NO_DATA: &str = "NoData";

/// Render one auxiliary value: two decimals, or `NoData` when missing or zero.
pub fn format_aux(value: AuxValue) -> String {
    match value.present() {
        Some(v) => format_number(v, 2),
        None => NO_DATA.to_string(),
    }
}

/// `"<region>, <parent>"`, skipping empty names.
pub fn region_label(record: &RiskRecord) -> String {
    [record.region_name.as_str(), record.parent_name.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Project the first record of a query for `region_id`.
///
/// An empty result is `RegionNotFound`; a partial view is never returned.
pub fn project_result(region_id: &str, records: &[RiskRecord]) -> Result<RegionDetailView> {
    let record = records
        .first()
        .ok_or_else(|| RiskError::RegionNotFound(region_id.to_string()))?;
    if records.len() > 1 {
        debug!(region_id, count = records.len(), "query matched several regions, using the first");
    }
    project(record)
}

pub fn project(record: &RiskRecord) -> Result<RegionDetailView> {
    let composite = DimensionScore {
        dimension: Dimension::Risk,
        score: display_score(Dimension::Risk, record.risk)?,
    };
    let dimensions = Dimension::COMPONENTS
        .iter()
        .map(|dim| {
            Ok(DimensionScore {
                dimension: *dim,
                score: display_score(*dim, record.value(*dim))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let indicators = GROUPS
        .iter()
        .map(|group| IndicatorGroupView {
            dimension: group.dimension,
            title: group.title.to_string(),
            lines: group
                .indicators
                .iter()
                .map(|(key, label)| IndicatorLine {
                    key: key.to_string(),
                    label: label.to_string(),
                    value: format_aux(record.aux(key)),
                })
                .collect(),
        })
        .collect();

    let label = region_label(record);
    let mut description = format!(
        "The risk index rating is {} (Score: {} out of 10) for {}",
        composite.score.class_label(),
        composite.score.scaled_text(),
        label
    );
    if !record.parent_name.is_empty() {
        description.push_str(&format!(" when compared to the rest of {}", record.parent_name));
    }
    description.push('.');

    Ok(RegionDetailView {
        region_id: record.region_id.clone(),
        region_label: label,
        parent_name: record.parent_name.clone(),
        composite,
        dimensions,
        population: format_int(record.population),
        male: format_int(record.male),
        female: format_int(record.female),
        households: format_int(record.households),
        indicators,
        description,
    })
}

impl RegionDetailView {
    /// Link to the print report for this region.
    pub fn report_link(&self, base: &str) -> String {
        format!("{}?id={}", base, self.region_id)
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        if dimension == Dimension::Risk {
            return Some(&self.composite);
        }
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    /// Composite first, then the components, in a fixed order.
    pub fn score_rows(&self) -> Vec<ScoreTableRow> {
        std::iter::once(&self.composite)
            .chain(self.dimensions.iter())
            .map(|d| ScoreTableRow {
                dimension: d.dimension.label().to_string(),
                score: d.score.scaled_text(),
                class: d.score.class_label().to_string(),
            })
            .collect()
    }
}
