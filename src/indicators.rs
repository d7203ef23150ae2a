//! Auxiliary indicator catalogue.
//!
//! Each component dimension is broken down into a fixed, ordered list of
//! sub-indicators. Both the detail panel and the print report walk these
//! lists, so the order here is the order users see.

use crate::types::Dimension;

#[derive(Debug, Clone, Copy)]
pub struct IndicatorGroup {
    pub dimension: Dimension,
    pub title: &'static str,
    /// `(column key, display label)`
    pub indicators: &'static [(&'static str, &'static str)],
}

pub const HAZARD_INDICATORS: IndicatorGroup = IndicatorGroup {
    dimension: Dimension::Hazard,
    title: "Hazard",
    indicators: &[
        ("Hz1", "Slope Angle"),
        ("Hz2", "Soil Type"),
        ("Hz3", "Rainfall"),
        ("Hz4", "Land Use"),
        ("Hz5", "Geology"),
        ("Hz6", "Vegetation"),
    ],
};

pub const VULNERABILITY_INDICATORS: IndicatorGroup = IndicatorGroup {
    dimension: Dimension::Vulnerability,
    title: "Vulnerability",
    indicators: &[
        ("Vu1", "Population"),
        ("Vu2", "Buildings"),
        ("Vu3", "Infrastructure"),
        ("Vu4", "Agriculture"),
        ("Vu5", "Economy"),
    ],
};

pub const EXPOSURE_INDICATORS: IndicatorGroup = IndicatorGroup {
    dimension: Dimension::Exposure,
    title: "Exposure",
    indicators: &[
        ("Ep1", "Roads"),
        ("Ep2", "Schools"),
        ("Ep3", "Hospitals"),
        ("Ep4", "Bridges"),
        ("Ep5", "Utilities"),
    ],
};

pub const GROUPS: [IndicatorGroup; 3] =
    [HAZARD_INDICATORS, VULNERABILITY_INDICATORS, EXPOSURE_INDICATORS];

pub fn group_for(dimension: Dimension) -> Option<&'static IndicatorGroup> {
    GROUPS.iter().find(|g| g.dimension == dimension)
}

/// All indicator column keys, in display order.
pub fn all_keys() -> impl Iterator<Item = &'static str> {
    GROUPS
        .iter()
        .flat_map(|g| g.indicators.iter().map(|(key, _)| *key))
}
