use crate::error::{Result, RiskError};
use crate::score::check_range;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tabled::Tabled;

/// The four pre-computed indicators carried by every region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Risk,
    Hazard,
    Vulnerability,
    Exposure,
}

// Lower-cased aliases used by the feature service layers and dashboard controls.
static FIELD_ALIASES: Lazy<HashMap<&'static str, Dimension>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for alias in ["risk", "n_ri", "risk_score", "riskscore"] {
        m.insert(alias, Dimension::Risk);
    }
    for alias in ["hazard", "n_h", "susceptibility_score"] {
        m.insert(alias, Dimension::Hazard);
    }
    for alias in ["vulnerabil", "vulnerability", "n_pv"] {
        m.insert(alias, Dimension::Vulnerability);
    }
    for alias in ["exposure", "n_e", "n_exposure", "exposure_score"] {
        m.insert(alias, Dimension::Exposure);
    }
    m
});

impl Dimension {
    /// Hazard, vulnerability, exposure: the dimensions the composite is built from.
    pub const COMPONENTS: [Dimension; 3] =
        [Dimension::Hazard, Dimension::Vulnerability, Dimension::Exposure];

    pub fn from_field(field: &str) -> Result<Dimension> {
        FIELD_ALIASES
            .get(field.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| RiskError::UnknownField(field.to_string()))
    }

    /// Column name in the feature service schema.
    pub fn field_name(&self) -> &'static str {
        match self {
            Dimension::Risk => "Risk",
            Dimension::Hazard => "Hazard",
            Dimension::Vulnerability => "Vulnerabil",
            Dimension::Exposure => "Exposure",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Risk => "Risk",
            Dimension::Hazard => "Hazard",
            Dimension::Vulnerability => "Vulnerability",
            Dimension::Exposure => "Exposure",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Five ordinal classes, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskClass {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskClass {
    pub const ALL: [RiskClass; 5] = [
        RiskClass::VeryLow,
        RiskClass::Low,
        RiskClass::Moderate,
        RiskClass::High,
        RiskClass::VeryHigh,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskClass::VeryLow => "Very Low",
            RiskClass::Low => "Low",
            RiskClass::Moderate => "Moderate",
            RiskClass::High => "High",
            RiskClass::VeryHigh => "Very High",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An auxiliary indicator: either a finite number or an explicit gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AuxValue {
    Value(f64),
    NoData,
}

impl AuxValue {
    pub fn from_option(v: Option<f64>) -> AuxValue {
        match v {
            Some(x) if x.is_finite() => AuxValue::Value(x),
            _ => AuxValue::NoData,
        }
    }

    /// Zero counts as missing, matching how the dashboard has always shown these.
    pub fn present(&self) -> Option<f64> {
        match self {
            AuxValue::Value(v) if *v != 0.0 => Some(*v),
            _ => None,
        }
    }
}

/// One administrative region's risk snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub region_id: String,
    pub region_name: String,
    pub parent_name: String,
    pub hazard: f64,
    pub vulnerability: f64,
    pub exposure: f64,
    pub risk: f64,
    pub population: u64,
    pub male: u64,
    pub female: u64,
    pub households: u64,
    #[serde(default)]
    pub auxiliary: BTreeMap<String, AuxValue>,
}

impl RiskRecord {
    pub fn value(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Risk => self.risk,
            Dimension::Hazard => self.hazard,
            Dimension::Vulnerability => self.vulnerability,
            Dimension::Exposure => self.exposure,
        }
    }

    pub fn aux(&self, key: &str) -> AuxValue {
        self.auxiliary.get(key).copied().unwrap_or(AuxValue::NoData)
    }

    /// Checks that every normalized indicator lies in [0, 1].
    pub fn validate(&self) -> Result<()> {
        for dim in [
            Dimension::Risk,
            Dimension::Hazard,
            Dimension::Vulnerability,
            Dimension::Exposure,
        ] {
            check_range(dim.field_name(), self.value(dim))?;
        }
        Ok(())
    }
}

/// Derived on demand; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayScore {
    pub raw: f64,
    pub scaled: f64,
    pub class: RiskClass,
}

impl DisplayScore {
    /// The 1-10 score with one decimal, as shown on the dashboard and the report.
    pub fn scaled_text(&self) -> String {
        format!("{:.1}", self.scaled)
    }

    pub fn class_label(&self) -> &'static str {
        self.class.label()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Parameters for one ranked-page request against the feature service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    pub field: Dimension,
    pub offset: usize,
    pub limit: usize,
    pub sort_direction: SortDirection,
}

impl QueryParams {
    /// `orderByFields` entry, e.g. `Risk DESC`.
    pub fn order_by(&self) -> String {
        format!("{} {}", self.field.field_name(), self.sort_direction.keyword())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRow {
    pub rank: usize,
    pub region_id: String,
    pub display_score: DisplayScore,
    pub region_label: String,
    pub population: u64,
    pub households: u64,
}

/// A window into a server-ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankPage {
    pub field: Dimension,
    pub page: usize,
    pub page_size: usize,
    pub rows: Vec<RankRow>,
    pub total_count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RankTableRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "Class")]
    #[tabled(rename = "Class")]
    pub class: String,
    #[serde(rename = "Population")]
    #[tabled(rename = "Population")]
    pub population: String,
    #[serde(rename = "Households")]
    #[tabled(rename = "Households")]
    pub households: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: Dimension,
    pub score: DisplayScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorLine {
    pub key: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorGroupView {
    pub dimension: Dimension,
    pub title: String,
    pub lines: Vec<IndicatorLine>,
}

/// Everything the detail panel and the print report show for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDetailView {
    pub region_id: String,
    pub region_label: String,
    pub parent_name: String,
    pub composite: DimensionScore,
    pub dimensions: Vec<DimensionScore>,
    pub population: String,
    pub male: String,
    pub female: String,
    pub households: String,
    pub indicators: Vec<IndicatorGroupView>,
    pub description: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ScoreTableRow {
    #[serde(rename = "Dimension")]
    #[tabled(rename = "Dimension")]
    pub dimension: String,
    #[serde(rename = "Score")]
    #[tabled(rename = "Score")]
    pub score: String,
    #[serde(rename = "Class")]
    #[tabled(rename = "Class")]
    pub class: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct IndicatorTableRow {
    #[serde(rename = "Indicator")]
    #[tabled(rename = "Indicator")]
    pub indicator: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Core columns of a feature-service CSV export.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "ID_2")]
    pub id: Option<String>,
    #[serde(rename = "NAME_2")]
    pub name: Option<String>,
    #[serde(rename = "NAME_1")]
    pub parent_name: Option<String>,
    #[serde(rename = "Hazard")]
    pub hazard: Option<String>,
    #[serde(rename = "Vulnerabil")]
    pub vulnerability: Option<String>,
    #[serde(rename = "Exposure")]
    pub exposure: Option<String>,
    #[serde(rename = "Risk")]
    pub risk: Option<String>,
    #[serde(rename = "Population")]
    pub population: Option<String>,
    #[serde(rename = "Male")]
    pub male: Option<String>,
    #[serde(rename = "Female")]
    pub female: Option<String>,
    #[serde(rename = "Households")]
    pub households: Option<String>,
}
