//! Feature query service contract and an in-memory implementation.
//!
//! The dashboard only ever talks to the service through [`FeatureService`];
//! transport failures come back as `RiskError::Transport` and are passed
//! through to the caller untouched.

use crate::detail::project_result;
use crate::error::Result;
use crate::rank::{build_page, next_page};
use crate::types::{QueryParams, RankPage, RegionDetailView, RiskRecord, SortDirection};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// One response of `queryFeatures`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    pub features: Vec<RiskRecord>,
    pub total_count: usize,
}

pub trait FeatureService {
    /// Ordered, offset-windowed query. `offset` is an item offset and
    /// `limit` a row cap.
    fn query_features(&self, params: &QueryParams) -> Result<FeatureSet>;

    fn query_feature_count(&self) -> Result<usize>;

    /// All records whose id equals `region_id`. Zero records is not an error
    /// at this level.
    fn query_region(&self, region_id: &str) -> Result<Vec<RiskRecord>>;
}

/// Serves a loaded dataset snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeatureService {
    records: Vec<RiskRecord>,
}

impl MemoryFeatureService {
    pub fn new(records: Vec<RiskRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RiskRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FeatureService for MemoryFeatureService {
    fn query_features(&self, params: &QueryParams) -> Result<FeatureSet> {
        let mut ordered: Vec<&RiskRecord> = self.records.iter().collect();
        ordered.sort_by(|a, b| {
            let (va, vb) = (a.value(params.field), b.value(params.field));
            let by_value = match params.sort_direction {
                SortDirection::Descending => vb.partial_cmp(&va),
                SortDirection::Ascending => va.partial_cmp(&vb),
            };
            by_value
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.region_id.cmp(&b.region_id))
        });
        let features: Vec<RiskRecord> = ordered
            .into_iter()
            .skip(params.offset)
            .take(params.limit)
            .cloned()
            .collect();
        debug!(
            order_by = %params.order_by(),
            offset = params.offset,
            returned = features.len(),
            "queryFeatures"
        );
        Ok(FeatureSet {
            features,
            total_count: self.records.len(),
        })
    }

    fn query_feature_count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn query_region(&self, region_id: &str) -> Result<Vec<RiskRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.region_id == region_id)
            .cloned()
            .collect())
    }
}

/// Plan, query and reduce one ranked page.
pub fn fetch_rank_page<S: FeatureService + ?Sized>(
    service: &S,
    field: &str,
    start_index: usize,
) -> Result<RankPage> {
    let params = next_page(field, start_index)?;
    let set = service.query_features(&params)?;
    build_page(&params, &set)
}

/// Query a single region and project it for display.
pub fn fetch_region_detail<S: FeatureService + ?Sized>(
    service: &S,
    region_id: &str,
) -> Result<RegionDetailView> {
    let records = service.query_region(region_id)?;
    project_result(region_id, &records)
}
