//! Ranked-list query planning and row reduction.

use crate::error::{Result, RiskError};
use crate::score::display_score;
use crate::service::FeatureSet;
use crate::types::{Dimension, QueryParams, RankPage, RankRow, RankTableRow, RiskRecord, SortDirection};
use crate::util::format_int;

pub const PAGE_SIZE: usize = 10;

/// Query parameters for the page whose first item is `start_index` (1-based,
/// as reported by the pagination control).
///
/// The first page is offset 0; every later page uses the start item itself
/// as the offset. This matches the ranking list's long-standing behavior,
/// which skips one row per page boundary.
pub fn next_page(field: &str, start_index: usize) -> Result<QueryParams> {
    let field = Dimension::from_field(field)?;
    if start_index == 0 {
        return Err(RiskError::InvalidCursor(start_index));
    }
    let offset = if start_index == 1 { 0 } else { start_index };
    Ok(QueryParams {
        field,
        offset,
        limit: PAGE_SIZE,
        sort_direction: SortDirection::Descending,
    })
}

/// Reduce a page of records into display rows, keeping their order.
pub fn reduce_rows(records: &[RiskRecord], field: &str) -> Result<Vec<RankRow>> {
    let field = Dimension::from_field(field)?;
    reduce_rows_from(records, field, 0)
}

fn reduce_rows_from(records: &[RiskRecord], field: Dimension, offset: usize) -> Result<Vec<RankRow>> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Ok(RankRow {
                rank: offset + i + 1,
                region_id: r.region_id.clone(),
                display_score: display_score(field, r.value(field))?,
                region_label: rank_label(r),
                population: r.population,
                households: r.households,
            })
        })
        .collect()
}

/// The ranking list names a region parent-first.
fn rank_label(r: &RiskRecord) -> String {
    [r.parent_name.as_str(), r.region_name.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Assemble the page a query produced.
pub fn build_page(params: &QueryParams, set: &FeatureSet) -> Result<RankPage> {
    let rows = reduce_rows_from(&set.features, params.field, params.offset)?;
    Ok(RankPage {
        field: params.field,
        page: params.offset,
        page_size: params.limit,
        rows,
        total_count: set.total_count,
    })
}

/// Number of pages the pagination control shows for `total_count` items.
pub fn total_pages(total_count: usize) -> usize {
    total_count.div_ceil(PAGE_SIZE)
}

/// 1-based start item for a 1-based page number.
///
/// Page 0, or a page whose start item does not fit in `usize`, is
/// `InvalidCursor`.
pub fn start_item_for_page(page_number: usize) -> Result<usize> {
    page_number
        .checked_sub(1)
        .and_then(|p| p.checked_mul(PAGE_SIZE))
        .and_then(|i| i.checked_add(1))
        .ok_or(RiskError::InvalidCursor(page_number))
}

impl RankRow {
    pub fn to_table_row(&self) -> RankTableRow {
        RankTableRow {
            rank: self.rank,
            region: self.region_label.clone(),
            score: self.display_score.scaled_text(),
            class: self.display_score.class_label().to_string(),
            population: format_int(self.population),
            households: format_int(self.households),
        }
    }
}

impl RankPage {
    pub fn table_rows(&self) -> Vec<RankTableRow> {
        self.rows.iter().map(RankRow::to_table_row).collect()
    }
}
