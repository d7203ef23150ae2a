//! Dashboard state and its transitions.
//!
//! Every user action or query response is an [`Action`] fed through
//! [`reduce`]. Requests are stamped with a generation; a response whose
//! generation is not the latest one for its flow is dropped, so the last
//! request always wins.

use crate::error::Result;
use crate::rank::next_page;
use crate::types::{Dimension, QueryParams, RankPage, RegionDetailView};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub generation: u64,
    pub params: QueryParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub generation: u64,
    pub region_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub rank_field: Dimension,
    pub start_index: usize,
    pub page_generation: u64,
    pub pending_page: Option<PageRequest>,
    pub page: Option<RankPage>,
    pub page_error: Option<String>,
    pub selected_region: Option<String>,
    pub detail_generation: u64,
    pub pending_detail: Option<DetailRequest>,
    pub detail: Option<RegionDetailView>,
    pub detail_error: Option<String>,
    pub uploaded_layers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectRankField(Dimension),
    RequestPage { start_index: usize },
    PageLoaded { generation: u64, page: RankPage },
    PageFailed { generation: u64, message: String },
    RequestDetail { region_id: String },
    DetailLoaded { generation: u64, view: RegionDetailView },
    DetailFailed { generation: u64, message: String },
    ClearSelection,
    LayerUploaded { name: String },
}

impl DashboardState {
    pub fn new(rank_field: Dimension) -> Self {
        DashboardState {
            rank_field,
            start_index: 1,
            page_generation: 0,
            pending_page: None,
            page: None,
            page_error: None,
            selected_region: None,
            detail_generation: 0,
            pending_detail: None,
            detail: None,
            detail_error: None,
            uploaded_layers: Vec::new(),
        }
    }

    fn issue_page(mut self) -> Result<Self> {
        let params = next_page(self.rank_field.field_name(), self.start_index)?;
        self.page_generation += 1;
        self.pending_page = Some(PageRequest {
            generation: self.page_generation,
            params,
        });
        Ok(self)
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        DashboardState::new(Dimension::Risk)
    }
}

pub fn reduce(state: DashboardState, action: Action) -> Result<DashboardState> {
    let mut state = state;
    match action {
        Action::SelectRankField(field) => {
            state.rank_field = field;
            state.start_index = 1;
            state.issue_page()
        }
        Action::RequestPage { start_index } => {
            // validate before touching the state
            next_page(state.rank_field.field_name(), start_index)?;
            state.start_index = start_index;
            state.issue_page()
        }
        Action::PageLoaded { generation, page } => {
            if generation != state.page_generation {
                debug!(generation, latest = state.page_generation, "stale page discarded");
                return Ok(state);
            }
            state.pending_page = None;
            state.page = Some(page);
            state.page_error = None;
            Ok(state)
        }
        Action::PageFailed { generation, message } => {
            if generation != state.page_generation {
                debug!(generation, "stale page failure discarded");
                return Ok(state);
            }
            state.pending_page = None;
            state.page_error = Some(message);
            Ok(state)
        }
        Action::RequestDetail { region_id } => {
            state.detail_generation += 1;
            state.selected_region = Some(region_id.clone());
            state.pending_detail = Some(DetailRequest {
                generation: state.detail_generation,
                region_id,
            });
            Ok(state)
        }
        Action::DetailLoaded { generation, view } => {
            if generation != state.detail_generation {
                debug!(generation, latest = state.detail_generation, "stale detail discarded");
                return Ok(state);
            }
            state.pending_detail = None;
            state.detail = Some(view);
            state.detail_error = None;
            Ok(state)
        }
        Action::DetailFailed { generation, message } => {
            if generation != state.detail_generation {
                debug!(generation, "stale detail failure discarded");
                return Ok(state);
            }
            state.pending_detail = None;
            state.detail = None;
            state.detail_error = Some(message);
            Ok(state)
        }
        Action::ClearSelection => {
            // bump so an in-flight detail response lands as stale
            state.detail_generation += 1;
            state.selected_region = None;
            state.pending_detail = None;
            state.detail = None;
            state.detail_error = None;
            Ok(state)
        }
        Action::LayerUploaded { name } => {
            if !state.uploaded_layers.contains(&name) {
                state.uploaded_layers.push(name);
            }
            Ok(state)
        }
    }
}
