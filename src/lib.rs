//! Risk scoring, ranking and region-detail model behind the hazard-risk
//! dashboard and its print report.
//!
//! Every function here takes plain data and returns plain data. Talking to
//! the feature service goes through the [`service::FeatureService`] trait,
//! and UI state changes go through [`state::reduce`].

pub mod chart;
pub mod config;
pub mod detail;
pub mod error;
pub mod indicators;
pub mod loader;
pub mod output;
pub mod rank;
pub mod report;
pub mod score;
pub mod service;
pub mod state;
pub mod types;
pub mod upload;
pub mod util;

pub use detail::{project, project_result};
pub use error::{Result, RiskError};
pub use rank::{next_page, reduce_rows, PAGE_SIZE};
pub use score::{classify, scale, unscale};
pub use service::{FeatureService, MemoryFeatureService};
pub use types::{
    AuxValue, Dimension, DisplayScore, QueryParams, RankPage, RankRow, RegionDetailView,
    RiskClass, RiskRecord, SortDirection,
};
