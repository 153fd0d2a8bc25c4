//! Camera-space tracking geometry
//!
//! [`TrackingRegion`] turns the two level settings into a movement rectangle
//! and a click rectangle; [`GazeMapper`] classifies each gaze pixel against
//! them and produces normalized screen targets.

mod mapper;
mod region;

pub use mapper::{to_screen, GazeMapper, GazeMapping, MappedGaze, EDGE_MAP_MARGIN_PX};
pub use region::{
    gap_for_level, level_for_gap, level_for_padding, padding_for_level, TrackingRegion,
    DEFAULT_INNER_LEVEL, DEFAULT_OUTER_LEVEL, GAP_LEVEL_BASE_PX, GAP_LEVEL_STEP_PX,
    MAX_INNER_LEVEL, MAX_OUTER_LEVEL, MIN_INNER_LEVEL, MIN_OUTER_LEVEL, PAD_AT_LEVEL_1,
    PAD_AT_MAX_LEVEL, PAD_LEVEL_STEP_PX,
};
