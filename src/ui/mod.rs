//! Rendering: side/top panels and the chart page.

pub mod panels;
pub mod plot;
