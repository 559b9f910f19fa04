//! Bounding boxes: a value/time box for numeric temporals and a
//! spatiotemporal box for spatial values.

pub mod stbox;
pub mod tbox;

pub use stbox::STBox;
pub use tbox::TBox;
