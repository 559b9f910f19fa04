//! Native container model and text parser for temporal and mobility data.
//!
//! The crate provides the value kinds of a moving-object data model —
//! [`Set`](collections::Set), [`Span`](collections::Span),
//! [`SpanSet`](collections::SpanSet), the bounding boxes
//! [`TBox`](boxes::TBox) and [`STBox`](boxes::STBox), and the temporal
//! containers [`TInstant`](temporal::TInstant),
//! [`TSequence`](temporal::TSequence) and
//! [`TSequenceSet`](temporal::TSequenceSet) — together with the
//! recursive-descent text parser shared by all of them. Parsing is driven
//! by the [`catalog::MobType`] registry; construction enforces ordering,
//! deduplication, canonicalization, and SRID/dimensionality uniformity,
//! and precomputes bounding boxes.
//!
//! ```
//! use mobilis::catalog::MobType;
//! use mobilis::collections::Span;
//!
//! let span = Span::parse("[1, 5]", MobType::IntSpan).unwrap();
//! assert_eq!(span.to_wkt(15), "[1, 6)");
//! ```
//!
//! Every fallible operation returns a [`Result`]; no global state is
//! involved and every value is exclusively owned by its holder.

use bitmask_enum::bitmask;

pub mod boxes;
pub mod catalog;
pub mod collections;
pub mod datetime;
pub mod errors;
pub mod geo;
pub mod hash;
mod parser;
pub mod temporal;
mod utils;
pub mod value;

pub use boxes::{STBox, TBox};
pub use catalog::MobType;
pub use collections::{Ordered, Set, Span, SpanSet};
pub use errors::{Error, Result};
pub use geo::{GeoValue, NPoint, NSegment};
pub use temporal::{TInstant, TInterpolation, TSequence, TSequenceSet, Temporal};
pub use value::Value;

/// The flag byte shared by the container headers: value passing mode and
/// ordering for sets, dimension and geodetic bits for spatial values.
#[bitmask(u8)]
pub enum ValueFlags {
    /// Elements are stored inline in the slot words.
    ByValue,
    /// Elements are sorted and deduplicated.
    Ordered,
    /// The value carries an X (and Y) dimension.
    X,
    /// The value carries a Z dimension.
    Z,
    /// The value carries a time dimension.
    T,
    /// Coordinates are geodetic (on the sphere).
    Geodetic,
}
