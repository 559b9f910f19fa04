//! The type catalog: a closed enumeration of every supported tag and the
//! pure relations between them.
//!
//! The catalog is the single source of truth for "what can go with what".
//! Every parser and every container constructor routes through it; there is
//! no state, every relation is answered in constant time.

use crate::errors::{Error, Result};

/// Tag naming every supported base, set, span, span-set, box, and temporal
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MobType {
    // Base types
    Int,
    BigInt,
    Float,
    Text,
    Date,
    TimestampTz,
    Geometry,
    Geography,
    NPoint,
    // Set types
    IntSet,
    BigIntSet,
    FloatSet,
    TextSet,
    DateSet,
    TstzSet,
    GeomSet,
    GeogSet,
    NPointSet,
    // Span types
    IntSpan,
    BigIntSpan,
    FloatSpan,
    DateSpan,
    TstzSpan,
    // Span set types
    IntSpanSet,
    BigIntSpanSet,
    FloatSpanSet,
    DateSpanSet,
    TstzSpanSet,
    // Box types
    TBox,
    STBox,
    // Temporal types
    TInt,
    TFloat,
    TText,
    TGeomPoint,
    TGeogPoint,
    TNPoint,
}

use MobType::*;

impl MobType {
    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Int => "int",
            BigInt => "bigint",
            Float => "float",
            Text => "text",
            Date => "date",
            TimestampTz => "timestamptz",
            Geometry => "geometry",
            Geography => "geography",
            NPoint => "npoint",
            IntSet => "intset",
            BigIntSet => "bigintset",
            FloatSet => "floatset",
            TextSet => "textset",
            DateSet => "dateset",
            TstzSet => "tstzset",
            GeomSet => "geomset",
            GeogSet => "geogset",
            NPointSet => "npointset",
            IntSpan => "intspan",
            BigIntSpan => "bigintspan",
            FloatSpan => "floatspan",
            DateSpan => "datespan",
            TstzSpan => "tstzspan",
            IntSpanSet => "intspanset",
            BigIntSpanSet => "bigintspanset",
            FloatSpanSet => "floatspanset",
            DateSpanSet => "datespanset",
            TstzSpanSet => "tstzspanset",
            TBox => "tbox",
            STBox => "stbox",
            TInt => "tint",
            TFloat => "tfloat",
            TText => "ttext",
            TGeomPoint => "tgeompoint",
            TGeogPoint => "tgeogpoint",
            TNPoint => "tnpoint",
        }
    }

    /// True for the scalar domains from which higher kinds are built.
    pub fn is_base(self) -> bool {
        matches!(
            self,
            Int | BigInt | Float | Text | Date | TimestampTz | Geometry | Geography | NPoint
        )
    }

    pub fn is_set(self) -> bool {
        matches!(
            self,
            IntSet | BigIntSet | FloatSet | TextSet | DateSet | TstzSet | GeomSet | GeogSet
                | NPointSet
        )
    }

    pub fn is_span(self) -> bool {
        matches!(self, IntSpan | BigIntSpan | FloatSpan | DateSpan | TstzSpan)
    }

    pub fn is_span_set(self) -> bool {
        matches!(
            self,
            IntSpanSet | BigIntSpanSet | FloatSpanSet | DateSpanSet | TstzSpanSet
        )
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, TInt | TFloat | TText | TGeomPoint | TGeogPoint | TNPoint)
    }

    /// Base type of a set, span, span set, or temporal type.
    pub fn base_type(self) -> Option<MobType> {
        Some(match self {
            IntSet | IntSpan | IntSpanSet | TInt => Int,
            BigIntSet | BigIntSpan | BigIntSpanSet => BigInt,
            FloatSet | FloatSpan | FloatSpanSet | TFloat => Float,
            TextSet | TText => Text,
            DateSet | DateSpan | DateSpanSet => Date,
            TstzSet | TstzSpan | TstzSpanSet => TimestampTz,
            GeomSet | TGeomPoint => Geometry,
            GeogSet | TGeogPoint => Geography,
            NPointSet | TNPoint => NPoint,
            t if t.is_base() => t,
            _ => return None,
        })
    }

    /// Span type built over a base type, if the base supports spans.
    pub fn span_type(self) -> Option<MobType> {
        Some(match self {
            Int | IntSet | IntSpanSet => IntSpan,
            BigInt | BigIntSet | BigIntSpanSet => BigIntSpan,
            Float | FloatSet | FloatSpanSet => FloatSpan,
            Date | DateSet | DateSpanSet => DateSpan,
            TimestampTz | TstzSet | TstzSpanSet => TstzSpan,
            t if t.is_span() => t,
            _ => return None,
        })
    }

    /// Span set type paired with a span or base type.
    pub fn span_set_type(self) -> Option<MobType> {
        Some(match self {
            Int | IntSpan => IntSpanSet,
            BigInt | BigIntSpan => BigIntSpanSet,
            Float | FloatSpan => FloatSpanSet,
            Date | DateSpan => DateSpanSet,
            TimestampTz | TstzSpan => TstzSpanSet,
            t if t.is_span_set() => t,
            _ => return None,
        })
    }

    /// Set type built over a base type.
    pub fn set_type(self) -> Option<MobType> {
        Some(match self {
            Int => IntSet,
            BigInt => BigIntSet,
            Float => FloatSet,
            Text => TextSet,
            Date => DateSet,
            TimestampTz => TstzSet,
            Geometry => GeomSet,
            Geography => GeogSet,
            NPoint => NPointSet,
            t if t.is_set() => t,
            _ => return None,
        })
    }

    /// Temporal type whose samples are of this base type.
    pub fn temporal_type(self) -> Option<MobType> {
        Some(match self {
            Int => TInt,
            Float => TFloat,
            Text => TText,
            Geometry => TGeomPoint,
            Geography => TGeogPoint,
            NPoint => TNPoint,
            t if t.is_temporal() => t,
            _ => return None,
        })
    }

    /// True when the base value fits in one machine word.
    pub fn is_by_value(self) -> bool {
        matches!(self, Int | BigInt | Float | Date | TimestampTz)
    }

    /// True for discrete domains whose spans are stored canonically as
    /// `[lower, upper)`.
    pub fn is_canonical(self) -> bool {
        matches!(self.base_type(), Some(Int) | Some(BigInt) | Some(Date))
    }

    /// True when linear interpolation is admissible over the domain.
    pub fn is_continuous(self) -> bool {
        matches!(
            self.base_type(),
            Some(Float) | Some(TimestampTz) | Some(Geometry) | Some(Geography) | Some(NPoint)
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(self.base_type(), Some(Int) | Some(BigInt) | Some(Float))
    }

    pub fn is_spatial(self) -> bool {
        self == STBox
            || matches!(
                self.base_type(),
                Some(Geometry) | Some(Geography) | Some(NPoint)
            )
    }

    pub fn is_time(self) -> bool {
        matches!(self.base_type(), Some(Date) | Some(TimestampTz))
    }

    /// Base type of this tag, or an internal error naming the tag.
    pub(crate) fn expect_base_type(self) -> Result<MobType> {
        self.base_type()
            .ok_or_else(|| Error::internal(format!("Type {} has no base type", self.name())))
    }

    pub(crate) fn expect_span_type(self) -> Result<MobType> {
        self.span_type()
            .ok_or_else(|| Error::internal(format!("Type {} has no span type", self.name())))
    }

    pub(crate) fn expect_span_set_type(self) -> Result<MobType> {
        self.span_set_type()
            .ok_or_else(|| Error::internal(format!("Type {} has no span set type", self.name())))
    }

    pub(crate) fn expect_set_type(self) -> Result<MobType> {
        self.set_type()
            .ok_or_else(|| Error::internal(format!("Type {} has no set type", self.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sibling_relations_agree() {
        for base in [Int, BigInt, Float, Date, TimestampTz] {
            let span = base.span_type().unwrap();
            let span_set = base.span_set_type().unwrap();
            assert_eq!(span.base_type(), Some(base));
            assert_eq!(span.span_set_type(), Some(span_set));
            assert_eq!(span_set.span_type(), Some(span));
            assert_eq!(span_set.base_type(), Some(base));
        }
        for base in [Int, BigInt, Float, Text, Date, TimestampTz, Geometry, Geography, NPoint] {
            assert_eq!(base.set_type().unwrap().base_type(), Some(base));
        }
    }

    #[test]
    fn canonical_types_are_the_discrete_domains() {
        assert!(IntSpan.is_canonical());
        assert!(BigIntSpan.is_canonical());
        assert!(DateSpan.is_canonical());
        assert!(!FloatSpan.is_canonical());
        assert!(!TstzSpan.is_canonical());
    }

    #[test]
    fn continuity_drives_default_interpolation() {
        assert!(TFloat.is_continuous());
        assert!(TGeomPoint.is_continuous());
        assert!(TNPoint.is_continuous());
        assert!(!TInt.is_continuous());
        assert!(!TText.is_continuous());
    }

    #[test]
    fn text_has_no_span() {
        assert_eq!(Text.span_type(), None);
        assert!(Text.expect_span_type().is_err());
    }

    #[test]
    fn spatial_predicate() {
        assert!(GeomSet.is_spatial());
        assert!(TGeogPoint.is_spatial());
        assert!(NPointSet.is_spatial());
        assert!(STBox.is_spatial());
        assert!(!IntSet.is_spatial());
    }
}
