//! Spatiotemporal boxes: an optional 2/3-D coordinate extent, an optional
//! time span, an SRID, and the geodetic flag.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};

use crate::catalog::MobType;
use crate::collections::span::Span;
use crate::errors::{Error, Result};
use crate::geo::{GeoValue, SRID_UNKNOWN, WGS84_SRID};
use crate::hash;
use crate::parser::Cursor;
use crate::utils::{format_float, round_float};
use crate::value::Value;
use crate::ValueFlags;

#[derive(Debug, Clone)]
pub struct STBox {
    srid: i32,
    flags: ValueFlags,
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    zmin: f64,
    zmax: f64,
    period: Option<Span>,
}

impl STBox {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        has_x: bool,
        has_z: bool,
        geodetic: bool,
        srid: i32,
        xmin: f64,
        xmax: f64,
        ymin: f64,
        ymax: f64,
        zmin: f64,
        zmax: f64,
        period: Option<Span>,
    ) -> Result<STBox> {
        if !has_x && period.is_none() {
            return Err(Error::arg_value(
                "A spatiotemporal box must have at least one dimension",
            ));
        }
        if has_z && !has_x {
            return Err(Error::arg_value(
                "A spatiotemporal box with a Z dimension must have an X dimension",
            ));
        }
        if let Some(p) = &period {
            if p.span_type() != MobType::TstzSpan {
                return Err(Error::arg_type(format!(
                    "The time span of a spatiotemporal box must be a tstzspan, not {}",
                    p.span_type().name()
                )));
            }
        }
        let mut flags = ValueFlags::none();
        if has_x {
            flags |= ValueFlags::X;
        }
        if has_z {
            flags |= ValueFlags::Z;
        }
        if period.is_some() {
            flags |= ValueFlags::T;
        }
        if geodetic {
            flags |= ValueFlags::Geodetic;
        }
        Ok(STBox {
            srid,
            flags,
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
            period,
        })
    }

    /// Bounding box of a non-empty geometry.
    pub fn from_geo(geo: &GeoValue) -> Result<STBox> {
        let (xmin, xmax, ymin, ymax, zrange) = geo.extent().ok_or_else(|| {
            Error::arg_value("An empty geometry has no bounding box")
        })?;
        let (zmin, zmax) = zrange.unwrap_or((0.0, 0.0));
        STBox::new(
            true,
            zrange.is_some(),
            geo.is_geodetic(),
            geo.srid(),
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
            None,
        )
    }

    /// Time-only box from a single timestamp.
    pub fn from_timestamptz(t: DateTime<Utc>) -> Result<STBox> {
        let period = Span::from_value(Value::Timestamp(t))?;
        STBox::new(
            false, false, false, SRID_UNKNOWN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, Some(period),
        )
    }

    /// Time-only box from a timestamptz span.
    pub fn from_tstzspan(period: Span) -> Result<STBox> {
        STBox::new(
            false, false, false, SRID_UNKNOWN, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, Some(period),
        )
    }

    /// Parse from the text form
    /// `[SRID=<n>;]{STBOX|GEODSTBOX} {X|Z|T|XT|ZT}(…)`.
    pub fn parse(s: &str) -> Result<STBox> {
        let type_str = MobType::STBox.name();
        let mut cur = Cursor::new(s);
        let srid = cur.parse_srid()?;
        let geodetic = if cur.try_keyword("GEODSTBOX") {
            true
        } else if cur.try_keyword("STBOX") {
            false
        } else {
            return Err(Error::text("Could not parse spatiotemporal box"));
        };
        let srid = match srid {
            Some(srid) => srid,
            None if geodetic => WGS84_SRID,
            None => SRID_UNKNOWN,
        };
        let (has_x, has_z, has_t) = if cur.try_keyword("ZT") {
            (true, true, true)
        } else if cur.try_keyword("XT") {
            (true, false, true)
        } else if cur.try_keyword("Z") {
            (true, true, false)
        } else if cur.try_keyword("X") {
            (true, false, false)
        } else if cur.try_keyword("T") {
            (false, false, true)
        } else {
            return Err(Error::parse(type_str, "Missing dimension information"));
        };

        let (mut xmin, mut xmax, mut ymin, mut ymax) = (0.0, 0.0, 0.0, 0.0);
        let (mut zmin, mut zmax) = (0.0, 0.0);
        if has_t {
            cur.expect_oparen(type_str)?;
        }
        if has_x {
            cur.expect_oparen(type_str)?;
            cur.expect_oparen(type_str)?;
            xmin = cur.parse_double()?;
            cur.try_comma();
            ymin = cur.parse_double()?;
            if has_z {
                cur.try_comma();
                zmin = cur.parse_double()?;
            }
            cur.expect_cparen(type_str)?;
            cur.try_comma();
            cur.expect_oparen(type_str)?;
            xmax = cur.parse_double()?;
            cur.try_comma();
            ymax = cur.parse_double()?;
            if has_z {
                cur.try_comma();
                zmax = cur.parse_double()?;
            }
            cur.expect_cparen(type_str)?;
            cur.expect_cparen(type_str)?;
            if has_t {
                cur.try_comma();
            }
        }
        let period = if has_t {
            let p = Span::parse_cursor(&mut cur, MobType::TstzSpan, false)?;
            cur.expect_cparen(type_str)?;
            Some(p)
        } else {
            None
        };
        cur.expect_end(type_str)?;
        STBox::new(
            has_x, has_z, geodetic, srid, xmin, xmax, ymin, ymax, zmin, zmax, period,
        )
    }

    pub fn has_x(&self) -> bool {
        self.flags.contains(ValueFlags::X)
    }

    pub fn has_z(&self) -> bool {
        self.flags.contains(ValueFlags::Z)
    }

    pub fn has_t(&self) -> bool {
        self.flags.contains(ValueFlags::T)
    }

    pub fn is_geodetic(&self) -> bool {
        self.flags.contains(ValueFlags::Geodetic)
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }

    pub fn xmin(&self) -> Option<f64> {
        self.has_x().then_some(self.xmin)
    }

    pub fn xmax(&self) -> Option<f64> {
        self.has_x().then_some(self.xmax)
    }

    pub fn ymin(&self) -> Option<f64> {
        self.has_x().then_some(self.ymin)
    }

    pub fn ymax(&self) -> Option<f64> {
        self.has_x().then_some(self.ymax)
    }

    pub fn zmin(&self) -> Option<f64> {
        self.has_z().then_some(self.zmin)
    }

    pub fn zmax(&self) -> Option<f64> {
        self.has_z().then_some(self.zmax)
    }

    pub fn period(&self) -> Option<&Span> {
        self.period.as_ref()
    }

    pub fn tmin(&self) -> Option<DateTime<Utc>> {
        self.period.as_ref().and_then(|p| p.lower().as_timestamp())
    }

    pub fn tmax(&self) -> Option<DateTime<Utc>> {
        self.period.as_ref().and_then(|p| p.upper().as_timestamp())
    }

    /// Grow this box to the union of itself and `other`.
    pub fn expand(&mut self, other: &STBox) -> Result<()> {
        if self.has_x() != other.has_x()
            || self.has_z() != other.has_z()
            || self.has_t() != other.has_t()
        {
            return Err(Error::arg_value(
                "Operation on spatiotemporal boxes of mixed dimensions",
            ));
        }
        if self.is_geodetic() != other.is_geodetic() {
            return Err(Error::arg_value("Operation on mixed planar and geodetic boxes"));
        }
        if self.srid != other.srid {
            return Err(Error::arg_value(format!(
                "Operation on mixed SRID: {} and {}",
                self.srid, other.srid
            )));
        }
        if self.has_x() {
            self.xmin = self.xmin.min(other.xmin);
            self.xmax = self.xmax.max(other.xmax);
            self.ymin = self.ymin.min(other.ymin);
            self.ymax = self.ymax.max(other.ymax);
            if self.has_z() {
                self.zmin = self.zmin.min(other.zmin);
                self.zmax = self.zmax.max(other.zmax);
            }
        }
        if let (Some(a), Some(b)) = (&mut self.period, &other.period) {
            a.expand(b);
        }
        Ok(())
    }

    /// Round the coordinate extent to `maxdd` decimal digits.
    pub fn round(&self, maxdd: i32) -> Result<STBox> {
        if maxdd < 0 {
            return Err(Error::arg_value("The number of decimal digits must not be negative"));
        }
        let mut out = self.clone();
        if out.has_x() {
            out.xmin = round_float(out.xmin, maxdd);
            out.xmax = round_float(out.xmax, maxdd);
            out.ymin = round_float(out.ymin, maxdd);
            out.ymax = round_float(out.ymax, maxdd);
            if out.has_z() {
                out.zmin = round_float(out.zmin, maxdd);
                out.zmax = round_float(out.zmax, maxdd);
            }
        }
        Ok(out)
    }

    /// Shift and/or scale the time dimension.
    pub fn shift_scale_time(
        &self,
        shift: Option<TimeDelta>,
        duration: Option<TimeDelta>,
    ) -> Result<STBox> {
        let period = self
            .period
            .as_ref()
            .ok_or_else(|| Error::arg_value("The box has no time dimension"))?;
        let mut out = self.clone();
        out.period = Some(period.shift_scale_time(shift, duration)?);
        Ok(out)
    }

    pub fn hash32(&self) -> u32 {
        let mut h = hash::hash_u32(self.flags.bits() as u32 | ((self.srid as u32) << 8));
        if self.has_x() {
            for v in [self.xmin, self.xmax, self.ymin, self.ymax] {
                h = hash::combine(h, hash::hash_u32(v.to_bits() as u32 ^ (v.to_bits() >> 32) as u32));
            }
            if self.has_z() {
                for v in [self.zmin, self.zmax] {
                    h = hash::combine(h, hash::hash_u32(v.to_bits() as u32 ^ (v.to_bits() >> 32) as u32));
                }
            }
        }
        if let Some(p) = &self.period {
            h = hash::combine(h, p.hash32());
        }
        h
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        let mut h = hash::hash_u64_extended(self.flags.bits() as u64 | ((self.srid as u64) << 8), seed);
        if self.has_x() {
            for v in [self.xmin, self.xmax, self.ymin, self.ymax] {
                h = hash::combine_extended(h, hash::hash_u64_extended(v.to_bits(), seed));
            }
            if self.has_z() {
                for v in [self.zmin, self.zmax] {
                    h = hash::combine_extended(h, hash::hash_u64_extended(v.to_bits(), seed));
                }
            }
        }
        if let Some(p) = &self.period {
            h = hash::combine_extended(h, p.hash64(seed));
        }
        h
    }

    /// Order on `(flags, coordinates, period, srid)`; used when temporal
    /// values fall back to bounding-box comparison.
    pub fn cmp_boxes(&self, other: &STBox) -> Ordering {
        self.flags
            .bits()
            .cmp(&other.flags.bits())
            .then_with(|| self.xmin.total_cmp(&other.xmin))
            .then_with(|| self.xmax.total_cmp(&other.xmax))
            .then_with(|| self.ymin.total_cmp(&other.ymin))
            .then_with(|| self.ymax.total_cmp(&other.ymax))
            .then_with(|| self.zmin.total_cmp(&other.zmin))
            .then_with(|| self.zmax.total_cmp(&other.zmax))
            .then_with(|| match (&self.period, &other.period) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
            .then_with(|| self.srid.cmp(&other.srid))
    }

    /// Text output mirroring the parse grammar.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        let mut out = String::new();
        if self.srid > 0 {
            out.push_str(&format!("SRID={};", self.srid));
        }
        out.push_str(if self.is_geodetic() { "GEODSTBOX" } else { "STBOX" });
        out.push(' ');
        out.push_str(match (self.has_x(), self.has_z(), self.has_t()) {
            (true, true, true) => "ZT",
            (true, false, true) => "XT",
            (true, true, false) => "Z",
            (true, false, false) => "X",
            _ => "T",
        });
        if self.has_t() {
            out.push('(');
        }
        if self.has_x() {
            out.push('(');
            self.push_corner(&mut out, self.xmin, self.ymin, self.zmin, maxdd);
            out.push(',');
            self.push_corner(&mut out, self.xmax, self.ymax, self.zmax, maxdd);
            out.push(')');
            if self.has_t() {
                out.push(',');
            }
        }
        if let Some(p) = &self.period {
            out.push_str(&p.to_wkt(maxdd));
            out.push(')');
        }
        out
    }

    fn push_corner(&self, out: &mut String, x: f64, y: f64, z: f64, maxdd: i32) {
        out.push('(');
        out.push_str(&format_float(x, maxdd));
        out.push(',');
        out.push_str(&format_float(y, maxdd));
        if self.has_z() {
            out.push(',');
            out.push_str(&format_float(z, maxdd));
        }
        out.push(')');
    }
}

impl PartialEq for STBox {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_boxes(other) == Ordering::Equal
    }
}

impl Eq for STBox {}

impl Hash for STBox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl std::str::FromStr for STBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<STBox> {
        STBox::parse(s)
    }
}

impl fmt::Display for STBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_x_only() {
        let b: STBox = "STBOX X((1,1),(2,2))".parse().unwrap();
        assert!(b.has_x() && !b.has_z() && !b.has_t());
        assert_eq!(b.xmin(), Some(1.0));
        assert_eq!(b.ymax(), Some(2.0));
        assert_eq!(b.to_wkt(15), "STBOX X((1,1),(2,2))");
    }

    #[test]
    fn parse_zt_with_period() {
        let b: STBox = "STBOX ZT(((1,2,3),(4,5,6)),[2001-01-01, 2001-01-02])"
            .parse()
            .unwrap();
        assert!(b.has_x() && b.has_z() && b.has_t());
        assert_eq!(b.zmin(), Some(3.0));
        assert_eq!(b.zmax(), Some(6.0));
        assert!(b.tmin().unwrap() < b.tmax().unwrap());
        let again: STBox = b.to_wkt(15).parse().unwrap();
        assert_eq!(b, again);
    }

    #[test]
    fn parse_t_only() {
        let b: STBox = "STBOX T([2001-01-01, 2001-01-02])".parse().unwrap();
        assert!(!b.has_x() && b.has_t());
        assert_eq!(b.xmin(), None);
    }

    #[test]
    fn geodetic_box_defaults_to_wgs84() {
        let b: STBox = "GEODSTBOX Z((1,1,1),(2,2,2))".parse().unwrap();
        assert!(b.is_geodetic());
        assert_eq!(b.srid(), WGS84_SRID);
        let tagged: STBox = "SRID=7035;GEODSTBOX Z((1,1,1),(2,2,2))".parse().unwrap();
        assert_eq!(tagged.srid(), 7035);
    }

    #[test]
    fn srid_prefix_round_trips() {
        let b: STBox = "SRID=4326;STBOX X((1,1),(2,2))".parse().unwrap();
        assert_eq!(b.srid(), 4326);
        let again: STBox = b.to_wkt(15).parse().unwrap();
        assert_eq!(b, again);
    }

    #[test]
    fn from_geo_covers_extent() {
        let g = GeoValue::from_wkt("LINESTRING(0 0, 2 5)", false).unwrap();
        let b = STBox::from_geo(&g).unwrap();
        assert_eq!(b.xmin(), Some(0.0));
        assert_eq!(b.xmax(), Some(2.0));
        assert_eq!(b.ymax(), Some(5.0));
        assert!(!b.has_z());
        let empty = GeoValue::from_wkt("POINT EMPTY", false).unwrap();
        assert!(STBox::from_geo(&empty).is_err());
    }

    #[test]
    fn expand_unions_extents() {
        let mut a: STBox = "STBOX X((0,0),(1,1))".parse().unwrap();
        let b: STBox = "STBOX X((2,-1),(3,4))".parse().unwrap();
        a.expand(&b).unwrap();
        assert_eq!(a.to_wkt(15), "STBOX X((0,-1),(3,4))");
    }

    #[test]
    fn mixed_dimension_expand_is_rejected() {
        let mut a: STBox = "STBOX X((0,0),(1,1))".parse().unwrap();
        let b: STBox = "STBOX Z((0,0,0),(1,1,1))".parse().unwrap();
        assert!(a.expand(&b).is_err());
    }
}
