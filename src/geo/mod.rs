//! The opaque geometry kernel.
//!
//! The container model never looks inside a geometry beyond what this
//! module exposes: SRID, dimensionality flags, emptiness, a coordinate
//! extent for bounding boxes, and WKT/EWKT text I/O. Everything heavier
//! (projections, distances, predicates) lives outside the core.

pub mod npoint;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use wkt::types::{Coord, LineString, Point, Polygon};
use wkt::Wkt;

use crate::errors::{Error, Result};
use crate::hash;
use crate::parser::Cursor;
use crate::utils::format_float;

pub use npoint::{NPoint, NSegment};

/// SRID carried by values with no explicit reference system.
pub const SRID_UNKNOWN: i32 = 0;
/// Default SRID for geodetic values.
pub const WGS84_SRID: i32 = 4326;

/// An owned geometry or geography value: a parsed WKT body plus the SRID
/// and the geodetic flag.
#[derive(Debug, Clone)]
pub struct GeoValue {
    geom: Wkt<f64>,
    srid: i32,
    geodetic: bool,
}

impl GeoValue {
    /// Parse a WKT or EWKT literal (`SRID=<n>;` prefix optional).
    ///
    /// A geodetic value with no explicit SRID defaults to WGS-84.
    pub fn from_wkt(s: &str, geodetic: bool) -> Result<Self> {
        let mut cur = Cursor::new(s.trim());
        let srid = cur.parse_srid()?;
        let body = cur.rest().trim();
        let geom = Wkt::<f64>::from_str(body)
            .map_err(|e| Error::text(format!("Could not parse geometry: {e}: {body}")))?;
        let srid = match srid {
            Some(srid) => srid,
            None if geodetic => WGS84_SRID,
            None => SRID_UNKNOWN,
        };
        Ok(GeoValue { geom, srid, geodetic })
    }

    /// A point value built from coordinates; used when interpolating
    /// between point samples.
    pub fn point(x: f64, y: f64, z: Option<f64>, srid: i32, geodetic: bool) -> GeoValue {
        GeoValue {
            geom: Wkt::Point(Point(Some(Coord { x, y, z, m: None }))),
            srid,
            geodetic,
        }
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    pub fn set_srid(&mut self, srid: i32) {
        self.srid = srid;
    }

    pub fn is_geodetic(&self) -> bool {
        self.geodetic
    }

    pub fn is_empty(&self) -> bool {
        self.coords().is_empty()
    }

    pub fn has_z(&self) -> bool {
        self.coords().iter().any(|c| c.z.is_some())
    }

    pub fn has_m(&self) -> bool {
        self.coords().iter().any(|c| c.m.is_some())
    }

    /// Point coordinates, if this value is a non-empty point.
    pub fn point_coords(&self) -> Option<(f64, f64, Option<f64>)> {
        match &self.geom {
            Wkt::Point(Point(Some(c))) => Some((c.x, c.y, c.z)),
            _ => None,
        }
    }

    /// Coordinate extent `(xmin, xmax, ymin, ymax, z-range)`, or `None`
    /// when the value is empty.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64, Option<(f64, f64)>)> {
        let coords = self.coords();
        let first = coords.first()?;
        let (mut xmin, mut xmax) = (first.x, first.x);
        let (mut ymin, mut ymax) = (first.y, first.y);
        let mut zrange = first.z.map(|z| (z, z));
        for c in &coords[1..] {
            xmin = xmin.min(c.x);
            xmax = xmax.max(c.x);
            ymin = ymin.min(c.y);
            ymax = ymax.max(c.y);
            if let Some(z) = c.z {
                zrange = Some(match zrange {
                    Some((lo, hi)) => (lo.min(z), hi.max(z)),
                    None => (z, z),
                });
            }
        }
        Some((xmin, xmax, ymin, ymax, zrange))
    }

    /// WKT output without the SRID prefix.
    pub fn to_wkt(&self, maxdd: i32) -> String {
        format_geom(&self.geom, maxdd)
    }

    /// EWKT output: `SRID=<n>;` prefixed when an SRID is set.
    pub fn to_ewkt(&self, maxdd: i32) -> String {
        if self.srid > 0 {
            format!("SRID={};{}", self.srid, self.to_wkt(maxdd))
        } else {
            self.to_wkt(maxdd)
        }
    }

    pub(crate) fn hash32(&self) -> u32 {
        hash::hash_bytes(self.to_ewkt(17).as_bytes())
    }

    pub(crate) fn hash64(&self, seed: u64) -> u64 {
        hash::hash_bytes_extended(self.to_ewkt(17).as_bytes(), seed)
    }

    fn coords(&self) -> Vec<&Coord<f64>> {
        let mut out = Vec::new();
        collect_coords(&self.geom, &mut out);
        out
    }

    fn variant_rank(&self) -> u8 {
        match &self.geom {
            Wkt::Point(_) => 0,
            Wkt::LineString(_) => 1,
            Wkt::Polygon(_) => 2,
            Wkt::MultiPoint(_) => 3,
            Wkt::MultiLineString(_) => 4,
            Wkt::MultiPolygon(_) => 5,
            Wkt::GeometryCollection(_) => 6,
        }
    }
}

impl PartialEq for GeoValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GeoValue {}

impl PartialOrd for GeoValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GeoValue {
    /// Coordinate-lexicographic order, variants ranked first, SRID last.
    fn cmp(&self, other: &Self) -> Ordering {
        self.variant_rank()
            .cmp(&other.variant_rank())
            .then_with(|| {
                let a = self.coords();
                let b = other.coords();
                for (ca, cb) in a.iter().zip(b.iter()) {
                    let ord = ca
                        .x
                        .total_cmp(&cb.x)
                        .then_with(|| ca.y.total_cmp(&cb.y))
                        .then_with(|| {
                            ca.z.unwrap_or(0.0).total_cmp(&cb.z.unwrap_or(0.0))
                        });
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            })
            .then_with(|| self.srid.cmp(&other.srid))
    }
}

impl fmt::Display for GeoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ewkt(15))
    }
}

fn collect_coords<'a>(geom: &'a Wkt<f64>, out: &mut Vec<&'a Coord<f64>>) {
    match geom {
        Wkt::Point(Point(c)) => out.extend(c.iter()),
        Wkt::LineString(LineString(cs)) => out.extend(cs.iter()),
        Wkt::Polygon(Polygon(rings)) => {
            for LineString(cs) in rings {
                out.extend(cs.iter());
            }
        }
        Wkt::MultiPoint(mp) => {
            for Point(c) in &mp.0 {
                out.extend(c.iter());
            }
        }
        Wkt::MultiLineString(mls) => {
            for LineString(cs) in &mls.0 {
                out.extend(cs.iter());
            }
        }
        Wkt::MultiPolygon(mpoly) => {
            for Polygon(rings) in &mpoly.0 {
                for LineString(cs) in rings {
                    out.extend(cs.iter());
                }
            }
        }
        Wkt::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_coords(g, out);
            }
        }
    }
}

fn format_coord(c: &Coord<f64>, maxdd: i32, out: &mut String) {
    out.push_str(&format_float(c.x, maxdd));
    out.push(' ');
    out.push_str(&format_float(c.y, maxdd));
    if let Some(z) = c.z {
        out.push(' ');
        out.push_str(&format_float(z, maxdd));
    }
    if let Some(m) = c.m {
        out.push(' ');
        out.push_str(&format_float(m, maxdd));
    }
}

fn format_coord_seq(cs: &[Coord<f64>], maxdd: i32, out: &mut String) {
    out.push('(');
    for (i, c) in cs.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        format_coord(c, maxdd, out);
    }
    out.push(')');
}

fn format_rings(rings: &[LineString<f64>], maxdd: i32, out: &mut String) {
    out.push('(');
    for (i, LineString(cs)) in rings.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        format_coord_seq(cs, maxdd, out);
    }
    out.push(')');
}

fn dim_tag(geom: &Wkt<f64>) -> &'static str {
    let mut coords = Vec::new();
    collect_coords(geom, &mut coords);
    let has_z = coords.iter().any(|c| c.z.is_some());
    let has_m = coords.iter().any(|c| c.m.is_some());
    match (has_z, has_m) {
        (true, true) => " ZM ",
        (true, false) => " Z ",
        (false, true) => " M ",
        (false, false) => "",
    }
}

fn format_geom(geom: &Wkt<f64>, maxdd: i32) -> String {
    let mut out = String::new();
    match geom {
        Wkt::Point(Point(None)) => out.push_str("POINT EMPTY"),
        Wkt::Point(Point(Some(c))) => {
            out.push_str("POINT");
            out.push_str(dim_tag(geom));
            out.push('(');
            format_coord(c, maxdd, &mut out);
            out.push(')');
        }
        Wkt::LineString(LineString(cs)) => {
            if cs.is_empty() {
                out.push_str("LINESTRING EMPTY");
            } else {
                out.push_str("LINESTRING");
                out.push_str(dim_tag(geom));
                format_coord_seq(cs, maxdd, &mut out);
            }
        }
        Wkt::Polygon(Polygon(rings)) => {
            if rings.is_empty() {
                out.push_str("POLYGON EMPTY");
            } else {
                out.push_str("POLYGON");
                out.push_str(dim_tag(geom));
                format_rings(rings, maxdd, &mut out);
            }
        }
        Wkt::MultiPoint(mp) => {
            if mp.0.is_empty() {
                out.push_str("MULTIPOINT EMPTY");
            } else {
                out.push_str("MULTIPOINT");
                out.push_str(dim_tag(geom));
                out.push('(');
                for (i, Point(c)) in mp.0.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if let Some(c) = c {
                        format_coord(c, maxdd, &mut out);
                    } else {
                        out.push_str("EMPTY");
                    }
                }
                out.push(')');
            }
        }
        Wkt::MultiLineString(mls) => {
            if mls.0.is_empty() {
                out.push_str("MULTILINESTRING EMPTY");
            } else {
                out.push_str("MULTILINESTRING");
                out.push_str(dim_tag(geom));
                out.push('(');
                for (i, LineString(cs)) in mls.0.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    format_coord_seq(cs, maxdd, &mut out);
                }
                out.push(')');
            }
        }
        Wkt::MultiPolygon(mpoly) => {
            if mpoly.0.is_empty() {
                out.push_str("MULTIPOLYGON EMPTY");
            } else {
                out.push_str("MULTIPOLYGON");
                out.push_str(dim_tag(geom));
                out.push('(');
                for (i, Polygon(rings)) in mpoly.0.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    format_rings(rings, maxdd, &mut out);
                }
                out.push(')');
            }
        }
        Wkt::GeometryCollection(gc) => {
            if gc.0.is_empty() {
                out.push_str("GEOMETRYCOLLECTION EMPTY");
            } else {
                out.push_str("GEOMETRYCOLLECTION(");
                for (i, g) in gc.0.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&format_geom(g, maxdd));
                }
                out.push(')');
            }
        }
    }
    out
}
