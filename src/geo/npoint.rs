//! Network points: a route identifier plus a relative position.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};
use crate::hash;
use crate::parser::Cursor;
use crate::utils::format_float;

/// A position along a route, with the position expressed as a fraction of
/// the route length in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct NPoint {
    rid: i64,
    pos: f64,
}

impl NPoint {
    pub fn new(rid: i64, pos: f64) -> Result<Self> {
        ensure_position(pos)?;
        Ok(NPoint { rid, pos })
    }

    pub fn route(&self) -> i64 {
        self.rid
    }

    pub fn position(&self) -> f64 {
        self.pos
    }

    /// Parse `NPOINT(<rid>,<pos>)` from the cursor.
    pub(crate) fn parse_cursor(cur: &mut Cursor<'_>, end: bool) -> Result<Self> {
        let type_str = "network point";
        if !cur.try_keyword("NPOINT") {
            return Err(Error::text("Could not parse network point"));
        }
        cur.expect_oparen(type_str)?;
        let rid = parse_i64(cur, type_str)?;
        cur.expect_char(b',', type_str)?;
        let pos = cur.parse_double()?;
        ensure_position(pos)?;
        cur.expect_cparen(type_str)?;
        if end {
            cur.expect_end(type_str)?;
        }
        NPoint::new(rid, pos)
    }

    pub fn to_wkt(&self, maxdd: i32) -> String {
        format!("NPOINT({},{})", self.rid, format_float(self.pos, maxdd))
    }

    pub(crate) fn hash32(&self) -> u32 {
        hash::combine(hash::hash_u32(self.rid as u32), hash::hash_u32(self.pos.to_bits() as u32))
    }

    pub(crate) fn hash64(&self, seed: u64) -> u64 {
        let h = hash::hash_u64_extended(self.rid as u64, seed);
        hash::combine_extended(h, hash::hash_u64_extended(self.pos.to_bits(), seed))
    }
}

impl PartialEq for NPoint {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NPoint {}

impl PartialOrd for NPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rid
            .cmp(&other.rid)
            .then_with(|| self.pos.total_cmp(&other.pos))
    }
}

impl FromStr for NPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut cur = Cursor::new(s);
        NPoint::parse_cursor(&mut cur, true)
    }
}

impl fmt::Display for NPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}

/// A segment of a route between two relative positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NSegment {
    rid: i64,
    pos1: f64,
    pos2: f64,
}

impl NSegment {
    /// The two positions are stored in increasing order.
    pub fn new(rid: i64, pos1: f64, pos2: f64) -> Result<Self> {
        ensure_position(pos1)?;
        ensure_position(pos2)?;
        let (pos1, pos2) = if pos1 <= pos2 { (pos1, pos2) } else { (pos2, pos1) };
        Ok(NSegment { rid, pos1, pos2 })
    }

    pub fn route(&self) -> i64 {
        self.rid
    }

    pub fn start_position(&self) -> f64 {
        self.pos1
    }

    pub fn end_position(&self) -> f64 {
        self.pos2
    }

    pub fn to_wkt(&self, maxdd: i32) -> String {
        format!(
            "NSEGMENT({},{},{})",
            self.rid,
            format_float(self.pos1, maxdd),
            format_float(self.pos2, maxdd)
        )
    }
}

impl FromStr for NSegment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let type_str = "network segment";
        let mut cur = Cursor::new(s);
        if !cur.try_keyword("NSEGMENT") {
            return Err(Error::text("Could not parse network segment"));
        }
        cur.expect_oparen(type_str)?;
        let rid = parse_i64(&mut cur, type_str)?;
        cur.expect_char(b',', type_str)?;
        let pos1 = cur.parse_double()?;
        cur.expect_char(b',', type_str)?;
        let pos2 = cur.parse_double()?;
        cur.expect_cparen(type_str)?;
        cur.expect_end(type_str)?;
        NSegment::new(rid, pos1, pos2)
    }
}

impl fmt::Display for NSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}

fn ensure_position(pos: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&pos) {
        return Err(Error::text(
            "The relative position must be a real number between 0 and 1",
        ));
    }
    Ok(())
}

fn parse_i64(cur: &mut Cursor<'_>, type_str: &str) -> Result<i64> {
    let v = cur.parse_double()?;
    if v.fract() != 0.0 {
        return Err(Error::parse(type_str, "Route identifier must be an integer"));
    }
    Ok(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npoint_round_trip() {
        let np: NPoint = "NPOINT(2193, 0.5)".parse().unwrap();
        assert_eq!(np.route(), 2193);
        assert_eq!(np.position(), 0.5);
        assert_eq!(np.to_wkt(15), "NPOINT(2193,0.5)");
    }

    #[test]
    fn position_outside_unit_interval_is_rejected() {
        assert!("NPOINT(1, 1.5)".parse::<NPoint>().is_err());
        assert!("NPOINT(1, -0.1)".parse::<NPoint>().is_err());
    }

    #[test]
    fn nsegment_orders_positions() {
        let ns: NSegment = "NSEGMENT(5, 0.9, 0.1)".parse().unwrap();
        assert_eq!(ns.start_position(), 0.1);
        assert_eq!(ns.end_position(), 0.9);
    }

    #[test]
    fn npoints_order_by_route_then_position() {
        let a = NPoint::new(1, 0.9).unwrap();
        let b = NPoint::new(2, 0.1).unwrap();
        assert!(a < b);
        let c = NPoint::new(1, 0.95).unwrap();
        assert!(a < c);
    }
}
