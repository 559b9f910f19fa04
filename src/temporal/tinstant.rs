//! Temporal instants: a single `(value, timestamp)` observation.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, TimeDelta, Utc};

use crate::boxes::{STBox, TBox};
use crate::catalog::MobType;
use crate::collections::span::Span;
use crate::datetime;
use crate::errors::{Error, Result};
use crate::geo::SRID_UNKNOWN;
use crate::hash;
use crate::parser::Cursor;
use crate::temporal::TemporalBox;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct TInstant {
    temp_type: MobType,
    value: Value,
    t: DateTime<Utc>,
}

impl TInstant {
    /// Build an instant, validating the value against the temporal type.
    ///
    /// # Example
    /// ```
    /// # use mobilis::catalog::MobType;
    /// # use mobilis::temporal::TInstant;
    /// # use mobilis::value::Value;
    /// # use mobilis::datetime::parse_timestamptz;
    /// let t = parse_timestamptz("2001-01-01 08:00:00+00").unwrap();
    /// let inst = TInstant::new(Value::Float(1.5), MobType::TFloat, t).unwrap();
    /// assert_eq!(inst.to_wkt(15), "1.5@2001-01-01 08:00:00+00");
    /// ```
    pub fn new(value: Value, temp_type: MobType, t: DateTime<Utc>) -> Result<TInstant> {
        let base_type = temp_type.expect_base_type()?;
        if !temp_type.is_temporal() {
            return Err(Error::internal(format!(
                "Type {} is not a temporal type",
                temp_type.name()
            )));
        }
        if value.mob_type() != base_type {
            return Err(Error::arg_type(format!(
                "A {} instant cannot hold a {} value",
                temp_type.name(),
                value.mob_type().name()
            )));
        }
        if let Some(g) = value.as_geo() {
            if g.is_empty() {
                return Err(Error::arg_value("Input geometries cannot be empty"));
            }
            if g.has_m() {
                return Err(Error::arg_value(
                    "Input geometries cannot have an M dimension",
                ));
            }
        }
        Ok(TInstant { temp_type, value, t })
    }

    /// Parse `<basevalue>@<timestamp>` from the cursor. For spatial
    /// temporals, `srid` carries the SRID of the enclosing value and is
    /// reconciled with the one found on the geometry.
    pub(crate) fn parse_cursor(
        cur: &mut Cursor<'_>,
        temp_type: MobType,
        end: bool,
        srid: &mut i32,
    ) -> Result<TInstant> {
        let base_type = temp_type.expect_base_type()?;
        let mut value = Value::parse_text(cur.scan_base_value(b'@')?, base_type)?;
        if let Value::Geom(g) | Value::Geog(g) = &mut value {
            if *srid == SRID_UNKNOWN && g.srid() != SRID_UNKNOWN {
                *srid = g.srid();
            } else if *srid != SRID_UNKNOWN && g.srid() == SRID_UNKNOWN {
                g.set_srid(*srid);
            } else if *srid != SRID_UNKNOWN && g.srid() != *srid {
                return Err(Error::text(format!(
                    "Geometry SRID ({}) does not match temporal type SRID ({})",
                    g.srid(),
                    *srid
                )));
            }
        }
        cur.try_char(b'@');
        let t = datetime::parse_timestamptz(cur.scan_timestamp())?;
        if end {
            cur.expect_end(temp_type.name())?;
        }
        TInstant::new(value, temp_type, t)
    }

    /// Parse a single instant of the given temporal type.
    pub fn parse(s: &str, temp_type: MobType) -> Result<TInstant> {
        let mut cur = Cursor::new(s);
        let mut srid = SRID_UNKNOWN;
        TInstant::parse_cursor(&mut cur, temp_type, true, &mut srid)
    }

    pub fn temp_type(&self) -> MobType {
        self.temp_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.t
    }

    /// The instant's bounding box.
    pub fn bbox(&self) -> Result<TemporalBox> {
        let period = Span::from_value(Value::Timestamp(self.t))?;
        if self.temp_type.is_numeric() {
            Ok(TemporalBox::Number(TBox::new(
                Some(Span::from_value(self.value.clone())?),
                Some(period),
            )?))
        } else if let Some(g) = self.value.as_geo() {
            let b = STBox::from_geo(g)?;
            let bbox = STBox::new(
                b.has_x(),
                b.has_z(),
                b.is_geodetic(),
                b.srid(),
                b.xmin().unwrap_or(0.0),
                b.xmax().unwrap_or(0.0),
                b.ymin().unwrap_or(0.0),
                b.ymax().unwrap_or(0.0),
                b.zmin().unwrap_or(0.0),
                b.zmax().unwrap_or(0.0),
                Some(period),
            )?;
            Ok(TemporalBox::Spatial(bbox))
        } else if self.temp_type == MobType::TNPoint {
            Ok(TemporalBox::Spatial(STBox::from_tstzspan(period)?))
        } else {
            Ok(TemporalBox::Time(period))
        }
    }

    /// Shift the instant in time.
    pub fn shift_time(&self, delta: TimeDelta) -> TInstant {
        TInstant {
            temp_type: self.temp_type,
            value: self.value.clone(),
            t: self.t + delta,
        }
    }

    pub fn to_wkt(&self, maxdd: i32) -> String {
        format!(
            "{}@{}",
            self.value.output(maxdd),
            datetime::format_timestamptz(self.t)
        )
    }

    /// Order on `(timestamp, value)`.
    pub(crate) fn cmp_instants(&self, other: &TInstant) -> Ordering {
        self.t
            .cmp(&other.t)
            .then_with(|| self.value.cmp_same(&other.value))
    }

    pub fn hash32(&self) -> u32 {
        hash::combine(
            self.value.hash32(),
            hash::hash_u32(fold_micros(self.t.timestamp_micros())),
        )
    }

    pub fn hash64(&self, seed: u64) -> u64 {
        hash::combine_extended(
            self.value.hash64(seed),
            hash::hash_u64_extended(self.t.timestamp_micros() as u64, seed),
        )
    }
}

fn fold_micros(micros: i64) -> u32 {
    (micros ^ (micros >> 32)) as u32
}

impl PartialEq for TInstant {
    fn eq(&self, other: &Self) -> bool {
        self.temp_type == other.temp_type && self.cmp_instants(other) == Ordering::Equal
    }
}

impl Eq for TInstant {}

impl Hash for TInstant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash32());
    }
}

impl fmt::Display for TInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt(15))
    }
}
