use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

/// How a temporal value behaves between its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TInterpolation {
    /// Isolated samples; the value is undefined between them.
    Discrete,
    /// Piecewise constant: each sample holds until the next one.
    Step,
    /// Piecewise linear between consecutive samples.
    Linear,
}

impl FromStr for TInterpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "discrete" => Ok(TInterpolation::Discrete),
            "step" | "stepwise" => Ok(TInterpolation::Step),
            "linear" => Ok(TInterpolation::Linear),
            _ => Err(Error::text(format!("Unknown interpolation type: {s}"))),
        }
    }
}

impl fmt::Display for TInterpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_accepts_legacy_spelling() {
        assert_eq!("step".parse::<TInterpolation>().unwrap(), TInterpolation::Step);
        assert_eq!("Stepwise".parse::<TInterpolation>().unwrap(), TInterpolation::Step);
        assert_eq!("LINEAR".parse::<TInterpolation>().unwrap(), TInterpolation::Linear);
        assert!("cubic".parse::<TInterpolation>().is_err());
    }
}
