//! Fixed-precision percentages shared by rollout flags and samples.

use crate::error::{FlagError, FlagResult};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal places of a random draw.
pub const DRAW_SCALE: u32 = 4;

const DRAW_UNITS: i64 = 100 * 10_i64.pow(DRAW_SCALE);

/// A percentage in `[0, 100]`.
///
/// Comparisons against a random draw are exact decimal comparisons; no
/// floating point is involved on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);
    pub const HUNDRED: Percent = Percent(Decimal::ONE_HUNDRED);

    /// A percentage in `[0, 100]` with at most [`DRAW_SCALE`] decimal places.
    ///
    /// Finer values are rejected rather than rounded, since a draw cannot
    /// tell them apart.
    pub fn new(value: Decimal) -> FlagResult<Self> {
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(FlagError::InvalidPercent(value.to_string()));
        }
        let value = value.normalize();
        if value.scale() > DRAW_SCALE {
            return Err(FlagError::InvalidPercent(format!(
                "{} has more than {} decimal places",
                value, DRAW_SCALE
            )));
        }
        Ok(Self(value))
    }

    /// Whole-number percentage.
    pub fn whole(value: u8) -> FlagResult<Self> {
        Self::new(Decimal::from(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Uniform draw from `[0, 100)` with [`DRAW_SCALE`] decimal places.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(Decimal::new(rng.random_range(0..DRAW_UNITS), DRAW_SCALE))
    }

    /// Draw with the thread-local generator.
    pub fn random() -> Self {
        Self::draw(&mut rand::rng())
    }

    /// Whether `draw` falls inside this percentage. The bound is inclusive.
    pub fn admits(&self, draw: Percent) -> bool {
        draw <= *self
    }
}

impl TryFrom<Decimal> for Percent {
    type Error = FlagError;

    fn try_from(value: Decimal) -> FlagResult<Self> {
        Self::new(value)
    }
}

impl From<Percent> for Decimal {
    fn from(percent: Percent) -> Self {
        percent.0
    }
}

impl FromStr for Percent {
    type Err = FlagError;

    fn from_str(s: &str) -> FlagResult<Self> {
        let value = Decimal::from_str(s.trim()).map_err(|_| FlagError::InvalidPercent(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_bounds() {
        assert!(Percent::whole(0).is_ok());
        assert!(Percent::whole(100).is_ok());
        assert!(Percent::whole(101).is_err());
        assert!("-0.1".parse::<Percent>().is_err());
        assert!("100.01".parse::<Percent>().is_err());
        assert!("abc".parse::<Percent>().is_err());
    }

    #[test]
    fn test_precision_limited_to_draw_scale() {
        assert!("12.3456".parse::<Percent>().is_ok());
        assert!("0.0001".parse::<Percent>().is_ok());
        assert!("12.34560".parse::<Percent>().is_ok());
        assert!(matches!(
            "12.34561".parse::<Percent>(),
            Err(FlagError::InvalidPercent(_))
        ));
        assert!("0.00001".parse::<Percent>().is_err());
        assert!(serde_json::from_str::<Percent>("\"0.00009\"").is_err());
    }

    #[test]
    fn test_parse_keeps_precision() {
        let percent: Percent = "12.5".parse().unwrap();
        assert_eq!(percent.value(), Decimal::new(125, 1));
        assert_eq!(percent.to_string(), "12.5%");
        assert_eq!("50.00".parse::<Percent>().unwrap(), Percent::whole(50).unwrap());
    }

    #[test]
    fn test_draws_stay_below_hundred() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let draw = Percent::draw(&mut rng);
            assert!(draw >= Percent::ZERO);
            assert!(draw < Percent::HUNDRED);
            assert!(draw.value().scale() <= DRAW_SCALE);
        }
    }

    #[test]
    fn test_hundred_admits_every_draw() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10_000 {
            assert!(Percent::HUNDRED.admits(Percent::draw(&mut rng)));
        }
    }

    #[test]
    fn test_inclusive_boundary() {
        let half = Percent::whole(50).unwrap();
        assert!(half.admits(half));
        assert!(!half.admits("50.0001".parse().unwrap()));
        assert!(Percent::ZERO.admits(Percent::ZERO));
    }

    #[test]
    fn test_admission_rate_tracks_percent() {
        let mut rng = StdRng::seed_from_u64(3);
        let quarter = Percent::whole(25).unwrap();
        let admitted = (0..20_000)
            .filter(|_| quarter.admits(Percent::draw(&mut rng)))
            .count();
        assert!((4_000..6_000).contains(&admitted), "admitted {}", admitted);
    }

    #[test]
    fn test_serde_validates() {
        let percent: Percent = serde_json::from_str("\"33.3\"").unwrap();
        assert_eq!(percent, "33.3".parse().unwrap());
        assert!(serde_json::from_str::<Percent>("\"250\"").is_err());

        let json = serde_json::to_string(&percent).unwrap();
        assert_eq!(serde_json::from_str::<Percent>(&json).unwrap(), percent);
    }
}
