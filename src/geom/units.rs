use std::fmt;

use auto_ops::{impl_op_ex, impl_op_ex_commutative};
use serde::{Deserialize, Serialize};

use crate::err::{DrcError, Result};

// All spatial reasoning is done in integer nanometres. Comparisons are
// exact; products that can overflow 64 bits are widened to 128 bits at the
// call site (see Point::cross / Point::dot).
#[derive(
    Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize,
)]
pub struct Length(i64);

impl Length {
    pub const ZERO: Length = Length(0);

    pub const fn nm(nm: i64) -> Self {
        Self(nm)
    }

    pub const fn to_nm(self) -> i64 {
        self.0
    }

    pub fn from_mm(mm: f64) -> Self {
        Self((mm * 1e6).round() as i64)
    }

    pub fn to_mm(self) -> f64 {
        self.0 as f64 / 1e6
    }

    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    // Floor halving; used for widths and diameters which are non-negative.
    pub const fn half(self) -> Self {
        Self(self.0 / 2)
    }

    pub fn checked_add(self, o: Length) -> Result<Length> {
        self.0.checked_add(o.0).map(Length).ok_or(DrcError::Overflow)
    }

    pub fn checked_mul(self, k: i64) -> Result<Length> {
        self.0.checked_mul(k).map(Length).ok_or(DrcError::Overflow)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}mm", trim_zeros(self.to_mm()))
    }
}

impl_op_ex!(-|a: &Length| -> Length { Length(-a.0) });
impl_op_ex!(+ |a: &Length, b: &Length| -> Length { Length(a.0 + b.0) });
impl_op_ex!(+= |a: &mut Length, b: &Length| { a.0 += b.0; });
impl_op_ex!(-|a: &Length, b: &Length| -> Length { Length(a.0 - b.0) });
impl_op_ex!(-= |a: &mut Length, b: &Length| { a.0 -= b.0; });
impl_op_ex_commutative!(*|a: &Length, b: &i64| -> Length { Length(a.0 * b) });
impl_op_ex!(/|a: &Length, b: &i64| -> Length { Length(a.0 / b) });

// Length that is checked to be >= 0 on construction.
#[derive(
    Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize,
)]
pub struct UnsignedLength(Length);

impl UnsignedLength {
    pub const ZERO: UnsignedLength = UnsignedLength(Length::ZERO);

    pub const fn nm(nm: i64) -> Self {
        assert!(nm >= 0);
        Self(Length::nm(nm))
    }

    pub fn new(l: Length) -> Result<Self> {
        if l.to_nm() < 0 {
            return Err(DrcError::Logic(format!("unsigned length out of range: {l}")));
        }
        Ok(Self(l))
    }

    pub const fn len(self) -> Length {
        self.0
    }

    pub const fn to_nm(self) -> i64 {
        self.0.to_nm()
    }

    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for UnsignedLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Length that is checked to be > 0 on construction.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize)]
pub struct PositiveLength(Length);

impl PositiveLength {
    pub const fn nm(nm: i64) -> Self {
        assert!(nm > 0);
        Self(Length::nm(nm))
    }

    pub fn new(l: Length) -> Result<Self> {
        if l.to_nm() <= 0 {
            return Err(DrcError::Logic(format!("positive length out of range: {l}")));
        }
        Ok(Self(l))
    }

    pub const fn len(self) -> Length {
        self.0
    }

    pub const fn to_nm(self) -> i64 {
        self.0.to_nm()
    }
}

impl fmt::Display for PositiveLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<PositiveLength> for UnsignedLength {
    fn from(l: PositiveLength) -> Self {
        Self(l.0)
    }
}

impl From<UnsignedLength> for Length {
    fn from(l: UnsignedLength) -> Self {
        l.0
    }
}

impl From<PositiveLength> for Length {
    fn from(l: PositiveLength) -> Self {
        l.0
    }
}

// Angles are in integer 1/1000 degree ticks, stored modulo a full turn with
// the sign preserved. Arc sweeps lie strictly inside (-360deg, 360deg).
#[derive(
    Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize,
)]
pub struct Angle(i32);

pub const FULL_TURN_MDEG: i32 = 360_000;

impl Angle {
    pub const ZERO: Angle = Angle(0);
    pub const DEG_45: Angle = Angle(45_000);
    pub const DEG_90: Angle = Angle(90_000);
    pub const DEG_180: Angle = Angle(180_000);
    pub const DEG_270: Angle = Angle(270_000);

    pub const fn mdeg(mdeg: i32) -> Self {
        Self(mdeg % FULL_TURN_MDEG)
    }

    pub const fn to_mdeg(self) -> i32 {
        self.0
    }

    pub fn from_deg(deg: f64) -> Self {
        Self::mdeg((deg * 1000.0).round() as i32)
    }

    pub fn to_deg(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn to_rad(self) -> f64 {
        self.to_deg().to_radians()
    }

    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    // Normalized into [0, 360deg).
    pub const fn normalized(self) -> Self {
        Self(self.0.rem_euclid(FULL_TURN_MDEG))
    }

    pub const fn is_multiple_of_90(self) -> bool {
        self.0 % 90_000 == 0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\u{b0}", trim_zeros(self.to_deg()))
    }
}

impl_op_ex!(-|a: &Angle| -> Angle { Angle::mdeg(-a.0) });
impl_op_ex!(+ |a: &Angle, b: &Angle| -> Angle { Angle::mdeg(a.0 + b.0) });
impl_op_ex!(-|a: &Angle, b: &Angle| -> Angle { Angle::mdeg(a.0 - b.0) });
impl_op_ex_commutative!(*|a: &Angle, b: &i32| -> Angle { Angle::mdeg(a.0 * b) });

// Fixed-point ratio in parts per million.
#[derive(
    Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize,
)]
pub struct Ratio(i32);

pub const PPM_100_PERCENT: i32 = 1_000_000;

impl Ratio {
    pub const ZERO: Ratio = Ratio(0);
    pub const FULL: Ratio = Ratio(PPM_100_PERCENT);

    pub const fn ppm(ppm: i32) -> Self {
        Self(ppm)
    }

    pub const fn to_ppm(self) -> i32 {
        self.0
    }

    pub fn from_percent(pct: f64) -> Self {
        Self((pct * 10_000.0).round() as i32)
    }

    pub fn of(self, l: Length) -> Length {
        let nm = i128::from(l.to_nm()) * i128::from(self.0) / i128::from(PPM_100_PERCENT);
        Length::nm(nm as i64)
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", trim_zeros(self.0 as f64 / 10_000.0))
    }
}

// Ratio limited to [0%, 100%], e.g. pad corner radii.
#[derive(
    Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize, Deserialize,
)]
pub struct LimitedRatio(Ratio);

impl LimitedRatio {
    pub const fn ppm(ppm: i32) -> Self {
        assert!(ppm >= 0 && ppm <= PPM_100_PERCENT);
        Self(Ratio::ppm(ppm))
    }

    pub fn new(r: Ratio) -> Result<Self> {
        if r.to_ppm() < 0 || r.to_ppm() > PPM_100_PERCENT {
            return Err(DrcError::Logic(format!("ratio out of [0, 100%]: {r}")));
        }
        Ok(Self(r))
    }

    pub const fn ratio(self) -> Ratio {
        self.0
    }

    pub fn of(self, l: Length) -> Length {
        self.0.of(l)
    }
}

impl fmt::Display for LimitedRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// Shortest decimal text for a value, e.g. 0.2 not 0.200000.
pub(crate) fn trim_zeros(v: f64) -> String {
    let s = format!("{v:.6}");
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_arith() {
        let a = Length::nm(200_000);
        let b = Length::nm(50_000);
        assert_eq!(a + b, Length::nm(250_000));
        assert_eq!(a - b, Length::nm(150_000));
        assert_eq!(a * 3, Length::nm(600_000));
        assert_eq!(-a, Length::nm(-200_000));
        assert_eq!(a.half(), Length::nm(100_000));
        assert!(b < a);
    }

    #[test]
    fn test_length_display() {
        assert_eq!(Length::nm(200_000).to_string(), "0.2mm");
        assert_eq!(Length::nm(1_000_000).to_string(), "1mm");
        assert_eq!(Length::nm(-5_000).to_string(), "-0.005mm");
    }

    #[test]
    fn test_length_overflow_guard() {
        assert_eq!(Length::nm(i64::MAX).checked_add(Length::nm(1)), Err(DrcError::Overflow));
        assert!(Length::nm(2).checked_mul(3).is_ok());
    }

    #[test]
    fn test_unsigned_positive_ranges() {
        assert!(UnsignedLength::new(Length::nm(0)).is_ok());
        assert!(UnsignedLength::new(Length::nm(-1)).is_err());
        assert!(PositiveLength::new(Length::nm(0)).is_err());
        assert!(PositiveLength::new(Length::nm(1)).is_ok());
    }

    #[test]
    fn test_angle_normalize() {
        assert_eq!(Angle::mdeg(450_000), Angle::mdeg(90_000));
        assert_eq!(Angle::mdeg(-90_000).normalized(), Angle::mdeg(270_000));
        assert!(Angle::DEG_180.is_multiple_of_90());
        assert!(!Angle::mdeg(45_000).is_multiple_of_90());
    }

    #[test]
    fn test_ratio_of_length() {
        assert_eq!(Ratio::from_percent(50.0).of(Length::nm(1_000_000)), Length::nm(500_000));
        assert_eq!(LimitedRatio::ppm(250_000).of(Length::nm(400_000)), Length::nm(100_000));
        assert!(LimitedRatio::new(Ratio::from_percent(101.0)).is_err());
    }
}
