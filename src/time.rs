use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, AddAssign, Sub},
};

use hifitime::{Duration, Epoch, TimeScale, Unit};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::constants::SECONDS_PER_DAY;

/// Fixed point instant: integer day count and seconds of day.
///
/// The day counter is a Modified Julian Day whenever the value is converted
/// to or from an [Epoch]. The seconds of day are kept as a real number
/// (sub-second resolution) and are always normalized to `[0, 86400[`:
/// any overflow or underflow is carried into the day counter.
/// Arithmetic is total, [TimeValue] has no error state.
#[derive(Debug, Copy, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimeValue {
    day: i64,
    sod: f64,
}

fn normalize(day: i64, sod: f64) -> (i64, f64) {
    let carry = (sod / SECONDS_PER_DAY).floor();
    let mut day = day + carry as i64;
    let mut sod = sod - carry * SECONDS_PER_DAY;

    // rounding may land on the excluded upper bound
    if sod >= SECONDS_PER_DAY {
        sod -= SECONDS_PER_DAY;
        day += 1;
    }
    if sod <= 0.0 {
        sod = 0.0;
    }

    (day, sod)
}

impl TimeValue {
    /// Builds a [TimeValue] from a day counter and seconds of day.
    /// Seconds outside `[0, 86400[` are carried into the day counter.
    pub fn new(day: i64, sod: f64) -> Self {
        let (day, sod) = normalize(day, sod);
        Self { day, sod }
    }

    /// Builds a [TimeValue] from a day counter, (whole) seconds of day
    /// and an additional fractional second.
    pub fn with_fraction(day: i64, sod: f64, fractional: f64) -> Self {
        // carry whole days of the integer part first, keeps the fraction untouched
        let (day, sod) = normalize(day, sod);
        Self::new(day, sod + fractional)
    }

    /// Builds a [TimeValue] from a (possibly fractional) Modified Julian Day.
    pub fn from_mjd(mjd: f64) -> Self {
        let day = mjd.floor();
        Self::new(day as i64, (mjd - day) * SECONDS_PER_DAY)
    }

    /// Converts an [Epoch] expressed in given [TimeScale].
    /// The resulting day counter is the Modified Julian Day in that [TimeScale].
    pub fn from_epoch(epoch: Epoch, ts: TimeScale) -> Self {
        let elapsed = epoch.to_time_scale(ts) - Self::mjd_reference(ts);
        let days = elapsed.to_unit(Unit::Day).floor();
        let remainder = elapsed - Unit::Day * days;
        Self::new(days as i64, remainder.to_seconds())
    }

    /// Converts [Self] to an [Epoch] in given [TimeScale].
    pub fn to_epoch(&self, ts: TimeScale) -> Epoch {
        Self::mjd_reference(ts) + Unit::Day * (self.day as f64) + Duration::from_seconds(self.sod)
    }

    fn mjd_reference(ts: TimeScale) -> Epoch {
        Epoch::from_mjd_in_time_scale(0.0, ts)
    }

    /// Day counter (Modified Julian Day).
    pub fn day(&self) -> i64 {
        self.day
    }

    /// Seconds of day, in `[0, 86400[`, including the fractional part.
    pub fn second_of_day(&self) -> f64 {
        self.sod
    }

    /// Fractional part of the current second.
    pub fn fractional_second(&self) -> f64 {
        self.sod.fract()
    }

    /// Returns (possibly fractional) Modified Julian Day.
    pub fn to_mjd(&self) -> f64 {
        self.day as f64 + self.sod / SECONDS_PER_DAY
    }

    /// Signed duration `self - rhs`, in seconds.
    pub fn seconds_since(&self, rhs: &Self) -> f64 {
        (self.day - rhs.day) as f64 * SECONDS_PER_DAY + (self.sod - rhs.sod)
    }
}

impl Add<f64> for TimeValue {
    type Output = Self;
    fn add(self, seconds: f64) -> Self {
        // whole days are carried separately to preserve the seconds resolution
        let days = (seconds / SECONDS_PER_DAY).floor();
        let remainder = seconds - days * SECONDS_PER_DAY;
        Self::new(self.day + days as i64, self.sod + remainder)
    }
}

impl AddAssign<f64> for TimeValue {
    fn add_assign(&mut self, seconds: f64) {
        *self = *self + seconds;
    }
}

impl Sub<f64> for TimeValue {
    type Output = Self;
    fn sub(self, seconds: f64) -> Self {
        self + (-seconds)
    }
}

impl Sub for TimeValue {
    type Output = f64;
    fn sub(self, rhs: Self) -> f64 {
        self.seconds_since(&rhs)
    }
}

impl PartialEq for TimeValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeValue {}

impl PartialOrd for TimeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day
            .cmp(&other.day)
            .then_with(|| self.sod.total_cmp(&other.sod))
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MJD {} {:.6}s", self.day, self.sod)
    }
}

impl From<(i64, f64)> for TimeValue {
    fn from(value: (i64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

#[cfg(test)]
mod test {
    use super::TimeValue;
    use hifitime::{Epoch, TimeScale};

    #[test]
    fn normalization() {
        let t = TimeValue::new(60000, 86400.5);
        assert_eq!(t.day(), 60001);
        assert!((t.second_of_day() - 0.5).abs() < 1e-9);

        let t = TimeValue::new(60000, -10.0);
        assert_eq!(t.day(), 59999);
        assert!((t.second_of_day() - 86390.0).abs() < 1e-9);

        let t = TimeValue::new(60000, 3.0 * 86400.0 + 12.0);
        assert_eq!(t.day(), 60003);
        assert_eq!(t.second_of_day(), 12.0);

        let t = TimeValue::with_fraction(60000, 86399.0, 1.25);
        assert_eq!(t.day(), 60001);
        assert!((t.second_of_day() - 0.25).abs() < 1e-12);
        assert!((t.fractional_second() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn arithmetic() {
        let t0 = TimeValue::new(60000, 86000.0);
        let t1 = t0 + 1000.0;
        assert_eq!(t1.day(), 60001);
        assert!((t1.second_of_day() - 600.0).abs() < 1e-9);
        assert!((t1 - t0 - 1000.0).abs() < 1e-9);
        assert!((t0 - t1 + 1000.0).abs() < 1e-9);

        let back = t1 - 1000.0;
        assert_eq!(back, t0);

        let mut t = t0;
        t += 5.0 * 86400.0;
        assert_eq!(t.day(), 60005);
        assert!((t.second_of_day() - 86000.0).abs() < 1e-9);
    }

    #[test]
    fn multi_day_resolution() {
        // microsecond steps must survive a multi-day offset
        let t0 = TimeValue::new(60000, 0.0);
        let t1 = t0 + 10.0 * 86400.0 + 1.0E-6;
        assert_eq!(t1.day(), 60010);
        assert!((t1.second_of_day() - 1.0E-6).abs() < 1.0E-12);
        assert!((t1 - t0 - (864000.0 + 1.0E-6)).abs() < 1.0E-9);
    }

    #[test]
    fn ordering() {
        let a = TimeValue::new(60000, 100.0);
        let b = TimeValue::new(60000, 100.5);
        let c = TimeValue::new(60001, 0.0);
        assert!(a < b);
        assert!(b < c);
        assert!(c > a);
        assert_eq!(a.max(c), c);
        assert_eq!(TimeValue::new(59999, 86400.0), TimeValue::new(60000, 0.0));
    }

    #[test]
    fn mjd_conversion() {
        let t = TimeValue::from_mjd(60000.5);
        assert_eq!(t.day(), 60000);
        assert!((t.second_of_day() - 43200.0).abs() < 1e-6);
        assert!((t.to_mjd() - 60000.5).abs() < 1e-12);
    }

    #[test]
    fn epoch_round_trip() {
        let t = TimeValue::new(60310, 45296.25);
        let epoch = t.to_epoch(TimeScale::TAI);
        let back = TimeValue::from_epoch(epoch, TimeScale::TAI);
        assert_eq!(back.day(), 60310);
        assert!((back.second_of_day() - 45296.25).abs() < 1e-6);

        let epoch = Epoch::from_mjd_in_time_scale(60310.0, TimeScale::TAI);
        let t = TimeValue::from_epoch(epoch, TimeScale::TAI);
        assert!((t.to_mjd() - 60310.0).abs() < 1e-9);
    }

    #[test]
    fn display() {
        let t = TimeValue::new(60000, 1.5);
        assert_eq!(t.to_string(), "MJD 60000 1.500000s");
    }
}
