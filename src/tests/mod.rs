mod cfg;

use log::LevelFilter;
use std::sync::{Arc, Once};

use crate::prelude::{
    Config, EphemerisSample, EphemerisTable, Predictor, RefractionModel, StationLocation,
    TimeValue, Vector3,
};

/// Earth gravitational constant (m^3 s-2)
const EARTH_GRAVITATION_MU_M3_S2: f64 = 3.986004418E14;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Reference instant of all synthetic ephemerides
pub fn t_ref() -> TimeValue {
    TimeValue::new(60310, 43200.0)
}

/// San Fernando (Spain)
pub fn reference_station() -> StationLocation {
    StationLocation::from_geodetic_deg(36.46525, -6.20574, 98.0).unwrap()
}

/// Circular orbit, 7000 km radius, 50° inclination
pub struct CircularOrbit {
    pub radius_m: f64,
    pub inclination_rad: f64,
}

impl Default for CircularOrbit {
    fn default() -> Self {
        Self {
            radius_m: 7.0E6,
            inclination_rad: 50.0_f64.to_radians(),
        }
    }
}

impl CircularOrbit {
    pub fn angular_rate(&self) -> f64 {
        (EARTH_GRAVITATION_MU_M3_S2 / self.radius_m.powi(3)).sqrt()
    }

    /// Position at `t` seconds after [t_ref]
    pub fn position(&self, t: f64) -> Vector3<f64> {
        let (sin_i, cos_i) = self.inclination_rad.sin_cos();
        let (sin, cos) = (self.angular_rate() * t).sin_cos();
        Vector3::new(cos, sin * cos_i, sin * sin_i) * self.radius_m
    }

    /// Velocity at `t` seconds after [t_ref]
    pub fn velocity(&self, t: f64) -> Vector3<f64> {
        let (sin_i, cos_i) = self.inclination_rad.sin_cos();
        let w = self.angular_rate();
        let (sin, cos) = (w * t).sin_cos();
        Vector3::new(-sin, cos * cos_i, cos * sin_i) * self.radius_m * w
    }

    /// Table of `size` samples spaced by `interval_s`, starting at [t_ref]
    pub fn table(&self, size: usize, interval_s: f64, with_velocity: bool) -> EphemerisTable {
        let samples = (0..size)
            .map(|i| {
                let t = i as f64 * interval_s;
                let sample = EphemerisSample::new(t_ref() + t, self.position(t));
                if with_velocity {
                    sample.with_velocity(self.velocity(t))
                } else {
                    sample
                }
            })
            .collect();
        EphemerisTable::new(samples).unwrap()
    }
}

/// Straight line fly-by over the reference station, in its local frame:
/// the target moves eastwards at constant altitude, passing `north_offset_m`
/// north of the station at [t_ref]. Elevation is a symmetric hump
/// culminating at [t_ref].
pub struct FlyBy {
    pub altitude_m: f64,
    pub north_offset_m: f64,
    pub speed_m_s: f64,
}

impl Default for FlyBy {
    fn default() -> Self {
        Self {
            altitude_m: 500.0E3,
            north_offset_m: 200.0E3,
            speed_m_s: 7.0E3,
        }
    }
}

impl FlyBy {
    /// Local (ENU) position at `t` seconds from [t_ref]
    pub fn enu(&self, t: f64) -> Vector3<f64> {
        Vector3::new(self.speed_m_s * t, self.north_offset_m, self.altitude_m)
    }

    /// Geometric elevation (degrees) at `t` seconds from [t_ref]
    pub fn elevation_deg(&self, t: f64) -> f64 {
        let horizontal = (self.north_offset_m.powi(2) + (self.speed_m_s * t).powi(2)).sqrt();
        self.altitude_m.atan2(horizontal).to_degrees()
    }

    /// Culmination elevation (degrees)
    pub fn max_elevation_deg(&self) -> f64 {
        self.elevation_deg(0.0)
    }

    /// Time from [t_ref] (s) at which the geometric elevation equals `mask_deg`, after culmination
    pub fn mask_crossing_s(&self, mask_deg: f64) -> f64 {
        let horizontal = self.altitude_m / mask_deg.to_radians().tan();
        (horizontal.powi(2) - self.north_offset_m.powi(2)).sqrt() / self.speed_m_s
    }

    /// Table sampled every `interval_s` over `[t_ref - half_span_s, t_ref + half_span_s]`
    pub fn table(
        &self,
        station: &StationLocation,
        half_span_s: f64,
        interval_s: f64,
        with_velocity: bool,
    ) -> EphemerisTable {
        let size = (2.0 * half_span_s / interval_s).round() as usize + 1;
        let east = station.enu_to_ecef(&Vector3::new(self.speed_m_s, 0.0, 0.0)) - station.geocentric();
        let samples = (0..size)
            .map(|i| {
                let t = -half_span_s + i as f64 * interval_s;
                let sample = EphemerisSample::new(t_ref() + t, station.enu_to_ecef(&self.enu(t)));
                if with_velocity {
                    sample.with_velocity(east)
                } else {
                    sample
                }
            })
            .collect();
        EphemerisTable::new(samples).unwrap()
    }
}

/// Target circling at constant altitude in the local frame of the reference station.
/// The circle center lies `center_north_m` north of the station: the target comes
/// closest (`center_north_m - radius_m`) once per revolution, at [t_ref] + k·period - period/4,
/// producing one elevation hump per revolution.
pub struct LoopingTarget {
    pub altitude_m: f64,
    pub radius_m: f64,
    pub center_north_m: f64,
    pub period_s: f64,
}

impl Default for LoopingTarget {
    fn default() -> Self {
        Self {
            altitude_m: 500.0E3,
            radius_m: 1500.0E3,
            center_north_m: 1700.0E3,
            period_s: 1200.0,
        }
    }
}

impl LoopingTarget {
    /// Local (ENU) position at `t` seconds from [t_ref]
    pub fn enu(&self, t: f64) -> Vector3<f64> {
        let angle = 2.0 * std::f64::consts::PI * t / self.period_s;
        let (sin, cos) = angle.sin_cos();
        Vector3::new(
            self.radius_m * cos,
            self.center_north_m + self.radius_m * sin,
            self.altitude_m,
        )
    }

    /// Culmination elevation (degrees)
    pub fn max_elevation_deg(&self) -> f64 {
        self.altitude_m
            .atan2(self.center_north_m - self.radius_m)
            .to_degrees()
    }

    /// Table sampled every 10s over `[t_ref - half_span_s, t_ref + half_span_s]`
    pub fn table(&self, station: &StationLocation, half_span_s: f64) -> EphemerisTable {
        let size = (half_span_s / 5.0).round() as usize + 1;
        let samples = (0..size)
            .map(|i| {
                let t = -half_span_s + i as f64 * 10.0;
                EphemerisSample::new(t_ref() + t, station.enu_to_ecef(&self.enu(t)))
            })
            .collect();
        EphemerisTable::new(samples).unwrap()
    }
}

/// Motionless target, seen at constant elevation from the reference station
pub fn fixed_point_table(station: &StationLocation, elevation_deg: f64, size: usize) -> EphemerisTable {
    let range = 1.0E6;
    let (sin, cos) = elevation_deg.to_radians().sin_cos();
    let position = station.enu_to_ecef(&Vector3::new(0.0, range * cos, range * sin));
    let samples = (0..size)
        .map(|i| EphemerisSample::new(t_ref() + i as f64 * 60.0, position))
        .collect();
    EphemerisTable::new(samples).unwrap()
}

/// Fly-by [Predictor] at the reference station, without refraction
pub fn flyby_predictor(half_span_s: f64) -> Predictor {
    let station = reference_station();
    let table = FlyBy::default().table(&station, half_span_s, 10.0, false);
    let cfg = Config::default().with_refraction(RefractionModel::Disabled);
    Predictor::new(Arc::new(table), station, cfg).unwrap()
}
