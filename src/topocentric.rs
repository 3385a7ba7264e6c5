use map_3d::{deg2rad, ecef2geodetic, geodetic2ecef, Ellipsoid};
use nalgebra::{Matrix3, Vector3};

use crate::{
    constants::ZENITH_GUARD_DEG,
    error::Error,
    refraction::{MeteoData, RefractionModel},
};

/// Ground station coordinates, fixed for a prediction session.
#[derive(Debug, Clone, PartialEq)]
pub struct StationLocation {
    /// Geodetic coordinates: latitude (rad), longitude (rad), altitude above ellipsoid (m)
    pub(crate) geodetic: Vector3<f64>,
    /// ECEF coordinates (m)
    pub(crate) geocentric: Vector3<f64>,
    /// ECEF to local East North Up rotation
    ecef_to_enu: Matrix3<f64>,
}

fn enu_rotation(lat_rad: f64, lon_rad: f64) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();
    Matrix3::new(
        -sin_lon,
        cos_lon,
        0.0,
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    )
}

impl StationLocation {
    /// Builds a new [StationLocation] from both geodetic coordinates
    /// (latitude [rad], longitude [rad], altitude [m]) and ECEF coordinates [m].
    /// Both are assumed consistent: they are not cross-checked.
    pub fn new(geodetic: Vector3<f64>, geocentric: Vector3<f64>) -> Result<Self, Error> {
        let finite = geodetic.iter().chain(geocentric.iter()).all(|c| c.is_finite());
        if !finite {
            return Err(Error::NonFiniteStation);
        }
        Ok(Self {
            ecef_to_enu: enu_rotation(geodetic[0], geodetic[1]),
            geodetic,
            geocentric,
        })
    }

    /// Builds a new [StationLocation] from WGS84 geodetic coordinates:
    /// - latitude [rad]
    /// - longitude [rad]
    /// - altitude above ellipsoid [m]
    pub fn from_geodetic(geodetic: Vector3<f64>) -> Result<Self, Error> {
        let (lat, lon, alt) = (geodetic[0], geodetic[1], geodetic[2]);
        let (x, y, z) = geodetic2ecef(lat, lon, alt, Ellipsoid::WGS84);
        Self::new(geodetic, Vector3::new(x, y, z))
    }

    /// Builds a new [StationLocation] from WGS84 latitude and longitude
    /// in decimal degrees, and altitude above ellipsoid in meters.
    pub fn from_geodetic_deg(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Result<Self, Error> {
        Self::from_geodetic(Vector3::new(deg2rad(lat_deg), deg2rad(lon_deg), alt_m))
    }

    /// Builds a new [StationLocation] from ECEF coordinates in meters.
    pub fn from_ecef(ecef: Vector3<f64>) -> Result<Self, Error> {
        let (x, y, z) = (ecef[0], ecef[1], ecef[2]);
        let (lat, lon, alt) = ecef2geodetic(x, y, z, Ellipsoid::WGS84);
        Self::new(Vector3::new(lat, lon, alt), ecef)
    }

    /// Returns geodetic coordinates
    /// - latitude [rad]
    /// - longitude [rad]
    /// - altitude above ellipsoid [m]
    pub fn geodetic(&self) -> Vector3<f64> {
        self.geodetic
    }

    /// Returns ECEF coordinates [m]
    pub fn geocentric(&self) -> Vector3<f64> {
        self.geocentric
    }

    /// Rotates an ECEF vector into the local East North Up frame.
    pub fn ecef_to_enu(&self, ecef: &Vector3<f64>) -> Vector3<f64> {
        self.ecef_to_enu * ecef
    }

    /// Absolute ECEF position of a point expressed in the local
    /// East North Up frame of this station.
    pub fn enu_to_ecef(&self, enu: &Vector3<f64>) -> Vector3<f64> {
        self.geocentric + self.ecef_to_enu.transpose() * enu
    }
}

/// Station relative view of a target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TopocentricResult {
    /// Azimuth (degrees) from North, positive towards East, in [0, 360[
    pub azimuth: f64,
    /// Reported elevation (degrees), refraction included
    pub elevation: f64,
    /// Geometric elevation (degrees)
    pub unrefracted_elevation: f64,
    /// Refraction correction applied to [Self::unrefracted_elevation] (degrees)
    pub refraction: f64,
    /// Slant range (m)
    pub range: f64,
    /// Range rate (m/s), when target velocity is known.
    pub range_rate: Option<f64>,
    /// Azimuth rate (deg/s), when target velocity is known.
    pub diff_azimuth: Option<f64>,
    /// Geometric elevation rate (deg/s), when target velocity is known.
    pub diff_elevation: Option<f64>,
}

/// Converts an ECEF `position` (and `velocity`) into the local
/// view of `station`. Refraction only affects the elevation angle,
/// azimuth and range are geometric. An exact zenith is reported at
/// slightly less than 90° so the azimuth stays defined.
/// Rates are [None] when `velocity` is unknown, angular rates are
/// also [None] at the exact zenith, where azimuth rate is singular.
pub fn to_topocentric(
    station: &StationLocation,
    position: &Vector3<f64>,
    velocity: Option<&Vector3<f64>>,
    meteo: &MeteoData,
    refraction: RefractionModel,
) -> TopocentricResult {
    let enu = station.ecef_to_enu(&(position - station.geocentric));
    let (e, n, u) = (enu[0], enu[1], enu[2]);

    let range = enu.norm();
    let horizontal = (e * e + n * n).sqrt();

    let mut unrefracted_elevation = u.atan2(horizontal).to_degrees();
    if unrefracted_elevation.abs() >= 90.0 {
        unrefracted_elevation = ZENITH_GUARD_DEG.copysign(unrefracted_elevation);
    }

    let azimuth = e.atan2(n).to_degrees().rem_euclid(360.0);
    // rem_euclid may round up to the excluded bound
    let azimuth = if azimuth >= 360.0 { 0.0 } else { azimuth };

    let correction = refraction.refraction_deg(unrefracted_elevation, meteo);

    let mut result = TopocentricResult {
        azimuth,
        elevation: unrefracted_elevation + correction,
        unrefracted_elevation,
        refraction: correction,
        range,
        range_rate: None,
        diff_azimuth: None,
        diff_elevation: None,
    };

    let Some(velocity) = velocity else {
        return result;
    };

    if range > 0.0 {
        let rate = station.ecef_to_enu(velocity);
        let (de, dn, du) = (rate[0], rate[1], rate[2]);

        result.range_rate = Some(enu.dot(&rate) / range);

        if horizontal > 0.0 {
            let h2 = horizontal * horizontal;
            let az_rate = (de * n - dn * e) / h2;
            let el_rate = (du * h2 - u * (e * de + n * dn)) / (range * range * horizontal);
            result.diff_azimuth = Some(az_rate.to_degrees());
            result.diff_elevation = Some(el_rate.to_degrees());
        }
    }

    result
}
