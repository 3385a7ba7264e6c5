use crate::{error::Error, time::TimeValue};

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Elevation range over which refraction is evaluated (degrees).
/// Below, the correction saturates; above, it vanishes.
const MIN_REFRACTION_ELEVATION_DEG: f64 = -1.0;
const MAX_REFRACTION_ELEVATION_DEG: f64 = 89.9;

fn default_pressure() -> f64 {
    1013.25
}

fn default_temperature() -> f64 {
    10.0
}

fn default_humidity() -> f64 {
    0.5
}

/// Ambient conditions at the station.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub struct MeteoData {
    /// Atmospheric pressure (hPa)
    #[cfg_attr(feature = "serde", serde(default = "default_pressure"))]
    pub pressure_hpa: f64,
    /// Air temperature (°C)
    #[cfg_attr(feature = "serde", serde(default = "default_temperature"))]
    pub temperature_c: f64,
    /// Relative humidity, in [0, 1]
    #[cfg_attr(feature = "serde", serde(default = "default_humidity"))]
    pub relative_humidity: f64,
}

impl Default for MeteoData {
    fn default() -> Self {
        Self::standard()
    }
}

impl MeteoData {
    /// Standard conditions: 1013.25 hPa, 10 °C, 50 % humidity.
    pub fn standard() -> Self {
        Self {
            pressure_hpa: default_pressure(),
            temperature_c: default_temperature(),
            relative_humidity: default_humidity(),
        }
    }

    /// Air temperature in Kelvin
    pub fn temperature_k(&self) -> f64 {
        self.temperature_c + 273.15
    }
}

/// Any meteorological feed (station sensors, forecasts..) may implement
/// [MeteoSource] to provide ambient conditions at a given instant.
/// [MeteoData] implements it as a fixed value.
pub trait MeteoSource {
    /// Ambient conditions at `t`.
    fn meteo_at(&self, t: TimeValue) -> MeteoData;
}

impl MeteoSource for MeteoData {
    fn meteo_at(&self, _: TimeValue) -> MeteoData {
        *self
    }
}

/// Atmospheric refraction model, applied to elevation angles only.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize))]
pub enum RefractionModel {
    /// Reported elevations are geometric elevations.
    Disabled,
    /// Sæmundsson (1986) true to apparent elevation formula,
    /// scaled by pressure and temperature.
    #[default]
    Saemundsson,
}

impl std::str::FromStr for RefractionModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "none" => Ok(Self::Disabled),
            "saemundsson" | "sæmundsson" => Ok(Self::Saemundsson),
            _ => Err(Error::UnknownRefractionModel(s.to_string())),
        }
    }
}

impl std::fmt::Display for RefractionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Saemundsson => write!(f, "Saemundsson"),
        }
    }
}

impl RefractionModel {
    /// Elevation correction (degrees, positive upwards) to apply to
    /// the geometric elevation `unrefracted_deg`.
    /// The correction is bounded: it saturates below -1° and vanishes
    /// above 89.9°, it is always finite for finite inputs.
    pub fn refraction_deg(&self, unrefracted_deg: f64, meteo: &MeteoData) -> f64 {
        match self {
            Self::Disabled => 0.0,
            Self::Saemundsson => saemundsson(unrefracted_deg, meteo),
        }
    }

    /// Apparent elevation (degrees) of a target at geometric elevation `unrefracted_deg`.
    pub fn apparent_elevation_deg(&self, unrefracted_deg: f64, meteo: &MeteoData) -> f64 {
        unrefracted_deg + self.refraction_deg(unrefracted_deg, meteo)
    }
}

fn saemundsson(unrefracted_deg: f64, meteo: &MeteoData) -> f64 {
    if unrefracted_deg > MAX_REFRACTION_ELEVATION_DEG {
        return 0.0;
    }

    let h = unrefracted_deg.max(MIN_REFRACTION_ELEVATION_DEG);
    let arcmin = 1.02 / (h + 10.3 / (h + 5.11)).to_radians().tan();

    let scaling = (meteo.pressure_hpa / 1010.0) * (283.0 / (273.0 + meteo.temperature_c));
    let r = arcmin / 60.0 * scaling;

    if r.is_finite() {
        r.max(0.0)
    } else {
        0.0
    }
}
