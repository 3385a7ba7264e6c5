/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Seconds in one (civil) day
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Picoseconds to seconds
pub const PICOSECONDS_TO_S: f64 = 1.0E-12;

/// Elevation reported in place of an exact zenith, so azimuth remains defined.
pub const ZENITH_GUARD_DEG: f64 = 90.0 - 1.0E-4;
