//! Reference ellipsoid parameters.

/// Reference ellipsoid parameters.
#[derive(Clone, Copy, Debug)]
pub struct Ellipsoid {
    /// Semi-major axis (metres)
    pub a: f64,
    /// Flattening (dimensionless)
    pub f: f64,
    /// First eccentricity squared
    pub e2: f64,
}

impl Ellipsoid {
    pub const fn new(a: f64, f: f64) -> Self {
        Self {
            a,
            f,
            e2: 2.0 * f - f * f,
        }
    }

    /// First eccentricity. Not stored because `sqrt` is not const.
    #[inline]
    pub fn eccentricity(&self) -> f64 {
        self.e2.sqrt()
    }
}

/// WGS84 ellipsoid.
pub const WGS84: Ellipsoid = Ellipsoid::new(6_378_137.0, 1.0 / 298.257_223_563);
