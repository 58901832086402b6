//! Ellipsoidal Mercator projection (variant A).
//!
//!   forward: x = a·k₀·(λ - λ₀), y = a·k₀·ln(tan(π/4 + φ/2)·((1 - e·sinφ)/(1 + e·sinφ))^(e/2))
//!   inverse: λ = λ₀ + x/(a·k₀), φ solved iteratively from t = exp(-y/(a·k₀))

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::ellipsoid::{Ellipsoid, WGS84};
use super::{ProjError, Projection};

/// Latitude limit beyond which Mercator northings diverge.
const MAX_MERCATOR_LAT: f64 = 89.5;

/// Convergence threshold for the inverse latitude iteration (radians).
const INVERSE_TOLERANCE: f64 = 1e-12;
const INVERSE_MAX_ITERATIONS: usize = 15;

/// Longitude difference from the central meridian, wrapped into [-180, 180].
fn delta_lon(lon: f64, lon0: f64) -> f64 {
    let mut d = lon - lon0;
    while d > 180.0 {
        d -= 360.0;
    }
    while d < -180.0 {
        d += 360.0;
    }
    d
}

/// Ellipsoidal Mercator projection (variant A, scale factor at the equator).
pub struct Mercator {
    ellipsoid: Ellipsoid,
    lon0: f64,
    k0: f64,
}

impl Mercator {
    pub fn new(ellipsoid: Ellipsoid, lon0: f64, k0: f64) -> Self {
        Self {
            ellipsoid,
            lon0,
            k0,
        }
    }

    /// EPSG:3832 parameters: WGS84, central meridian 150°E, k₀ = 1.
    pub fn pdc() -> Self {
        Self::new(WGS84, 150.0, 1.0)
    }
}

impl Projection for Mercator {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjError> {
        if !lat.is_finite() || lat.abs() > MAX_MERCATOR_LAT {
            return Err(ProjError::TransformFailed(format!(
                "latitude {} outside Mercator domain",
                lat
            )));
        }
        let e = self.ellipsoid.eccentricity();
        let ak = self.ellipsoid.a * self.k0;
        let phi = lat.to_radians();
        let esin = e * phi.sin();

        let x = ak * delta_lon(lon, self.lon0).to_radians();
        let y = ak * ((FRAC_PI_4 + phi / 2.0).tan() * ((1.0 - esin) / (1.0 + esin)).powf(e / 2.0)).ln();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let e = self.ellipsoid.eccentricity();
        let ak = self.ellipsoid.a * self.k0;
        let t = (-y / ak).exp();

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..INVERSE_MAX_ITERATIONS {
            let esin = e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - esin) / (1.0 + esin)).powf(e / 2.0)).atan();
            let done = (next - phi).abs() < INVERSE_TOLERANCE;
            phi = next;
            if done {
                break;
            }
        }

        let lon = self.lon0 + (x / ak).to_degrees();
        Ok((lon, phi.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_pdc_origin_is_central_meridian() {
        let (x, y) = Mercator::pdc().forward(150.0, 0.0).unwrap();
        assert!(close(x, 0.0, 1e-6));
        assert!(close(y, 0.0, 1e-6));
    }

    #[test]
    fn test_pdc_round_trip() {
        let m = Mercator::pdc();
        for (lon, lat) in [(179.5, -17.0), (-170.0, 10.0), (125.0, 25.0), (150.0, -29.9)] {
            let (x, y) = m.forward(lon, lat).unwrap();
            let (lon2, lat2) = m.inverse(x, y).unwrap();
            // Inverse does not wrap, so compare through the same wrap
            assert!(close(delta_lon(lon2, lon), 0.0, 1e-9), "lon {} vs {}", lon, lon2);
            assert!(close(lat2, lat, 1e-9), "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_pdc_inverse_east_of_antimeridian_is_unwrapped() {
        let m = Mercator::pdc();
        let (x, y) = m.forward(-170.0, 0.0).unwrap();
        let (lon, _) = m.inverse(x, y).unwrap();
        assert!(close(lon, 190.0, 1e-9));
    }

    #[test]
    fn test_pdc_known_northing() {
        // Ellipsoidal northing of 30°S on WGS84 Mercator
        let (_, y) = Mercator::pdc().forward(150.0, -30.0).unwrap();
        assert!(close(y, -3_482_189.085, 0.01), "northing {}", y);
    }

    #[test]
    fn test_pdc_rejects_polar_latitude() {
        assert!(Mercator::pdc().forward(0.0, 90.0).is_err());
    }
}
