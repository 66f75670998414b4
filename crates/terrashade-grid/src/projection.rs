//! Map projections between geographic and planar coordinates.
//!
//! All projections here are spherical and expressed in meters. Geographic
//! coordinates are in degrees, passed longitude first to match the usual
//! `(x, y)` ordering.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// Mean Earth radius (meters), used by the local projections.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Semi-major axis used by spherical Web Mercator (meters).
pub const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// A bidirectional mapping between geographic and planar coordinates.
///
/// Round trips need not be exact, but must be consistent over the area a
/// grid covers.
pub trait Projection {
    /// Project `(lng, lat)` in degrees to planar `(x, y)`.
    fn forward(&self, lng: f64, lat: f64) -> (f64, f64);

    /// Unproject planar `(x, y)` to `(lng, lat)` in degrees.
    fn inverse(&self, x: f64, y: f64) -> (f64, f64);
}

impl<P: Projection + ?Sized> Projection for &P {
    fn forward(&self, lng: f64, lat: f64) -> (f64, f64) {
        (**self).forward(lng, lat)
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        (**self).inverse(x, y)
    }
}

/// Spherical transverse Mercator.
///
/// With [`TransverseMercator::utm`] this approximates a UTM zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransverseMercator {
    /// Central meridian in degrees.
    pub lon0: f64,
    /// Latitude of origin in degrees.
    pub lat0: f64,
    /// Scale factor on the central meridian.
    pub k0: f64,
    /// Added to every easting (meters).
    pub false_easting: f64,
    /// Added to every northing (meters).
    pub false_northing: f64,
}

impl TransverseMercator {
    /// UTM zone `zone` (1-60) in the given hemisphere.
    pub fn utm(zone: u8, north: bool) -> Self {
        let zone = zone.clamp(1, 60);
        Self {
            lon0: -183.0 + 6.0 * zone as f64,
            lat0: 0.0,
            k0: 0.9996,
            false_easting: 500_000.0,
            false_northing: if north { 0.0 } else { 10_000_000.0 },
        }
    }

    /// The UTM zone containing a coordinate.
    pub fn utm_for(lat: f64, lon: f64) -> Self {
        Self::utm(utm_zone(lon), lat >= 0.0)
    }
}

impl Projection for TransverseMercator {
    fn forward(&self, lng: f64, lat: f64) -> (f64, f64) {
        let phi = lat.to_radians();
        let dlam = (lng - self.lon0).to_radians();
        let rk = EARTH_RADIUS_M * self.k0;

        let b = phi.cos() * dlam.sin();
        let x = rk * b.atanh();
        let y = rk * (phi.tan().atan2(dlam.cos()) - self.lat0.to_radians());

        (x + self.false_easting, y + self.false_northing)
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let rk = EARTH_RADIUS_M * self.k0;
        let xs = (x - self.false_easting) / rk;
        let d = (y - self.false_northing) / rk + self.lat0.to_radians();

        let phi = (d.sin() / xs.cosh()).asin();
        let lam = self.lon0.to_radians() + xs.sinh().atan2(d.cos());

        (lam.to_degrees(), phi.to_degrees())
    }
}

/// UTM zone number for a longitude.
pub fn utm_zone(lon: f64) -> u8 {
    (((lon + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u8
}

/// The projections a grid can be persisted with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapProjection {
    /// Plate carrée scaled to meters at standard parallel `lat_ts`.
    Equirectangular {
        /// Latitude of true scale in degrees.
        lat_ts: f64,
    },
    /// Spherical Web Mercator (EPSG:3857).
    WebMercator,
    /// Spherical transverse Mercator.
    TransverseMercator(TransverseMercator),
}

impl MapProjection {
    /// UTM-like transverse Mercator for the zone containing a coordinate.
    pub fn utm_for(lat: f64, lon: f64) -> Self {
        MapProjection::TransverseMercator(TransverseMercator::utm_for(lat, lon))
    }
}

impl Projection for MapProjection {
    fn forward(&self, lng: f64, lat: f64) -> (f64, f64) {
        match self {
            MapProjection::Equirectangular { lat_ts } => {
                let x = EARTH_RADIUS_M * lng.to_radians() * lat_ts.to_radians().cos();
                let y = EARTH_RADIUS_M * lat.to_radians();
                (x, y)
            }
            MapProjection::WebMercator => {
                let x = WEB_MERCATOR_RADIUS_M * lng.to_radians();
                let y = WEB_MERCATOR_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
                (x, y)
            }
            MapProjection::TransverseMercator(tm) => tm.forward(lng, lat),
        }
    }

    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            MapProjection::Equirectangular { lat_ts } => {
                let lng = (x / (EARTH_RADIUS_M * lat_ts.to_radians().cos())).to_degrees();
                let lat = (y / EARTH_RADIUS_M).to_degrees();
                (lng, lat)
            }
            MapProjection::WebMercator => {
                let lng = (x / WEB_MERCATOR_RADIUS_M).to_degrees();
                let lat = (2.0 * (y / WEB_MERCATOR_RADIUS_M).exp().atan() - 2.0 * FRAC_PI_4).to_degrees();
                (lng, lat)
            }
            MapProjection::TransverseMercator(tm) => tm.inverse(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_round_trip(proj: &MapProjection, lng: f64, lat: f64) {
        let (x, y) = proj.forward(lng, lat);
        let (lng2, lat2) = proj.inverse(x, y);
        assert_abs_diff_eq!(lng2, lng, epsilon = 1e-9);
        assert_abs_diff_eq!(lat2, lat, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trips() {
        let projections = [
            MapProjection::Equirectangular { lat_ts: 47.0 },
            MapProjection::WebMercator,
            MapProjection::utm_for(47.4, 10.9),
            MapProjection::utm_for(-33.9, 151.2),
        ];
        let points = [(10.9, 47.4), (11.3, 47.1), (151.2, -33.9), (0.0, 0.0)];

        for proj in &projections {
            for (lng, lat) in points {
                assert_round_trip(proj, lng, lat);
            }
        }
    }

    #[test]
    fn test_utm_zone() {
        assert_eq!(utm_zone(-180.0), 1);
        assert_eq!(utm_zone(10.9), 32);
        assert_eq!(utm_zone(151.2), 56);
        assert_eq!(utm_zone(180.0), 60);
    }

    #[test]
    fn test_utm_central_meridian_has_false_easting() {
        let tm = TransverseMercator::utm(32, true);
        assert_eq!(tm.lon0, 9.0);
        let (x, y) = tm.forward(9.0, 0.0);
        assert_abs_diff_eq!(x, 500_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-6);

        let south = TransverseMercator::utm(56, false);
        let (_, y) = south.forward(153.0, 0.0);
        assert_abs_diff_eq!(y, 10_000_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_transverse_mercator_scale_near_meridian() {
        // One degree of latitude along the central meridian is about 111 km.
        let tm = TransverseMercator::utm(32, true);
        let (_, y1) = tm.forward(9.0, 47.0);
        let (_, y2) = tm.forward(9.0, 48.0);
        assert_abs_diff_eq!(y2 - y1, 111_150.0, epsilon = 200.0);
    }

    #[test]
    fn test_web_mercator_origin() {
        let (x, y) = MapProjection::WebMercator.forward(0.0, 0.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_projection_serde_tagging() {
        let proj = MapProjection::utm_for(47.4, 10.9);
        let json = serde_json::to_string(&proj).unwrap();
        assert!(json.contains("\"kind\":\"transverse_mercator\""));
        let back: MapProjection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, proj);

        let json = serde_json::to_string(&MapProjection::WebMercator).unwrap();
        assert_eq!(json, "{\"kind\":\"web_mercator\"}");
    }
}
