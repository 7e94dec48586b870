//! Geographic location type and WGS84 distance.
//!
//! Distances are computed by converting both endpoints to WGS84 geocentric
//! Cartesian coordinates and taking the Euclidean norm.  The chord length is
//! within 0.5 % of the great-circle arc at the city-to-region separations a
//! radio-access network spans; it is *not* a substitute for great-circle math
//! on continental arcs.

use serde::{Deserialize, Serialize};

use crate::error::LocationError;
use crate::geocode::Geocoder;

// WGS84 ellipsoid.
const SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;
const FIRST_ECCENTRICITY_SQ: f64 = 6.694_379_990_14e-3;

/// A geographic point in decimal degrees, with optional altitude (meters)
/// and optional reverse-geocoded country / address annotations.
///
/// Equality compares coordinates only; the annotations are cosmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    /// Construct a location, validating the coordinate ranges.
    pub fn new(lat: f64, lon: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(LocationError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(LocationError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon, alt: None, country: None, address: None })
    }

    /// Same as [`new`](Self::new) with an explicit altitude in meters.
    pub fn with_alt(lat: f64, lon: f64, alt: Option<f64>) -> Result<Self, LocationError> {
        let mut loc = Self::new(lat, lon)?;
        loc.alt = alt;
        Ok(loc)
    }

    /// Resolve a country or address string into coordinates through `geocoder`.
    pub fn from_place(place: &str, geocoder: &dyn Geocoder) -> Result<Self, LocationError> {
        let (lat, lon) = geocoder
            .geocode(place)
            .ok_or_else(|| LocationError::GeocodeFailed(place.to_string()))?;
        let mut loc = Self::new(lat, lon)?;
        loc.address = Some(place.to_string());
        Ok(loc)
    }

    /// Altitude in meters, defaulting to 0 when unspecified.
    #[inline]
    pub fn alt_m(&self) -> f64 {
        self.alt.unwrap_or(0.0)
    }

    /// Fill the country annotation by reverse geocoding.  Failures are
    /// silent: the coordinates already identify the point.
    pub fn fill_country(&mut self, geocoder: &dyn Geocoder) {
        if self.country.is_none() {
            self.country = geocoder
                .reverse_country(self.lat, self.lon)
                .map(|c| c.to_uppercase());
        }
    }

    /// WGS84 geocentric Cartesian coordinates in meters.
    pub fn to_geocentric(&self) -> [f64; 3] {
        let phi = self.lat.to_radians();
        let lambda = self.lon.to_radians();
        let sin_phi = phi.sin();
        let n = SEMI_MAJOR_AXIS_M / (1.0 - FIRST_ECCENTRICITY_SQ * sin_phi * sin_phi).sqrt();
        [
            (n + self.alt_m()) * phi.cos() * lambda.cos(),
            (n + self.alt_m()) * phi.cos() * lambda.sin(),
            (n * (1.0 - FIRST_ECCENTRICITY_SQ) + self.alt_m()) * sin_phi,
        ]
    }

    /// Chord distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Location) -> f64 {
        let a = self.to_geocentric();
        let b = other.to_geocentric();
        let dx = a[0] - b[0];
        let dy = a[1] - b[1];
        let dz = a[2] - b[2];
        (dx * dx + dy * dy + dz * dz).sqrt() / 1000.0
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.lat == other.lat && self.lon == other.lon && self.alt_m() == other.alt_m()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.lat, self.lon, self.alt_m())
    }
}
