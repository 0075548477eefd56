//! Great-circle distances between expats and the professionals they browse.

use super::domain::{Coordinates, ProfessionalProfile};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Search origin used when the viewer shares no location.
pub const DEFAULT_ORIGIN: Coordinates = Coordinates::new(40.4168, -3.7038);

const CITY_CENTERS: &[(&str, Coordinates)] = &[
    ("madrid", Coordinates::new(40.4168, -3.7038)),
    ("barcelona", Coordinates::new(41.3874, 2.1686)),
    ("valencia", Coordinates::new(39.4699, -0.3763)),
    ("sevilla", Coordinates::new(37.3891, -5.9845)),
    ("seville", Coordinates::new(37.3891, -5.9845)),
    ("malaga", Coordinates::new(36.7213, -4.4214)),
    ("málaga", Coordinates::new(36.7213, -4.4214)),
    ("alicante", Coordinates::new(38.3452, -0.4810)),
    ("bilbao", Coordinates::new(43.2630, -2.9350)),
    ("granada", Coordinates::new(37.1773, -3.5986)),
    ("palma", Coordinates::new(39.5696, 2.6502)),
    ("marbella", Coordinates::new(36.5101, -4.8825)),
    ("zaragoza", Coordinates::new(41.6488, -0.8891)),
];

/// Haversine distance in kilometres.
///
/// Any zero or non-finite component is treated as an unknown location and yields `0.0`
/// instead of an error, so callers can sort without special-casing missing data.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let unknown = [lat1, lon1, lat2, lon2]
        .iter()
        .any(|value| !value.is_finite() || *value == 0.0);
    if unknown {
        return 0.0;
    }

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn distance_between(from: Coordinates, to: Coordinates) -> f64 {
    distance(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Centre of a known city, matched case-insensitively.
pub fn city_center(city: &str) -> Option<Coordinates> {
    let needle = city.trim().to_lowercase();
    CITY_CENTERS
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, coordinates)| *coordinates)
}

/// Stored coordinates when usable, else the centre of the first served city.
pub fn locate(profile: &ProfessionalProfile) -> Option<Coordinates> {
    profile
        .contact
        .coordinates
        .filter(Coordinates::is_known)
        .or_else(|| {
            profile
                .expertise
                .cities
                .first()
                .and_then(|city| city_center(city))
        })
}

/// Distance from `origin` to the professional, `None` when the professional cannot be located.
pub fn distance_from(origin: Coordinates, profile: &ProfessionalProfile) -> Option<f64> {
    locate(profile).map(|location| distance_between(origin, location))
}
