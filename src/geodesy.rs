/*!
 * Geographic calculations.
 *
 * Geometry in this crate is kept in geographic coordinates (WGS84 longitude and latitude in
 * degrees, longitude as `x`) until an area is needed. Areas are always computed after projecting
 * onto a planar metric coordinate system, never in degree space.
 */
use geo::{Area, Coord, MapCoords, MultiPolygon};
use serde::{Deserialize, Serialize};

pub(crate) use alpha_shape::{alpha_shape, Hull};
pub(crate) use buffer::{buffer_hull, buffer_point, union_all};

mod alpha_shape;
mod buffer;

const DEG2RAD: f64 = std::f64::consts::PI / 180.0;

/// The mean radius of the Earth in meters.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// The semi-major axis of the WGS84 ellipsoid, used as the sphere radius by Web Mercator.
const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Approximate length of one degree of latitude in meters.
///
/// This is used for both latitude and longitude when converting buffer distances, which is only
/// accurate near the equator.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Web Mercator is undefined at the poles, latitudes are clamped to this value.
const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Check that a latitude and longitude pair is in range.
pub fn valid_lat_lon(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/**
 * The central angle between two points on a sphere, the haversine formula.
 *
 * #Arguments
 * * lat1 - the latitude of the first point in degrees.
 * * lon1 - the longitude of the first point in degrees.
 * * lat2 - the latitude of the second point in degrees.
 * * lon2 - the longitude of the second point in degrees.
 *
 * #Returns
 * The angle between the points in radians.
 */
pub fn haversine_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_r = lat1 * DEG2RAD;
    let lon1_r = lon1 * DEG2RAD;
    let lat2_r = lat2 * DEG2RAD;
    let lon2_r = lon2 * DEG2RAD;

    let dlat2 = (lat2_r - lat1_r) / 2.0;
    let dlon2 = (lon2_r - lon1_r) / 2.0;

    let sin2_dlat = f64::powi(f64::sin(dlat2), 2);
    let sin2_dlon = f64::powi(f64::sin(dlon2), 2);

    let h = sin2_dlat + sin2_dlon * f64::cos(lat1_r) * f64::cos(lat2_r);

    // Rounding can push h a hair above 1 for antipodal points.
    2.0 * f64::asin(f64::sqrt(h.min(1.0)))
}

/**
 * The simple great circle distance calculation.
 *
 * #Returns
 * The distance between the points in meters.
 */
pub fn great_circle_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_angle(lat1, lon1, lat2, lon2) * EARTH_MEAN_RADIUS_M
}

/// Convert a distance in meters to an angle in radians on the mean Earth sphere.
pub fn meters_to_radians(meters: f64) -> f64 {
    meters / EARTH_MEAN_RADIUS_M
}

/// Convert a distance in meters to degrees using the fixed [METERS_PER_DEGREE] approximation.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// The planar coordinate systems available for computing areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AreaProjection {
    /// Spherical (Web) Mercator, EPSG:3857.
    ///
    /// Areas are inflated by 1/cos²(latitude) compared to the ground, which is small for fields
    /// near the equator.
    #[default]
    WebMercator,
    /// Lambert cylindrical equal area on the mean Earth sphere, areas are true ground areas.
    EqualArea,
}

impl AreaProjection {
    /// Project a geographic coordinate (x = longitude, y = latitude in degrees) into meters.
    pub fn project(self, coord: Coord<f64>) -> Coord<f64> {
        match self {
            AreaProjection::WebMercator => {
                let lat = coord.y.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE) * DEG2RAD;
                Coord {
                    x: WEB_MERCATOR_RADIUS_M * coord.x * DEG2RAD,
                    y: WEB_MERCATOR_RADIUS_M
                        * f64::ln(f64::tan(std::f64::consts::FRAC_PI_4 + lat / 2.0)),
                }
            }
            AreaProjection::EqualArea => Coord {
                x: EARTH_MEAN_RADIUS_M * coord.x * DEG2RAD,
                y: EARTH_MEAN_RADIUS_M * f64::sin(coord.y * DEG2RAD),
            },
        }
    }

    /// Reproject a geographic region and calculate its area in square meters.
    pub fn area_m2(self, region: &MultiPolygon<f64>) -> f64 {
        region
            .map_coords(|coord| self.project(coord))
            .unsigned_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_great_circle_distance() {
        // One degree of latitude along a meridian.
        let d = great_circle_distance(10.0, 100.0, 11.0, 100.0);
        assert!((d - 111_195.08).abs() < 1.0);

        assert_eq!(great_circle_distance(-6.2, 106.8, -6.2, 106.8), 0.0);
    }

    #[test]
    fn test_web_mercator_origin() {
        let p = AreaProjection::WebMercator.project(Coord { x: 0.0, y: 0.0 });
        assert!(p.x.abs() < 1.0e-9);
        assert!(p.y.abs() < 1.0e-9);

        let p = AreaProjection::WebMercator.project(Coord { x: 180.0, y: 0.0 });
        assert!((p.x - 20_037_508.342_789_244).abs() < 1.0e-3);
    }

    #[test]
    fn test_equal_area_of_small_square() {
        // A 0.001 degree square at the equator is about 111.2m on a side.
        let sq = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.001, y: 0.0),
            (x: 0.001, y: 0.001),
            (x: 0.0, y: 0.001),
        ];
        let area = AreaProjection::EqualArea.area_m2(&MultiPolygon::new(vec![sq]));
        assert!((area - 12_364.35).abs() < 1.0);
    }
}
