/*!
 * The declared boundary of a rice field.
 *
 * Every cluster polygon is clipped to this boundary, so it has to be a proper simple polygon.
 */
use crate::{
    error::{ScanError, ScanResult},
    geodesy::{valid_lat_lon, AreaProjection},
};
use geo::{Area, Contains, Coord, Intersects, Line, LineString, MultiPolygon, Point, Polygon};

/// A simple polygon in geographic coordinates, longitude as `x` and latitude as `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoundary {
    polygon: Polygon<f64>,
}

impl FieldBoundary {
    /// The minimum number of distinct vertices in a boundary.
    pub const MIN_VERTICES: usize = 3;

    /**
     * Create a boundary from `(longitude, latitude)` vertices.
     *
     * The ring may be given open or closed. Repeated consecutive vertices are dropped.
     *
     * #Errors
     * [ScanError::InvalidBoundary] if there are fewer than 3 distinct vertices, any vertex is out
     * of range, the ring crosses or touches itself, or it encloses no area.
     */
    pub fn from_lon_lat(vertices: &[(f64, f64)]) -> ScanResult<Self> {
        let mut ring: Vec<Coord<f64>> = vertices.iter().map(|&(x, y)| Coord { x, y }).collect();
        ring.dedup();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        if ring.len() < Self::MIN_VERTICES {
            return Err(ScanError::InvalidBoundary {
                reason: "fewer than 3 distinct vertices",
            });
        }

        if ring.iter().any(|c| !valid_lat_lon(c.y, c.x)) {
            return Err(ScanError::InvalidBoundary {
                reason: "vertex latitude or longitude out of range",
            });
        }

        if !is_simple(&ring) {
            return Err(ScanError::InvalidBoundary {
                reason: "boundary crosses itself",
            });
        }

        let polygon = Polygon::new(LineString::new(ring), vec![]);
        if polygon.unsigned_area() == 0.0 {
            return Err(ScanError::InvalidBoundary {
                reason: "boundary encloses no area",
            });
        }

        Ok(FieldBoundary { polygon })
    }

    /// Create a boundary from `[latitude, longitude]` vertices, the order used in scan requests.
    pub fn from_lat_lon(vertices: &[[f64; 2]]) -> ScanResult<Self> {
        let lon_lat: Vec<(f64, f64)> = vertices.iter().map(|&[lat, lon]| (lon, lat)).collect();
        Self::from_lon_lat(&lon_lat)
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// The boundary as a region, ready for boolean operations.
    pub(crate) fn region(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![self.polygon.clone()])
    }

    /// Is this location strictly inside the field?
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.polygon.contains(&Point::new(longitude, latitude))
    }

    /// The area of the field in square meters after projection.
    pub fn area_m2(&self, projection: AreaProjection) -> f64 {
        projection.area_m2(&self.region())
    }
}

/// Check a ring (without the closing vertex) for crossing or touching edges.
fn is_simple(ring: &[Coord<f64>]) -> bool {
    let n = ring.len();
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(ring[i], ring[(i + 1) % n]))
        .collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);

            if adjacent {
                if folds_back(&edges[i], &edges[j]) {
                    return false;
                }
            } else if edges[i].intersects(&edges[j]) {
                return false;
            }
        }
    }

    true
}

/// Adjacent edges that are collinear and point back over each other form a zero width spike.
fn folds_back(left: &Line<f64>, right: &Line<f64>) -> bool {
    let a = left.delta();
    let b = right.delta();

    let cross = a.x * b.y - a.y * b.x;
    let dot = a.x * b.x + a.y * b.y;

    // Edges are stored head to tail except for the closing pair, where the order is reversed,
    // but a spike is antiparallel either way.
    cross == 0.0 && dot < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_square_is_valid() {
        let sq = [(0.0, 0.0), (0.001, 0.0), (0.001, 0.001), (0.0, 0.001), (0.0, 0.0)];
        let boundary = FieldBoundary::from_lon_lat(&sq).unwrap();
        assert_eq!(boundary.polygon().exterior().0.len(), 5);
        assert!(boundary.contains(0.0005, 0.0005));
        assert!(!boundary.contains(0.002, 0.0005));
    }

    #[test]
    fn test_bow_tie_is_invalid() {
        let bow_tie = [(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)];
        assert!(matches!(
            FieldBoundary::from_lon_lat(&bow_tie),
            Err(ScanError::InvalidBoundary { .. })
        ));
    }

    #[test]
    fn test_too_few_vertices() {
        let line = [(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)];
        assert!(matches!(
            FieldBoundary::from_lon_lat(&line),
            Err(ScanError::InvalidBoundary { .. })
        ));
    }

    #[test]
    fn test_spike_is_invalid() {
        let spike = [(0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (1.0, 1.0)];
        assert!(FieldBoundary::from_lon_lat(&spike).is_err());
    }
}
