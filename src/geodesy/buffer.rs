/*!
 * Outward buffering of hulls and points.
 *
 * A buffer is the Minkowski sum of a shape with a disc. For a polygon that is the polygon itself
 * plus the buffer of every one of its rings, and the buffer of a line is the union of a disc at
 * every vertex with a rectangle along every segment. Discs are approximated by regular polygons
 * with `4 * quad_segments` vertices.
 */
use super::Hull;
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};

/// Approximate a disc around `center`.
pub(crate) fn buffer_point(center: Coord<f64>, distance: f64, quad_segments: usize) -> Polygon<f64> {
    let num_vertices = 4 * quad_segments.max(1);
    let step = 2.0 * std::f64::consts::PI / num_vertices as f64;

    let ring: Vec<Coord<f64>> = (0..num_vertices)
        .map(|i| {
            let theta = step * i as f64;
            Coord {
                x: center.x + distance * theta.cos(),
                y: center.y + distance * theta.sin(),
            }
        })
        .collect();

    Polygon::new(LineString::new(ring), vec![])
}

/**
 * Buffer a hull outward by `distance`.
 *
 * #Returns
 * `None` if the hull is empty, there is nothing to buffer.
 */
pub(crate) fn buffer_hull(
    hull: &Hull,
    distance: f64,
    quad_segments: usize,
) -> Option<MultiPolygon<f64>> {
    match hull {
        Hull::Empty => None,
        Hull::Point(center) => Some(MultiPolygon::new(vec![buffer_point(
            *center,
            distance,
            quad_segments,
        )])),
        Hull::Line(line) => Some(buffer_line(line, distance, quad_segments)),
        Hull::Polygon(region) => Some(buffer_region(region, distance, quad_segments)),
    }
}

fn buffer_region(region: &MultiPolygon<f64>, distance: f64, quad_segments: usize) -> MultiPolygon<f64> {
    region
        .iter()
        .flat_map(|poly| std::iter::once(poly.exterior()).chain(poly.interiors().iter()))
        .map(|ring| buffer_line(ring, distance, quad_segments))
        .fold(region.clone(), |acc, ring_buffer| acc.union(&ring_buffer))
}

fn buffer_line(line: &LineString<f64>, distance: f64, quad_segments: usize) -> MultiPolygon<f64> {
    let discs = line
        .coords()
        .map(|&c| buffer_point(c, distance, quad_segments));

    let segments = line
        .lines()
        .filter_map(|segment| segment_rectangle(segment.start, segment.end, distance));

    union_all(discs.chain(segments))
}

/// The rectangle swept by a segment, `None` for a zero length segment.
fn segment_rectangle(start: Coord<f64>, end: Coord<f64>, distance: f64) -> Option<Polygon<f64>> {
    let dir = end - start;
    let len = dir.x.hypot(dir.y);
    if len == 0.0 {
        return None;
    }

    let offset = Coord {
        x: -dir.y / len * distance,
        y: dir.x / len * distance,
    };

    let ring = vec![start + offset, end + offset, end - offset, start - offset];
    Some(Polygon::new(LineString::new(ring), vec![]))
}

pub(crate) fn union_all<I>(polygons: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = Polygon<f64>>,
{
    polygons
        .into_iter()
        .fold(MultiPolygon::new(vec![]), |acc, poly| {
            acc.union(&MultiPolygon::new(vec![poly]))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    #[test]
    fn test_point_buffer_area() {
        let disc = buffer_point(Coord { x: 0.0, y: 0.0 }, 1.0, 8);

        // A regular 32-gon inscribed in the unit circle.
        let expected = 0.5 * 32.0 * (2.0 * std::f64::consts::PI / 32.0).sin();
        assert!((disc.unsigned_area() - expected).abs() < 1.0e-9);
        assert_eq!(disc.exterior().0.len(), 33);
    }

    #[test]
    fn test_line_buffer_is_a_capsule() {
        let line = LineString::new(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 0.0 }]);
        let capsule = buffer_line(&line, 1.0, 8);

        assert_eq!(capsule.0.len(), 1);

        // A 10 x 2 rectangle plus (nearly) a unit disc.
        let area = capsule.unsigned_area();
        assert!(area > 20.0 + 3.0);
        assert!(area < 20.0 + std::f64::consts::PI);
    }

    #[test]
    fn test_polygon_buffer_grows_the_polygon() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 4.0),
            (x: 0.0, y: 4.0),
        ];
        let region = MultiPolygon::new(vec![square]);
        let buffered = buffer_region(&region, 1.0, 8);

        // Square, four 4 x 1 strips and (nearly) a unit disc in the corners.
        let area = buffered.unsigned_area();
        assert!(area > 16.0 + 16.0 + 3.0);
        assert!(area < 16.0 + 16.0 + std::f64::consts::PI);
    }
}
