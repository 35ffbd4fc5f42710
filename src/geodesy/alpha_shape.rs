/*!
 * Concave hulls (alpha shapes) of small point sets.
 *
 * The point sets are the members of a single cluster, so they are small (a scan has at most a
 * handful of images) and a brute force Delaunay triangulation is plenty fast.
 */
use geo::{BooleanOps, ConvexHull, Coord, LineString, MultiPoint, MultiPolygon, Polygon};

/// Relative tolerance for deciding if a set of points all lie on one line.
const COLLINEAR_TOLERANCE: f64 = 1.0e-12;

/// Relative tolerance on the squared circumradius when testing if a point is inside a circumcircle.
const COCIRCULAR_TOLERANCE: f64 = 1.0e-9;

/// The shape reconstructed from a set of points.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Hull {
    /// No points, or no triangle passed the alpha test.
    Empty,
    /// All the points are at the same location.
    Point(Coord<f64>),
    /// All the points lie along a line, this is the segment between the extreme points.
    Line(LineString<f64>),
    /// An area bearing shape, possibly with several parts.
    Polygon(MultiPolygon<f64>),
}

/**
 * Compute the alpha shape of a set of points.
 *
 * A Delaunay triangle is part of the shape if its circumradius is smaller than `1 / alpha`. An
 * alpha of zero or less, or fewer than 4 distinct points, gives the convex hull. The radius test
 * is done in the units of the input coordinates.
 */
pub(crate) fn alpha_shape(points: &[Coord<f64>], alpha: f64) -> Hull {
    let mut pts: Vec<Coord<f64>> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();

    match pts.len() {
        0 => return Hull::Empty,
        1 => return Hull::Point(pts[0]),
        _ => {}
    }

    // After the lexicographic sort the first and last points are extremes, so if the set is
    // collinear they are the ends of the segment.
    let first = pts[0];
    let last = pts[pts.len() - 1];
    if all_collinear(&pts, first, last) {
        return Hull::Line(LineString::new(vec![first, last]));
    }

    if pts.len() < 4 || alpha <= 0.0 {
        let hull: Polygon<f64> = MultiPoint::from(pts).convex_hull();
        return Hull::Polygon(MultiPolygon::new(vec![hull]));
    }

    let max_radius = 1.0 / alpha;
    let region = delaunay(&pts)
        .into_iter()
        .filter(|tri| tri.radius_sq.sqrt() < max_radius)
        .map(|tri| tri.to_polygon(&pts))
        .fold(MultiPolygon::new(vec![]), |acc, tri| {
            acc.union(&MultiPolygon::new(vec![tri]))
        });

    if region.0.is_empty() {
        Hull::Empty
    } else {
        Hull::Polygon(region)
    }
}

fn all_collinear(pts: &[Coord<f64>], first: Coord<f64>, last: Coord<f64>) -> bool {
    let dir = last - first;
    let scale = dir.x * dir.x + dir.y * dir.y;

    pts.iter().all(|&p| {
        let rel = p - first;
        let cross = dir.x * rel.y - dir.y * rel.x;
        cross.abs() <= COLLINEAR_TOLERANCE * scale
    })
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    center: Coord<f64>,
    radius_sq: f64,
}

impl Triangle {
    fn new(v: [usize; 3], pts: &[Coord<f64>]) -> Self {
        let (a, b, c) = (pts[v[0]], pts[v[1]], pts[v[2]]);

        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d == 0.0 {
            // Collinear, there is no circumcircle.
            return Triangle {
                v,
                center: a,
                radius_sq: f64::INFINITY,
            };
        }

        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;

        let center = Coord {
            x: (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            y: (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        };

        let radius_sq = dist_sq(center, a);

        Triangle {
            v,
            center,
            radius_sq,
        }
    }

    /// Is `p` inside the circumcircle by more than the rounding tolerance?
    fn strictly_contains(&self, p: Coord<f64>) -> bool {
        dist_sq(self.center, p) < self.radius_sq * (1.0 - COCIRCULAR_TOLERANCE)
    }

    fn to_polygon(self, pts: &[Coord<f64>]) -> Polygon<f64> {
        let ring = self.v.iter().map(|&i| pts[i]).collect::<Vec<_>>();
        Polygon::new(LineString::new(ring), vec![])
    }
}

fn dist_sq(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}

/**
 * Delaunay triangulation by the empty circumcircle test.
 *
 * Every triple of points whose circumcircle holds no other point is a Delaunay triangle, so each
 * triple is tested directly. The cost grows with the fourth power of the number of points, which
 * is fine for the members of one cluster, and the union of the triangles is always the convex
 * hull of the points. When four or more points lie on (or very near) a common circle all of the
 * triangles among them are kept, they overlap but cover the same region as any one triangulation.
 *
 * The returned triangles index into `pts`. The work is done relative to the lower left corner of
 * the bounding box to keep the arithmetic well conditioned for tightly packed geographic
 * coordinates, the circumradii are the same in either frame.
 */
fn delaunay(pts: &[Coord<f64>]) -> Vec<Triangle> {
    let n = pts.len();

    let min = pts.iter().fold(
        Coord {
            x: f64::INFINITY,
            y: f64::INFINITY,
        },
        |min, p| Coord {
            x: min.x.min(p.x),
            y: min.y.min(p.y),
        },
    );
    let local: Vec<Coord<f64>> = pts.iter().map(|&p| p - min).collect();

    let mut triangles = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let tri = Triangle::new([i, j, k], &local);
                if !tri.radius_sq.is_finite() {
                    continue;
                }

                let empty = local
                    .iter()
                    .enumerate()
                    .filter(|&(m, _)| m != i && m != j && m != k)
                    .all(|(_, &p)| !tri.strictly_contains(p));

                if empty {
                    triangles.push(tri);
                }
            }
        }
    }

    triangles
}
