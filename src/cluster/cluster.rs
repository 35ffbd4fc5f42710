use super::{dbscan::dbscan, ClusterList};
use crate::{
    boundary::FieldBoundary,
    config::ClusterConfig,
    error::ScanResult,
    geodesy::{alpha_shape, buffer_hull, buffer_point, union_all, Hull},
    sample::{Level, Sample},
};
use geo::{Area, BooleanOps, Coord, MultiPolygon};

/// How a cluster came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterKind {
    /// A group of samples found by the density clustering.
    Dense,
    /// A single sample that was not close enough to any other sample.
    Noise,
}

/**
 * A group of samples and the part of the field they represent.
 */
#[derive(Debug, Clone)]
pub struct Cluster {
    /// The member samples.
    pub points: Vec<Sample>,
    /// The buffered hull of the members clipped to the field boundary, in geographic
    /// coordinates (longitude as `x`). Empty if the buffered hull was entirely outside the field.
    pub region: MultiPolygon<f64>,
    /// Representative level, the rounded mean of the decidable member levels.
    pub level: Level,
    /// Area of the region in square meters, computed after reprojection.
    pub area_m2: f64,
    pub kind: ClusterKind,
}

impl Cluster {
    pub fn is_noise(&self) -> bool {
        self.kind == ClusterKind::Noise
    }

    /**
     * The outline of the cluster as `[latitude, longitude]` pairs.
     *
     * Clipping against a concave field can split a region into several parts, this is the
     * exterior ring of the largest one. Empty if the region is empty.
     */
    pub fn polygon(&self) -> Vec<[f64; 2]> {
        self.region
            .iter()
            .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
            .map(|poly| poly.exterior().coords().map(|c| [c.y, c.x]).collect())
            .unwrap_or_default()
    }

    /// The member locations as `[latitude, longitude]` pairs.
    pub fn point_coords(&self) -> Vec<[f64; 2]> {
        self.points
            .iter()
            .map(|s| [s.latitude, s.longitude])
            .collect()
    }
}

/// Partition samples into clusters with polygons and areas.
#[derive(Debug, Clone, Copy)]
pub struct Clusterer {
    config: ClusterConfig,
}

impl Clusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Clusterer { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /**
     * Group samples into clusters.
     *
     * Dense clusters come first, in the order they were discovered, followed by a single sample
     * cluster for every noise sample in input order. Consumers should not rely on the order.
     *
     * #Arguments
     * samples - the samples from one scan, may be empty.
     * boundary - the field the cluster regions are clipped to.
     */
    pub fn cluster(&self, samples: &[Sample], boundary: &FieldBoundary) -> ClusterList {
        let labels = dbscan(samples, self.config.epsilon_radians(), self.config.min_samples);

        let mut groups: Vec<Vec<Sample>> = vec![vec![]; labels.num_clusters];
        let mut noise: Vec<Sample> = vec![];
        for (sample, label) in samples.iter().zip(&labels.labels) {
            match label {
                Some(lbl) => groups[*lbl].push(*sample),
                None => noise.push(*sample),
            }
        }

        let field = boundary.region();

        let dense = groups.into_iter().map(|members| {
            let region = self.dense_region(&members);
            let level = Level::decidable_mean(members.iter().map(|s| s.level));
            self.finish(members, region, level, &field, ClusterKind::Dense)
        });

        let singles = noise.into_iter().map(|sample| {
            let region = MultiPolygon::new(vec![buffer_point(
                coord(&sample),
                self.config.buffer_degrees(),
                self.config.quad_segments,
            )]);
            self.finish(vec![sample], region, sample.level, &field, ClusterKind::Noise)
        });

        let clusters: Vec<Cluster> = dense.chain(singles).collect();

        ClusterList::new(clusters, samples.len())
    }

    /// Validate `(longitude, latitude)` boundary vertices and cluster the samples.
    pub fn cluster_lon_lat(
        &self,
        samples: &[Sample],
        boundary: &[(f64, f64)],
    ) -> ScanResult<ClusterList> {
        let boundary = FieldBoundary::from_lon_lat(boundary)?;
        Ok(self.cluster(samples, &boundary))
    }

    /// The buffered hull of the members of a dense cluster, before clipping.
    fn dense_region(&self, members: &[Sample]) -> MultiPolygon<f64> {
        let coords: Vec<Coord<f64>> = members.iter().map(coord).collect();
        let distance = self.config.buffer_degrees();
        let quad_segments = self.config.quad_segments;

        let hull = alpha_shape(&coords, self.config.alpha);
        match &hull {
            Hull::Point(_) => {
                log::debug!("all {} cluster members at one location", members.len())
            }
            Hull::Line(_) => log::debug!("cluster of {} collinear members", members.len()),
            _ => {}
        }

        match buffer_hull(&hull, distance, quad_segments) {
            Some(region) => region,
            None => {
                log::debug!(
                    "degenerate hull for a cluster of {} members, buffering the members instead",
                    members.len()
                );
                union_all(
                    coords
                        .iter()
                        .map(|&c| buffer_point(c, distance, quad_segments)),
                )
            }
        }
    }

    fn finish(
        &self,
        points: Vec<Sample>,
        region: MultiPolygon<f64>,
        level: Level,
        field: &MultiPolygon<f64>,
        kind: ClusterKind,
    ) -> Cluster {
        let region = region.intersection(field);

        if let (true, Some(first)) = (region.0.is_empty(), points.first()) {
            log::warn!(
                "cluster of {} samples near {:.6},{:.6} lies outside the field boundary",
                points.len(),
                first.latitude,
                first.longitude
            );
        }

        let area_m2 = self.config.projection.area_m2(&region);

        Cluster {
            points,
            region,
            level,
            area_m2,
            kind,
        }
    }
}

fn coord(sample: &Sample) -> Coord<f64> {
    Coord {
        x: sample.longitude,
        y: sample.latitude,
    }
}
