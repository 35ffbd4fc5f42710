use crate::{config::AreaUnit, sample::Level, Cluster};

/**
 * The clusters found in a single scan.
 */
#[derive(Debug, Clone, Default)]
pub struct ClusterList {
    /// List of Cluster objects.
    pub clusters: Vec<Cluster>,
    /// The number of samples that went into the clustering.
    pub num_samples: usize,
}

impl ClusterList {
    pub(crate) fn new(clusters: Vec<Cluster>, num_samples: usize) -> Self {
        ClusterList {
            clusters,
            num_samples,
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cluster> {
        self.clusters.iter()
    }

    /// The number of single sample clusters made from noise samples.
    pub fn num_noise(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_noise()).count()
    }

    /// Sum of the cluster areas in square meters.
    pub fn total_area_m2(&self) -> f64 {
        self.clusters.iter().map(|c| c.area_m2).sum()
    }

    /**
     * The `(area, level)` pair of every cluster, as used by the yield estimate.
     *
     * #Arguments
     * unit - the unit to express the areas in, this should match the unit of the field area.
     */
    pub fn area_levels(&self, unit: AreaUnit) -> Vec<(f64, Level)> {
        self.clusters
            .iter()
            .map(|c| (unit.from_square_meters(c.area_m2), c.level))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ClusterList {
    type Item = &'a Cluster;
    type IntoIter = std::slice::Iter<'a, Cluster>;

    fn into_iter(self) -> Self::IntoIter {
        self.clusters.iter()
    }
}
