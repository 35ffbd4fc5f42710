/*! Density based clustering (DBSCAN) with the haversine metric. */

use crate::{geodesy::haversine_angle, sample::Sample};

/// The outcome of a clustering pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Labels {
    /// The cluster each sample was assigned to, `None` for noise.
    pub labels: Vec<Option<usize>>,
    /// Cluster numbers run from 0 up to, but not including, this value.
    pub num_clusters: usize,
}

/**
 * Group samples with DBSCAN.
 *
 * #Arguments
 * samples - the samples to group.
 * eps_radians - the neighborhood radius as a central angle. Samples are neighbors if the angle
 *     between them is at most this.
 * min_samples - a sample with at least this many neighbors, counting itself, is a core sample.
 *
 * #Returns
 * The label of every sample. Core samples and every sample reachable from them through core
 * samples share a label, border samples go to the first cluster that reaches them.
 */
pub(crate) fn dbscan(samples: &[Sample], eps_radians: f64, min_samples: usize) -> Labels {
    let neighborhoods: Vec<Vec<usize>> = samples
        .iter()
        .map(|a| {
            samples
                .iter()
                .enumerate()
                .filter(|(_, b)| {
                    haversine_angle(a.latitude, a.longitude, b.latitude, b.longitude) <= eps_radians
                })
                .map(|(j, _)| j)
                .collect()
        })
        .collect();

    let is_core: Vec<bool> = neighborhoods
        .iter()
        .map(|nbrs| nbrs.len() >= min_samples)
        .collect();

    let mut labels: Vec<Option<usize>> = vec![None; samples.len()];
    let mut num_clusters = 0;

    for seed in 0..samples.len() {
        if labels[seed].is_some() || !is_core[seed] {
            continue;
        }

        let label = num_clusters;
        num_clusters += 1;

        labels[seed] = Some(label);
        let mut stack = vec![seed];
        while let Some(current) = stack.pop() {
            // Border samples join the cluster but don't extend it.
            if !is_core[current] {
                continue;
            }

            for &nbr in &neighborhoods[current] {
                if labels[nbr].is_none() {
                    labels[nbr] = Some(label);
                    stack.push(nbr);
                }
            }
        }
    }

    log::debug!(
        "dbscan: {} samples, {} clusters, {} noise",
        samples.len(),
        num_clusters,
        labels.iter().filter(|lbl| lbl.is_none()).count()
    );

    Labels {
        labels,
        num_clusters,
    }
}
