/*!
 * A scan is one visit to a field: a set of geotagged leaf readings plus the planting details
 * needed to interpret them.
 *
 * [ScanPipeline] takes a [ScanRequest] through validation, nitrogen estimation, clustering and
 * the yield estimate, and produces a [ScanReport].
 */
use crate::{
    agronomy::{Estimator, GrowthStage, PlantingType, Season},
    boundary::FieldBoundary,
    cluster::{Cluster, Clusterer},
    config::{AreaUnit, ScanConfig},
    error::{ScanError, ScanResult},
    geodesy::valid_lat_lon,
    sample::{LeafReading, Level, Sample},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

/// A leaf reading and where it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub reading: LeafReading,
}

impl ScanPoint {
    /**
     * Pair up coordinates with the readings of the images taken at them.
     *
     * #Arguments
     * coordinates - `[latitude, longitude]` of each image.
     * readings - the classifier output for each image, in the same order.
     */
    pub fn zip(coordinates: &[[f64; 2]], readings: &[LeafReading]) -> ScanResult<Vec<ScanPoint>> {
        if coordinates.len() != readings.len() {
            return Err(ScanError::CountMismatch {
                readings: readings.len(),
                points: coordinates.len(),
            });
        }

        Ok(coordinates
            .iter()
            .zip(readings)
            .map(|(&[latitude, longitude], &reading)| ScanPoint {
                latitude,
                longitude,
                reading,
            })
            .collect())
    }
}

/// Everything submitted for a scan of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub field_id: Option<String>,
    /// When the scan was taken, the time of processing if not supplied.
    #[serde(default)]
    pub scanned_at: Option<DateTime<Utc>>,
    pub season: Season,
    pub planting_type: PlantingType,
    /// Age of the crop in months.
    pub paddy_age: u32,
    /// The recorded area of the field, in the configured field area unit.
    pub field_area: f64,
    /// The field boundary as `[latitude, longitude]` vertices.
    pub boundary: Vec<[f64; 2]>,
    #[serde(default)]
    pub points: Vec<ScanPoint>,
}

impl ScanRequest {
    /// Create a request with no readings yet.
    pub fn new(
        season: Season,
        planting_type: PlantingType,
        paddy_age: u32,
        field_area: f64,
        boundary: Vec<[f64; 2]>,
    ) -> Self {
        ScanRequest {
            field_id: None,
            scanned_at: None,
            season,
            planting_type,
            paddy_age,
            field_area,
            boundary,
            points: vec![],
        }
    }

    pub fn with_field_id<S: Into<String>>(mut self, field_id: S) -> Self {
        self.field_id = Some(field_id.into());
        self
    }

    pub fn with_scan_time(mut self, scanned_at: DateTime<Utc>) -> Self {
        self.scanned_at = Some(scanned_at);
        self
    }

    /// Set the readings from separately supplied coordinates and classifier output.
    pub fn with_readings(
        mut self,
        coordinates: &[[f64; 2]],
        readings: &[LeafReading],
    ) -> ScanResult<Self> {
        self.points = ScanPoint::zip(coordinates, readings)?;
        Ok(self)
    }

    /// Load a request from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ScanResult<Self> {
        let f = File::open(path.as_ref())?;
        let request = serde_json::from_reader(BufReader::new(f))?;
        Ok(request)
    }

    /**
     * Check the request before doing any work on it.
     *
     * The checks run in order: the number of images, every sample coordinate, then the field
     * area. The boundary is checked when it is built.
     */
    pub fn validate(&self, max_images: usize) -> ScanResult<()> {
        if self.points.len() > max_images {
            return Err(ScanError::TooManyImages {
                count: self.points.len(),
                max: max_images,
            });
        }

        if let Some(pnt) = self
            .points
            .iter()
            .find(|pnt| !valid_lat_lon(pnt.latitude, pnt.longitude))
        {
            return Err(ScanError::InvalidCoordinate {
                latitude: pnt.latitude,
                longitude: pnt.longitude,
            });
        }

        if !(self.field_area > 0.0) {
            return Err(ScanError::InvalidFieldArea(self.field_area));
        }

        Ok(())
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.points
            .iter()
            .map(|pnt| Sample::from_reading(pnt.latitude, pnt.longitude, pnt.reading))
            .collect()
    }
}

/// The part of a report describing one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    /// Member locations as `[latitude, longitude]`.
    pub points: Vec<[f64; 2]>,
    /// Outline as `[latitude, longitude]`, empty if the cluster fell outside the field.
    pub polygon: Vec<[f64; 2]>,
    pub level: Level,
    pub area_m2: f64,
    pub noise: bool,
}

impl From<&Cluster> for ClusterReport {
    fn from(cluster: &Cluster) -> Self {
        ClusterReport {
            points: cluster.point_coords(),
            polygon: cluster.polygon(),
            level: cluster.level,
            area_m2: cluster.area_m2,
            noise: cluster.is_noise(),
        }
    }
}

/// The result of processing a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default)]
    pub field_id: Option<String>,
    pub scanned_at: DateTime<Utc>,
    pub season: Season,
    pub planting_type: PlantingType,
    pub paddy_age: u32,
    pub growth_stage: GrowthStage,
    /// The field area as recorded, in the configured field area unit.
    pub field_area: f64,
    pub levels: Vec<Level>,
    /// Nitrogen in kg/ha.
    pub nitrogen_required: f64,
    pub maintenance_dose: bool,
    /// Urea for the whole field in kg.
    pub urea_required: f64,
    pub fertilizer_sacks: f64,
    /// Estimated harvest in tonnes.
    #[serde(rename = "yield")]
    pub yield_estimate: f64,
    pub clusters: Vec<ClusterReport>,
}

impl ScanReport {
    /// The mean of the decidable levels, or 0 if there are none.
    pub fn mean_level(&self) -> f64 {
        let (sum, count) = self
            .levels
            .iter()
            .filter(|lvl| lvl.is_decidable())
            .fold((0.0, 0usize), |(sum, count), lvl| {
                (sum + f64::from(lvl.value()), count + 1)
            });

        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

/// Runs scans with a fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct ScanPipeline<'a> {
    config: &'a ScanConfig,
    clusterer: Clusterer,
    estimator: Estimator<'a>,
}

impl<'a> ScanPipeline<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        ScanPipeline {
            config,
            clusterer: Clusterer::new(config.cluster),
            estimator: Estimator::from_config(config),
        }
    }

    pub fn config(&self) -> &'a ScanConfig {
        self.config
    }

    /**
     * Process a scan.
     *
     * The nitrogen estimate runs before the clustering, so a scan with too many uncertain
     * readings is rejected without any geometry work.
     */
    pub fn run(&self, request: &ScanRequest) -> ScanResult<ScanReport> {
        self.config.validate()?;
        request.validate(self.config.max_images)?;

        let samples = request.samples();
        let levels: Vec<Level> = samples.iter().map(|s| s.level).collect();
        let field_area_ha = self.config.field_area_unit.to_hectares(request.field_area);

        let nutrients = self.estimator.estimate(
            request.season,
            request.planting_type,
            request.paddy_age,
            &levels,
            field_area_ha,
        )?;

        let boundary = FieldBoundary::from_lat_lon(&request.boundary)?;
        let clusters = self.clusterer.cluster(&samples, &boundary);

        let yield_estimate = self.estimator.yield_estimate(
            field_area_ha,
            &clusters.area_levels(AreaUnit::Hectares),
            request.planting_type,
        );

        log::info!(
            "scan of {}: {} samples, {} clusters ({} noise), {:.1} kg urea, {:.2} t yield",
            request.field_id.as_deref().unwrap_or("unnamed field"),
            samples.len(),
            clusters.len(),
            clusters.num_noise(),
            nutrients.urea_required,
            yield_estimate
        );

        Ok(ScanReport {
            field_id: request.field_id.clone(),
            scanned_at: request.scanned_at.unwrap_or_else(Utc::now),
            season: request.season,
            planting_type: request.planting_type,
            paddy_age: request.paddy_age,
            growth_stage: nutrients.growth_stage,
            field_area: request.field_area,
            levels: nutrients.levels,
            nitrogen_required: nutrients.nitrogen_required,
            maintenance_dose: nutrients.maintenance_dose,
            urea_required: nutrients.urea_required,
            fertilizer_sacks: nutrients.fertilizer_sacks,
            yield_estimate,
            clusters: clusters.iter().map(ClusterReport::from).collect(),
        })
    }
}
