/*!
 * Tunable parameters for clustering and estimation.
 *
 * Configuration objects are built once (from defaults or a JSON file) and then only passed around
 * by reference, so independent scans can be processed in parallel with no shared mutable state.
 */
use crate::{
    agronomy::AgronomyTables,
    error::{ScanError, ScanResult},
    geodesy,
};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

/// Parameters for grouping samples and building the cluster polygons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ClusterFields")]
pub struct ClusterConfig {
    /// Neighborhood radius for the density clustering, in meters along the ground.
    pub epsilon_meters: f64,
    /// Distance the hulls are grown by to absorb GPS and sampling noise, in meters.
    pub buffer_meters: f64,
    /// Alpha parameter of the concave hull, triangles with a circumradius (in degrees) of
    /// `1 / alpha` or more are left out.
    pub alpha: f64,
    /// Minimum number of samples in a neighborhood (including the sample itself) for it to seed a
    /// cluster.
    pub min_samples: usize,
    /// Number of segments used to approximate a quarter circle when buffering.
    pub quad_segments: usize,
    /// Coordinate system used to calculate areas.
    pub projection: geodesy::AreaProjection,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            epsilon_meters: 10.0,
            buffer_meters: 5.0,
            alpha: 0.5,
            min_samples: 2,
            quad_segments: 8,
            projection: geodesy::AreaProjection::WebMercator,
        }
    }
}

impl ClusterConfig {
    /// The clustering radius as an angle on the mean Earth sphere.
    pub fn epsilon_radians(&self) -> f64 {
        geodesy::meters_to_radians(self.epsilon_meters)
    }

    /// The buffer distance in degrees, see [geodesy::METERS_PER_DEGREE].
    pub fn buffer_degrees(&self) -> f64 {
        geodesy::meters_to_degrees(self.buffer_meters)
    }

    /**
     * Check the settings are usable.
     *
     * The clustering radius and alpha may be zero (every sample is noise, the convex hull is used)
     * but not negative. The buffer must be positive or noise clusters would have no area.
     */
    pub fn validate(&self) -> ScanResult<()> {
        if !(self.epsilon_meters >= 0.0 && self.epsilon_meters.is_finite()) {
            return Err(invalid_config("epsilon_meters", self.epsilon_meters));
        }
        if !(self.buffer_meters > 0.0 && self.buffer_meters.is_finite()) {
            return Err(invalid_config("buffer_meters", self.buffer_meters));
        }
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return Err(invalid_config("alpha", self.alpha));
        }
        if self.min_samples == 0 {
            return Err(invalid_config("min_samples", self.min_samples));
        }
        if self.quad_segments == 0 {
            return Err(invalid_config("quad_segments", self.quad_segments));
        }

        Ok(())
    }
}

/// The serialized form of [ClusterConfig], checked on the way in.
#[derive(Deserialize)]
#[serde(default)]
struct ClusterFields {
    epsilon_meters: f64,
    buffer_meters: f64,
    alpha: f64,
    min_samples: usize,
    quad_segments: usize,
    projection: geodesy::AreaProjection,
}

impl Default for ClusterFields {
    fn default() -> Self {
        let ClusterConfig {
            epsilon_meters,
            buffer_meters,
            alpha,
            min_samples,
            quad_segments,
            projection,
        } = ClusterConfig::default();

        ClusterFields {
            epsilon_meters,
            buffer_meters,
            alpha,
            min_samples,
            quad_segments,
            projection,
        }
    }
}

impl TryFrom<ClusterFields> for ClusterConfig {
    type Error = ScanError;

    fn try_from(fields: ClusterFields) -> ScanResult<Self> {
        let ClusterFields {
            epsilon_meters,
            buffer_meters,
            alpha,
            min_samples,
            quad_segments,
            projection,
        } = fields;

        let config = ClusterConfig {
            epsilon_meters,
            buffer_meters,
            alpha,
            min_samples,
            quad_segments,
            projection,
        };
        config.validate()?;

        Ok(config)
    }
}

fn invalid_config<T: std::fmt::Display>(name: &str, value: T) -> ScanError {
    ScanError::InvalidConfig(format!("{} may not be {}", name, value))
}

/// The unit the authoritative field area is recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AreaUnit {
    #[default]
    Hectares,
    SquareMeters,
}

impl AreaUnit {
    /// Convert an area in square meters into this unit.
    pub fn from_square_meters(self, area_m2: f64) -> f64 {
        match self {
            AreaUnit::Hectares => area_m2 / 10_000.0,
            AreaUnit::SquareMeters => area_m2,
        }
    }

    /// Convert an area in this unit into hectares, the unit of the agronomy tables.
    pub fn to_hectares(self, area: f64) -> f64 {
        match self {
            AreaUnit::Hectares => area,
            AreaUnit::SquareMeters => area / 10_000.0,
        }
    }
}

/// The fertilizer used to deliver the nitrogen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FertilizerFields")]
pub struct FertilizerConfig {
    /// Mass fraction of nitrogen in the fertilizer, 0.46 for urea.
    pub nitrogen_content: f64,
    /// Mass of one sack of fertilizer in kilograms.
    pub sack_weight_kg: f64,
}

impl Default for FertilizerConfig {
    fn default() -> Self {
        FertilizerConfig {
            nitrogen_content: 0.46,
            sack_weight_kg: 50.0,
        }
    }
}

impl FertilizerConfig {
    /// The nitrogen fraction must be in (0, 1] and sacks must weigh something.
    pub fn validate(&self) -> ScanResult<()> {
        if !(self.nitrogen_content > 0.0 && self.nitrogen_content <= 1.0) {
            return Err(invalid_config("nitrogen_content", self.nitrogen_content));
        }
        if !(self.sack_weight_kg > 0.0 && self.sack_weight_kg.is_finite()) {
            return Err(invalid_config("sack_weight_kg", self.sack_weight_kg));
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct FertilizerFields {
    nitrogen_content: f64,
    sack_weight_kg: f64,
}

impl Default for FertilizerFields {
    fn default() -> Self {
        let FertilizerConfig {
            nitrogen_content,
            sack_weight_kg,
        } = FertilizerConfig::default();

        FertilizerFields {
            nitrogen_content,
            sack_weight_kg,
        }
    }
}

impl TryFrom<FertilizerFields> for FertilizerConfig {
    type Error = ScanError;

    fn try_from(fields: FertilizerFields) -> ScanResult<Self> {
        let config = FertilizerConfig {
            nitrogen_content: fields.nitrogen_content,
            sack_weight_kg: fields.sack_weight_kg,
        };
        config.validate()?;

        Ok(config)
    }
}

/// Everything needed to process a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub cluster: ClusterConfig,
    pub tables: AgronomyTables,
    pub fertilizer: FertilizerConfig,
    /// The maximum number of images (and so samples) in a single scan.
    pub max_images: usize,
    /// The unit of the field areas supplied with scan requests.
    pub field_area_unit: AreaUnit,
    /// Classifier outputs with a top probability below this are treated as uncertain.
    pub confidence_threshold: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            cluster: ClusterConfig::default(),
            tables: AgronomyTables::default(),
            fertilizer: FertilizerConfig::default(),
            max_images: 10,
            field_area_unit: AreaUnit::Hectares,
            confidence_threshold: 0.7,
        }
    }
}

impl ScanConfig {
    /// Load a configuration from a JSON file, missing sections take their default values.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ScanResult<Self> {
        let f = File::open(path.as_ref())?;
        let config: ScanConfig = serde_json::from_reader(BufReader::new(f))?;
        config.validate()?;
        Ok(config)
    }

    /**
     * Check every section of the configuration.
     *
     * Deserializing already checks the cluster and fertilizer sections, this is for
     * configurations that were built or modified in code, such as command line overrides.
     */
    pub fn validate(&self) -> ScanResult<()> {
        self.cluster.validate()?;
        self.fertilizer.validate()?;

        if self.max_images == 0 {
            return Err(invalid_config("max_images", self.max_images));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(invalid_config(
                "confidence_threshold",
                self.confidence_threshold,
            ));
        }

        Ok(())
    }

    pub fn to_json_pretty(&self) -> ScanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
