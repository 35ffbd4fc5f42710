pub use agronomy::{
    AgronomyTables, Estimator, FertilizerAmount, GrowthStage, NitrogenDose, NitrogenEntry,
    NutrientEstimate, PlantingType, Season, StageRange, TableEntries, ThresholdEntry, YieldEntry,
};
pub use boundary::FieldBoundary;
pub use classify::{classify_all, LeafClassifier, ProbabilityModel, ThresholdClassifier};
pub use cluster::{Cluster, ClusterKind, ClusterList, Clusterer};
pub use config::{AreaUnit, ClusterConfig, FertilizerConfig, ScanConfig};
pub use error::{ScanError, ScanResult};
pub use geodesy::{
    great_circle_distance, haversine_angle, meters_to_degrees, meters_to_radians, valid_lat_lon,
    AreaProjection, EARTH_MEAN_RADIUS_M, METERS_PER_DEGREE,
};
pub use sample::{LeafReading, Level, Sample};
pub use scan::{ClusterReport, ScanPipeline, ScanPoint, ScanReport, ScanRequest};
pub use summary::{FieldSummary, ScanStatistic};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod agronomy;
mod boundary;
mod classify;
mod cluster;
mod config;
mod error;
mod geodesy;
mod sample;
mod scan;
mod summary;
