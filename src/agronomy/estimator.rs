use super::{AgronomyTables, GrowthStage, PlantingType};
use crate::{
    config::{FertilizerConfig, ScanConfig},
    sample::Level,
};

/**
 * Turns leaf color levels and planting details into nitrogen, fertilizer and yield figures.
 *
 * An estimator only borrows its tables, it is cheap to create one per scan.
 */
#[derive(Debug, Clone, Copy)]
pub struct Estimator<'a> {
    pub(super) tables: &'a AgronomyTables,
    pub(super) fertilizer: FertilizerConfig,
}

impl<'a> Estimator<'a> {
    /// Create an estimator that converts nitrogen into urea in standard 50 kg sacks.
    pub fn new(tables: &'a AgronomyTables) -> Self {
        Self::with_fertilizer(tables, FertilizerConfig::default())
    }

    pub fn with_fertilizer(tables: &'a AgronomyTables, fertilizer: FertilizerConfig) -> Self {
        Estimator { tables, fertilizer }
    }

    pub fn from_config(config: &'a ScanConfig) -> Self {
        Self::with_fertilizer(&config.tables, config.fertilizer)
    }

    pub fn tables(&self) -> &'a AgronomyTables {
        self.tables
    }

    /// The growth stage for a paddy age in months, ages past the table saturate to the last stage.
    pub fn growth_stage(&self, paddy_age: u32) -> GrowthStage {
        self.tables.growth_stage(paddy_age)
    }

    /// The level below which a reading is considered nitrogen deficient.
    pub fn threshold(&self, planting_type: PlantingType) -> Level {
        self.tables.threshold(planting_type)
    }
}
