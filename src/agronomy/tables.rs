use super::{GrowthStage, PlantingType, Season};
use crate::{
    error::ScanError,
    sample::{LeafReading, Level},
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// Paddy ages from `min_age` (inclusive) up to `max_age` (exclusive), in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRange {
    pub min_age: u32,
    pub max_age: u32,
    pub stage: GrowthStage,
}

/// Reference nitrogen application for a growth stage and season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NitrogenEntry {
    pub stage: GrowthStage,
    pub season: Season,
    pub kg_per_ha: f64,
}

/// The leaf color level below which nitrogen deficiency is presumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub planting_type: PlantingType,
    pub level: Level,
}

/// Expected yield for a planting type when the field shows a given level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldEntry {
    pub planting_type: PlantingType,
    pub level: Level,
    pub tonnes_per_ha: f64,
}

/**
 * The plain document form of [AgronomyTables], as it appears in a configuration file.
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntries {
    pub growth_stages: Vec<StageRange>,
    pub nitrogen: Vec<NitrogenEntry>,
    pub thresholds: Vec<ThresholdEntry>,
    pub yield_baseline: Vec<YieldEntry>,
    #[serde(default)]
    pub out_of_table_default: f64,
    /// See [AgronomyTables::with_count_uncertain_as_deficient], `true` counts level 0 as
    /// deficient like a plain `level < threshold` count.
    #[serde(default)]
    pub count_uncertain_as_deficient: bool,
    #[serde(default)]
    pub clamp_negative_yield: bool,
}

/**
 * The agronomic reference values used by the estimator.
 *
 * The tables are validated when they are built and never change after that, so a single instance
 * can be shared by reference between any number of concurrent scans.
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TableEntries", into = "TableEntries")]
pub struct AgronomyTables {
    /// Sorted by age, contiguous and starting at 0.
    stages: Vec<StageRange>,
    nitrogen: FxHashMap<(GrowthStage, Season), f64>,
    thresholds: FxHashMap<PlantingType, Level>,
    yield_baseline: FxHashMap<(PlantingType, Level), f64>,
    out_of_table_default: f64,
    count_uncertain_as_deficient: bool,
    clamp_negative_yield: bool,
}

impl AgronomyTables {
    /**
     * Build the tables from their entries.
     *
     * #Returns
     * [ScanError::InvalidTables] if the growth stage ranges are empty, do not start at age 0, or
     * have gaps or overlaps, if a planting type has no threshold, or if an entry appears twice.
     */
    pub fn from_entries(mut entries: TableEntries) -> Result<Self, ScanError> {
        entries.growth_stages.sort_by_key(|rng| rng.min_age);
        validate_stages(&entries.growth_stages)?;

        if let Some(missing) = PlantingType::iter()
            .find(|pt| !entries.thresholds.iter().any(|e| e.planting_type == *pt))
        {
            return Err(ScanError::InvalidTables(format!(
                "no threshold for {}",
                missing
            )));
        }

        let num_entries =
            entries.nitrogen.len() + entries.thresholds.len() + entries.yield_baseline.len();
        let tables = Self::build(entries);
        let num_keys = tables.nitrogen.len() + tables.thresholds.len() + tables.yield_baseline.len();

        let duplicates = num_entries - num_keys;
        if duplicates > 0 {
            return Err(ScanError::InvalidTables(format!(
                "{} duplicate table entries",
                duplicates
            )));
        }

        Ok(tables)
    }

    fn build(entries: TableEntries) -> Self {
        let nitrogen = entries
            .nitrogen
            .into_iter()
            .map(|e| ((e.stage, e.season), e.kg_per_ha))
            .collect();

        let thresholds = entries
            .thresholds
            .into_iter()
            .map(|e| (e.planting_type, e.level))
            .collect();

        let yield_baseline = entries
            .yield_baseline
            .into_iter()
            .map(|e| ((e.planting_type, e.level), e.tonnes_per_ha))
            .collect();

        AgronomyTables {
            stages: entries.growth_stages,
            nitrogen,
            thresholds,
            yield_baseline,
            out_of_table_default: entries.out_of_table_default,
            count_uncertain_as_deficient: entries.count_uncertain_as_deficient,
            clamp_negative_yield: entries.clamp_negative_yield,
        }
    }

    /// The value used in place of a missing nitrogen or yield table entry.
    pub fn with_out_of_table_default(mut self, value: f64) -> Self {
        self.out_of_table_default = value;
        self
    }

    /**
     * Count uncertain readings as below the threshold in the maintenance dose decision.
     *
     * With `true` the decision is a plain count of every level under the threshold, so the
     * uncertain level 0 counts as deficient. The readings `[4, 4, 4, 1, 1, 0]` against a
     * threshold of 4 then have 3 below out of 5 decidable and get the full dose. With the default
     * `false` only decidable readings are counted, 2 of 5 are below and the same readings get the
     * halved maintenance dose. Either way the majority is taken over the decidable readings.
     */
    pub fn with_count_uncertain_as_deficient(mut self, value: bool) -> Self {
        self.count_uncertain_as_deficient = value;
        self
    }

    /// Report negative yield estimates as zero.
    pub fn with_clamp_negative_yield(mut self, value: bool) -> Self {
        self.clamp_negative_yield = value;
        self
    }

    pub fn out_of_table_default(&self) -> f64 {
        self.out_of_table_default
    }

    pub fn count_uncertain_as_deficient(&self) -> bool {
        self.count_uncertain_as_deficient
    }

    pub fn clamp_negative_yield(&self) -> bool {
        self.clamp_negative_yield
    }

    /**
     * Look up the growth stage for a paddy age in months.
     *
     * Ages at or beyond the end of the last range belong to the last stage.
     */
    pub fn growth_stage(&self, paddy_age: u32) -> GrowthStage {
        // The ranges are sorted and contiguous, so the last one starting at or before the age
        // either contains it or is the last range and the age is past its end.
        self.stages
            .iter()
            .rev()
            .find(|rng| rng.min_age <= paddy_age)
            .map(|rng| rng.stage)
            .unwrap_or(GrowthStage::GrainFilling)
    }

    /// The deficiency threshold level for a planting type.
    pub fn threshold(&self, planting_type: PlantingType) -> Level {
        // Validation guarantees every planting type has an entry.
        self.thresholds
            .get(&planting_type)
            .copied()
            .unwrap_or(Level::UNCERTAIN)
    }

    /// Reference nitrogen in kg/ha, or the out of table default.
    pub fn nitrogen(&self, stage: GrowthStage, season: Season) -> f64 {
        match self.nitrogen.get(&(stage, season)) {
            Some(&kg_per_ha) => kg_per_ha,
            None => {
                log::warn!(
                    "no nitrogen entry for {} / {}, using {}",
                    stage,
                    season,
                    self.out_of_table_default
                );
                self.out_of_table_default
            }
        }
    }

    /// Baseline yield in tonnes/ha, or the out of table default.
    pub fn yield_baseline(&self, planting_type: PlantingType, level: Level) -> f64 {
        match self.yield_baseline.get(&(planting_type, level)) {
            Some(&tonnes_per_ha) => tonnes_per_ha,
            None => {
                log::warn!(
                    "no yield baseline for {} at level {}, using {}",
                    planting_type,
                    level,
                    self.out_of_table_default
                );
                self.out_of_table_default
            }
        }
    }
}

fn validate_stages(stages: &[StageRange]) -> Result<(), ScanError> {
    let first = stages
        .first()
        .ok_or_else(|| ScanError::InvalidTables("no growth stages".to_owned()))?;

    if first.min_age != 0 {
        return Err(ScanError::InvalidTables(format!(
            "growth stages start at age {} instead of 0",
            first.min_age
        )));
    }

    if let Some(rng) = stages.iter().find(|rng| rng.min_age >= rng.max_age) {
        return Err(ScanError::InvalidTables(format!(
            "empty age range {}..{} for {}",
            rng.min_age, rng.max_age, rng.stage
        )));
    }

    if let Some(pair) = stages.windows(2).find(|w| w[0].max_age != w[1].min_age) {
        return Err(ScanError::InvalidTables(format!(
            "age ranges for {} and {} are not contiguous",
            pair[0].stage, pair[1].stage
        )));
    }

    Ok(())
}

impl TryFrom<TableEntries> for AgronomyTables {
    type Error = ScanError;

    fn try_from(entries: TableEntries) -> Result<Self, Self::Error> {
        AgronomyTables::from_entries(entries)
    }
}

impl From<AgronomyTables> for TableEntries {
    fn from(tables: AgronomyTables) -> Self {
        let mut nitrogen: Vec<NitrogenEntry> = tables
            .nitrogen
            .iter()
            .map(|(&(stage, season), &kg_per_ha)| NitrogenEntry {
                stage,
                season,
                kg_per_ha,
            })
            .collect();
        nitrogen.sort_by_key(|e| (e.stage, e.season));

        let mut thresholds: Vec<ThresholdEntry> = tables
            .thresholds
            .iter()
            .map(|(&planting_type, &level)| ThresholdEntry {
                planting_type,
                level,
            })
            .collect();
        thresholds.sort_by_key(|e| e.planting_type);

        let mut yield_baseline: Vec<YieldEntry> = tables
            .yield_baseline
            .iter()
            .map(|(&(planting_type, level), &tonnes_per_ha)| YieldEntry {
                planting_type,
                level,
                tonnes_per_ha,
            })
            .collect();
        yield_baseline.sort_by_key(|e| (e.planting_type, e.level));

        TableEntries {
            growth_stages: tables.stages,
            nitrogen,
            thresholds,
            yield_baseline,
            out_of_table_default: tables.out_of_table_default,
            count_uncertain_as_deficient: tables.count_uncertain_as_deficient,
            clamp_negative_yield: tables.clamp_negative_yield,
        }
    }
}

impl Default for TableEntries {
    fn default() -> Self {
        use GrowthStage::*;
        use PlantingType::*;
        use Season::*;

        let growth_stages = [Tillering, PanicleInitiation, Flowering, GrainFilling]
            .into_iter()
            .zip(0u32..)
            .map(|(stage, i)| StageRange {
                min_age: 4 * i,
                max_age: 4 * (i + 1),
                stage,
            })
            .collect();

        let nitrogen = [
            (Tillering, 25.0, 18.0),
            (PanicleInitiation, 30.0, 23.0),
            (Flowering, 20.0, 13.0),
            (GrainFilling, 15.0, 8.0),
        ]
        .into_iter()
        .flat_map(|(stage, dry, wet)| {
            [
                NitrogenEntry {
                    stage,
                    season: Dry,
                    kg_per_ha: dry,
                },
                NitrogenEntry {
                    stage,
                    season: Wet,
                    kg_per_ha: wet,
                },
            ]
        })
        .collect();

        let thresholds = vec![
            ThresholdEntry {
                planting_type: Transplanted,
                level: Level::from(LeafReading::Swap4),
            },
            ThresholdEntry {
                planting_type: DirectSeeded,
                level: Level::from(LeafReading::Swap3),
            },
        ];

        let yield_baseline = [
            (Transplanted, [3.0, 4.0, 5.0, 6.0]),
            (DirectSeeded, [4.0, 5.0, 6.0, 6.0]),
        ]
        .into_iter()
        .flat_map(|(planting_type, by_level)| {
            LeafReading::CLASSES
                .into_iter()
                .zip(by_level)
                .map(move |(reading, tonnes_per_ha)| YieldEntry {
                    planting_type,
                    level: reading.level(),
                    tonnes_per_ha,
                })
        })
        .collect();

        TableEntries {
            growth_stages,
            nitrogen,
            thresholds,
            yield_baseline,
            out_of_table_default: 0.0,
            count_uncertain_as_deficient: false,
            clamp_negative_yield: false,
        }
    }
}

impl Default for AgronomyTables {
    fn default() -> Self {
        AgronomyTables::build(TableEntries::default())
    }
}
