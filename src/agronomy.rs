/*!
 * Nitrogen and yield estimation from leaf color levels.
 *
 * All the agronomic reference values live in [AgronomyTables], an immutable object that is built
 * once and lent to an [Estimator].
 */
use serde::{Deserialize, Serialize};

pub use estimator::Estimator;
pub use nitrogen::{FertilizerAmount, NitrogenDose, NutrientEstimate};
pub use tables::{AgronomyTables, NitrogenEntry, StageRange, TableEntries, ThresholdEntry, YieldEntry};

mod estimator;
mod nitrogen;
mod tables;
mod yield_estimate;

/// The cropping season.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum Season {
    Dry,
    Wet,
}

/// How the rice was established in the field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum PlantingType {
    Transplanted,
    #[serde(rename = "Direct Seeded")]
    #[strum(serialize = "Direct Seeded")]
    DirectSeeded,
}

/// Growth stages of the rice plant, in the order they occur.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
pub enum GrowthStage {
    Tillering,
    #[serde(rename = "Panicle Initiation")]
    #[strum(serialize = "Panicle Initiation")]
    PanicleInitiation,
    Flowering,
    #[serde(rename = "Grain Filling")]
    #[strum(serialize = "Grain Filling")]
    GrainFilling,
}
