use super::{Estimator, GrowthStage, PlantingType, Season};
use crate::{
    error::{ScanError, ScanResult},
    sample::Level,
};
use serde::{Deserialize, Serialize};

/// The nitrogen recommendation for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NitrogenDose {
    pub growth_stage: GrowthStage,
    /// Reference value from the nitrogen table in kg/ha.
    pub reference_kg_per_ha: f64,
    /// Recommended nitrogen in kg/ha, half the reference value for a maintenance dose.
    pub kg_per_ha: f64,
    /// Set if most of the decidable readings were at or above the threshold.
    pub maintenance: bool,
    /// Number of uncertain readings.
    pub uncertain: usize,
    /// Number of readings counted as below the threshold.
    pub below_threshold: usize,
}

/// An amount of fertilizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FertilizerAmount {
    /// Mass of fertilizer in kilograms.
    pub kilograms: f64,
    /// The mass as a (fractional) number of sacks.
    pub sacks: f64,
}

/// Nitrogen and fertilizer requirements for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientEstimate {
    /// The level of every reading, in input order.
    pub levels: Vec<Level>,
    /// Nitrogen in kg/ha.
    pub nitrogen_required: f64,
    /// Urea for the whole field in kg.
    pub urea_required: f64,
    pub fertilizer_sacks: f64,
    pub growth_stage: GrowthStage,
    pub maintenance_dose: bool,
}

impl<'a> Estimator<'a> {
    /**
     * Decide how much nitrogen a field needs from its leaf color levels.
     *
     * #Arguments
     * season - the current cropping season.
     * planting_type - how the field was planted, this sets the deficiency threshold.
     * paddy_age - age of the crop in months.
     * levels - one level per reading, 0 for uncertain readings.
     *
     * #Returns
     * [ScanError::InsufficientConfidence] if at least half of the readings are uncertain, this
     * includes an empty list of readings. Otherwise the reference dose for the growth stage and
     * season, halved unless at least half of the decidable readings are below the threshold.
     */
    pub fn nitrogen(
        &self,
        season: Season,
        planting_type: PlantingType,
        paddy_age: u32,
        levels: &[Level],
    ) -> ScanResult<NitrogenDose> {
        let total = levels.len();
        let uncertain = levels.iter().filter(|lvl| !lvl.is_decidable()).count();

        if 2 * uncertain >= total {
            log::info!(
                "refusing nitrogen estimate, {} of {} readings uncertain",
                uncertain,
                total
            );
            return Err(ScanError::InsufficientConfidence { uncertain, total });
        }

        let threshold = self.threshold(planting_type);
        let count_uncertain = self.tables.count_uncertain_as_deficient();
        let below_threshold = levels
            .iter()
            .filter(|&&lvl| lvl < threshold && (count_uncertain || lvl.is_decidable()))
            .count();

        let decidable = total - uncertain;
        let maintenance = 2 * below_threshold < decidable;

        let growth_stage = self.growth_stage(paddy_age);
        let reference_kg_per_ha = self.tables.nitrogen(growth_stage, season);
        let kg_per_ha = if maintenance {
            0.5 * reference_kg_per_ha
        } else {
            reference_kg_per_ha
        };

        log::debug!(
            "{} {} {} months ({}): {} of {} decidable readings below {}, {} kg/ha{}",
            season,
            planting_type,
            paddy_age,
            growth_stage,
            below_threshold,
            decidable,
            threshold,
            kg_per_ha,
            if maintenance { " (maintenance)" } else { "" }
        );

        Ok(NitrogenDose {
            growth_stage,
            reference_kg_per_ha,
            kg_per_ha,
            maintenance,
            uncertain,
            below_threshold,
        })
    }

    /**
     * Convert a nitrogen rate into the mass of fertilizer for a field.
     *
     * #Arguments
     * nitrogen_kg_per_ha - the nitrogen rate.
     * field_area - the field area in hectares, assumed positive.
     */
    pub fn fertilizer(&self, nitrogen_kg_per_ha: f64, field_area: f64) -> FertilizerAmount {
        let kilograms = nitrogen_kg_per_ha * field_area / self.fertilizer.nitrogen_content;
        let sacks = kilograms / self.fertilizer.sack_weight_kg;

        FertilizerAmount { kilograms, sacks }
    }

    /**
     * Nitrogen and urea requirements for a field.
     *
     * #Arguments
     * field_area - the field area in hectares.
     *
     * #Returns
     * [ScanError::InvalidFieldArea] if the area is not a positive number, otherwise as
     * [Estimator::nitrogen].
     */
    pub fn estimate(
        &self,
        season: Season,
        planting_type: PlantingType,
        paddy_age: u32,
        levels: &[Level],
        field_area: f64,
    ) -> ScanResult<NutrientEstimate> {
        // Written this way to also reject NaN.
        if !(field_area > 0.0) {
            return Err(ScanError::InvalidFieldArea(field_area));
        }

        let dose = self.nitrogen(season, planting_type, paddy_age, levels)?;
        let urea = self.fertilizer(dose.kg_per_ha, field_area);

        Ok(NutrientEstimate {
            levels: levels.to_vec(),
            nitrogen_required: dose.kg_per_ha,
            urea_required: urea.kilograms,
            fertilizer_sacks: urea.sacks,
            growth_stage: dose.growth_stage,
            maintenance_dose: dose.maintenance,
        })
    }
}
