use super::{Estimator, PlantingType};
use crate::sample::Level;

impl<'a> Estimator<'a> {
    /**
     * Estimate the harvest for a field from the levels of its clusters.
     *
     * The baseline is the yield for the rounded mean of the decidable cluster levels (the
     * threshold level if there are none) over the whole field. Every decidable cluster with a
     * different level then moves the estimate by the difference in baseline yield times its
     * area, a deficient cluster lowers it and a greener one raises it.
     *
     * #Arguments
     * field_area - area of the whole field.
     * cluster_levels - `(area, level)` for every cluster, with the areas in the same unit as
     *     `field_area`.
     * planting_type - selects the baseline yield table.
     *
     * #Returns
     * The yield in tonnes if the areas are in hectares. The result can be negative when the
     * deductions outweigh the baseline, unless the tables clamp it at zero.
     */
    pub fn yield_estimate(
        &self,
        field_area: f64,
        cluster_levels: &[(f64, Level)],
        planting_type: PlantingType,
    ) -> f64 {
        let decidable = cluster_levels.iter().map(|&(_, lvl)| lvl);
        let average_level = match Level::decidable_mean(decidable) {
            Level::UNCERTAIN => self.threshold(planting_type),
            lvl => lvl,
        };

        let max_yield_per_ha = self.tables.yield_baseline(planting_type, average_level);
        let max_yield = max_yield_per_ha * field_area;

        let deduction: f64 = cluster_levels
            .iter()
            .filter(|&&(_, lvl)| lvl.is_decidable() && lvl != average_level)
            .map(|&(area, lvl)| {
                (max_yield_per_ha - self.tables.yield_baseline(planting_type, lvl)) * area
            })
            .sum();

        let estimate = max_yield - deduction;

        if estimate < 0.0 {
            log::warn!(
                "negative yield estimate {:.3} (baseline {:.3}, deduction {:.3})",
                estimate,
                max_yield,
                deduction
            );
            if self.tables.clamp_negative_yield() {
                return 0.0;
            }
        }

        estimate
    }

    /// The yield of a field with no readings yet, as estimated when the field is registered.
    pub fn potential_yield(&self, field_area: f64, planting_type: PlantingType) -> f64 {
        self.yield_estimate(field_area, &[], planting_type)
    }
}
