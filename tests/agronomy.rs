use approx::assert_relative_eq;
use lccscan::{
    AgronomyTables, Estimator, FertilizerConfig, GrowthStage, Level, PlantingType, ScanError,
    Season, StageRange, TableEntries, ThresholdEntry,
};

fn lvl(value: u8) -> Level {
    Level::new(value).unwrap()
}

fn levels(values: &[u8]) -> Vec<Level> {
    values.iter().map(|&v| lvl(v)).collect()
}

#[test]
fn test_growth_stage_saturates() {
    use GrowthStage::*;

    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    let expected = [
        (0, Tillering),
        (3, Tillering),
        (4, PanicleInitiation),
        (7, PanicleInitiation),
        (8, Flowering),
        (11, Flowering),
        (12, GrainFilling),
        (15, GrainFilling),
        (16, GrainFilling),
        (100, GrainFilling),
        (u32::MAX, GrainFilling),
    ];

    for (age, stage) in expected {
        assert_eq!(est.growth_stage(age), stage, "age {}", age);
    }
}

#[test]
fn test_thresholds() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    assert_eq!(est.threshold(PlantingType::Transplanted), lvl(4));
    assert_eq!(est.threshold(PlantingType::DirectSeeded), lvl(3));
}

#[test]
fn test_insufficient_confidence_boundary() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    let res = est.nitrogen(
        Season::Dry,
        PlantingType::Transplanted,
        2,
        &levels(&[4, 4, 0, 0]),
    );
    assert!(matches!(
        res,
        Err(ScanError::InsufficientConfidence {
            uncertain: 2,
            total: 4
        })
    ));

    let res = est.nitrogen(
        Season::Dry,
        PlantingType::Transplanted,
        2,
        &levels(&[4, 4, 4, 0, 0]),
    );
    assert!(res.is_ok());
}

#[test]
fn test_no_readings_is_insufficient() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    let res = est.nitrogen(Season::Wet, PlantingType::DirectSeeded, 2, &[]);
    assert!(matches!(
        res,
        Err(ScanError::InsufficientConfidence { .. })
    ));
}

#[test]
fn test_maintenance_dose_is_half() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    // One of three below the threshold of 4.
    let dose = est
        .nitrogen(Season::Dry, PlantingType::Transplanted, 0, &levels(&[4, 4, 1]))
        .unwrap();
    assert!(dose.maintenance);
    assert_eq!(dose.below_threshold, 1);
    assert_eq!(dose.growth_stage, GrowthStage::Tillering);
    assert_relative_eq!(dose.reference_kg_per_ha, 25.0);
    assert_relative_eq!(dose.kg_per_ha, 12.5);

    // Two of three below, the full dose.
    let dose = est
        .nitrogen(Season::Dry, PlantingType::Transplanted, 0, &levels(&[4, 1, 1]))
        .unwrap();
    assert!(!dose.maintenance);
    assert_relative_eq!(dose.kg_per_ha, 25.0);

    // Exactly half below is not a majority of good readings.
    let dose = est
        .nitrogen(Season::Wet, PlantingType::DirectSeeded, 9, &levels(&[3, 2]))
        .unwrap();
    assert!(!dose.maintenance);
    assert_eq!(dose.growth_stage, GrowthStage::Flowering);
    assert_relative_eq!(dose.kg_per_ha, 13.0);
}

#[test]
fn test_uncertain_readings_in_the_dose_decision() {
    let readings = levels(&[4, 4, 4, 1, 1, 0]);

    let tables = AgronomyTables::default();
    let dose = Estimator::new(&tables)
        .nitrogen(Season::Dry, PlantingType::Transplanted, 5, &readings)
        .unwrap();
    assert_eq!(dose.uncertain, 1);
    assert_eq!(dose.below_threshold, 2);
    assert!(dose.maintenance);
    assert_relative_eq!(dose.kg_per_ha, 15.0);

    let tables = AgronomyTables::default().with_count_uncertain_as_deficient(true);
    let dose = Estimator::new(&tables)
        .nitrogen(Season::Dry, PlantingType::Transplanted, 5, &readings)
        .unwrap();
    assert_eq!(dose.below_threshold, 3);
    assert!(!dose.maintenance);
    assert_relative_eq!(dose.kg_per_ha, 30.0);
}

#[test]
fn test_fertilizer() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    let urea = est.fertilizer(20.0, 2.0);
    assert_relative_eq!(urea.kilograms, 40.0 / 0.46);
    assert_relative_eq!(urea.sacks, 40.0 / 0.46 / 50.0);

    let est = Estimator::with_fertilizer(
        &tables,
        FertilizerConfig {
            nitrogen_content: 0.2,
            sack_weight_kg: 25.0,
        },
    );
    let amm = est.fertilizer(20.0, 2.0);
    assert_relative_eq!(amm.kilograms, 200.0);
    assert_relative_eq!(amm.sacks, 8.0);
}

#[test]
fn test_estimate() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    let readings = levels(&[3, 2, 2, 0]);
    let estimate = est
        .estimate(Season::Wet, PlantingType::DirectSeeded, 13, &readings, 1.5)
        .unwrap();

    assert_eq!(estimate.levels, readings);
    assert_eq!(estimate.growth_stage, GrowthStage::GrainFilling);
    assert!(!estimate.maintenance_dose);
    assert_relative_eq!(estimate.nitrogen_required, 8.0);
    assert_relative_eq!(estimate.urea_required, 8.0 * 1.5 / 0.46);
    assert_relative_eq!(estimate.fertilizer_sacks, 8.0 * 1.5 / 0.46 / 50.0);
}

#[test]
fn test_estimate_rejects_bad_area() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);
    let readings = levels(&[3, 3]);

    for area in [0.0, -1.0, f64::NAN] {
        let res = est.estimate(Season::Dry, PlantingType::Transplanted, 1, &readings, area);
        assert!(matches!(res, Err(ScanError::InvalidFieldArea(_))));
    }
}

#[test]
fn test_yield_without_deductions() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    let single = [(0.4, lvl(4))];
    assert_relative_eq!(
        est.yield_estimate(1.0, &single, PlantingType::Transplanted),
        6.0
    );

    // No decidable clusters, the threshold level sets the baseline.
    let uncertain = [(0.4, Level::UNCERTAIN)];
    assert_relative_eq!(
        est.yield_estimate(2.0, &uncertain, PlantingType::DirectSeeded),
        12.0
    );
}

#[test]
fn test_deficient_cluster_lowers_yield() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    let uniform = [(0.4, lvl(4)), (0.3, lvl(4))];
    let base = est.yield_estimate(1.0, &uniform, PlantingType::Transplanted);

    // The mean of 4, 4 and 3 still rounds to 4.
    let patchy = [(0.4, lvl(4)), (0.3, lvl(4)), (0.2, lvl(3))];
    let lowered = est.yield_estimate(1.0, &patchy, PlantingType::Transplanted);

    assert!(lowered < base);
    assert_relative_eq!(lowered, 6.0 - (6.0 - 5.0) * 0.2);
}

#[test]
fn test_negative_yield() {
    let clusters = [(1.0, lvl(4)), (1.0, lvl(4)), (5.0, lvl(1))];

    // Average level 3: 5 t/ha, the fours add 1 t each, the ones remove 2 t/ha over 5 ha.
    let tables = AgronomyTables::default();
    let raw = Estimator::new(&tables).yield_estimate(1.0, &clusters, PlantingType::Transplanted);
    assert_relative_eq!(raw, -3.0);

    let tables = AgronomyTables::default().with_clamp_negative_yield(true);
    let clamped =
        Estimator::new(&tables).yield_estimate(1.0, &clusters, PlantingType::Transplanted);
    assert_relative_eq!(clamped, 0.0);
}

#[test]
fn test_potential_yield() {
    let tables = AgronomyTables::default();
    let est = Estimator::new(&tables);

    assert_relative_eq!(est.potential_yield(2.0, PlantingType::DirectSeeded), 12.0);
    assert_relative_eq!(est.potential_yield(0.5, PlantingType::Transplanted), 3.0);
}

#[test]
fn test_out_of_table_default() {
    let mut entries = TableEntries::default();
    entries
        .nitrogen
        .retain(|e| !(e.stage == GrowthStage::Flowering && e.season == Season::Wet));

    let tables = AgronomyTables::from_entries(entries)
        .unwrap()
        .with_out_of_table_default(7.0);
    let dose = Estimator::new(&tables)
        .nitrogen(Season::Wet, PlantingType::Transplanted, 9, &levels(&[1, 1]))
        .unwrap();

    assert_relative_eq!(dose.kg_per_ha, 7.0);
}

#[test]
fn test_invalid_tables() {
    let mut gap = TableEntries::default();
    gap.growth_stages[1] = StageRange {
        min_age: 5,
        max_age: 8,
        stage: GrowthStage::PanicleInitiation,
    };
    assert!(matches!(
        AgronomyTables::from_entries(gap),
        Err(ScanError::InvalidTables(_))
    ));

    let mut late_start = TableEntries::default();
    late_start.growth_stages.remove(0);
    assert!(matches!(
        AgronomyTables::from_entries(late_start),
        Err(ScanError::InvalidTables(_))
    ));

    let mut missing_threshold = TableEntries::default();
    missing_threshold
        .thresholds
        .retain(|e| e.planting_type != PlantingType::DirectSeeded);
    assert!(matches!(
        AgronomyTables::from_entries(missing_threshold),
        Err(ScanError::InvalidTables(_))
    ));

    let mut duplicate = TableEntries::default();
    duplicate.thresholds.push(ThresholdEntry {
        planting_type: PlantingType::Transplanted,
        level: lvl(3),
    });
    assert!(matches!(
        AgronomyTables::from_entries(duplicate),
        Err(ScanError::InvalidTables(_))
    ));
}

#[test]
fn test_tables_from_json() {
    let json = r#"{
        "growth_stages": [
            {"min_age": 0, "max_age": 2, "stage": "Tillering"},
            {"min_age": 2, "max_age": 5, "stage": "Flowering"}
        ],
        "nitrogen": [
            {"stage": "Tillering", "season": "Dry", "kg_per_ha": 40.0},
            {"stage": "Flowering", "season": "Dry", "kg_per_ha": 10.0}
        ],
        "thresholds": [
            {"planting_type": "Transplanted", "level": 4},
            {"planting_type": "Direct Seeded", "level": 2}
        ],
        "yield_baseline": [
            {"planting_type": "Direct Seeded", "level": 2, "tonnes_per_ha": 3.5}
        ]
    }"#;

    let tables: AgronomyTables = serde_json::from_str(json).unwrap();
    let est = Estimator::new(&tables);

    assert_eq!(est.growth_stage(1), GrowthStage::Tillering);
    assert_eq!(est.growth_stage(9), GrowthStage::Flowering);
    assert_eq!(est.threshold(PlantingType::DirectSeeded), lvl(2));
    assert_relative_eq!(est.potential_yield(2.0, PlantingType::DirectSeeded), 7.0);
    // Not in the table.
    assert_relative_eq!(est.potential_yield(2.0, PlantingType::Transplanted), 0.0);

    let bad = json.replace("\"min_age\": 2", "\"min_age\": 3");
    assert!(serde_json::from_str::<AgronomyTables>(&bad).is_err());
}
