use approx::{assert_abs_diff_eq, assert_relative_eq};
use geo::{Area, BooleanOps, MultiPolygon};
use lccscan::{
    AreaProjection, ClusterConfig, Clusterer, FieldBoundary, LeafReading, Level, Sample, ScanError,
};

// A field of roughly one hectare on Java, as [latitude, longitude].
const FIELD: [[f64; 2]; 4] = [
    [-6.2, 106.8],
    [-6.2, 106.8009],
    [-6.1991, 106.8009],
    [-6.1991, 106.8],
];

fn field() -> FieldBoundary {
    FieldBoundary::from_lat_lon(&FIELD).unwrap()
}

fn lvl(value: u8) -> Level {
    Level::new(value).unwrap()
}

fn clusterer() -> Clusterer {
    Clusterer::new(ClusterConfig::default())
}

/// Three fours in one corner, two ones across the field, and an uncertain reading on its own.
fn scan_samples() -> Vec<Sample> {
    vec![
        Sample::new(-6.1997, 106.8002, lvl(4)),
        Sample::new(-6.19972, 106.8002, lvl(4)),
        Sample::new(-6.1997, 106.80022, lvl(4)),
        Sample::new(-6.1994, 106.8006, lvl(1)),
        Sample::new(-6.19943, 106.8006, lvl(1)),
        Sample::from_reading(-6.1993, 106.8001, LeafReading::Uncertain),
    ]
}

#[test]
fn test_empty_input_gives_no_clusters() {
    let clusters = clusterer().cluster(&[], &field());
    assert!(clusters.is_empty());
    assert_eq!(clusters.num_samples, 0);
}

#[test]
fn test_close_samples_form_one_cluster() {
    let samples = vec![
        Sample::new(-6.1995, 106.8004, lvl(3)),
        Sample::new(-6.19952, 106.8004, lvl(3)),
        Sample::new(-6.1995, 106.80042, lvl(4)),
        Sample::new(-6.19952, 106.80042, lvl(0)),
    ];

    let clusters = clusterer().cluster(&samples, &field());

    assert_eq!(clusters.len(), 1);
    let cluster = &clusters.clusters[0];
    assert!(!cluster.is_noise());
    assert_eq!(cluster.points.len(), 4);
    // Mean of 3, 3 and 4, the uncertain reading is left out.
    assert_eq!(cluster.level, lvl(3));
    assert!(cluster.area_m2 > 0.0);
}

#[test]
fn test_groups_and_noise() {
    let clusters = clusterer().cluster(&scan_samples(), &field());

    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters.num_noise(), 1);

    let fours = clusters.iter().find(|c| c.level == lvl(4)).unwrap();
    assert_eq!(fours.points.len(), 3);
    assert!(!fours.is_noise());

    let ones = clusters.iter().find(|c| c.level == lvl(1)).unwrap();
    assert_eq!(ones.points.len(), 2);
    assert!(!ones.is_noise());

    let noise = clusters.iter().find(|c| c.is_noise()).unwrap();
    assert_eq!(noise.points.len(), 1);
    assert_eq!(noise.level, Level::UNCERTAIN);
}

#[test]
fn test_scattered_samples_are_all_noise() {
    let samples = vec![
        Sample::new(-6.1998, 106.8001, lvl(2)),
        Sample::new(-6.1995, 106.8005, lvl(3)),
        Sample::new(-6.1992, 106.8008, lvl(1)),
    ];

    let clusters = clusterer().cluster(&samples, &field());

    assert_eq!(clusters.len(), 3);
    assert_eq!(clusters.num_noise(), 3);
    for (cluster, sample) in clusters.iter().zip(&samples) {
        assert_eq!(cluster.points, vec![*sample]);
        assert_eq!(cluster.level, sample.level);
    }
}

#[test]
fn test_noise_area_is_a_buffered_point() {
    let samples = vec![Sample::new(-6.19955, 106.80045, lvl(2))];
    let config = ClusterConfig {
        projection: AreaProjection::EqualArea,
        ..ClusterConfig::default()
    };

    let clusters = Clusterer::new(config).cluster(&samples, &field());

    assert_eq!(clusters.len(), 1);
    // A 5 m disc, with the longitude shrinking by cos(latitude) on the ground.
    let expected = std::f64::consts::PI * 25.0 * f64::cos(6.19955_f64.to_radians());
    assert_relative_eq!(clusters.clusters[0].area_m2, expected, max_relative = 0.02);
}

#[test]
fn test_clusters_lie_within_the_field() {
    let mut samples = scan_samples();
    // A pair right on the corner of the field, most of their buffer falls outside.
    samples.push(Sample::new(-6.2, 106.8, lvl(3)));
    samples.push(Sample::new(-6.19998, 106.80002, lvl(3)));

    let boundary = field();
    let field_region = MultiPolygon::new(vec![boundary.polygon().clone()]);
    let clusters = clusterer().cluster(&samples, &boundary);

    for cluster in &clusters {
        let inside = cluster.region.intersection(&field_region);
        assert_relative_eq!(
            inside.unsigned_area(),
            cluster.region.unsigned_area(),
            max_relative = 1.0e-6
        );

        for [lat, lon] in cluster.polygon() {
            // Allow for rounding in the clipped coordinates.
            assert!((-6.2 - 1.0e-9..=-6.1991 + 1.0e-9).contains(&lat));
            assert!((106.8 - 1.0e-9..=106.8009 + 1.0e-9).contains(&lon));
        }
    }

    let corner = clusters.iter().find(|c| c.level == lvl(3)).unwrap();
    let unclipped = clusters.iter().find(|c| c.level == lvl(1)).unwrap();
    // Two points 3 m apart clipped to a quarter versus two points 3 m apart inside the field.
    assert!(corner.area_m2 < 0.5 * unclipped.area_m2);
}

#[test]
fn test_area_is_projected_not_degrees() {
    let clusters = clusterer().cluster(&scan_samples(), &field());

    for cluster in &clusters {
        let degree_area = cluster.region.unsigned_area();
        assert!(cluster.area_m2 > 0.0);
        assert!(degree_area > 0.0);
        assert!(cluster.area_m2 > 1.0e6 * degree_area);
    }
}

#[test]
fn test_cluster_outside_field_is_empty() {
    // About 300 m north of the field.
    let samples = vec![
        Sample::new(-6.1963, 106.8004, lvl(2)),
        Sample::new(-6.19632, 106.8004, lvl(2)),
    ];

    let clusters = clusterer().cluster(&samples, &field());

    assert_eq!(clusters.len(), 1);
    assert!(clusters.clusters[0].polygon().is_empty());
    assert_abs_diff_eq!(clusters.clusters[0].area_m2, 0.0);
    assert_abs_diff_eq!(clusters.total_area_m2(), 0.0);
}

#[test]
fn test_collinear_cluster_has_area() {
    let samples: Vec<Sample> = (0..4)
        .map(|i| Sample::new(-6.1995 + 2.0e-5 * i as f64, 106.8004, lvl(2)))
        .collect();

    let clusters = clusterer().cluster(&samples, &field());

    assert_eq!(clusters.len(), 1);
    assert!(clusters.clusters[0].area_m2 > 0.0);
    assert!(clusters.clusters[0].polygon().len() > 4);
}

#[test]
fn test_duplicate_locations_have_area() {
    let samples = vec![
        Sample::new(-6.1995, 106.8004, lvl(4)),
        Sample::new(-6.1995, 106.8004, lvl(3)),
    ];

    let clusters = clusterer().cluster(&samples, &field());

    assert_eq!(clusters.len(), 1);
    // Mean of 3.5 rounds to the even level.
    assert_eq!(clusters.clusters[0].level, lvl(4));
    assert!(clusters.clusters[0].area_m2 > 0.0);
}

#[test]
fn test_invalid_boundaries() {
    let samples = scan_samples();

    let too_few = [(106.8, -6.2), (106.8009, -6.2)];
    assert!(matches!(
        clusterer().cluster_lon_lat(&samples, &too_few),
        Err(ScanError::InvalidBoundary { .. })
    ));

    let bow_tie = [
        (106.8, -6.2),
        (106.8009, -6.1991),
        (106.8009, -6.2),
        (106.8, -6.1991),
    ];
    assert!(matches!(
        clusterer().cluster_lon_lat(&samples, &bow_tie),
        Err(ScanError::InvalidBoundary { .. })
    ));

    let square: Vec<(f64, f64)> = FIELD.iter().map(|&[lat, lon]| (lon, lat)).collect();
    let clusters = clusterer().cluster_lon_lat(&samples, &square).unwrap();
    assert_eq!(clusters.len(), 3);
}
