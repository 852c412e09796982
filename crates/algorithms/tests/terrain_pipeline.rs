//! End-to-end tests of the terrain pipeline on synthetic and tiled terrain.

use std::io::Cursor;

use cumbre_algorithms::morphology::SquareWindow;
use cumbre_algorithms::pipeline::{
    analyze_batch, analyze_region, analyze_terrain, CancelToken, PipelineConfig,
};
use cumbre_algorithms::terrain::{
    canopy_filter, classify, detect_peaks, estimate_prominence, Biome, LandformType, PeakParams,
    ShapeSignal,
};
use cumbre_core::provider::{
    ConeFeature, MemoryTileSource, NoiseRange, SyntheticTerrain, TerrainRgbProvider, TileId,
};
use cumbre_core::{BoundingBox, ElevationGrid, Error};

/// 60x60 lowland at ~30 m with one 2500 m cone in the middle and light noise
fn volcano_field(seed: u64) -> ElevationGrid {
    SyntheticTerrain {
        cone: Some(ConeFeature {
            x: 30.0,
            y: 30.0,
            peak_height: 2500.0,
            radius: 5.0,
        }),
        noise: NoiseRange { min: 0.0, max: 15.0 },
        ..SyntheticTerrain::flat(60, 60, 90.0, 30.0)
    }
    .with_seed(seed)
    .generate()
    .expect("valid synthetic terrain")
}

// ---------------------------------------------------------------------------
// Reference behavior
// ---------------------------------------------------------------------------

#[test]
fn synthetic_volcano_is_found() {
    for seed in [1, 2, 3] {
        let grid = volcano_field(seed);
        let entities = analyze_terrain(&grid, &PipelineConfig::default()).unwrap();
        let volcano = entities
            .iter()
            .find(|e| e.landform == LandformType::Volcano)
            .unwrap_or_else(|| panic!("seed {}: no volcano in {:?}", seed, entities));
        assert!(
            volcano.coordinates.x.abs_diff(30) <= 5 && volcano.coordinates.y.abs_diff(30) <= 5,
            "seed {}: volcano at {:?}",
            seed,
            volcano.coordinates
        );
        assert!(volcano.altitude > 2000.0);
        assert!(volcano.prominence > 500.0);
    }
}

#[test]
fn conical_band_depends_on_cell_size() {
    let cone = |cell_size| {
        SyntheticTerrain {
            cone: Some(ConeFeature {
                x: 30.0,
                y: 30.0,
                peak_height: 2500.0,
                radius: 5.0,
            }),
            ..SyntheticTerrain::flat(60, 60, cell_size, 30.0)
        }
        .generate()
        .unwrap()
    };
    let config = PipelineConfig::default();

    let coarse = analyze_terrain(&cone(90.0), &config).unwrap();
    assert_eq!(coarse[0].landform, LandformType::Volcano);

    // Same cone on 30 m cells is steeper than the default band
    let fine = analyze_terrain(&cone(30.0), &config).unwrap();
    assert_eq!(fine[0].landform, LandformType::Mountain);
    assert!(fine[0].shape.average_slope_degrees > 45.0);

    let mut retuned = config;
    retuned.shape.conical_max_degrees = 55.0;
    let fine = analyze_terrain(&cone(30.0), &retuned).unwrap();
    assert_eq!(fine[0].landform, LandformType::Volcano);
}

#[test]
fn flat_terrain_has_no_landforms() {
    let grid = SyntheticTerrain::flat(50, 50, 30.0, 1200.0).generate().unwrap();
    assert!(analyze_terrain(&grid, &PipelineConfig::default()).unwrap().is_empty());
}

#[test]
fn classification_reference_cases() {
    let shape = |is_conical| ShapeSignal {
        average_slope_degrees: 30.0,
        is_conical,
        gradient_magnitude: 0.5,
    };
    let t = PipelineConfig::default().classifier;
    let b = Biome::Andean;
    assert_eq!(classify(2500.0, 600.0, &shape(true), b, &t), Some(LandformType::Volcano));
    assert_eq!(classify(500.0, 350.0, &shape(false), b, &t), Some(LandformType::Mountain));
    assert_eq!(classify(100.0, 50.0, &shape(false), b, &t), Some(LandformType::Hill));
    assert_eq!(classify(100.0, 5.0, &shape(false), b, &t), None);
}

// ---------------------------------------------------------------------------
// Stage properties
// ---------------------------------------------------------------------------

#[test]
fn canopy_filter_is_idempotent_and_never_raises() {
    let grid = SyntheticTerrain::default().with_seed(17).generate().unwrap();
    for size in [3, 5, 7] {
        let once = canopy_filter(&grid, size).unwrap();
        let twice = canopy_filter(&once, size).unwrap();
        assert_eq!(once, twice, "window {}", size);
        assert!(once
            .data()
            .iter()
            .zip(grid.data().iter())
            .all(|(f, raw)| f <= raw));
    }
}

#[test]
fn accepted_peaks_are_separated() {
    let grid = SyntheticTerrain::default().with_seed(23).generate().unwrap();
    let filtered = canopy_filter(&grid, 3).unwrap();
    for min_separation in [3.0, 10.0, 25.0] {
        let peaks = detect_peaks(&filtered, &PeakParams { min_separation }).unwrap();
        for (i, a) in peaks.iter().enumerate() {
            for b in &peaks[i + 1..] {
                assert!(a.distance_to(b) > min_separation);
            }
        }
    }
}

#[test]
fn prominence_is_zero_or_drop_to_floor() {
    let grid = volcano_field(4);
    let filtered = canopy_filter(&grid, 3).unwrap();
    let peaks = detect_peaks(&filtered, &PeakParams::default()).unwrap();
    for peak in &peaks {
        let p = estimate_prominence(&filtered, peak, 15).unwrap();
        assert!(p >= 0.0);
        assert!(p <= peak.elevation - filtered.statistics().min + 1e-9);
    }
}

#[test]
fn pipeline_is_deterministic() {
    let grid = SyntheticTerrain::default().with_seed(99).generate().unwrap();
    let config = PipelineConfig::default();
    assert_eq!(
        analyze_terrain(&grid, &config).unwrap(),
        analyze_terrain(&grid, &config).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn bad_grids_are_rejected() {
    let ragged = ElevationGrid::from_rows(vec![vec![1.0; 4], vec![1.0; 3], vec![1.0; 4]], 30.0);
    assert!(matches!(ragged, Err(Error::InvalidGrid { .. })));

    let tiny = ElevationGrid::from_rows(vec![vec![1.0; 2]; 2], 30.0);
    assert!(matches!(tiny, Err(Error::InvalidGrid { .. })));

    let empty = ElevationGrid::from_rows(Vec::new(), 30.0);
    assert!(empty.unwrap_err().is_bad_input());
}

#[test]
fn bad_parameters_are_rejected() {
    let grid = volcano_field(5);
    assert!(SquareWindow::new(4).is_err());

    let mut config = PipelineConfig::default();
    config.canopy.window_size = 6;
    let err = analyze_terrain(&grid, &config).unwrap_err();
    assert!(err.is_bad_input() && !err.is_no_data());
}

#[test]
fn missing_region_is_no_data_and_isolated() {
    let provider = TerrainRgbProvider::new(MemoryTileSource::new(), 8).unwrap();
    let bbox = BoundingBox::new(-0.9, -1.0, -78.4, -78.5);
    let err = analyze_region(&provider, &bbox, &PipelineConfig::default()).unwrap_err();
    assert!(err.is_no_data());

    let synthetic = SyntheticTerrain::default().with_seed(2);
    let results = analyze_batch(
        &synthetic,
        &[bbox, BoundingBox::new(95.0, 0.0, 1.0, 0.0)],
        &PipelineConfig::default(),
        &CancelToken::new(),
    );
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().is_err_and(|e| e.is_bad_input()));
}

// ---------------------------------------------------------------------------
// Terrain-RGB tiles
// ---------------------------------------------------------------------------

fn terrain_rgb_png(size: u32, height: impl Fn(u32, u32) -> f64) -> Vec<u8> {
    let img = image::RgbImage::from_fn(size, size, |x, y| {
        let v = ((height(x, y) + 10000.0) / 0.1).round() as u32;
        image::Rgb([(v >> 16) as u8, (v >> 8) as u8, v as u8])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn tiled_region_finds_the_massif() {
    let png = terrain_rgb_png(64, |x, y| {
        let d2 = (x as f64 - 32.0).powi(2) + (y as f64 - 32.0).powi(2);
        100.0 + 2500.0 * (-d2 / 50.0).exp()
    });
    let mut source = MemoryTileSource::new();
    source.insert(TileId::new(0, 0, 0), png);
    let provider = TerrainRgbProvider::new(source, 0).unwrap();

    let world = BoundingBox::new(80.0, -80.0, 179.0, -179.0);
    let entities = analyze_region(&provider, &world, &PipelineConfig::default()).unwrap();
    // Kilometre-sized cells flatten every slope, so the cone reads as a mountain
    let summit = entities.first().expect("summit entity");
    assert_eq!(summit.landform, LandformType::Mountain);
    assert!(summit.altitude > 2000.0);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn config_roundtrips_through_toml() {
    let mut config = PipelineConfig::default().with_biome(Biome::Jungle);
    config.prominence.search_radius = 20;
    config.classifier.hill_min_prominence = 10.0;

    let text = toml::to_string(&config).unwrap();
    let back: PipelineConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
    assert!(back.validate().is_ok());
}
