use gradematch_core::lut::cube;
use gradematch_core::{
    GradeError, GradingImage, LutSize, PresetConfig, TransferConfig, TransferMethod,
    generate_lut, generate_preset, load_image, save_image, transfer_file, transfer_image,
};

fn scene(width: u32, height: u32, warmth: f64) -> GradingImage {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let u = x as f64 / (width - 1) as f64;
            let v = y as f64 / (height - 1) as f64;
            let l = 0.05 + 0.9 * (u + v) / 2.0;
            pixels.push([
                (l + warmth * 0.15).clamp(0.0, 1.0),
                l * (0.85 + 0.15 * u),
                (l - warmth * 0.15).clamp(0.0, 1.0),
            ]);
        }
    }
    GradingImage::from_pixels(width, height, pixels).unwrap()
}

fn data_rows(text: &str) -> Vec<[f64; 3]> {
    text.lines()
        .filter_map(|line| {
            let values: Vec<f64> = line
                .split_whitespace()
                .map(|v| v.parse::<f64>())
                .collect::<Result<_, _>>()
                .ok()?;
            (values.len() == 3).then(|| [values[0], values[1], values[2]])
        })
        .collect()
}

#[test]
fn test_strength_zero_is_identity_for_every_method() {
    let reference = scene(16, 12, 1.0);
    let target = scene(10, 10, -1.0);
    for &method in TransferMethod::all() {
        let config = TransferConfig {
            strength: 0.0,
            ..TransferConfig::with_method(method)
        };
        assert_eq!(transfer_image(&reference, &target, &config).unwrap(), target);
    }
}

#[test]
fn test_uniform_reference_pulls_mean_to_its_color() {
    let reference = GradingImage::from_rgb8(8, 8, &[200, 100, 50].repeat(64)).unwrap();
    let target = scene(20, 20, -0.5);
    let out = transfer_image(
        &reference,
        &target,
        &TransferConfig::with_method(TransferMethod::GlobalLab),
    )
    .unwrap();
    let mean = out.mean_rgb();
    for (c, want) in [200.0, 100.0, 50.0].into_iter().enumerate() {
        assert!((mean[c] * 255.0 - want).abs() < 0.5, "{mean:?}");
    }
}

#[test]
fn test_partial_strength_lies_between() {
    let reference = scene(16, 16, 1.0);
    let target = scene(16, 16, -1.0);
    let full = transfer_image(&reference, &target, &TransferConfig::default()).unwrap();
    let half = transfer_image(
        &reference,
        &target,
        &TransferConfig {
            strength: 0.5,
            ..TransferConfig::default()
        },
    )
    .unwrap();
    let red = |img: &GradingImage| img.mean_rgb()[0];
    assert!(red(&half) > red(&target), "{} {}", red(&half), red(&target));
    assert!(red(&half) < red(&full), "{} {}", red(&half), red(&full));
}

#[test]
fn test_generate_lut_row_counts() {
    let dir = tempfile::tempdir().unwrap();
    let reference = scene(24, 16, 0.8);
    for (size, rows) in [(LutSize::N17, 4913), (LutSize::N65, 274_625)] {
        let path = dir.path().join(format!("look_{}.cube", size.edge()));
        let lut = generate_lut(
            &reference,
            &TransferConfig::default(),
            size,
            &path,
            Some("Warm Look"),
        )
        .unwrap();
        assert_eq!(lut.len(), rows);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("TITLE \"Warm Look\"\n"));
        assert!(text.contains(&format!("LUT_3D_SIZE {}\n", size.edge())));
        assert!(text.contains("DOMAIN_MIN 0.0 0.0 0.0\n"));
        assert!(text.contains("DOMAIN_MAX 1.0 1.0 1.0\n"));
        assert_eq!(data_rows(&text).len(), rows);
    }
}

#[test]
fn test_cube_reparses_within_tolerance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("look.cube");
    let reference = scene(20, 20, 1.0);
    let config = TransferConfig::with_method(TransferMethod::Improved);
    let lut = generate_lut(&reference, &config, LutSize::N17, &path, None).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("TITLE \"gradematch\"\n"));

    let parsed = cube::read(&path).unwrap();
    assert_eq!(parsed.size, 17);
    for (r, g, b) in [(0, 0, 0), (16, 0, 0), (0, 16, 0), (3, 9, 14), (16, 16, 16)] {
        let (want, got) = (lut.lookup(r, g, b), parsed.lookup(r, g, b));
        for c in 0..3 {
            assert!((want[c] - got[c]).abs() < 1e-4, "{want:?} {got:?}");
        }
    }
}

#[test]
fn test_cube_rows_are_red_fastest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("id.cube");
    let reference = scene(8, 8, 0.0);
    let config = TransferConfig {
        strength: 0.0,
        ..TransferConfig::default()
    };
    generate_lut(&reference, &config, LutSize::N17, &path, None).unwrap();
    let rows = data_rows(&std::fs::read_to_string(&path).unwrap());
    let step = 1.0 / 16.0;
    assert_eq!(rows[0], [0.0, 0.0, 0.0]);
    assert!((rows[1][0] - step).abs() < 1e-6 && rows[1][1] == 0.0 && rows[1][2] == 0.0);
    assert!((rows[17][1] - step).abs() < 1e-6 && rows[17][0] == 0.0);
    assert!((rows[289][2] - step).abs() < 1e-6 && rows[289][0] == 0.0);
}

#[test]
fn test_generate_preset_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let reference = scene(30, 20, 1.0);
    let target = scene(25, 25, -1.0);
    let config = PresetConfig::default();
    let a = dir.path().join("a.xmp");
    let b = dir.path().join("b.xmp");
    generate_preset(&reference, &target, "Golden & Teal", &a, &config).unwrap();
    generate_preset(&reference, &target, "Golden & Teal", &b, &config).unwrap();
    let (a, b) = (std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    assert_eq!(a, b);

    let text = String::from_utf8(a).unwrap();
    assert!(text.contains("crs:PresetType=\"Normal\""));
    assert!(text.contains("Golden &amp; Teal"));
}

#[test]
fn test_preset_without_highlights_has_zero_highlight_tint() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dark.xmp");
    let reference = GradingImage::uniform(12, 12, [0.25, 0.1, 0.05]).unwrap();
    let target = GradingImage::uniform(12, 12, [0.05, 0.1, 0.25]).unwrap();
    let delta =
        generate_preset(&reference, &target, "Dark", &path, &PresetConfig::default()).unwrap();
    assert_eq!(delta.highlight_tint.hue, 0.0);
    assert_eq!(delta.highlight_tint.saturation, 0.0);
    assert!(delta.is_finite());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("crs:SplitToningHighlightHue=\"0\""));
    assert!(text.contains("crs:SplitToningHighlightSaturation=\"0\""));

    // No highlight zone: the upper channel anchors stay on the diagonal.
    assert_eq!(delta.curves.parametric.lights, 0);
    assert!(text.contains("<crs:ToneCurvePV2012Red>"));
    assert_eq!(text.matches("<rdf:li>200, 200</rdf:li>").count(), 3);
}

#[test]
fn test_preset_curves_lean_toward_reference_cast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warm.xmp");
    let delta = generate_preset(
        &scene(30, 20, 1.0),
        &scene(30, 20, -1.0),
        "Warm",
        &path,
        &PresetConfig::default(),
    )
    .unwrap();
    // Warmer reference: red anchors rise, blue anchors fall.
    let curves = &delta.curves;
    assert!(curves.red[2][1] > 128, "{curves:?}");
    assert!(curves.blue[2][1] < 128, "{curves:?}");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(&format!("<rdf:li>128, {}</rdf:li>", curves.red[2][1])));
}

#[test]
fn test_validation_happens_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");
    let config = TransferConfig {
        strength: 3.0,
        ..TransferConfig::default()
    };
    let err = transfer_file(&missing, &missing, &dir.path().join("out.png"), &config).unwrap_err();
    assert!(err.is_validation(), "{err}");

    let err = transfer_file(
        &missing,
        &missing,
        &dir.path().join("out.png"),
        &TransferConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GradeError::Io { .. }), "{err}");
}

#[test]
fn test_transfer_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let reference_path = dir.path().join("reference.png");
    let target_path = dir.path().join("target.png");
    let output_path = dir.path().join("out/graded.png");
    save_image(&scene(16, 16, 1.0), &reference_path).unwrap();
    save_image(&scene(12, 8, -1.0), &target_path).unwrap();

    let graded = transfer_file(
        &reference_path,
        &target_path,
        &output_path,
        &TransferConfig::with_method(TransferMethod::Histogram),
    )
    .unwrap();
    let reloaded = load_image(&output_path).unwrap();
    assert_eq!((reloaded.width, reloaded.height), (12, 8));
    for (a, b) in graded.pixels.iter().zip(&reloaded.pixels) {
        for c in 0..3 {
            assert!((a[c] - b[c]).abs() <= 0.5 / 255.0 + 1e-9);
        }
    }
}

#[test]
fn test_bad_grid_size_is_validation_error() {
    let err = LutSize::try_from(32).unwrap_err();
    assert!(err.is_validation());
}
