use frame_baker_core::prelude::*;
use image::{Rgba, RgbaImage};
use std::fs;
use std::sync::Mutex;
use std::path::Path;

fn write_box_frames(dir: &Path, boxes: &[(u32, u32, u32, u32)], canvas: (u32, u32)) {
    fs::create_dir_all(dir).expect("mkdir");
    for (i, (x, y, w, h)) in boxes.iter().enumerate() {
        let mut img = RgbaImage::new(canvas.0, canvas.1);
        for yy in *y..y + h {
            for xx in *x..x + w {
                img.put_pixel(xx, yy, Rgba([50, 60, 70, 255]));
            }
        }
        img.save(dir.join(format!("{:04}.png", i + 1))).expect("save");
    }
}

fn project(root: &Path, sequences: Vec<SequenceSettings>) -> ProjectConfig {
    ProjectConfig {
        render_root: root.join("out"),
        textures_dir: root.join("textures"),
        sequences,
        ..Default::default()
    }
}

#[test]
fn slug_lowercases_and_hyphenates() {
    assert_eq!(slug("Fire Impact"), "fire-impact");
    assert_eq!(slug("UV Swirl Big"), "uv-swirl-big");
    assert_eq!(slug("smoke"), "smoke");
    let layout = SequenceLayout::new("out", "tex");
    assert_eq!(layout.sequence_dir("Fire Impact"), Path::new("out").join("fire-impact"));
    assert_eq!(layout.result_path("Fire Impact"), Path::new("tex").join("fire-impact.png"));
}

#[test]
fn crops_then_packs_stacked_sheet() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    write_box_frames(
        &root.join("out/fire-impact"),
        &[(2, 2, 4, 4), (10, 1, 6, 3), (0, 8, 2, 2)],
        (20, 20),
    );
    let mut s = SequenceSettings::named("Fire Impact");
    s.crop = true;
    s.stack_frames = true;

    let report = bake_project(&project(root, vec![s])).expect("bake");
    assert!(report.is_success());
    assert_eq!(report.baked.len(), 1);
    let b = &report.baked[0];
    assert_eq!(b.crop_size, Some((6, 4)));
    assert_eq!(b.frame_count, 3);
    assert_eq!(b.sheet_size, (12, 8));
    assert_eq!(b.output, root.join("textures").join("fire-impact.png"));

    let sheet = image::open(&b.output).expect("open").to_rgba8();
    assert_eq!(sheet.dimensions(), (12, 8));
}

#[test]
fn uv_sequences_are_never_cropped() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    let dir = root.join("out/uv-swirl");
    write_box_frames(&dir, &[(1, 1, 2, 2), (3, 3, 1, 1)], (8, 8));
    let mut s = SequenceSettings::named("UV Swirl");
    s.crop = true;
    s.is_uv = true;

    let report = bake_project(&project(root, vec![s])).expect("bake");
    let b = &report.baked[0];
    assert_eq!(b.crop_size, None);
    assert_eq!(b.sheet_size, (16, 8));
    let frame = image::open(dir.join("0001.png")).expect("open");
    assert_eq!((frame.width(), frame.height()), (8, 8));

    let sheet = image::open(&b.output).expect("open").to_rgba8();
    assert_eq!(sheet.get_pixel(0, 0).0, [0, 0, 255, 255]);
    assert_eq!(sheet.get_pixel(1, 1).0, [50, 60, 70, 255]);
}

#[test]
fn inactive_sequences_are_skipped() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    let mut off = SequenceSettings::named("Disabled");
    off.enabled = false;
    let mut hidden = SequenceSettings::named("Not Rendered");
    hidden.renders = false;

    let report = bake_project(&project(root, vec![off, hidden])).expect("bake");
    assert!(report.baked.is_empty());
    assert_eq!(report.skipped, ["Disabled", "Not Rendered"]);
}

#[test]
fn failure_names_the_sequence_and_stops() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    write_box_frames(&root.join("out/broken"), &[(0, 0, 1, 1), (0, 0, 1, 1)], (4, 4));
    // third frame with a different canvas size
    RgbaImage::from_pixel(5, 4, Rgba([0, 0, 0, 255]))
        .save(root.join("out/broken/0003.png"))
        .expect("save");
    write_box_frames(&root.join("out/fine"), &[(0, 0, 2, 2)], (4, 4));

    let cfg = project(
        root,
        vec![SequenceSettings::named("Broken"), SequenceSettings::named("Fine")],
    );
    let err = bake_project(&cfg).unwrap_err();
    match &err {
        FrameBakeError::Sequence { name, .. } => assert_eq!(name, "Broken"),
        other => panic!("expected Sequence error, got {other:?}"),
    }
    assert!(matches!(err.root(), FrameBakeError::DimensionMismatch { .. }));
    assert!(err.to_string().contains("Broken"));
    assert!(!root.join("textures/fine.png").exists());
}

#[test]
fn keep_going_collects_failures() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    write_box_frames(&root.join("out/empty-frame"), &[(0, 0, 0, 0)], (4, 4));
    write_box_frames(&root.join("out/fine"), &[(0, 0, 2, 2)], (4, 4));
    let mut bad = SequenceSettings::named("Empty Frame");
    bad.crop = true;

    let mut cfg = project(root, vec![bad, SequenceSettings::named("Fine")]);
    cfg.keep_going = true;
    let report = bake_project(&cfg).expect("bake");
    assert!(!report.is_success());
    assert_eq!(report.baked.len(), 1);
    assert_eq!(report.baked[0].name, "Fine");
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(
        report.failed[0].root(),
        FrameBakeError::DegenerateFrame { .. }
    ));
    assert!(root.join("textures/fine.png").exists());
}

#[test]
fn metadata_sidecar_is_written_on_request() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    write_box_frames(&root.join("out/dust"), &[(0, 0, 2, 2), (1, 1, 2, 2)], (4, 4));
    let mut cfg = project(root, vec![SequenceSettings::named("Dust")]);
    cfg.metadata = true;
    bake_project(&cfg).expect("bake");

    let text = fs::read_to_string(root.join("textures/dust.json")).expect("json");
    let v: serde_json::Value = serde_json::from_str(&text).expect("parse");
    assert_eq!(v["meta"]["frameCount"], 2);
    assert_eq!(v["meta"]["layout"], "linear");
    assert_eq!(v["frames"][1]["frame"]["x"], 4);
}

#[test]
fn yaml_project_accepts_names_and_tri_state_anchors() {
    let yaml = r#"
render_root: renders
textures_dir: ../assets/textures
keep_going: true
sequences:
  - name: Fire Impact
    crop: true
    crop_align_x: -1
    crop_align_y: end
    stack_frames: true
  - name: UV Swirl
    is_uv: true
    crop_x: 4
    crop_y: 0
"#;
    let cfg = ProjectConfig::from_yaml_str(yaml).expect("yaml");
    assert!(cfg.keep_going);
    assert_eq!(cfg.alpha_threshold, frame_baker_core::DEFAULT_ALPHA_THRESHOLD);
    let fire = &cfg.sequences[0];
    assert_eq!(fire.crop_align_x, Anchor::Start);
    assert_eq!(fire.crop_align_y, Anchor::End);
    assert!(fire.wants_crop());
    assert_eq!(fire.sheet_config().layout, SheetLayout::Stacked);
    let uv = &cfg.sequences[1];
    assert!(!uv.wants_crop());
    assert_eq!(uv.crop_config(0.002).anchor_policy().origin, Some((4, 0)));
    assert_eq!(uv.sheet_config().asset_class, AssetClass::Uv);
}

#[test]
fn duplicate_slugs_are_rejected() {
    let cfg = ProjectConfig {
        sequences: vec![
            SequenceSettings::named("Fire Impact"),
            SequenceSettings::named("fire impact"),
        ],
        ..Default::default()
    };
    assert!(matches!(
        cfg.validate(),
        Err(FrameBakeError::InvalidConfig(_))
    ));
}

#[test]
fn oversized_crop_origin_is_rejected_with_sequence_name() {
    let mut s = SequenceSettings::named("Far Away");
    s.crop = true;
    s.crop_x = 1 << 33;
    s.crop_y = 0;
    let cfg = ProjectConfig {
        sequences: vec![s],
        ..Default::default()
    };
    let err = cfg.validate().unwrap_err();
    match &err {
        FrameBakeError::Sequence { name, .. } => assert_eq!(name, "Far Away"),
        other => panic!("expected Sequence error, got {other:?}"),
    }
    assert!(matches!(err.root(), FrameBakeError::InvalidConfig(_)));
}

#[test]
fn callback_sees_every_baked_and_failed_sequence() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    write_box_frames(&root.join("out/smoke"), &[(0, 0, 2, 2)], (4, 4));
    write_box_frames(&root.join("out/spark"), &[(1, 1, 1, 1), (0, 0, 3, 3)], (4, 4));
    let mut off = SequenceSettings::named("Off");
    off.enabled = false;

    let mut cfg = project(
        root,
        vec![
            SequenceSettings::named("Smoke"),
            SequenceSettings::named("Missing"),
            off,
            SequenceSettings::named("Spark"),
        ],
    );
    cfg.keep_going = true;

    let seen = Mutex::new(Vec::new());
    let report = bake_project_with(&cfg, |settings, outcome| {
        seen.lock()
            .expect("lock")
            .push((settings.name.clone(), outcome.is_ok()));
    })
    .expect("bake");

    assert_eq!(
        seen.into_inner().expect("lock"),
        [
            ("Smoke".to_string(), true),
            ("Missing".to_string(), false),
            ("Spark".to_string(), true),
        ]
    );
    assert_eq!(report.baked.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.skipped, ["Off"]);
}

#[test]
fn callback_stops_with_the_first_failure() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let root = tmp.path();
    write_box_frames(&root.join("out/smoke"), &[(0, 0, 2, 2)], (4, 4));
    let cfg = project(
        root,
        vec![SequenceSettings::named("Missing"), SequenceSettings::named("Smoke")],
    );

    let calls = Mutex::new(0);
    let err = bake_project_with(&cfg, |_, _| *calls.lock().expect("lock") += 1).unwrap_err();
    assert_eq!(*calls.lock().expect("lock"), 1);
    assert!(matches!(err.root(), FrameBakeError::EmptySequence(_) | FrameBakeError::Io(_)));
}
