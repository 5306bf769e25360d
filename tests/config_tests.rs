use a3_merge::config::{Configuration, ResizeFilter};
use std::path::PathBuf;

#[test]
fn defaults_match_a3_export() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("."));
    assert_eq!(cfg.file_prefix, "POP");
    assert!((cfg.jpeg_quality - 0.92).abs() < f32::EPSILON);
    assert_eq!(cfg.background, [255, 255, 255]);
    assert_eq!(cfg.resize_filter, ResizeFilter::CatmullRom);
    assert_eq!(cfg.preview_max_edge, 320);
    assert!(cfg.validated().is_ok());
}

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
output-dir: "/tmp/out"
file-prefix: "FLYER"
jpeg-quality: 0.8
background: [250, 250, 240]
resize-filter: lanczos3
preview-max-edge: 128
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
    assert_eq!(cfg.file_prefix, "FLYER");
    assert_eq!(cfg.encoder_quality(), 80);
    assert_eq!(cfg.background, [250, 250, 240]);
    assert_eq!(cfg.resize_filter, ResizeFilter::Lanczos3);
    assert_eq!(cfg.preview_max_edge, 128);
}

#[test]
fn unknown_filter_is_rejected() {
    let yaml = "resize-filter: nearest-ish\n";
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn quality_outside_unit_range_is_invalid() {
    for q in ["0.0", "1.5", "-0.2"] {
        let yaml = format!("jpeg-quality: {q}\n");
        let cfg: Configuration = serde_yaml::from_str(&yaml).unwrap();
        assert!(cfg.validated().is_err(), "quality {q} should be rejected");
    }
}

#[test]
fn empty_prefix_is_invalid() {
    let cfg: Configuration = serde_yaml::from_str("file-prefix: \"  \"\n").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("file-prefix"));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "file-prefix: POSTER\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.file_prefix, "POSTER");
    assert!(Configuration::from_yaml_file(dir.path().join("missing.yaml")).is_err());
}
