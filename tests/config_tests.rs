use clap::Parser;
use empathy_lamp::args::{Args, LogLevel};
use empathy_lamp::config;
use empathy_lamp::mood::MoodRule;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::tempdir;

#[tokio::test]
async fn load_full_config() {
    let toml = r#"
        [camera]
        device = 1
        width = 1280
        height = 720
        fps = 15

        [preview]
        headless = true

        [analysis]
        period_secs = 2.0
        ai_width = 320
        cooldown_secs = 10
        rule = "dominant"

        [model]
        url = "http://deepface:5005"
    "#;
    let dir = tempdir().unwrap();
    let path = dir.path().join("lamp.toml");
    tokio::fs::write(&path, toml).await.unwrap();
    let cfg = config::load(&path).await.unwrap();
    assert_eq!(cfg.camera.device, 1);
    assert_eq!(cfg.camera.fps, 15);
    assert!(cfg.preview.headless);
    assert_eq!(cfg.model.url, "http://deepface:5005");
    let s = cfg.analyzer_settings().unwrap();
    assert_eq!(s.period, Duration::from_secs(2));
    assert_eq!(s.ai_width, 320);
    assert_eq!(s.cooldown, Duration::from_secs(10));
    assert_eq!(s.rule, MoodRule::Dominant);
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lamp.toml");
    tokio::fs::write(&path, "[analysis]\nperiod_secs = -1.0\n")
        .await
        .unwrap();
    assert!(config::load(&path).await.is_err());
    assert!(config::load(dir.path().join("missing.toml")).await.is_err());
}

#[test]
fn flags_override_config() {
    let args = Args::parse_from([
        "test",
        "--device",
        "2",
        "--rule",
        "dominant",
        "--period-secs",
        "0.5",
        "--replay-dir",
        "frames",
        "--headless",
        "--log-level",
        "debug",
    ]);
    let mut cfg = config::LampConfig::default();
    args.apply(&mut cfg);
    assert_eq!(cfg.camera.device, 2);
    assert_eq!(cfg.analysis.rule, MoodRule::Dominant);
    assert_eq!(cfg.analysis.period_secs, 0.5);
    assert_eq!(cfg.camera.replay_dir, Some(PathBuf::from("frames")));
    assert!(cfg.preview.headless);
    assert_eq!(args.log_level, LogLevel::Debug);
}

#[test]
fn no_flags_keep_config() {
    let args = Args::parse_from(["test"]);
    let mut cfg = config::LampConfig::default();
    args.apply(&mut cfg);
    assert_eq!(cfg, config::LampConfig::default());
    assert_eq!(args.log_level, LogLevel::Info);
}
