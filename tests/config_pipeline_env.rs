use serial_test::serial;
use std::path::PathBuf;

use fsops::config::PIPELINE_ENV;
use fsops::{Config, default_pipeline_path};

#[test]
#[serial]
fn env_override_wins() {
    unsafe {
        std::env::set_var(PIPELINE_ENV, "/srv/fsops/custom.xml");
    }
    assert_eq!(default_pipeline_path(), Some(PathBuf::from("/srv/fsops/custom.xml")));
    assert_eq!(Config::default().pipeline_file, Some(PathBuf::from("/srv/fsops/custom.xml")));
    unsafe {
        std::env::remove_var(PIPELINE_ENV);
    }
}

#[test]
#[serial]
fn default_lives_under_fsops_dir() {
    unsafe {
        std::env::remove_var(PIPELINE_ENV);
    }
    if let Some(p) = default_pipeline_path() {
        assert!(p.ends_with("fsops/pipeline.xml"), "{}", p.display());
    }
}

#[test]
#[serial]
fn empty_env_value_is_ignored() {
    unsafe {
        std::env::set_var(PIPELINE_ENV, "");
    }
    let p = default_pipeline_path();
    unsafe {
        std::env::remove_var(PIPELINE_ENV);
    }
    assert_ne!(p, Some(PathBuf::new()));
}
