use std::sync::{Mutex, OnceLock};

use logstack_operator::settings::{OperatorSettings, load_settings, save_settings, settings_path};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

#[test]
fn load_settings_defaults_when_missing() {
    let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
    let temp = tempfile::tempdir().unwrap();
    unsafe {
        std::env::set_var("LOGSTACK_OPERATOR_CONFIG_DIR", temp.path());
    }
    let settings = load_settings().unwrap();
    assert_eq!(settings, OperatorSettings::default());
    assert!(!settings.feature_gates.http_encryption);
    unsafe {
        std::env::remove_var("LOGSTACK_OPERATOR_CONFIG_DIR");
    }
}

#[test]
fn save_and_load_settings_roundtrip() {
    let _guard = ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap();
    let temp = tempfile::tempdir().unwrap();
    unsafe {
        std::env::set_var("LOGSTACK_OPERATOR_CONFIG_DIR", temp.path().join("nested"));
    }
    let mut settings = OperatorSettings::default();
    settings.feature_gates.http_encryption = true;
    settings.feature_gates.openshift.serving_certs_service = true;
    save_settings(&settings).unwrap();
    assert!(settings_path().unwrap().starts_with(temp.path()));

    let loaded = load_settings().unwrap();
    assert_eq!(loaded, settings);
    assert!(loaded.feature_gates.platform_serving_certs());
    unsafe {
        std::env::remove_var("LOGSTACK_OPERATOR_CONFIG_DIR");
    }
}
