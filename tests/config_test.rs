use alva_dashboard::config::AppConfig;
use alva_dashboard::config::credentials::{discover_credentials, expand_search_paths};
use alva_dashboard::config::loader::{load_config, load_config_from_yaml};
use alva_dashboard::error::DashboardError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[test]
fn test_defaults_match_service_constants() {
    let config = AppConfig::default();
    assert_eq!(config.uri_scheme, "alva");
    assert_eq!(config.timezone, "Asia/Shanghai");
    assert_eq!(config.timezone_offset_min, 480);
    assert_eq!(config.fetch_batch_size, 5);
    assert_eq!(config.create_timeout(), Duration::from_secs(600));
    assert_eq!(config.credential_env, "ALVA_JWT_TOKEN");
    assert_eq!(config.offset().local_minus_utc(), 8 * 3600);
}

#[test]
fn test_load_partial_yaml_keeps_defaults() {
    let yaml_content = r#"
fetch_batch_size: 2
timezone_offset_min: 0
output_dir: "/var/tmp/dashboards"
"#;
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("dashboard.yaml");
    fs::write(&file_path, yaml_content).expect("Failed to write temp file");

    let config = load_config_from_yaml(&file_path).expect("Failed to load config");
    assert_eq!(config.fetch_batch_size, 2);
    assert_eq!(config.offset().local_minus_utc(), 0);
    assert_eq!(config.uri_scheme, "alva");
    assert_eq!(config.chat_endpoint, AppConfig::default().chat_endpoint);
    assert_eq!(
        config.output_path_for("s-42"),
        PathBuf::from("/var/tmp/dashboards/alva-dashboard-s-42.html")
    );
}

#[test]
fn test_load_config_without_file_uses_defaults() {
    let config = load_config(None).expect("defaults never fail");
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let err = load_config(Some(temp_dir.path().join("absent.yaml").as_path())).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_default_output_goes_to_temp_dir() {
    let config = AppConfig::default();
    let path = config.output_path_for("abc");
    assert_eq!(path, std::env::temp_dir().join("alva-dashboard-abc.html"));
}

#[test]
fn test_env_token_wins_over_files() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file = temp_dir.path().join("alva.json");
    fs::write(&file, r#"{"token": "from-file"}"#).unwrap();

    let creds = discover_credentials(Some("from-env".to_string()), &[file]).expect("credentials");
    assert_eq!(creds.token, "from-env");
}

#[test]
fn test_first_valid_credential_file_is_used() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let broken = temp_dir.path().join("broken.json");
    let empty = temp_dir.path().join("empty.json");
    let good = temp_dir.path().join("good.json");
    let later = temp_dir.path().join("later.json");
    fs::write(&broken, "{not json").unwrap();
    fs::write(&empty, r#"{"token": ""}"#).unwrap();
    fs::write(&good, r#"{"token": "jwt-123", "user": "x"}"#).unwrap();
    fs::write(&later, r#"{"token": "jwt-456"}"#).unwrap();

    let paths = vec![temp_dir.path().join("missing.json"), broken, empty, good, later];
    let creds = discover_credentials(Some("   ".to_string()), &paths).expect("credentials");
    assert_eq!(creds.token, "jwt-123");
    assert!(!format!("{:?}", creds).contains("jwt-123"));
}

#[test]
fn test_no_credentials_lists_searched_paths() {
    let paths = vec![PathBuf::from("/nonexistent/a.json"), PathBuf::from("/nonexistent/b.json")];
    match discover_credentials(None, &paths) {
        Err(DashboardError::MissingCredentials { searched }) => assert_eq!(searched, paths),
        other => panic!("expected MissingCredentials, got {:?}", other),
    }
}

#[test]
fn test_relative_paths_try_executable_dir_first() {
    let paths = vec![PathBuf::from("secrets/alva.json"), PathBuf::from("/etc/alva.json")];

    let expanded = expand_search_paths(&paths, Some(Path::new("/opt/tool")));
    assert_eq!(
        expanded,
        vec![
            PathBuf::from("/opt/tool/secrets/alva.json"),
            PathBuf::from("secrets/alva.json"),
            PathBuf::from("/etc/alva.json"),
        ]
    );
    assert_eq!(expand_search_paths(&paths, None), paths);
}

#[test]
fn test_token_found_next_to_executable() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir_all(temp_dir.path().join("secrets")).unwrap();
    fs::write(temp_dir.path().join("secrets/alva.json"), r#"{"token": "beside-binary"}"#).unwrap();

    let paths = expand_search_paths(&[PathBuf::from("secrets/alva.json")], Some(temp_dir.path()));
    let creds = discover_credentials(None, &paths).expect("credentials");
    assert_eq!(creds.token, "beside-binary");
}
