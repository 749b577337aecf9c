use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use socketd::config::Settings;

fn write_config(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.server.listen, "127.0.0.1:8080");
    assert_eq!(settings.server.close_wait, Duration::from_secs(5));
    assert_eq!(settings.http.buffer_bytes, 4096);
    assert_eq!(settings.http.idle_timeout, Duration::from_secs(20));
    assert!(settings.session.enabled);
    assert_eq!(settings.session.cookie, "SocketD");
    assert_eq!(settings.session.timeout, Duration::from_secs(600));
    assert_eq!(settings.session.sweep_interval, Duration::from_secs(60));
    assert_eq!(settings.files.root, PathBuf::from("site"));
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
server:
  listen: "0.0.0.0:9000"
  close_wait: 2.5
http:
  buffer_bytes: 512
  idle_timeout: 0
session:
  enabled: false
  cookie: MYSID
  timeout: 30
  sweep_interval: 5
files:
  root: /srv/www
"#,
    );

    let settings = Settings::load(file.path()).unwrap();

    assert_eq!(settings.server.listen, "0.0.0.0:9000");
    assert_eq!(settings.server.close_wait, Duration::from_millis(2500));
    assert_eq!(settings.http.buffer_bytes, 512);
    assert_eq!(settings.http.idle_timeout, Duration::ZERO);
    assert!(!settings.session.enabled);
    assert_eq!(settings.session.cookie, "MYSID");
    assert_eq!(settings.session.timeout, Duration::from_secs(30));
    assert_eq!(settings.session.sweep_interval, Duration::from_secs(5));
    assert_eq!(settings.files.root, PathBuf::from("/srv/www"));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let file = write_config("server:\n  listen: \"127.0.0.1:7000\"\n");

    let settings = Settings::load(file.path()).unwrap();

    assert_eq!(settings.server.listen, "127.0.0.1:7000");
    // Everything not mentioned in the file keeps its default.
    assert_eq!(settings.server.close_wait, Duration::from_secs(5));
    assert_eq!(settings.http.buffer_bytes, 4096);
    assert!(settings.session.enabled);
    assert_eq!(settings.files.root, PathBuf::from("site"));
}

#[test]
fn test_env_var_selects_config_file() {
    unsafe {
        std::env::remove_var("SOCKETD_CONFIG");
    }
    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.server.listen, "127.0.0.1:8080");

    let file = write_config("server:\n  listen: \"0.0.0.0:4000\"\n");
    unsafe {
        std::env::set_var("SOCKETD_CONFIG", file.path());
    }
    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.server.listen, "0.0.0.0:4000");

    unsafe {
        std::env::remove_var("SOCKETD_CONFIG");
    }
}

#[test]
fn test_rejects_negative_duration() {
    let file = write_config("server:\n  close_wait: -1\n");
    assert!(Settings::load(file.path()).is_err());
}

#[test]
fn test_rejects_out_of_range_duration() {
    // Finite, but more seconds than a Duration can hold.
    let file = write_config("http:\n  idle_timeout: 1.0e20\n");
    assert!(Settings::load(file.path()).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(Settings::load("/no/such/config.yaml").is_err());
}
