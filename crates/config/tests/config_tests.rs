use parley_config::load;
use serial_test::serial;
use std::io::Write;

fn clear_env() {
    std::env::remove_var("PARLEY_CONFIG");
    std::env::remove_var("PARLEY_HTTP__PORT");
    std::env::remove_var("PARLEY_DATABASE__URL");
}

#[test]
#[serial]
fn defaults_apply_without_file_or_env() {
    clear_env();

    let config = load().unwrap();

    assert_eq!(config.http.address, "127.0.0.1");
    assert_eq!(config.http.port, 7070);
    assert_eq!(config.database.url, "sqlite://parley.db");
    assert_eq!(config.auth.session_ttl_seconds, 86_400);
}

#[test]
#[serial]
fn config_file_overrides_defaults() {
    clear_env();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parley.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[http]\naddress = \"0.0.0.0\"\nport = 9000\n\n[database]\nurl = \"sqlite://custom.db\"\nmax_connections = 4\n"
    )
    .unwrap();

    std::env::set_var("PARLEY_CONFIG", path.display().to_string());
    let config = load().unwrap();
    std::env::remove_var("PARLEY_CONFIG");

    assert_eq!(config.http.address, "0.0.0.0");
    assert_eq!(config.http.port, 9000);
    assert_eq!(config.database.url, "sqlite://custom.db");
    assert_eq!(config.database.max_connections, 4);
}

#[test]
#[serial]
fn environment_overrides_take_precedence() {
    clear_env();

    std::env::set_var("PARLEY_HTTP__PORT", "8181");
    std::env::set_var("PARLEY_DATABASE__URL", "sqlite://env.db");

    let config = load().unwrap();

    std::env::remove_var("PARLEY_HTTP__PORT");
    std::env::remove_var("PARLEY_DATABASE__URL");

    assert_eq!(config.http.port, 8181);
    assert_eq!(config.database.url, "sqlite://env.db");
}
