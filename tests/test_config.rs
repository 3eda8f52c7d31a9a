use std::io::Write;
use std::path::PathBuf;

use minnow::config::Config;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.port, 3000);
    assert!(!cfg.debug);
    assert_eq!(cfg.static_dir, PathBuf::from("."));
    assert_eq!(cfg.cgi_dir, PathBuf::from("cgi-bin"));
    assert!(!cfg.show_dir);
    assert_eq!(cfg.index, "index.html");
    assert_eq!(cfg.listen_addr(), "0.0.0.0:3000");
}

#[test]
fn test_config_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "port: 1337\ndebug: true\nshow_dir: true\nindex: default.htm"
    )
    .unwrap();

    let cfg = Config::from_file(file.path()).unwrap();

    assert_eq!(cfg.port, 1337);
    assert!(cfg.debug);
    assert!(cfg.show_dir);
    assert_eq!(cfg.index, "default.htm");
    // Unset fields keep their defaults
    assert_eq!(cfg.static_dir, PathBuf::from("."));
}

#[test]
fn test_config_rejects_bad_yaml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port: [not a number").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_relative_cgi_dir_resolves_under_static_root() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("cgi-bin")).unwrap();

    let mut cfg = Config {
        static_dir: root.path().to_path_buf(),
        ..Config::default()
    };
    cfg.resolve_roots();

    assert!(cfg.cgi_dir.is_absolute());
    assert!(cfg.cgi_dir.starts_with(&cfg.static_dir));
    assert!(cfg.cgi_dir.ends_with("cgi-bin"));
}
