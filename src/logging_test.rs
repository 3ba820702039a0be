use crate::logging::*;
use crate::testing;

#[test]
fn test_initialize_logging_is_idempotent() {
    assert!(initialize_logging(LogOutput::Stderr).is_ok());
    assert!(initialize_logging(LogOutput::Stderr).is_ok());
    tracing::info!("logging initialized");
}

#[cfg(target_os = "linux")]
#[test]
fn test_initialize_logging_retries_after_failure() {
    let tmpdir = testing::init();
    // A state dir underneath a regular file can never be created.
    let blocker = tmpdir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    std::env::set_var("XDG_STATE_HOME", blocker.join("state"));
    assert!(initialize_logging(LogOutput::File).is_err());
    assert!(initialize_logging(LogOutput::File).is_err());

    std::env::set_var("XDG_STATE_HOME", tmpdir.path().join("state"));
    assert!(initialize_logging(LogOutput::File).is_ok());
    assert!(tmpdir.path().join("state/tagpath").is_dir());
    std::env::remove_var("XDG_STATE_HOME");
}
