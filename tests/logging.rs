use hxv::logging::{self, LogTarget};

#[test]
fn file_log_is_written_once_guard_drops() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hxv.log");

    let guard = logging::init(LogTarget::File(&path)).unwrap();
    assert!(guard.is_some());
    tracing::error!(offset = 42, "viewer stopped");
    drop(guard);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("viewer stopped"), "log was: {:?}", contents);
    assert!(contents.contains("offset=42"));
}
