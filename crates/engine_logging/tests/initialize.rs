use engine_logging::{initialize, LogDestination};
use log::LevelFilter;
use tempfile::TempDir;

#[test]
fn file_destination_without_writable_path_installs_nothing() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("no_such_dir").join("clipqueue.log");

    let installed = initialize(LogDestination::File, LevelFilter::Info, &missing);

    assert!(!installed);
    assert!(!missing.exists());
}

#[test]
fn destination_defaults_to_file() {
    assert_eq!(LogDestination::default(), LogDestination::File);
}
