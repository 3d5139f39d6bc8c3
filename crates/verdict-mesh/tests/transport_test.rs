//! File and in-memory transports.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use verdict_core::WeightVector;
use verdict_mesh::{FileTransport, InMemoryTransport, MeshState, MeshTransport, RepoSnapshot};

fn state() -> MeshState {
    state_at(7)
}

fn state_at(clock: u64) -> MeshState {
    MeshState::from_snapshot(RepoSnapshot::new(
        "acme/api",
        WeightVector::from_raw([0.4, 0.3, 0.2, 0.1]).unwrap(),
        clock,
        42,
        BTreeMap::new(),
    ))
}

fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn file_transport_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let transport = FileTransport::new(dir.path().join("mesh.json"));
    assert!(transport.fetch().unwrap().is_none());

    transport.publish(&state()).unwrap();
    assert_eq!(transport.fetch().unwrap(), Some(state()));
    assert_eq!(file_names(dir.path()), vec!["mesh.json".to_string()]);
}

#[test]
fn concurrent_file_publishers_leave_one_complete_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = Arc::new(dir.path().join("mesh.json"));

    let handles: Vec<_> = (0..8u64)
        .map(|clock| {
            let path = Arc::clone(&path);
            thread::spawn(move || {
                let transport = FileTransport::new(path.as_path());
                for _ in 0..10 {
                    transport.publish(&state_at(clock)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let published = FileTransport::new(path.as_path()).fetch().unwrap().unwrap();
    let clock = published.member("acme/api").unwrap().clock;
    assert!(clock < 8);
    assert_eq!(published, state_at(clock));
    assert_eq!(file_names(dir.path()), vec!["mesh.json".to_string()]);
}

#[test]
fn file_transport_rejects_foreign_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mesh.json");
    std::fs::write(
        &path,
        r#"{"members":{"x":{"repository_id":"x","weights":{"clarity":1.0},"clock":1,"sample_count":1,"categories":{}}}}"#,
    )
    .unwrap();
    let err = FileTransport::new(&path).fetch().unwrap_err();
    assert_eq!(err.kind(), "serialization_error");
}

#[test]
fn in_memory_transport_records_publications() {
    let transport = InMemoryTransport::new();
    assert!(transport.fetch().unwrap().is_none());
    transport.publish(&state()).unwrap();
    assert_eq!(transport.fetch().unwrap(), Some(state()));
    assert_eq!(transport.published().len(), 1);
}
