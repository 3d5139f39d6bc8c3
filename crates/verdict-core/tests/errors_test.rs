use verdict_core::errors::*;
use verdict_core::SignalKind;

#[test]
fn lock_timeout_carries_resource_and_wait() {
    let err = VerdictError::LockTimeout {
        resource: "weight_state".into(),
        waited_ms: 2000,
    };
    let msg = err.to_string();
    assert!(msg.contains("weight_state"));
    assert!(msg.contains("2000"));
    assert!(err.is_recoverable());
    assert_eq!(err.kind(), "lock_timeout");
}

#[test]
fn missing_signal_names_the_signal() {
    let err = VerdictError::MissingSignal {
        signal: SignalKind::Severity,
        category: "security".into(),
    };
    assert!(err.to_string().contains("severity"));
    assert!(err.is_recoverable());
}

#[test]
fn not_found_is_surfaced_not_recovered() {
    let err = VerdictError::NotFound {
        id: "acme#7@2026-01-01T00:00:00.000000Z".into(),
    };
    assert!(err.to_string().contains("acme#7"));
    assert!(!err.is_recoverable());
}

#[test]
fn corruption_and_schema_mismatch_are_recoverable() {
    let corruption = VerdictError::StoreCorruption {
        details: "file is not a database".into(),
    };
    let mismatch = VerdictError::SchemaMismatch {
        expected: "diff, category".into(),
        found: "depth".into(),
    };
    assert!(corruption.is_recoverable());
    assert!(mismatch.is_recoverable());
}

#[test]
fn storage_error_converts_to_verdict_error() {
    let storage_err = StorageError::SqliteError {
        message: "disk full".into(),
    };
    let err: VerdictError = storage_err.into();
    assert!(matches!(err, VerdictError::StorageError(_)));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn serde_error_converts_to_verdict_error() {
    let serde_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: VerdictError = serde_err.into();
    assert!(matches!(err, VerdictError::SerializationError(_)));
}
