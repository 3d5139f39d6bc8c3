//! Span definitions per operation: assess, reconcile, refit, mesh sync.

/// Create an assess span.
#[macro_export]
macro_rules! assess_span {
    ($repository:expr, $pr_id:expr) => {
        tracing::info_span!("verdict.assess", repository = %$repository, pr_id = $pr_id)
    };
}

/// Create a reconcile span.
#[macro_export]
macro_rules! reconcile_span {
    ($record_id:expr) => {
        tracing::info_span!("verdict.reconcile", record = %$record_id)
    };
}

/// Create a refit span.
#[macro_export]
macro_rules! refit_span {
    () => {
        tracing::info_span!("verdict.refit")
    };
}

/// Create a mesh sync span.
#[macro_export]
macro_rules! mesh_sync_span {
    ($repository:expr) => {
        tracing::info_span!("verdict.mesh_sync", repository = %$repository)
    };
}
