use thiserror::Error;

/// Fatal, structural failures of the engine contract.
///
/// These are distinct from per-cell findings: when one is raised no row has
/// been validated and no partial report exists.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("row {line} has {found} cell(s) but the header declares {expected} column(s)")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}
