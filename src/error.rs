//! Rich diagnostic error types for the ski-loop engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains. Only durable-state and
//! configuration problems are errors: degenerate input, empty graphs and dead-end
//! walks are ordinary outcomes of an iteration.

use miette::Diagnostic;
use thiserror::Error;

use crate::paths::PathError;

/// Top-level error type for the ski-loop engine.
#[derive(Debug, Error, Diagnostic)]
pub enum SkiError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(ski::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("redb error: {message}")]
    #[diagnostic(
        code(ski::store::redb),
        help(
            "The knowledge store could not be opened or updated. If another `ski` \
             process is running against the same store, wait for it to finish. \
             Otherwise the file may be corrupt: move it aside to start from an \
             empty history."
        )
    )]
    Redb { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(ski::store::serde),
        help(
            "A stored atomic or triple could not be decoded. The store was probably \
             written by an incompatible version. No data was overwritten."
        )
    )]
    Serialization { message: String },

    #[error("iteration counter exhausted at {last_iteration}")]
    #[diagnostic(
        code(ski::store::iteration_overflow),
        help(
            "The stored history ends at the largest representable iteration. \
             Pass an explicit `--iteration` to keep going."
        )
    )]
    IterationOverflow { last_iteration: u64 },

    #[error("in-memory store lock poisoned")]
    #[diagnostic(
        code(ski::store::poisoned),
        help("A previous iteration panicked while holding the store. Recreate the store.")
    )]
    Poisoned,
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ski::config::read),
        help("Ensure the config file is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(ski::config::parse),
        help("Check the TOML syntax. Unknown keys are rejected; omitted keys take defaults.")
    )]
    Parse { path: String, message: String },

    #[error("failed to serialize config for {path}: {message}")]
    #[diagnostic(
        code(ski::config::serialize),
        help("A configuration value has no TOML representation.")
    )]
    Serialize { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(ski::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(ski::config::invalid), help("{message}"))]
    Invalid { message: String },
}

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("reachability depth {depth} outside supported range 1..={max_depth}")]
    #[diagnostic(
        code(ski::graph::depth_out_of_range),
        help(
            "Depth-limited expansion grows quickly on dense graphs. \
             Set `reach_depth` between 1 and {max_depth}."
        )
    )]
    DepthOutOfRange { depth: usize, max_depth: usize },
}

/// Convenience alias for functions returning ski-loop results.
pub type SkiResult<T> = std::result::Result<T, SkiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_to_ski_error() {
        let err = StoreError::Serialization {
            message: "truncated".into(),
        };
        let ski: SkiError = err.into();
        assert!(matches!(ski, SkiError::Store(StoreError::Serialization { .. })));
    }

    #[test]
    fn graph_error_display_names_range() {
        let err = GraphError::DepthOutOfRange {
            depth: 9,
            max_depth: 6,
        };
        let msg = format!("{err}");
        assert!(msg.contains('9'));
        assert!(msg.contains("1..=6"));
    }

    #[test]
    fn config_error_is_transparent() {
        let err: SkiError = ConfigError::Invalid {
            message: "walk_primes must be > 1".into(),
        }
        .into();
        assert!(format!("{err}").contains("walk_primes"));
    }
}
