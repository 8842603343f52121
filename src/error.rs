use thiserror::Error;

/// Failures of a derivation. Everything else degrades to a permissive
/// meta-type instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeriveError {
    #[error("unresolved reference `{reference}`: nothing at path `{path}`")]
    UnresolvedReference { reference: String, path: String },

    #[error("unresolved reference `{reference}`: no reference source with id `{id}`")]
    UnknownReferenceSource { reference: String, id: String },

    #[error("`$ref` must be a string, found {found}")]
    InvalidReference { found: String },
}

/// Failures while loading [`crate::DeriveOptions`] from JSON text.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at JSON path {path} → {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = DeriveError> = std::result::Result<T, E>;
