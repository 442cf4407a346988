use thiserror::Error;

/// Errors raised while loading contaminants or building their indices.
///
/// Every error leaves the loader reset; nothing from the failed call is kept.
#[derive(Error, Debug)]
pub enum ContamError {
    #[error("parameter error: {0}")]
    Parameter(String),

    #[error("illegal base '{base}' in contaminant '{name}', only A,C,G,T,N accepted")]
    Base { name: String, base: char },

    #[error("duplicate contaminant: {0}")]
    Duplicate(String),

    #[error("unable to allocate memory for {0}")]
    Memory(String),

    #[error("unable to read contaminants file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ContamError {
    pub(crate) fn memory(what: impl Into<String>) -> impl FnOnce(std::collections::TryReserveError) -> Self {
        let what = what.into();
        move |_| ContamError::Memory(what)
    }
}
