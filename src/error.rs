//! Error type shared by setup, translation and the event loop.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected before any device is opened.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no input device matches {0:?}")]
    NotFound(String),

    #[error("cannot query touchscreen {what}: {source}")]
    Probe {
        what: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("synthetic device setup failed at {step}: {source}")]
    Setup {
        step: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("input read failed: {0}")]
    Read(#[source] io::Error),

    #[error("output write failed: {0}")]
    Write(#[source] io::Error),
}

impl Error {
    pub fn setup(step: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::Setup { step, source }
    }

    pub fn probe(what: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Error::Probe { what, source }
    }
}
