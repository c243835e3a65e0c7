use std::{io, path::PathBuf};

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error carried by transport failures so that any [`TileSource`]
/// can report them.
///
/// [`TileSource`]: crate::TileSource
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The region description is not valid WKT.
    #[error("failed parsing region geometry: {0}")]
    GeometryParse(String),

    /// The tile URL built from the configured base is not a valid URL.
    #[error("invalid tile URL {url:?}, check the configured base URL")]
    UrlConfig {
        url: String,
        #[source]
        source: BoxError,
    },

    /// Connecting to or reading from the tile server failed.
    #[error("failed fetching {url}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The tile server answered with a non-success status.
    #[error("received status {status} fetching {url}")]
    Status { url: String, status: StatusCode },

    /// Creating a directory or writing a tile file failed.
    #[error("failed writing {path:?}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The region spans more tiles at a zoom level than can be counted.
    #[error("the region spans too many tiles at zoom {zoom}")]
    TooManyTiles { zoom: u8 },

    #[error("output {0:?} exists and is not a directory")]
    NotADirectory(PathBuf),

    #[error("invalid zoom range {min}..={max}, the minimum must not exceed the maximum")]
    InvalidZoomRange { min: u8, max: u8 },

    #[error("failed creating HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

impl Error {
    /// Renders the error together with its chain of sources.
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            report.push_str(": ");
            report.push_str(&cause.to_string());
            source = cause.source();
        }
        report
    }

    pub(crate) fn storage(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Error::Storage { path, source }
    }
}
