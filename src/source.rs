use std::{future::Future, time::Duration};

use bytes::Bytes;
use futures::{stream::BoxStream, StreamExt, TryStreamExt};
use url::Url;

use crate::error::{Error, Result};

/// Stream of body chunks of a single tile response.
pub type TileStream = BoxStream<'static, Result<Bytes>>;

/// Something tiles can be fetched from.
///
/// The downloader only needs the body of a successful response as a
/// stream of chunks; everything else about the transport stays behind this
/// trait so it can be swapped out in tests.
pub trait TileSource: Send + Sync + 'static {
    /// Opens the tile at `url` and returns its body.
    ///
    /// Fails with [`Error::Status`] on a non-success response and with
    /// [`Error::Transport`] if the server cannot be reached.
    fn open(&self, url: &Url) -> impl Future<Output = Result<TileStream>> + Send;
}

/// Fetches tiles over HTTP(S).
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// Creates a source whose connections time out after `connect_timeout`.
    ///
    /// Pass the zero duration to disable the timeout. There is no timeout on
    /// reading the response.
    pub fn new(connect_timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if connect_timeout > Duration::ZERO {
            builder = builder.connect_timeout(connect_timeout);
        }

        let client = builder.build().map_err(Error::HttpClient)?;

        Ok(Self { client })
    }
}

impl TileSource for HttpSource {
    async fn open(&self, url: &Url) -> Result<TileStream> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Transport {
                url: url.to_string(),
                source: e.into(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status,
            });
        }

        let url = url.to_string();
        let body = response.bytes_stream().map_err(move |e| Error::Transport {
            url: url.clone(),
            source: e.into(),
        });

        Ok(body.boxed())
    }
}
