use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::StreamExt;
use tempfile::NamedTempFile;
use tokio::{
    fs,
    io::{AsyncWriteExt, BufWriter},
    task,
};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::source::TileSource;
use crate::tile::TileCoordinate;
use crate::url::UrlFormat;

/// The result of fetching a single tile.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The tile was downloaded and written to disk.
    Downloaded { bytes: u64 },
    /// The tile already existed on disk, nothing was fetched.
    Skipped,
    /// Fetching or storing the tile failed. The failure has been logged.
    Failed(Error),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

/// A single tile to fetch, handed to exactly one worker.
#[derive(Clone, Debug)]
pub struct FetchTask {
    pub tile: TileCoordinate,
    pub zoom: u8,
    pub url: Arc<UrlFormat>,
    pub output_folder: Arc<Path>,
}

impl FetchTask {
    /// Where this task's tile is stored.
    pub fn path(&self) -> PathBuf {
        self.tile.file_path(&self.output_folder, self.zoom)
    }

    pub async fn execute<S: TileSource>(&self, source: &S) -> FetchOutcome {
        fetch_tile(source, self.tile, self.zoom, &self.url, &self.output_folder).await
    }
}

/// Fetches the given tile from `source` and saves it below `output_folder`,
/// unless it has been downloaded before.
///
/// The body is streamed into a temporary file next to the tile and only
/// renamed onto the tile's path once it has been written completely. A
/// failed download therefore never leaves a partial tile behind that a later
/// run would mistake for a finished one.
///
/// Failures are logged here and returned as [`FetchOutcome::Failed`].
pub async fn fetch_tile<S: TileSource>(
    source: &S,
    tile: TileCoordinate,
    zoom: u8,
    url_fmt: &UrlFormat,
    output_folder: &Path,
) -> FetchOutcome {
    match try_fetch_tile(source, tile, zoom, url_fmt, output_folder).await {
        Ok(FetchOutcome::Downloaded { bytes }) => {
            debug!(
                "downloaded tile {}x{}x{} ({} bytes)",
                zoom, tile.column, tile.row, bytes
            );
            FetchOutcome::Downloaded { bytes }
        }
        Ok(outcome) => {
            debug!("tile {}x{}x{} exists, skipping", zoom, tile.column, tile.row);
            outcome
        }
        Err(e) => {
            if let Error::UrlConfig { .. } = e {
                error!(
                    "base URL {:?} does not produce a valid tile URL: {}",
                    url_fmt.base(),
                    e.report(),
                );
            } else {
                error!(
                    "failed fetching tile {}x{}x{}: {}",
                    zoom,
                    tile.column,
                    tile.row,
                    e.report(),
                );
            }

            FetchOutcome::Failed(e)
        }
    }
}

async fn try_fetch_tile<S: TileSource>(
    source: &S,
    tile: TileCoordinate,
    zoom: u8,
    url_fmt: &UrlFormat,
    output_folder: &Path,
) -> Result<FetchOutcome> {
    let output_file = tile.file_path(output_folder, zoom);

    // if the tile's already been downloaded, skip it
    if fs::try_exists(&output_file)
        .await
        .map_err(Error::storage(&output_file))?
    {
        return Ok(FetchOutcome::Skipped);
    }

    let url = url_fmt.tile_url(&tile, zoom)?;
    let mut body = source.open(&url).await?;

    let target_dir = output_file.parent().unwrap_or(output_folder);
    fs::create_dir_all(target_dir)
        .await
        .map_err(Error::storage(target_dir))?;

    // removed on drop unless persisted
    let dir = target_dir.to_owned();
    let partial = blocking(target_dir, move || NamedTempFile::new_in(dir)).await?;
    let file = fs::OpenOptions::new()
        .write(true)
        .open(partial.path())
        .await
        .map_err(Error::storage(partial.path()))?;
    let mut writer = BufWriter::new(file);

    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        writer
            .write_all(&chunk)
            .await
            .map_err(Error::storage(partial.path()))?;
        written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(Error::storage(partial.path()))?;
    drop(writer);

    let target = output_file.clone();
    blocking(&output_file, move || {
        partial.persist(target).map(drop).map_err(|e| e.error)
    })
    .await?;

    Ok(FetchOutcome::Downloaded { bytes: written })
}

/// Runs a blocking file system operation on the blocking thread pool.
async fn blocking<T, F>(path: &Path, op: F) -> Result<T>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(op)
        .await
        .unwrap_or_else(|e| Err(io::Error::new(io::ErrorKind::Other, e)))
        .map_err(Error::storage(path))
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use bytes::Bytes;
    use futures::stream;
    use reqwest::StatusCode;
    use tempfile::TempDir;
    use url::Url;

    use super::*;
    use crate::source::TileStream;

    /// Serves the same body for every URL. `None` chunks fail the stream.
    struct MockSource {
        chunks: Vec<Option<&'static str>>,
        status: Option<StatusCode>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn serving(chunks: Vec<Option<&'static str>>) -> Self {
            Self {
                chunks,
                status: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn answering(status: StatusCode) -> Self {
            Self {
                chunks: Vec::new(),
                status: Some(status),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TileSource for MockSource {
        async fn open(&self, url: &Url) -> Result<TileStream> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(status) = self.status {
                return Err(Error::Status {
                    url: url.to_string(),
                    status,
                });
            }

            let chunks: Vec<Result<Bytes>> = self
                .chunks
                .iter()
                .map(|chunk| match *chunk {
                    Some(data) => Ok(Bytes::from_static(data.as_bytes())),
                    None => Err(Error::Transport {
                        url: url.to_string(),
                        source: io::Error::new(io::ErrorKind::ConnectionReset, "reset").into(),
                    }),
                })
                .collect();

            Ok(stream::iter(chunks).boxed())
        }
    }

    fn url_format() -> UrlFormat {
        UrlFormat::from_base("http://tiles.example.com/vt")
    }

    #[tokio::test]
    async fn downloads_into_level_column_row_layout() {
        let dir = TempDir::new().unwrap();
        let source = MockSource::serving(vec![Some("tile"), Some("body")]);

        let outcome =
            fetch_tile(&source, TileCoordinate::new(127, 63), 8, &url_format(), dir.path()).await;

        assert!(matches!(outcome, FetchOutcome::Downloaded { bytes: 8 }));
        let path = dir.path().join("8").join("127").join("63.png");
        assert_eq!(std::fs::read(path).unwrap(), b"tilebody");
    }

    #[tokio::test]
    async fn second_fetch_is_skipped() {
        let dir = TempDir::new().unwrap();
        let source = MockSource::serving(vec![Some("tile")]);
        let tile = TileCoordinate::new(1, 2);

        let first = fetch_tile(&source, tile, 3, &url_format(), dir.path()).await;
        let bytes_after_first = std::fs::read(tile.file_path(dir.path(), 3)).unwrap();
        let second = fetch_tile(&source, tile, 3, &url_format(), dir.path()).await;

        assert!(matches!(first, FetchOutcome::Downloaded { .. }));
        assert!(matches!(second, FetchOutcome::Skipped));
        assert_eq!(source.calls(), 1);
        assert_eq!(
            std::fs::read(tile.file_path(dir.path(), 3)).unwrap(),
            bytes_after_first
        );
    }

    #[tokio::test]
    async fn existing_tile_is_left_untouched() {
        let dir = TempDir::new().unwrap();
        let column_dir = dir.path().join("5").join("3");
        std::fs::create_dir_all(&column_dir).unwrap();
        std::fs::write(column_dir.join("7.png"), b"old").unwrap();
        let source = MockSource::serving(vec![Some("new")]);

        let outcome =
            fetch_tile(&source, TileCoordinate::new(3, 7), 5, &url_format(), dir.path()).await;

        assert!(matches!(outcome, FetchOutcome::Skipped));
        assert_eq!(source.calls(), 0);
        assert_eq!(std::fs::read(column_dir.join("7.png")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn error_status_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let source = MockSource::answering(StatusCode::NOT_FOUND);

        let outcome =
            fetch_tile(&source, TileCoordinate::new(0, 0), 1, &url_format(), dir.path()).await;

        match outcome {
            FetchOutcome::Failed(Error::Status { status, url }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(url, "http://tiles.example.com/vt?T=img_c&x=0&y=0&l=1");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(!dir.path().join("1").exists());
    }

    #[tokio::test]
    async fn interrupted_body_leaves_no_partial_tile() {
        let dir = TempDir::new().unwrap();
        let source = MockSource::serving(vec![Some("half"), None]);
        let tile = TileCoordinate::new(4, 2);

        let outcome = fetch_tile(&source, tile, 3, &url_format(), dir.path()).await;

        assert!(matches!(outcome, FetchOutcome::Failed(Error::Transport { .. })));
        let column_dir = dir.path().join("3").join("4");
        assert_eq!(std::fs::read_dir(&column_dir).unwrap().count(), 0);

        // a later run fetches the tile again
        let source = MockSource::serving(vec![Some("whole")]);
        let outcome = fetch_tile(&source, tile, 3, &url_format(), dir.path()).await;
        assert!(matches!(outcome, FetchOutcome::Downloaded { bytes: 5 }));
    }

    #[tokio::test]
    async fn malformed_base_url_is_reported_without_fetching() {
        let dir = TempDir::new().unwrap();
        let source = MockSource::serving(vec![Some("tile")]);
        let url_fmt = UrlFormat::from_base("not a url");

        let outcome =
            fetch_tile(&source, TileCoordinate::new(0, 0), 0, &url_fmt, dir.path()).await;

        assert!(matches!(outcome, FetchOutcome::Failed(Error::UrlConfig { .. })));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn blocking_failures_carry_the_path() {
        let path = Path::new("tiles/3/4");

        let err = blocking(path, || -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Storage { path: p, .. } if p == path));
        assert_eq!(blocking(path, || Ok(7)).await.unwrap(), 7);
    }

    #[test]
    fn task_path() {
        let task = FetchTask {
            tile: TileCoordinate::new(3, 7),
            zoom: 5,
            url: Arc::new(url_format()),
            output_folder: Arc::from(Path::new("tiles")),
        };

        assert_eq!(task.path(), Path::new("tiles/5/3/7.png"));
    }
}
