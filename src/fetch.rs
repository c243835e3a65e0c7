use std::{io, path::Path, sync::Arc};

use tokio::fs;
use tracing::{debug, error, info};

use crate::config::{Config, ZoomRange};
use crate::error::{Error, Result};
use crate::pool::WorkerPool;
use crate::region::Region;
use crate::source::{HttpSource, TileSource};
use crate::task::FetchTask;
use crate::url::UrlFormat;

/// Downloads all tiles covering `region` (WKT) from `min_zoom` to `max_zoom`
/// into `output_folder`, using the default worker count and connect timeout.
///
/// See [`download`] for the details.
///
/// # Example
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() {
/// grid_tile_downloader::download_region(
///     "POLYGON((6.031 50.7492, 6.1649 50.7492, 6.1649 50.811, 6.031 50.811, 6.031 50.7492))",
///     8,
///     12,
///     "http://tiles.example.com/maps/vt",
///     "./tiles",
/// )
/// .await
/// .expect("failed fetching tiles");
/// # }
/// ```
pub async fn download_region(
    region: &str,
    min_zoom: u8,
    max_zoom: u8,
    url_base: &str,
    output_folder: impl AsRef<Path>,
) -> Result<()> {
    let config = Config::new(
        Region::from_wkt(region),
        ZoomRange::new(min_zoom, max_zoom)?,
        UrlFormat::from_base(url_base),
        output_folder.as_ref(),
    );

    download(config).await
}

/// Asynchronously fetch the tiles specified in `cfg` over HTTP and save them
/// to the file system.
///
/// Creates the required directories on demand and skips tiles that already
/// exist at the destination.
pub async fn download(cfg: Config) -> Result<()> {
    let source = HttpSource::new(cfg.connect_timeout)?;
    download_with(cfg, source).await
}

/// Fetch the tiles specified in `cfg` from `source` and save them to the file
/// system.
///
/// All tiles of all zoom levels go through one pool of `cfg.workers`
/// workers; this returns once every one of them has been fetched, skipped or
/// has failed. Failing tiles and levels whose region cannot be parsed are
/// logged and do not fail the download. Only an output path that exists but
/// is not a directory, or cannot be inspected at all, does.
pub async fn download_with<S: TileSource>(cfg: Config, source: S) -> Result<()> {
    let output_folder = cfg.output_folder.as_path();

    // a missing output folder is created along with the first tile
    match fs::metadata(output_folder).await {
        Ok(metadata) if !metadata.is_dir() => {
            return Err(Error::NotADirectory(output_folder.to_owned()));
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(Error::Storage {
                path: output_folder.to_owned(),
                source,
            })
        }
    }

    let url = Arc::new(cfg.url.clone());
    let output_folder: Arc<Path> = Arc::from(output_folder);
    let pool = WorkerPool::new(cfg.workers, Arc::new(source));

    let mut submitted = 0usize;
    for zoom in cfg.zoom.levels() {
        let tiles = match cfg.region.coverage(zoom) {
            Ok(Some(tiles)) => tiles,
            Ok(None) => {
                debug!("region covers no tiles at zoom {}", zoom);
                continue;
            }
            Err(e) => {
                error!("skipping zoom {}: {}", zoom, e.report());
                continue;
            }
        };

        info!("queueing {} tiles at zoom {}", tiles.len(), zoom);
        submitted += tiles.len();

        for tile in tiles {
            pool.submit(FetchTask {
                tile,
                zoom,
                url: Arc::clone(&url),
                output_folder: Arc::clone(&output_folder),
            });
        }
    }

    let failed = pool.join().await;
    info!("finished {} tiles, {} failed", submitted, failed);

    Ok(())
}
