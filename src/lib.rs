//! Download the map tiles covering a region to your disk en-masse.
//!
//! Tiles are laid out on a uniform equirectangular degree grid: at zoom
//! level `z` every tile spans `360 / 2^z` degrees in both directions,
//! columns counting eastwards from the antimeridian and rows southwards from
//! the north pole. Tiles are stored as `{output}/{zoom}/{column}/{row}.png`;
//! tiles already present are never fetched again.
//!
//! **Use with caution.** Downloading tiles en-masse can hog down a tile
//! server easily.
//!
//! # CLI Example
//!
//! ```bash
//! grid-tile-downloader \
//!   --region "POLYGON((6.031 50.7492, 6.1649 50.7492, 6.1649 50.811, 6.031 50.811, 6.031 50.7492))" \
//!   --url "http://tiles.example.com/maps/vt" \
//!   --min-zoom 8 \
//!   --max-zoom 12 \
//!   --output ./tiles
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use grid_tile_downloader::{download, Config, Region, UrlFormat, ZoomRange};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut config = Config::new(
//!     Region::from_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))"),
//!     ZoomRange::new(1, 10).unwrap(),
//!     UrlFormat::from_base("http://tiles.example.com/maps/vt"),
//!     "./tiles",
//! );
//! config.workers = 8;
//! config.connect_timeout = Duration::from_secs(5);
//!
//! download(config).await.expect("failed fetching tiles");
//! # }
//! ```

mod bounding_box;
mod config;
mod error;
mod fetch;
mod pool;
mod region;
mod source;
mod task;
mod tile;
mod url;

pub use crate::bounding_box::BoundingBox;
pub use crate::config::{Config, ZoomRange, DEFAULT_CONNECT_TIMEOUT, DEFAULT_WORKERS};
pub use crate::error::{BoxError, Error, Result};
pub use crate::fetch::{download, download_region, download_with};
pub use crate::pool::WorkerPool;
pub use crate::region::Region;
pub use crate::source::{HttpSource, TileSource, TileStream};
pub use crate::task::{fetch_tile, FetchOutcome, FetchTask};
pub use crate::tile::{resolution, TileCoordinate};
pub use crate::url::UrlFormat;
