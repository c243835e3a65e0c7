use std::{ops::RangeInclusive, path::PathBuf, time::Duration};

use crate::error::{Error, Result};
use crate::region::Region;
use crate::tile::TileCoordinate;
use crate::url::UrlFormat;

/// Number of tiles fetched in parallel unless configured otherwise.
pub const DEFAULT_WORKERS: usize = 4;

/// How long to wait for a connection to the tile server.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// An inclusive range of zoom levels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ZoomRange {
    min: u8,
    max: u8,
}

impl ZoomRange {
    pub fn new(min: u8, max: u8) -> Result<Self> {
        if min > max {
            return Err(Error::InvalidZoomRange { min, max });
        }

        Ok(Self { min, max })
    }

    /// A range covering only `zoom`.
    pub fn single(zoom: u8) -> Self {
        Self {
            min: zoom,
            max: zoom,
        }
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    /// The zoom levels in ascending order.
    pub fn levels(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }
}

/// Tile fetching configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The region to cover with tiles.
    pub region: Region,

    /// The zoom levels to download.
    pub zoom: ZoomRange,

    /// The URL to download individual tiles from.
    pub url: UrlFormat,

    /// The folder to output the data to.
    pub output_folder: PathBuf,

    /// Number of workers fetching tiles in parallel.
    pub workers: usize,

    /// Timeout for connecting to the tile server.
    ///
    /// Pass the zero duration to disable the timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Creates a configuration with the default worker count and timeout.
    pub fn new(
        region: Region,
        zoom: ZoomRange,
        url: UrlFormat,
        output_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            region,
            zoom,
            url,
            output_folder: output_folder.into(),
            workers: DEFAULT_WORKERS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Creates an iterator over all tiles of the region, level by level.
    ///
    /// Levels on which the region has no coverage, or whose region fails to
    /// parse, contribute nothing.
    pub fn tiles(&self) -> impl Iterator<Item = (u8, TileCoordinate)> + '_ {
        self.zoom.levels().flat_map(move |zoom| {
            self.region
                .coverage(zoom)
                .ok()
                .flatten()
                .unwrap_or_default()
                .into_iter()
                .map(move |tile| (zoom, tile))
        })
    }

    /// Number of tiles a download would fetch at most.
    ///
    /// Counts each level arithmetically instead of enumerating its tiles.
    /// Fails if the region is not valid WKT or the total does not fit into a
    /// `usize`.
    pub fn tile_count(&self) -> Result<usize> {
        let mut count = 0usize;
        for zoom in self.zoom.levels() {
            count = count
                .checked_add(self.region.tile_count(zoom)?)
                .ok_or(Error::TooManyTiles { zoom })?;
        }

        Ok(count)
    }
}
