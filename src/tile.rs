use std::{fmt, path::Path, path::PathBuf};

/// Degrees spanned by one tile edge at zoom level zero.
const WORLD_SPAN_DEG: f64 = 360_f64;

/// Returns the edge length (in degrees) of a tile at the given zoom level.
///
/// The grid is a uniform equirectangular degree grid: both axes use the same
/// resolution, and it halves with every zoom level.
pub fn resolution(zoom: u8) -> f64 {
    WORLD_SPAN_DEG / 2_f64.powi(zoom as i32)
}

/// A tile of the equirectangular grid, identified by column and row within
/// a single zoom level.
///
/// Columns count eastwards from the antimeridian, rows southwards from the
/// north pole.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TileCoordinate {
    pub column: i64,
    pub row: i64,
}

impl TileCoordinate {
    pub fn new(column: i64, row: i64) -> Self {
        Self { column, row }
    }

    /// Computes the tile containing the given point (in degrees) at `zoom`.
    ///
    /// Out-of-range coordinates are not rejected, they simply map to tiles
    /// outside the grid.
    ///
    /// # Example
    /// ```rust
    /// # use grid_tile_downloader::TileCoordinate;
    /// let tile = TileCoordinate::from_coords_and_zoom(0.5, 0.5, 8);
    /// assert_eq!(tile, TileCoordinate::new(128, 63));
    /// ```
    pub fn from_coords_and_zoom(longitude: f64, latitude: f64, zoom: u8) -> Self {
        let res = resolution(zoom);

        Self::new(
            cell_index(180_f64 + longitude, res),
            cell_index(90_f64 - latitude, res),
        )
    }

    /// The path of this tile's image below `root`: `{root}/{zoom}/{column}/{row}.png`.
    pub fn file_path(&self, root: &Path, zoom: u8) -> PathBuf {
        let mut target = root.join(zoom.to_string());
        target.push(self.column.to_string());
        target.push(format!("{}.png", self.row));
        target
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.column, self.row)
    }
}

/// Index of the cell an offset from the grid origin falls into. Cells are
/// closed on their far edge; the origin edge itself belongs to the first cell.
fn cell_index(offset: f64, resolution: f64) -> i64 {
    if offset == 0_f64 {
        return 0;
    }

    (offset / resolution).ceil() as i64 - 1
}
