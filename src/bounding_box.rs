use geo_types::Rect;

use crate::tile::{resolution, TileCoordinate};

/// A bounding box consisting of north, east, south and west coordinate boundaries
/// given in degrees.
///
/// # Example
/// ```rust
/// # use grid_tile_downloader::BoundingBox;
/// let aachen_germany = BoundingBox::new(50.811, 6.1649, 50.7492, 6.031);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub west: f64,
    pub east: f64,
    pub south: f64,
}

impl BoundingBox {
    /// Create a new bounding box from the specified coordinates in degrees
    /// (-180 to 180° longitude, -90 to 90° latitude).
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> Self {
        BoundingBox {
            north,
            east,
            south,
            west,
        }
    }

    /// The corner the tile enumeration starts from.
    ///
    /// Returned as `(longitude, latitude)`, this is the south-west corner,
    /// i.e. the minimum coordinate of the envelope.
    pub fn reference_corner(&self) -> (f64, f64) {
        (self.west, self.south)
    }

    /// Number of tile columns and rows the box spans at `zoom`.
    fn span(&self, zoom: u8) -> (usize, usize) {
        let size = resolution(zoom);

        let columns = ((self.east - self.west).abs() / size).ceil() as usize;
        let rows = ((self.north - self.south).abs() / size).ceil() as usize;

        (columns, rows)
    }

    /// Number of tiles [`BoundingBox::tiles`] yields at `zoom`, computed
    /// without enumerating them.
    ///
    /// `None` if the count does not fit into a `usize`.
    pub fn tile_count(&self, zoom: u8) -> Option<usize> {
        let (columns, rows) = self.span(zoom);
        columns.checked_mul(rows)
    }

    /// Enumerates all tiles covering the bounding box at `zoom`.
    ///
    /// Steps one tile edge at a time from the tile containing the reference
    /// corner, once per tile the box spans in each direction: eastwards to
    /// the next column, northwards to the previous row. Returns `None` if
    /// the box spans no tile at all (it has zero width or height); a present
    /// result is never empty and never contains a tile twice.
    ///
    /// # Example
    /// ```rust
    /// # use grid_tile_downloader::{BoundingBox, TileCoordinate};
    /// let bbox = BoundingBox::new(1.0, 1.0, 0.0, 0.0);
    /// assert_eq!(bbox.tiles(8), Some(vec![TileCoordinate::new(127, 63)]));
    /// ```
    pub fn tiles(&self, zoom: u8) -> Option<Vec<TileCoordinate>> {
        let (columns, rows) = self.span(zoom);

        if columns == 0 || rows == 0 {
            return None;
        }

        let (lon, lat) = self.reference_corner();
        let origin = TileCoordinate::from_coords_and_zoom(lon, lat, zoom);

        let tiles = (0..columns as i64)
            .flat_map(|i| {
                (0..rows as i64)
                    .map(move |j| TileCoordinate::new(origin.column + i, origin.row - j))
            })
            .collect();

        Some(tiles)
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        let (min, max) = (rect.min(), rect.max());
        Self::new(max.y, max.x, min.y, min.x)
    }
}
