use geo::algorithm::bounding_rect::BoundingRect;
use geo_types::Geometry;
use wkt::TryFromWkt;

use crate::bounding_box::BoundingBox;
use crate::error::{Error, Result};
use crate::tile::TileCoordinate;

/// A download region described as WKT text.
///
/// The text is parsed once on construction. A region that fails to parse is
/// still a value: every query on it reports the parse failure, so callers
/// decide per query whether that is fatal.
///
/// # Example
/// ```rust
/// # use grid_tile_downloader::{BoundingBox, Region};
/// let region = Region::from_wkt("POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))");
/// assert_eq!(
///     region.envelope().unwrap(),
///     Some(BoundingBox::new(1.0, 1.0, 0.0, 0.0)),
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    wkt: String,
    envelope: std::result::Result<Option<BoundingBox>, String>,
}

impl Region {
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        let wkt = wkt.into();
        let envelope = Geometry::<f64>::try_from_wkt_str(&wkt)
            .map(|geometry| geometry.bounding_rect().map(BoundingBox::from))
            .map_err(|e| e.to_string());

        Self { wkt, envelope }
    }

    pub fn wkt(&self) -> &str {
        &self.wkt
    }

    /// The axis-aligned bounding box of the region's geometry.
    ///
    /// `Ok(None)` if the geometry is valid but empty.
    pub fn envelope(&self) -> Result<Option<BoundingBox>> {
        self.envelope.clone().map_err(Error::GeometryParse)
    }

    /// All tiles covering the region at `zoom`.
    ///
    /// Distinguishes three cases: the tiles covering the region, `Ok(None)`
    /// when the geometry is valid but covers no tile, and an error when the
    /// region is not valid WKT ([`Error::GeometryParse`]) or spans more tiles
    /// than can be counted ([`Error::TooManyTiles`]).
    pub fn coverage(&self, zoom: u8) -> Result<Option<Vec<TileCoordinate>>> {
        let bbox = match self.envelope()? {
            Some(bbox) => bbox,
            None => return Ok(None),
        };

        if bbox.tile_count(zoom).is_none() {
            return Err(Error::TooManyTiles { zoom });
        }

        Ok(bbox.tiles(zoom))
    }

    /// Number of tiles [`Region::coverage`] yields at `zoom`, without
    /// enumerating them.
    pub fn tile_count(&self, zoom: u8) -> Result<usize> {
        match self.envelope()? {
            Some(bbox) => bbox.tile_count(zoom).ok_or(Error::TooManyTiles { zoom }),
            None => Ok(0),
        }
    }
}
