use maplit::hashmap;
use strfmt::strfmt;
use url::Url;

use crate::error::{Error, Result};
use crate::tile::TileCoordinate;

/// Builds tile URLs from a configured base.
///
/// A plain base URL gets the imagery tile request appended as query
/// parameters: `{base}?T=img_c&x={column}&y={row}&l={zoom}`. A base that
/// already contains the format specifiers `{x}`, `{y}` and `{z}` is used as
/// the template directly.
#[derive(Clone, Debug, PartialEq)]
pub struct UrlFormat {
    base: String,
    template: String,
}

impl UrlFormat {
    pub fn from_base(base: impl Into<String>) -> Self {
        let base = base.into();
        let template = if base.contains('{') {
            base.clone()
        } else {
            format!("{}?T=img_c&x={{x}}&y={{y}}&l={{z}}", base)
        };

        Self { base, template }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// The URL to fetch `tile` at `zoom` from.
    ///
    /// Fails with [`Error::UrlConfig`] if the template has unknown specifiers
    /// or the result is not an absolute URL.
    pub fn tile_url(&self, tile: &TileCoordinate, zoom: u8) -> Result<Url> {
        let vars = hashmap! {
            "x".to_owned() => tile.column.to_string(),
            "y".to_owned() => tile.row.to_string(),
            "z".to_owned() => zoom.to_string(),
        };

        let formatted = strfmt(&self.template, &vars).map_err(|e| Error::UrlConfig {
            url: self.template.clone(),
            source: e.into(),
        })?;

        match Url::parse(&formatted) {
            Ok(url) => Ok(url),
            Err(e) => Err(Error::UrlConfig {
                url: formatted,
                source: e.into(),
            }),
        }
    }
}
