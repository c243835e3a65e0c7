use grid_tile_downloader::{Region, TileCoordinate, UrlFormat};

pub fn is_numeric_min(
    min: usize,
) -> impl Fn(&str) -> Result<usize, String> + Clone + Send + Sync + 'static {
    move |v: &str| {
        let val = v
            .parse::<usize>()
            .map_err(|_| "must be numeric".to_owned())?;

        if val < min {
            return Err(format!("must be >= {}", min));
        }

        Ok(val)
    }
}

pub fn is_wkt(v: &str) -> Result<String, String> {
    Region::from_wkt(v)
        .envelope()
        .map(|_| v.to_owned())
        .map_err(|e| e.to_string())
}

pub fn is_url_base(v: &str) -> Result<String, String> {
    UrlFormat::from_base(v)
        .tile_url(&TileCoordinate::new(0, 0), 0)
        .map(|_| v.to_owned())
        .map_err(|e| e.report())
}
