use clap::{command, value_parser, Arg, ArgAction, ArgMatches};
use std::{convert::TryFrom, path::PathBuf, time::Duration};

use crate::validators::*;
use grid_tile_downloader::{Config, Region, UrlFormat, ZoomRange};

const REGION_ARG: &str = "region";
const URL_ARG: &str = "url";
const ZOOM_ARG: &str = "zoom";
const MIN_ZOOM_ARG: &str = "min_zoom";
const MAX_ZOOM_ARG: &str = "max_zoom";
const OUTPUT_DIR_ARG: &str = "output_dir";
const WORKERS_ARG: &str = "num_workers";
const TIMEOUT_ARG: &str = "timeout";
const DRY_RUN_ARG: &str = "dry_run";

pub struct Args {
    pub region: String,
    pub url: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl TryFrom<Args> for Config {
    type Error = grid_tile_downloader::Error;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let mut config = Config::new(
            Region::from_wkt(args.region),
            ZoomRange::new(args.min_zoom, args.max_zoom)?,
            UrlFormat::from_base(args.url),
            args.output_dir,
        );
        config.workers = args.workers;
        config.connect_timeout = args.timeout;

        Ok(config)
    }
}

impl Args {
    pub fn parse() -> Self {
        Self::from_matches(&get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let (min_zoom, max_zoom) = match matches.get_one::<u8>(ZOOM_ARG) {
            // if `zoom` is set, use it for both min/max
            Some(&zoom) => (zoom, zoom),
            // otherwise, use min/max separately
            None => (
                *matches.get_one(MIN_ZOOM_ARG).expect("defaulted"),
                *matches.get_one(MAX_ZOOM_ARG).expect("defaulted"),
            ),
        };

        Self {
            min_zoom,
            max_zoom,
            region: matches
                .get_one::<String>(REGION_ARG)
                .expect("required")
                .clone(),
            url: matches
                .get_one::<String>(URL_ARG)
                .expect("required")
                .clone(),
            output_dir: matches
                .get_one::<PathBuf>(OUTPUT_DIR_ARG)
                .expect("defaulted")
                .clone(),
            workers: *matches.get_one(WORKERS_ARG).expect("defaulted"),
            timeout: Duration::from_secs(
                *matches.get_one::<u64>(TIMEOUT_ARG).expect("defaulted"),
            ),
            dry_run: matches.get_flag(DRY_RUN_ARG),
        }
    }
}

fn get_matches() -> ArgMatches {
    cli().get_matches()
}

fn cli() -> clap::Command {
    command!()
        .arg(
            Arg::new(REGION_ARG)
                .help("The region to download as WKT geometry, e.g. `POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))` (in degrees)")
                .required(true)
                .value_parser(is_wkt)
                .allow_hyphen_values(true)
                .short('r')
                .long("region"),
        )
        .arg(
            Arg::new(URL_ARG)
                .help("The base URL to fetch the tiles from. The tile is requested as `?T=img_c&x={column}&y={row}&l={zoom}` unless the URL contains the format specifiers `{x}`, `{y}` and `{z}` itself.")
                .required(true)
                .value_parser(is_url_base)
                .short('u')
                .long("url"),
        )
        .arg(
            Arg::new(WORKERS_ARG)
                .help("The amount of tiles fetched in parallel.")
                .value_parser(is_numeric_min(1))
                .default_value("4")
                .short('w')
                .long("workers"),
        )
        .arg(
            Arg::new(TIMEOUT_ARG)
                .help("The timeout (in seconds) for connecting to the tile server. Pass 0 for no timeout.")
                .value_parser(value_parser!(u64))
                .default_value("10")
                .short('t')
                .long("timeout"),
        )
        .arg(
            Arg::new(MIN_ZOOM_ARG)
                .help("The minimum zoom level to fetch")
                .value_parser(value_parser!(u8))
                .default_value("1")
                .long("min-zoom"),
        )
        .arg(
            Arg::new(MAX_ZOOM_ARG)
                .help("The maximum zoom level to fetch")
                .value_parser(value_parser!(u8))
                .default_value("18")
                .long("max-zoom"),
        )
        .arg(
            Arg::new(ZOOM_ARG)
                .help("Only fetch a single zoom level (implies min=x/max=x)")
                .value_parser(value_parser!(u8))
                .long("zoom")
                .short('z'),
        )
        .arg(
            Arg::new(OUTPUT_DIR_ARG)
                .help("The folder to output the tiles to. Tiles are stored as `{zoom}/{column}/{row}.png` below it.")
                .value_parser(value_parser!(PathBuf))
                .default_value("output")
                .short('o')
                .long("output"),
        )
        .arg(
            Arg::new(DRY_RUN_ARG)
                .help("Don't actually fetch anything, just determine how many tiles would be fetched.")
                .action(ArgAction::SetTrue)
                .long("dry-run"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let matches = cli()
            .try_get_matches_from(args)
            .expect("valid arguments");
        Args::from_matches(&matches)
    }

    #[test]
    fn command_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = parse(&[
            "grid-tile-downloader",
            "--region",
            "POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))",
            "--url",
            "http://tiles.example.com/vt",
        ]);

        assert_eq!((args.min_zoom, args.max_zoom), (1, 18));
        assert_eq!(args.workers, 4);
        assert_eq!(args.timeout, Duration::from_secs(10));
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert!(!args.dry_run);
    }

    #[test]
    fn zoom_overrides_min_and_max() {
        let args = parse(&[
            "grid-tile-downloader",
            "-r",
            "POINT(-10 -10)",
            "-u",
            "http://tiles.example.com/vt",
            "--min-zoom",
            "2",
            "-z",
            "7",
            "--dry-run",
        ]);

        assert_eq!((args.min_zoom, args.max_zoom), (7, 7));
        assert!(args.dry_run);
    }

    #[test]
    fn rejects_invalid_region() {
        let result = cli().try_get_matches_from(&[
            "grid-tile-downloader",
            "--region",
            "POLYGON((",
            "--url",
            "http://tiles.example.com/vt",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn inverted_zoom_range_fails_conversion() {
        let args = parse(&[
            "grid-tile-downloader",
            "--region",
            "POINT(0 0)",
            "--url",
            "http://tiles.example.com/vt",
            "--min-zoom",
            "9",
            "--max-zoom",
            "3",
        ]);

        assert!(Config::try_from(args).is_err());
    }
}
