use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use formats::{DEFAULT_TOPOLOGY_OBJECT, GeoDataset, load_dataset_path, parse_alias_seed};
use foundation::math::{GLOBE_RADIUS, unproject};
use scene::{Camera, CountryIndex, Identifier, MeshOptions, PickOptions, Triangulation, Viewport, pick_screen};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect country geography used by the globe")]
struct Args {
    /// GeoJSON FeatureCollection or TopoJSON Topology
    input: PathBuf,

    /// Object to read from a TopoJSON input
    #[arg(long, default_value = DEFAULT_TOPOLOGY_OBJECT)]
    object: String,

    #[arg(long, value_enum, default_value_t = TriangulationArg::Fan)]
    triangulation: TriangulationArg,

    #[arg(long, default_value_t = GLOBE_RADIUS)]
    radius: f64,

    /// JSON object of extra aliases, e.g. {"156": "CHN"}
    #[arg(long)]
    aliases: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mesh and alias statistics for the input
    Stats,

    /// Resolve identifiers (numeric ids, codes or names) to alpha-3 codes
    Resolve {
        #[arg(required = true)]
        identifiers: Vec<String>,
    },

    /// Pick the country under a screen position
    Pick {
        #[arg(long)]
        x: f64,

        #[arg(long)]
        y: f64,

        #[arg(long, default_value_t = 800.0)]
        width: f64,

        #[arg(long, default_value_t = 600.0)]
        height: f64,

        /// Globe rotation about +Y, in radians
        #[arg(long, default_value_t = 0.0)]
        yaw: f64,

        /// Also accept rays passing this close to a border segment
        #[arg(long)]
        line_threshold: Option<f64>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum TriangulationArg {
    Fan,
    Earcut,
}

impl From<TriangulationArg> for Triangulation {
    fn from(value: TriangulationArg) -> Self {
        match value {
            TriangulationArg::Fan => Triangulation::Fan,
            TriangulationArg::Earcut => Triangulation::EarCut,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatsReport {
    fingerprint: String,
    features: usize,
    skipped: usize,
    countries: usize,
    segments: usize,
    triangles: usize,
    degenerate_rings: usize,
    triangulation_failures: usize,
    without_code: usize,
    distinct_codes: usize,
    aliases: usize,
    triangulation: &'static str,
}

#[derive(Debug, Serialize)]
struct Resolution {
    identifier: String,
    code: Option<String>,
}

#[derive(Debug, Serialize)]
struct PickReport {
    candidates: usize,
    hit: Option<PickedCountry>,
}

#[derive(Debug, Serialize)]
struct PickedCountry {
    id: String,
    name: String,
    code: Option<String>,
    slot: usize,
    distance: f64,
    lon_deg: Option<f64>,
    lat_deg: Option<f64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    let dataset = load(&args.input, &args.object)?;
    let opts = MeshOptions {
        radius: args.radius,
        triangulation: args.triangulation.into(),
    };
    let index = CountryIndex::build(&dataset.features, &opts);
    if let Some(path) = &args.aliases {
        let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
        let seeds = parse_alias_seed(&payload).map_err(|e| format!("{path:?}: {e}"))?;
        index.seed_aliases(&seeds);
    }

    match args.command {
        Command::Stats => print_json(&stats(&dataset, &index, opts.triangulation)),
        Command::Resolve { identifiers } => {
            let out: Vec<Resolution> = identifiers
                .into_iter()
                .map(|raw| {
                    let code = index.resolve(&Identifier::parse(&raw));
                    Resolution {
                        identifier: raw,
                        code: code.map(|c| c.into_string()),
                    }
                })
                .collect();
            print_json(&out)
        }
        Command::Pick {
            x,
            y,
            width,
            height,
            yaw,
            line_threshold,
        } => {
            let viewport = Viewport::new(width, height);
            if !viewport.is_valid() {
                return Err(format!("invalid viewport {width}x{height}"));
            }
            let camera = Camera::default().in_globe_frame(yaw);
            let pick_opts = PickOptions {
                line_threshold,
                ..PickOptions::default()
            };
            let outcome = pick_screen(&index, x, y, &camera, viewport, pick_opts);
            let hit = outcome.hit.map(|hit| {
                let surface = unproject(hit.point);
                PickedCountry {
                    id: hit.country_id.text(),
                    code: index.resolve(&hit.country_id).map(|c| c.into_string()),
                    name: hit.country_name,
                    slot: hit.slot,
                    distance: hit.distance,
                    lon_deg: surface.map(|p| p.lon_deg),
                    lat_deg: surface.map(|p| p.lat_deg),
                }
            });
            print_json(&PickReport {
                candidates: outcome.candidates,
                hit,
            })
        }
    }
}

fn load(path: &Path, object: &str) -> Result<GeoDataset, String> {
    let dataset = load_dataset_path(path, Some(object)).map_err(|e| format!("load {path:?}: {e}"))?;
    info!(
        path = %path.display(),
        features = dataset.len(),
        skipped = dataset.skipped,
        fingerprint = %dataset.fingerprint,
        "loaded geography"
    );
    Ok(dataset)
}

fn stats(dataset: &GeoDataset, index: &CountryIndex, triangulation: Triangulation) -> StatsReport {
    let report = index.report();
    let mut codes: Vec<&str> = index
        .entries()
        .iter()
        .filter_map(|e| e.alpha3.as_ref().map(|c| c.as_str()))
        .collect();
    codes.sort_unstable();
    codes.dedup();

    StatsReport {
        fingerprint: dataset.fingerprint.clone(),
        features: dataset.len(),
        skipped: dataset.skipped,
        countries: report.countries,
        segments: report.segments,
        triangles: report.triangles,
        degenerate_rings: report.degenerate_rings,
        triangulation_failures: report.triangulation_failures,
        without_code: report.without_code,
        distinct_codes: codes.len(),
        aliases: index.table_len(),
        triangulation: triangulation.as_str(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formats::load_dataset_str;

    const SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "156", "properties": {"name": "China", "ISO_A3": "CHN"},
             "geometry": {"type": "Polygon", "coordinates": [[[-95, -5], [-85, -5], [-85, 5], [-95, 5]]]}},
            {"type": "Feature", "properties": {"name": "Line"},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
        ]
    }"#;

    #[test]
    fn args_parse_subcommands() {
        let args = Args::try_parse_from(["globe", "world.json", "--triangulation", "earcut", "pick", "--x", "1", "--y", "2"])
            .expect("parse");
        assert!(matches!(args.triangulation, TriangulationArg::Earcut));
        assert!(matches!(args.command, Command::Pick { x, width, .. } if x == 1.0 && width == 800.0));
        assert!(Args::try_parse_from(["globe", "world.json", "resolve"]).is_err());
    }

    #[test]
    fn stats_counts_meshes_and_codes() {
        let dataset = load_dataset_str(SQUARES, None).expect("load");
        let index = CountryIndex::build(&dataset.features, &MeshOptions::default());
        let report = stats(&dataset, &index, Triangulation::Fan);
        assert_eq!(report.features, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.segments, 3);
        assert_eq!(report.triangles, 2);
        assert_eq!(report.distinct_codes, 1);
        assert!(!report.fingerprint.is_empty());
    }
}
