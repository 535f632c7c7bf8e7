use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use clap::Parser;
use compute::chart::{Bucket, RecordingChart};
use explorer::config::{Args, ExplorerConfig};
use explorer::controls::ControlView;
use explorer::script::parse_script;
use explorer::session::Session;
use explorer::{Explorer, Intent};
use formats::loader::load_records_from_path;
use foundation::geo::GeoPoint;
use layers::surface::InMemoryMapSurface;
use layers::tooltip::TooltipText;
use layers::vector::{HeatmapLayer, PointLayer};
use layers::{Layer, FILTERED_LAYERS};
use runtime::metrics::MetricsSnapshot;
use scene::Dataset;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Report {
    fingerprint: String,
    records: usize,
    skipped: usize,
    visible: usize,
    /// Features drawn per layer, keyed by layer name.
    layers: BTreeMap<&'static str, usize>,
    heat_weight: f64,
    ticks_applied: u64,
    playing: bool,
    histogram: Vec<Bucket>,
    view: ControlView,
    metrics: MetricsSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    hover: Option<TooltipText>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();
    let mut config = ExplorerConfig::from_env();
    config.apply_args(&args);
    let options = config.options().map_err(|e| e.to_string())?;

    let hover_at = args.hover.as_deref().map(parse_lon_lat).transpose()?;
    let mut script = match &args.script {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            parse_script(&text).map_err(|e| e.to_string())?
        }
        None => Vec::new(),
    };
    if args.ticks.is_some() && args.script.is_none() {
        script.push(Intent::Play);
    }

    let loaded = load_records_from_path(&config.data_path).map_err(|e| e.to_string())?;
    info!(
        path = %config.data_path.display(),
        records = loaded.records.len(),
        skipped = loaded.skipped.len(),
        fingerprint = %loaded.fingerprint,
        "loaded tornado records"
    );
    let skipped = loaded.skipped.len();
    let dataset = Arc::new(Dataset::new(loaded.records));

    let map = InMemoryMapSurface::new(dataset.clone(), &FILTERED_LAYERS);
    let explorer = Explorer::new(
        dataset.clone(),
        map,
        RecordingChart::new(),
        RecordingChart::new(),
        options,
    );

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;
    let session = Session::new(explorer);
    let outcome = rt.block_on(session.run_script(script, args.ticks));
    let e = outcome.explorer;

    let report = Report {
        fingerprint: loaded.fingerprint,
        records: dataset.len(),
        skipped,
        visible: e.visible().len(),
        layers: BTreeMap::from([
            (PointLayer.name(), e.point_samples().len()),
            (HeatmapLayer.name(), e.heat_samples().len()),
        ]),
        heat_weight: e.heat_samples().iter().map(|h| h.weight).sum(),
        ticks_applied: outcome.ticks_applied,
        playing: e.is_playing(),
        histogram: e.histogram().buckets(),
        view: e.view().clone(),
        metrics: e.metrics().snapshot(),
        hover: hover_at.and_then(|p| e.hover(p)),
    };
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn parse_lon_lat(text: &str) -> Result<GeoPoint, String> {
    let (lon, lat) = text
        .split_once(',')
        .ok_or_else(|| format!("--hover expects \"lon,lat\", got {text:?}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid hover longitude {lon:?}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid hover latitude {lat:?}"))?;
    Ok(GeoPoint::new(lon, lat))
}
