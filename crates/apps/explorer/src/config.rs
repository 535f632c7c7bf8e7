use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use foundation::years::{YearDomain, YearRange, MAX_YEAR, MIN_YEAR};
use runtime::DEFAULT_TICK_PERIOD;

use crate::explorer::ExplorerOptions;

pub const DEFAULT_DATA_PATH: &str = "data/tornado_points.geojson";
pub const DEFAULT_HOVER_RADIUS_DEG: f64 = 0.25;

#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Headless tornado record explorer")]
pub struct Args {
    /// GeoJSON FeatureCollection of tornado records (env: TORNADO_DATA)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Playback tick period in milliseconds (env: TORNADO_TICK_MS)
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// First year of the initial window (env: TORNADO_START_YEAR)
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last year of the initial window (env: TORNADO_END_YEAR)
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Half-size of the hover hit box in degrees (env: TORNADO_HOVER_RADIUS_DEG)
    #[arg(long)]
    pub hover_radius: Option<f64>,

    /// JSON-lines intent script to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Start playback and run this many ticks before stopping
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Point to hover after the run, as "lon,lat"
    #[arg(long, allow_hyphen_values = true)]
    pub hover: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub data_path: PathBuf,
    pub tick_ms: u64,
    pub start_year: i32,
    pub end_year: i32,
    pub hover_radius_deg: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroTickPeriod,
    YearOutOfRange(i32),
    InvalidHoverRadius(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTickPeriod => write!(f, "tick period must be at least 1 ms"),
            ConfigError::YearOutOfRange(y) => {
                write!(f, "year {y} is outside {MIN_YEAR}..={MAX_YEAR}")
            }
            ConfigError::InvalidHoverRadius(r) => {
                write!(f, "hover radius must be positive degrees, got {r}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for ExplorerConfig {
    fn default() -> Self {
        let range = ExplorerOptions::default().initial_range;
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            tick_ms: DEFAULT_TICK_PERIOD.as_millis() as u64,
            start_year: range.start(),
            end_year: range.end(),
            hover_radius_deg: DEFAULT_HOVER_RADIUS_DEG,
        }
    }
}

impl ExplorerConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Reads `TORNADO_*` variables through `var`. Unset or unparseable values
    /// keep their defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            data_path: var("TORNADO_DATA")
                .map(PathBuf::from)
                .unwrap_or(d.data_path),
            tick_ms: env_var_u64(&var, "TORNADO_TICK_MS", d.tick_ms),
            start_year: env_var_i32(&var, "TORNADO_START_YEAR", d.start_year),
            end_year: env_var_i32(&var, "TORNADO_END_YEAR", d.end_year),
            hover_radius_deg: env_var_f64(&var, "TORNADO_HOVER_RADIUS_DEG", d.hover_radius_deg),
        }
    }

    /// Command-line flags override the environment.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(path) = &args.data {
            self.data_path = path.clone();
        }
        if let Some(ms) = args.tick_ms {
            self.tick_ms = ms;
        }
        if let Some(y) = args.start_year {
            self.start_year = y;
        }
        if let Some(y) = args.end_year {
            self.end_year = y;
        }
        if let Some(r) = args.hover_radius {
            self.hover_radius_deg = r;
        }
    }

    pub fn options(&self) -> Result<ExplorerOptions, ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        let domain = YearDomain::default();
        for year in [self.start_year, self.end_year] {
            if year < domain.min || year > domain.max {
                return Err(ConfigError::YearOutOfRange(year));
            }
        }
        if !self.hover_radius_deg.is_finite() || self.hover_radius_deg <= 0.0 {
            return Err(ConfigError::InvalidHoverRadius(self.hover_radius_deg));
        }
        Ok(ExplorerOptions {
            domain,
            initial_range: YearRange::new(self.start_year, self.end_year),
            tick_period: Duration::from_millis(self.tick_ms),
            hover_radius_deg: self.hover_radius_deg,
            ..ExplorerOptions::default()
        })
    }
}

fn env_var_u64(var: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    var(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_var_i32(var: &impl Fn(&str) -> Option<String>, key: &str, default: i32) -> i32 {
    var(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_var_f64(var: &impl Fn(&str) -> Option<String>, key: &str, default: f64) -> f64 {
    var(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
