//! Logging setup.
//!
//! Every event Tally emits uses a `tally::<area>` target, one per entry in
//! [`TARGETS`]. A preset picks a level for each area (and for `tower_http`
//! request traces); `--log area=level` refines single areas. `RUST_LOG`
//! replaces the whole computed filter when set.

use clap::{Args, ValueEnum};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Areas that emit events, as in `tally::<area>`.
pub const TARGETS: [&str; 4] = ["startup", "api", "calc", "history"];

const HTTP_TARGET: &str = "tower_http";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogPreset {
    /// Startup, API and history at info; calculations only when something is off.
    #[default]
    Normal,
    Verbose,
    Debug,
    Trace,
    Quiet,
}

impl LogPreset {
    fn level_for(self, area: &str) -> Level {
        match self {
            LogPreset::Normal if area == "calc" => Level::WARN,
            LogPreset::Normal | LogPreset::Verbose => Level::INFO,
            LogPreset::Debug => Level::DEBUG,
            LogPreset::Trace => Level::TRACE,
            LogPreset::Quiet => Level::WARN,
        }
    }

    fn http_level(self) -> Level {
        match self {
            LogPreset::Normal => Level::WARN,
            LogPreset::Verbose => Level::INFO,
            LogPreset::Debug => Level::DEBUG,
            LogPreset::Trace => Level::TRACE,
            LogPreset::Quiet => Level::ERROR,
        }
    }
}

/// Logging flags, flattened into the server command line.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Log every calculation
    #[arg(short, long)]
    pub verbose: bool,

    /// Also log rejected expressions and history bookkeeping
    #[arg(short, long)]
    pub debug: bool,

    /// Log everything, including evaluator fast-path hits
    #[arg(long)]
    pub trace: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Level for one area, e.g. "calc=debug" (areas: startup, api, calc, history, tower_http)
    #[arg(
        long = "log",
        value_name = "AREA=LEVEL",
        value_delimiter = ',',
        value_parser = parse_override
    )]
    pub overrides: Vec<(String, Level)>,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t)]
    pub format: LogFormat,
}

/// Parse `area=level` into a full target and level.
fn parse_override(raw: &str) -> Result<(String, Level), String> {
    let (target, level) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected AREA=LEVEL, got '{raw}'"))?;

    let level = level.trim();
    let level: Level = level
        .parse()
        .map_err(|_| format!("unknown log level '{level}'"))?;

    let target = target.trim();
    let area = target.strip_prefix("tally::").unwrap_or(target);
    let full_target = if area == HTTP_TARGET {
        HTTP_TARGET.to_string()
    } else if TARGETS.contains(&area) {
        format!("tally::{area}")
    } else {
        return Err(format!(
            "unknown log area '{target}' (expected one of {}, {HTTP_TARGET})",
            TARGETS.join(", ")
        ));
    };

    Ok((full_target, level))
}

impl LogArgs {
    /// Quietest flag wins, then the most detailed.
    pub fn preset(&self) -> LogPreset {
        if self.quiet {
            LogPreset::Quiet
        } else if self.trace {
            LogPreset::Trace
        } else if self.debug {
            LogPreset::Debug
        } else if self.verbose {
            LogPreset::Verbose
        } else {
            LogPreset::Normal
        }
    }

    /// Filter directives for the preset, followed by the overrides.
    pub fn directives(&self) -> Vec<String> {
        let preset = self.preset();

        TARGETS
            .iter()
            .map(|area| format!("tally::{area}={}", preset.level_for(area).as_str()))
            .chain(std::iter::once(format!(
                "{HTTP_TARGET}={}",
                preset.http_level().as_str()
            )))
            .chain(
                self.overrides
                    .iter()
                    .map(|(target, level)| format!("{target}={}", level.as_str())),
            )
            .collect()
    }

    pub fn build_filter(&self) -> EnvFilter {
        if let Ok(env_filter) = EnvFilter::try_from_default_env() {
            return env_filter;
        }
        EnvFilter::try_new(self.directives().join(",")).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Install the global subscriber.
pub fn init(args: &LogArgs) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(args.build_filter())
        .with_target(true);

    match args.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
