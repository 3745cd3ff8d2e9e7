use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tf_optimizer::{
    CatalogOptimizer, ExecutionMode, Optimizer, RangeOptimizer, RangeSpace, SearchConfig,
    SearchReport,
};
use tf_timing::{solve_resistors, AstableCircuit};
use tf_types::{
    parse_si, Catalog, ComponentSet, ComponentValue, Components, ESeries, Range, Spacing, Target,
    Unit,
};

mod render;

#[derive(Parser)]
#[command(
    name = "tf555",
    version,
    about = "Pick 555 astable components for a target high and low time"
)]
struct Cli {
    /// Search configuration file (JSON, every field optional)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,
    /// Evaluate candidates on a single thread
    #[arg(long, global = true)]
    sequential: bool,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Best combination of stock E-series (or catalog file) values
    Catalog {
        #[command(flatten)]
        target: TargetArgs,
        /// Resistor series
        #[arg(long, default_value = "E12")]
        resistors: ESeries,
        /// Capacitor series
        #[arg(long, default_value = "E6")]
        capacitors: ESeries,
        /// Smallest resistor
        #[arg(long, default_value = "10", value_parser = parse_ohms)]
        r_min: f64,
        /// Largest resistor
        #[arg(long, default_value = "8.2M", value_parser = parse_ohms)]
        r_max: f64,
        /// Smallest capacitor
        #[arg(long, default_value = "1p", value_parser = parse_farads)]
        c_min: f64,
        /// Largest capacitor
        #[arg(long, default_value = "680u", value_parser = parse_farads)]
        c_max: f64,
        /// Catalog file (JSON) replacing the E-series sets
        #[arg(long, value_name = "PATH")]
        catalog: Option<PathBuf>,
        /// Score a seeded sample of at most this many combinations
        #[arg(long)]
        budget: Option<usize>,
    },
    /// Best free-valued combination inside continuous ranges
    Range {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long, value_parser = parse_ohms)]
        r_min: f64,
        #[arg(long, value_parser = parse_ohms)]
        r_max: f64,
        #[arg(long, value_parser = parse_farads)]
        c_min: f64,
        #[arg(long, value_parser = parse_farads)]
        c_max: f64,
        /// Grid points per axis
        #[arg(long)]
        samples: Option<usize>,
        /// Grid point placement
        #[arg(long, value_enum)]
        spacing: Option<SpacingArg>,
        /// Keep the raw grid optimum
        #[arg(long)]
        no_refine: bool,
        /// Score a seeded sample of at most this many grid points
        #[arg(long)]
        budget: Option<usize>,
    },
    /// Timing of a given R1, R2, C
    Analyze {
        #[arg(long, value_parser = parse_ohms)]
        r1: f64,
        #[arg(long, value_parser = parse_ohms)]
        r2: f64,
        #[arg(long, value_parser = parse_farads)]
        c: f64,
    },
    /// Exact R1 and R2 for a target with a fixed capacitor
    Solve {
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long, value_parser = parse_farads)]
        c: f64,
    },
}

impl Command {
    /// Apply the search flags given on the command line on top of `config`.
    fn apply_overrides(&self, mut config: SearchConfig) -> SearchConfig {
        match self {
            Command::Catalog { budget, .. } => {
                if let Some(b) = budget {
                    config = config.with_budget(*b);
                }
            }
            Command::Range {
                samples,
                spacing,
                no_refine,
                budget,
                ..
            } => {
                if let Some(samples) = samples {
                    config = config.with_samples(*samples);
                }
                if let Some(spacing) = spacing {
                    config = config.with_spacing((*spacing).into());
                }
                if *no_refine {
                    config = config.without_refinement();
                }
                if let Some(b) = budget {
                    config = config.with_budget(*b);
                }
            }
            Command::Analyze { .. } | Command::Solve { .. } => {}
        }
        config
    }
}

#[derive(Args)]
struct TargetArgs {
    /// Desired output-high time (seconds, SI suffixes allowed)
    #[arg(long, value_parser = parse_seconds)]
    high: f64,
    /// Desired output-low time
    #[arg(long, value_parser = parse_seconds)]
    low: f64,
}

impl TargetArgs {
    fn target(&self) -> Result<Target> {
        Target::new(self.high, self.low).context("invalid target")
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SpacingArg {
    Linear,
    Log,
}

impl From<SpacingArg> for Spacing {
    fn from(arg: SpacingArg) -> Self {
        match arg {
            SpacingArg::Linear => Spacing::Linear,
            SpacingArg::Log => Spacing::Logarithmic,
        }
    }
}

fn parse_seconds(input: &str) -> std::result::Result<f64, String> {
    parse_si(input).map_err(|e| e.to_string())
}

fn parse_ohms(input: &str) -> std::result::Result<f64, String> {
    ComponentValue::parse(input, Unit::Ohm)
        .map(|v| v.value)
        .map_err(|e| e.to_string())
}

fn parse_farads(input: &str) -> std::result::Result<f64, String> {
    ComponentValue::parse(input, Unit::Farad)
        .map(|v| v.value)
        .map_err(|e| e.to_string())
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the `--config` file, then explicit flags.
fn load_config(cli: &Cli) -> Result<SearchConfig> {
    let mut config = match &cli.config {
        Some(path) => SearchConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if cli.sequential {
        config = config.with_execution(ExecutionMode::Sequential);
    }
    let config = cli.command.apply_overrides(config);
    debug!("Search config: {:?}", config);
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Catalog {
            target,
            resistors,
            capacitors,
            r_min,
            r_max,
            c_min,
            c_max,
            catalog,
            ..
        } => {
            let target = target.target()?;
            let catalog = match catalog {
                Some(path) => Catalog::from_path(path)
                    .with_context(|| format!("failed to load catalog {}", path.display()))?,
                None => {
                    let r = ComponentSet::e_series_between(*resistors, Unit::Ohm, *r_min, *r_max)
                        .context("invalid resistor series")?;
                    let c = ComponentSet::e_series_between(*capacitors, Unit::Farad, *c_min, *c_max)
                        .context("invalid capacitor series")?;
                    Catalog::new(format!("{resistors}/{capacitors}"), r, c)?
                }
            };
            info!(
                "Catalog '{}': {} resistors, {} capacitors",
                catalog.name,
                catalog.resistors.len(),
                catalog.capacitors.len()
            );

            let report = CatalogOptimizer::new(config)
                .run(&target, &catalog)
                .context("catalog search failed")?;
            emit(&report, &target, cli.json)
        }
        Command::Range {
            target,
            r_min,
            r_max,
            c_min,
            c_max,
            ..
        } => {
            let target = target.target()?;
            let space = RangeSpace::shared(
                Range::ohms(*r_min, *r_max).context("invalid resistor range")?,
                Range::farads(*c_min, *c_max).context("invalid capacitor range")?,
            )?;
            let report = RangeOptimizer::new(config)
                .run(&target, &space)
                .context("range search failed")?;
            emit(&report, &target, cli.json)
        }
        Command::Analyze { r1, r2, c } => analyze(Components::new(*r1, *r2, *c), cli.json),
        Command::Solve { target, c } => {
            let target = target.target()?;
            let (r1, r2) =
                solve_resistors(target.high, target.low, *c).context("no exact solution")?;
            analyze(Components::new(r1, r2, *c), cli.json)
        }
    }
}

fn analyze(components: Components, json: bool) -> Result<()> {
    let profile = AstableCircuit::from_components(&components)
        .and_then(|circuit| circuit.profile())
        .context("cannot analyse circuit")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("{}", render::profile_text(&components, &profile));
    }
    Ok(())
}

fn emit(report: &SearchReport, target: &Target, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", render::report_text(report, target));
    }
    Ok(())
}
