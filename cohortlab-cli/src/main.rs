//! CohortLab CLI: inspect cutoff curves, group partitions and confirmations.
//!
//! Commands:
//! - `curve`: print the empirical CDF and its coloured segments
//! - `groups`: print the ordinal group table for the current cutoffs
//! - `confirm`: print the confirmation payload and the local sink's answer
//!
//! Rows come from a JSON/CSV file (`--input`) or a synthetic cohort
//! (`--synthetic N`). Cutoffs default to the ones seeded with the rows and
//! can be overridden with `--percent` or `--value`.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cohortlab_core::data::{synthetic_cohort, FeatureSource, FileSource, LocalSink};
use cohortlab_core::groups::GroupTable;
use cohortlab_core::{CutoffSeed, CutoffSession, EditorConfig};

/// Months used for synthetic cohorts.
const SYNTHETIC_MONTHS: [i64; 4] = [0, 6, 12, 24];

#[derive(Parser)]
#[command(
    name = "cohortlab",
    about = "CohortLab CLI, empirical CDF cutoffs and response groups"
)]
struct Cli {
    /// Editor config (TOML). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Rows file (.json or .csv).
    #[arg(long, conflicts_with = "synthetic")]
    input: Option<PathBuf>,

    /// Generate a synthetic cohort with this many subjects.
    #[arg(long)]
    synthetic: Option<usize>,

    /// Feature column to plot. Resolved by policy when omitted.
    #[arg(long)]
    feature: Option<String>,

    /// Time bucket to plot. All rows when omitted.
    #[arg(long, allow_negative_numbers = true)]
    month: Option<i64>,

    /// Cutoff percentile (repeatable).
    #[arg(long = "percent", conflicts_with = "values")]
    percents: Vec<f64>,

    /// Cutoff raw value (repeatable).
    #[arg(long = "value", allow_negative_numbers = true)]
    values: Vec<f64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the CDF and its segments at the current cutoffs.
    Curve {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the group table for the current cutoffs.
    Groups {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Confirm the current cutoffs against a local sink.
    Confirm {
        #[command(flatten)]
        input: InputArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = match &cli.config {
        Some(path) => EditorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Commands::Curve { input } => run_curve(&input, config),
        Commands::Groups { input } => run_groups(&input, config),
        Commands::Confirm { input } => run_confirm(&input, config),
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn open_session(args: &InputArgs, config: EditorConfig) -> Result<CutoffSession> {
    let data = match (&args.input, args.synthetic) {
        (Some(path), _) => FileSource::new(path, config.rows.schema())
            .fetch_feature_rows("cli", "all", args.month)
            .with_context(|| format!("loading rows from {}", path.display()))?,
        (None, Some(n)) => {
            if n == 0 {
                bail!("--synthetic needs at least one subject");
            }
            synthetic_cohort("cohortlab-demo", n, &SYNTHETIC_MONTHS)
        }
        (None, None) => bail!("one of --input or --synthetic is required"),
    };

    let mut session = CutoffSession::new(data, args.feature.clone(), args.month, config);
    if !session.has_data() {
        bail!("no numeric data to plot (feature {:?})", session.feature_key());
    }

    if !args.percents.is_empty() {
        session.apply_cutoffs(&CutoffSeed::percents(&args.percents));
    } else if !args.values.is_empty() {
        session.apply_cutoffs(&CutoffSeed::values(&args.values));
    }
    info!(
        feature = ?session.feature_key(),
        markers = ?session.markers().positions(),
        "session ready"
    );
    Ok(session)
}

fn run_curve(args: &InputArgs, config: EditorConfig) -> Result<()> {
    let session = open_session(args, config)?;
    let preview = session.preview();

    if args.format == Format::Json {
        let out = serde_json::json!({
            "curve": session.built(),
            "preview": preview,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_curve_header(&session);
    println!();
    println!("--- Cutoffs ---");
    for c in &preview.markers {
        println!("{:<10} {:>8.2}%  {:>10.3}", c.id.to_string(), c.percent, c.value);
    }
    println!();
    println!("--- Segments ---");
    for s in &preview.segments {
        println!(
            "#{:<3} [{:>10.3}, {:>10.3}]  {} points",
            s.index,
            s.start,
            s.end,
            s.points.len()
        );
    }
    println!();
    println!("--- CDF ---");
    for p in session.cdf().points() {
        println!("{:>12.3}  {:>7.2}%", p.value, p.percent);
    }
    Ok(())
}

fn run_groups(args: &InputArgs, config: EditorConfig) -> Result<()> {
    let session = open_session(args, config)?;

    if args.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(session.groups())?);
        return Ok(());
    }

    print_curve_header(&session);
    print_groups(session.groups());
    Ok(())
}

fn run_confirm(args: &InputArgs, config: EditorConfig) -> Result<()> {
    let mut session = open_session(args, config)?;
    let Some(feature_key) = session.feature_key().map(str::to_string) else {
        bail!("no feature column could be resolved");
    };
    let sink = LocalSink::new(
        session.data().rows.clone(),
        feature_key,
        session.config().groups.clone(),
    );
    let request = session.confirmation_request();
    let response = session.confirm_with(&sink)?;

    if args.format == Format::Json {
        let out = serde_json::json!({
            "request": request,
            "response": response,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_curve_header(&session);
    println!();
    println!("--- Confirmation ---");
    println!("cutoffX:        {}", request.cutoff_x.join(", "));
    println!("cutoffY:        {}", request.cutoff_y.join(", "));
    println!("Authoritative:  {}", response.authoritative);
    print_groups(&response.groups);
    Ok(())
}

fn print_curve_header(session: &CutoffSession) {
    let built = session.built();
    println!();
    println!("=== Cutoff Curve ===");
    println!("Feature:        {}", built.feature_key.as_deref().unwrap_or("-"));
    if let Some(source) = built.key_source {
        println!("Key source:     {source:?}");
    }
    match session.month() {
        Some(m) => println!("Month:          {m}"),
        None => println!("Month:          all"),
    }
    if let Some((lo, hi)) = session.month_range() {
        println!("Month range:    {lo} to {hi}");
    }
    println!("Points:         {}", built.cdf.len());
    println!("Dropped:        {}", built.dropped);
    if built.month_fallback {
        println!("WARNING: no rows at the selected month, showing all rows");
    }
}

fn print_groups(table: &GroupTable) {
    println!();
    println!("--- Groups ({} subjects, {} excluded) ---", table.total, table.excluded);
    for g in &table.groups {
        println!(
            "#{:<3} {:>6}  {:<28} {:<28} {}",
            g.index, g.count, g.value_label, g.percent_label, g.color
        );
    }
    println!();
}
