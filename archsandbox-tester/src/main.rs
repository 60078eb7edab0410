mod loader;
mod reports;
mod scenarios;
mod storage;
mod util;

use anyhow::{Context, Result};
use archsandbox_engine::constants::DEFAULT_BUDGET;
use archsandbox_engine::{
    AppSchema, CatalogLoader, SandboxEngine, check_requirements, lint_catalog, ranked_entries,
    total_cost,
};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use loader::CatalogSource;
use reports::{AppTypeCheck, EvaluationReport, RankingReport, ReportFormat, RunReport};
use scenarios::{
    ScenarioCtx, ScenarioResult, get_scenario, list_scenarios, run_scenario, scenario_keys,
};
use storage::FileSchemaStorage;
use util::{schema_slot, split_csv};

#[derive(Debug, Parser)]
#[command(name = "archsandbox-tester", version = "0.1.0")]
#[command(
    about = "Automated QA for the architecture sandbox engine - logic scenarios, catalog lint and schema scoring"
)]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long)]
    scenarios: Option<String>,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Lint the catalog for broken references and out-of-range attributes
    #[arg(long)]
    lint: bool,

    /// Score a saved schema file
    #[arg(long)]
    evaluate: Option<PathBuf>,

    /// Rank the catalog against a saved schema file
    #[arg(long)]
    rank: Option<PathBuf>,

    /// Check the evaluated schema against an app type (e.g. ecommerce)
    #[arg(long)]
    app_type: Option<String>,

    /// Load technologies.json, modifiers.json and app_types.json from this directory
    #[arg(long)]
    catalog_dir: Option<PathBuf>,

    /// Project budget in dollars
    #[arg(long, default_value_t = DEFAULT_BUDGET)]
    budget: f64,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output file for reports
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    if args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner();
    }

    let start_time = Instant::now();
    let source = CatalogSource::new(args.catalog_dir.as_deref());
    let catalog = source
        .load_catalog()
        .with_context(|| format!("loading catalog from {}", source.describe()))?;
    let app_types = source
        .load_app_types()
        .with_context(|| format!("loading app types from {}", source.describe()))?;
    let ctx = ScenarioCtx {
        catalog: &catalog,
        app_types: &app_types,
        budget: args.budget,
    };

    let mut report = RunReport {
        scenarios: run_scenarios(&args, &ctx),
        ..RunReport::default()
    };
    if args.lint {
        report.lint = Some(lint_catalog(&catalog));
    }
    if let Some(path) = &args.evaluate {
        report.evaluation = Some(evaluate_schema(&args, &source, path)?);
    }
    if let Some(path) = &args.rank {
        let schema = load_schema_file(&source, path)?;
        let selected = schema.technologies();
        report.ranking = Some(RankingReport {
            source: path.display().to_string(),
            selected: selected.iter().map(|tech| tech.id.clone()).collect(),
            entries: ranked_entries(catalog.technologies(), &selected),
        });
    }

    write_report(&args, &report, start_time)?;

    if report.failed() {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏗️ Architecture Sandbox Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

/// Scenario keys to run. Defaults to the smoke scenario when nothing else was asked for.
fn planned_scenarios(args: &Args) -> Vec<String> {
    match &args.scenarios {
        Some(list) => expand_scenarios(list),
        None if args.lint || args.evaluate.is_some() || args.rank.is_some() => Vec::new(),
        None => vec!["smoke".to_string()],
    }
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.contains(&"all".to_string()) {
        scenarios.retain(|s| s != "all");
        scenarios.extend(scenario_keys().map(str::to_string));
    }
    scenarios
}

fn run_scenarios(args: &Args, ctx: &ScenarioCtx<'_>) -> Vec<ScenarioResult> {
    planned_scenarios(args)
        .iter()
        .map(|name| match get_scenario(name) {
            Some(scenario) => run_scenario(scenario, ctx, args.verbose),
            None => {
                log::warn!("unknown scenario '{name}'");
                ScenarioResult::unknown(name)
            }
        })
        .collect()
}

fn engine_for(
    source: &CatalogSource,
    path: &Path,
) -> Result<(SandboxEngine<CatalogSource, FileSchemaStorage>, String)> {
    let (root, slot) = schema_slot(path)?;
    Ok((
        SandboxEngine::new(source.clone(), FileSchemaStorage::new(root)),
        slot,
    ))
}

fn load_schema_file(source: &CatalogSource, path: &Path) -> Result<AppSchema> {
    let (engine, slot) = engine_for(source, path)?;
    engine
        .load_schema(&slot)
        .with_context(|| format!("loading schema {}", path.display()))?
        .with_context(|| format!("schema file not found: {}", path.display()))
}

fn evaluate_schema(args: &Args, source: &CatalogSource, path: &Path) -> Result<EvaluationReport> {
    let (engine, _) = engine_for(source, path)?;
    let schema = load_schema_file(source, path)?;
    let evaluation = engine
        .evaluate(&schema, args.budget)
        .context("scoring schema")?;

    let app_type = match &args.app_type {
        Some(id) => {
            let app_types = engine.app_types().context("loading app types")?;
            let app_type = app_types
                .get_by_id(id)
                .with_context(|| format!("unknown app type '{id}'"))?;
            Some(AppTypeCheck {
                id: app_type.id.clone(),
                name: app_type.name.clone(),
                within_budget: app_type
                    .requirements
                    .fits_budget(total_cost(schema.technologies())),
                report: check_requirements(&evaluation.metrics, app_type),
            })
        }
        None => None,
    };

    Ok(EvaluationReport {
        source: path.display().to_string(),
        panels: schema.len(),
        evaluation,
        app_type,
    })
}

fn write_report(args: &Args, report: &RunReport<'_>, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    report.write(output_target.writer(), args.report, start_time.elapsed())?;
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
