use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use fabriclab::config;
use fabriclab::plan::FabricPlan;

/// Link and addressing planner for emulated router fabrics
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the fabric configuration YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Output directory for the exported plan files
    #[arg(short, long, default_value = "plan_output")]
    output: PathBuf,

    /// Validate the configuration and plan without writing exports
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting fabriclab planner");
    info!("Configuration file: {:?}", args.config);

    let planner_config = config::load_config(&args.config)?;
    let plan = FabricPlan::generate(&planner_config.fabric)
        .wrap_err("Failed to generate fabric plan")?;

    if args.check {
        info!(
            "Plan OK: {} routers, {} links (no exports written)",
            plan.routers.len(),
            plan.links.len()
        );
        return Ok(());
    }

    write_exports(&plan, &args.output)?;

    info!("Exported plan to {:?}", args.output);
    Ok(())
}

/// Write the JSON export files consumed by topology-file writers
fn write_exports(plan: &FabricPlan, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let routers_path = output_dir.join("routers.json");
    fs::write(&routers_path, serde_json::to_string_pretty(&plan.routers)?)
        .wrap_err_with(|| format!("Failed to write '{}'", routers_path.display()))?;

    let links_path = output_dir.join("links.json");
    fs::write(&links_path, serde_json::to_string_pretty(&plan.links)?)
        .wrap_err_with(|| format!("Failed to write '{}'", links_path.display()))?;

    let wiring_path = output_dir.join("wiring.json");
    fs::write(&wiring_path, serde_json::to_string_pretty(&plan.wiring())?)
        .wrap_err_with(|| format!("Failed to write '{}'", wiring_path.display()))?;

    info!(
        "Wrote routers.json ({} routers), links.json ({} links), wiring.json",
        plan.routers.len(),
        plan.links.len()
    );
    Ok(())
}
