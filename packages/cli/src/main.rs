#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Batch CLI for the school distribution analysis pipeline.
//!
//! One invocation runs the configured stages start to finish over the
//! in-memory dataset: load -> spatial join -> neighbor graph -> weights
//! -> global and local statistics -> filtered outputs. There is no
//! persistent state across runs.

mod config;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use school_map_stats::StatsError;
use school_map_stats_models::HotspotClass;

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser)]
#[command(name = "school_map", about = "Spatial distribution analysis of Brunei schools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write all output tables
    Analyze {
        /// Path to the analysis TOML configuration
        #[arg(long, default_value = "analysis.toml")]
        config: PathBuf,
    },
    /// Join schools to zone boundaries and write per-zone counts
    Join {
        /// Path to the analysis TOML configuration
        #[arg(long, default_value = "analysis.toml")]
        config: PathBuf,
    },
    /// Compute global Moran's I over per-mukim school counts
    Global {
        /// Path to the analysis TOML configuration
        #[arg(long, default_value = "analysis.toml")]
        config: PathBuf,
    },
    /// Compute grid-based Getis-Ord Gi* hotspots
    Hotspots {
        /// Path to the analysis TOML configuration
        #[arg(long, default_value = "analysis.toml")]
        config: PathBuf,
    },
    /// Regress per-mukim school counts against population
    Regression {
        /// Path to the analysis TOML configuration
        #[arg(long, default_value = "analysis.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<(), BoxError> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { config } => analyze(&config),
        Commands::Join { config } => join(&config),
        Commands::Global { config } => global(&config),
        Commands::Hotspots { config } => hotspots(&config),
        Commands::Regression { config } => regression(&config),
    }
}

/// Full pipeline. Statistical terminal conditions (insufficient
/// structure, undefined statistic) are reported and leave their section
/// out of the summary; they do not abort the remaining stages.
fn analyze(config_path: &Path) -> Result<(), BoxError> {
    let config = config::load_config(config_path)?;
    std::fs::create_dir_all(&config.output_dir)?;
    let inputs = pipeline::load_inputs(&config)?;

    for (sector, count) in school_map_schools::count_by_sector(&inputs.schools) {
        log::info!("{count} {sector} schools");
    }

    let mukim_join = pipeline::join_zones(&inputs.mukims, &inputs.schools)?;
    report::write_zone_counts(
        &config.output_dir.join("mukim_counts.csv"),
        &inputs.mukims,
        &mukim_join.counts,
    )?;

    if let Some(kampongs) = &inputs.kampongs {
        let kampong_join = pipeline::join_zones(kampongs, &inputs.schools)?;
        report::write_zone_counts(
            &config.output_dir.join("kampong_counts.csv"),
            kampongs,
            &kampong_join.counts,
        )?;
    }

    let global = run_reported(|| pipeline::run_global(&inputs.mukims, &mukim_join.counts, &config))?;

    let regression = match &inputs.population {
        Some(records) => run_reported(|| {
            pipeline::run_regression(&inputs.mukims, &mukim_join.counts, records)
        })?,
        None => None,
    };

    let grid_join = pipeline::join_grid(&inputs.study_area, &inputs.schools, config.cell_km)?;
    let hotspot = run_reported(|| pipeline::run_hotspots(&grid_join, &inputs.study_area, &config))?;

    if let Some(analysis) = &hotspot {
        report::write_hotspots(&config.output_dir.join("grid_cells.csv"), &analysis.records)?;
        report::write_hotspots(
            &config.output_dir.join("significant_cells.csv"),
            &analysis.significant,
        )?;
    }

    let summary = serde_json::json!({
        "schools": inputs.schools.len(),
        "mukims": inputs.mukims.len(),
        "sectorCounts": school_map_schools::count_by_sector(&inputs.schools),
        "mukimJoin": &mukim_join.summary,
        "gridJoin": &grid_join.summary,
        "moransI": global,
        "regression": regression,
        "hotspots": hotspot.as_ref().map(|analysis| serde_json::json!({
            "cells": analysis.records.len(),
            "significant": analysis.significant.len(),
            "hotspotCells": class_count(&analysis.significant, HotspotClass::Hotspot),
            "coldspotCells": class_count(&analysis.significant, HotspotClass::Coldspot),
        })),
    });
    report::write_summary(&config.output_dir.join("summary.json"), &summary)?;

    Ok(())
}

fn join(config_path: &Path) -> Result<(), BoxError> {
    let config = config::load_config(config_path)?;
    std::fs::create_dir_all(&config.output_dir)?;
    let inputs = pipeline::load_inputs(&config)?;

    let mukim_join = pipeline::join_zones(&inputs.mukims, &inputs.schools)?;
    report::write_zone_counts(
        &config.output_dir.join("mukim_counts.csv"),
        &inputs.mukims,
        &mukim_join.counts,
    )?;

    if let Some(kampongs) = &inputs.kampongs {
        let kampong_join = pipeline::join_zones(kampongs, &inputs.schools)?;
        report::write_zone_counts(
            &config.output_dir.join("kampong_counts.csv"),
            kampongs,
            &kampong_join.counts,
        )?;
    }

    if mukim_join.summary.unmatched > 0 {
        log::warn!(
            "{} schools outside every mukim: {}",
            mukim_join.summary.unmatched,
            mukim_join.summary.unmatched_ids.join(", ")
        );
    }
    Ok(())
}

fn global(config_path: &Path) -> Result<(), BoxError> {
    let config = config::load_config(config_path)?;
    let inputs = pipeline::load_inputs(&config)?;

    let mukim_join = pipeline::join_zones(&inputs.mukims, &inputs.schools)?;
    let result = pipeline::run_global(&inputs.mukims, &mukim_join.counts, &config)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn hotspots(config_path: &Path) -> Result<(), BoxError> {
    let config = config::load_config(config_path)?;
    std::fs::create_dir_all(&config.output_dir)?;
    let inputs = pipeline::load_inputs(&config)?;

    let grid_join = pipeline::join_grid(&inputs.study_area, &inputs.schools, config.cell_km)?;
    let analysis = pipeline::run_hotspots(&grid_join, &inputs.study_area, &config)?;

    report::write_hotspots(&config.output_dir.join("grid_cells.csv"), &analysis.records)?;
    report::write_hotspots(
        &config.output_dir.join("significant_cells.csv"),
        &analysis.significant,
    )?;
    Ok(())
}

fn regression(config_path: &Path) -> Result<(), BoxError> {
    let config = config::load_config(config_path)?;
    let inputs = pipeline::load_inputs(&config)?;

    let Some(records) = &inputs.population else {
        return Err("no population table configured; set `population` in the config".into());
    };

    let mukim_join = pipeline::join_zones(&inputs.mukims, &inputs.schools)?;
    let fit = pipeline::run_regression(&inputs.mukims, &mukim_join.counts, records)?;
    println!("{}", serde_json::to_string_pretty(&fit)?);
    Ok(())
}

/// Runs a statistic, converting its terminal conditions into a logged
/// `None` instead of aborting the whole run.
fn run_reported<T>(run: impl FnOnce() -> Result<T, StatsError>) -> Result<Option<T>, BoxError> {
    match run() {
        Ok(value) => Ok(Some(value)),
        Err(
            err @ (StatsError::InsufficientStructure { .. }
            | StatsError::UndefinedStatistic { .. }),
        ) => {
            log::warn!("{err}");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn class_count(records: &[school_map_stats_models::HotspotRecord], class: HotspotClass) -> usize {
    records.iter().filter(|r| r.class == class).count()
}
