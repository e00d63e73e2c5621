//! Configuration file loading.
//!
//! This file defines the YAML-facing configuration document and its
//! loader. The document wraps the domain-level [`TopologyConfig`] in
//! a `fabric` section so future sections (export options, emulator
//! tuning) have somewhere to live without breaking existing files.

use color_eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::topology::types::TopologyConfig;

/// Top-level configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub fabric: TopologyConfig,
}

/// Load and parse a planner configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<PlannerConfig> {
    info!("Loading configuration from: {:?}", config_path);

    // Open the configuration file
    let file = File::open(config_path)?;

    // Parse the YAML content
    let config: PlannerConfig = serde_yaml::from_reader(file)?;

    // Validate before any generation work starts
    config.fabric.validate()?;

    info!(
        "Loaded {:?} fabric configuration, size {}",
        config.fabric.topology_type, config.fabric.size
    );

    Ok(config)
}
