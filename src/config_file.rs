use crate::cli::{Args, DEFAULT_INPUT_DIR, DEFAULT_MANIFEST, DEFAULT_OUTPUT_DIR};
use crate::image_processing::DEFAULT_JOBS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Saved run configuration
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub config: PreprocessConfigJson,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessConfigJson {
    pub manifest_path: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub jobs: Option<usize>,
    pub verbose: Option<bool>,
    pub dry_run: Option<bool>,
    pub json_progress: Option<bool>,
    pub report: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

impl Args {
    /// Load configuration from a JSON file and merge with command-line arguments
    /// Command-line arguments take precedence over config file values
    pub fn load_and_merge_config(&mut self) -> Result<()> {
        if let Some(config_path) = self.config_file.clone() {
            let config = ConfigFile::load(&config_path)?;
            self.merge_from_config(config.config);

            if self.verbose && !self.json_progress {
                eprintln!("Loaded configuration from: {:?}", config_path);
            }
        }
        Ok(())
    }

    /// Fill in values the command line left at their defaults
    fn merge_from_config(&mut self, config: PreprocessConfigJson) {
        if self.manifest == Path::new(DEFAULT_MANIFEST) {
            if let Some(manifest) = config.manifest_path {
                self.manifest = PathBuf::from(manifest);
            }
        }

        if self.input_dir == Path::new(DEFAULT_INPUT_DIR) {
            if let Some(input) = config.input_path {
                self.input_dir = PathBuf::from(input);
            }
        }

        if self.output_dir == Path::new(DEFAULT_OUTPUT_DIR) {
            if let Some(output) = config.output_path {
                self.output_dir = PathBuf::from(output);
            }
        }

        if self.jobs == DEFAULT_JOBS {
            if let Some(jobs) = config.jobs {
                self.jobs = jobs;
            }
        }

        // Boolean flags - only apply if currently false (default)
        if !self.verbose {
            self.verbose = config.verbose.unwrap_or(false);
        }

        if !self.dry_run {
            self.dry_run = config.dry_run.unwrap_or(false);
        }

        if !self.json_progress {
            self.json_progress = config.json_progress.unwrap_or(false);
        }

        if !self.report {
            self.report = config.report.unwrap_or(false);
        }
    }
}
