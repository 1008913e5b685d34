use clap::Parser;
use std::path::PathBuf;

use crate::image_processing::{ProcessingConfig, DEFAULT_JOBS};

pub const DEFAULT_MANIFEST: &str = "../dataset_dumps/list_eval_partition.txt";
pub const DEFAULT_INPUT_DIR: &str = "../dataset_dumps/img_align_celeba";
pub const DEFAULT_OUTPUT_DIR: &str = "../datasets/celebA";

#[derive(Parser, Debug)]
#[command(
    name = "celeba-preprocess",
    about = "Crop CelebA faces and sort them into train/val/synthesis folders",
    long_about = "
CelebA preprocessor

Reads the evaluation partition list (one '<filename> <label>' row per image),
crops every aligned 178x218 face image to the 148x148 box (15,40)-(163,188)
and writes it under the output directory:

  label 0 -> train_data/
  label 1 -> val_data/
  label 2 -> synthesis_data/

Running without arguments uses the default dataset layout.

Example Usage:
  # Default layout (../dataset_dumps -> ../datasets/celebA)
  celeba-preprocess

  # Custom locations with fewer workers
  celeba-preprocess -m list_eval_partition.txt -i img_align_celeba -o celebA -j 32

  # Check that every listed image exists without writing anything
  celeba-preprocess --dry-run --verbose"
)]
pub struct Args {
    /// Partition list mapping each filename to 0 (train), 1 (val) or 2 (synthesis)
    #[arg(short = 'm', long = "manifest", value_name = "FILE", default_value = DEFAULT_MANIFEST)]
    pub manifest: PathBuf,

    /// Directory holding the source images
    #[arg(short = 'i', long = "input", value_name = "DIR", default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Root directory for the split folders
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Number of parallel workers (0 = one per CPU core)
    #[arg(short = 'j', long = "jobs", value_name = "N", default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// Enable verbose output with detailed progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Check that every listed source image exists without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Emit progress as JSON lines on stdout instead of progress bars
    #[arg(long = "json-progress")]
    pub json_progress: bool,

    /// Print a per-split summary table at the end
    #[arg(long = "report")]
    pub report: bool,

    /// JSON configuration file; command-line values take precedence
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}

impl Args {
    /// Resolve the worker count, 0 meaning one per CPU core
    pub fn parallel_jobs(&self) -> usize {
        if self.jobs == 0 {
            num_cpus::get()
        } else {
            self.jobs
        }
    }

    /// Runtime configuration for the processing engine
    pub fn processing_config(&self) -> ProcessingConfig {
        ProcessingConfig {
            manifest_path: self.manifest.clone(),
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            parallel_jobs: self.parallel_jobs(),
            verbose: self.verbose,
            dry_run: self.dry_run,
            json_progress: self.json_progress,
            report: self.report,
        }
    }
}

// Default implementation for tests
#[cfg(test)]
impl Default for Args {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            jobs: DEFAULT_JOBS,
            verbose: false,
            dry_run: false,
            json_progress: false,
            report: false,
            config_file: None,
        }
    }
}
