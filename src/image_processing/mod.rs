pub mod batch;
pub mod crop;
pub mod manifest;
pub mod report;
pub mod writer;

use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use rayon::ThreadPool;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::json_output::JsonMessage;
use crate::utils::{create_progress_bar, verbose_println};

pub use manifest::{Manifest, Split};

/// Default number of worker threads, independent of CPU count
pub const DEFAULT_JOBS: usize = 256;

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    pub manifest_path: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub parallel_jobs: usize,
    pub verbose: bool,
    pub dry_run: bool,
    pub json_progress: bool,
    pub report: bool,
}

/// Outcome of one split
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub split: Split,
    pub processed: usize,
    pub output_dir: PathBuf,
    pub duration: Duration,
}

impl SplitReport {
    pub fn images_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.processed as f64 / secs
        }
    }
}

pub struct ProcessingEngine {
    config: ProcessingConfig,
    pool: ThreadPool,
}

impl ProcessingEngine {
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        let pool = batch::build_pool(config.parallel_jobs)?;
        Ok(Self { config, pool })
    }

    /// Output directory for a split
    pub fn split_dir(&self, split: Split) -> PathBuf {
        self.config.output_dir.join(split.dir_name())
    }

    /// Source path of a manifest filename
    pub fn source_path(&self, filename: &str) -> PathBuf {
        self.config.input_dir.join(filename)
    }

    /// Crop one image and store it in its split directory.
    /// In dry-run mode only the presence of the source file is checked.
    pub fn process_one_file(&self, filename: &str, split: Split) -> Result<()> {
        let input_path = self.source_path(filename);

        if self.config.dry_run {
            if !input_path.is_file() {
                return Err(anyhow::anyhow!(
                    "Source image not found: {}",
                    input_path.display()
                ));
            }
            return Ok(());
        }

        let cropped = crop::read_and_crop(&input_path)?;
        writer::save_image(&self.split_dir(split), filename, &cropped)?;
        Ok(())
    }

    /// Process every file of one split and wait until all are done
    pub fn process_split(
        &self,
        split: Split,
        filenames: &[String],
        progress: &ProgressBar,
    ) -> Result<SplitReport> {
        let start = Instant::now();
        let output_dir = self.split_dir(split);
        let total = filenames.len();

        verbose_println(
            self.config.verbose && !self.config.json_progress,
            &format!(
                "{}: {} files -> {}",
                split,
                total,
                output_dir.display()
            ),
        );

        let result = batch::process_files_parallel(
            &self.pool,
            filenames,
            |filename| {
                self.process_one_file(filename, split)
                    .with_context(|| format!("Failed to process {} ({})", filename, split))
            },
            |update| {
                progress.inc(1);
                if self.config.json_progress {
                    JsonMessage::progress(split, update);
                }
            },
        );

        let processed = match result {
            Ok(processed) => processed,
            Err(e) => {
                progress.abandon_with_message(format!("✗ {} failed", split));
                if self.config.json_progress {
                    JsonMessage::split_failed(split, format!("{:#}", e));
                }
                return Err(e);
            }
        };

        progress.finish_with_message(format!("✓ {}", split));

        Ok(SplitReport {
            split,
            processed,
            output_dir,
            duration: start.elapsed(),
        })
    }

    /// Process the three splits one after another.
    /// Stops at the first split that fails.
    pub fn run(&self, manifest: &Manifest) -> Result<Vec<SplitReport>> {
        let mut reports = Vec::with_capacity(Split::ALL.len());

        for (split, filenames) in manifest.iter() {
            let progress = if self.config.json_progress {
                JsonMessage::split_started(split, filenames.len());
                ProgressBar::hidden()
            } else {
                println!("{}", style(format!("Processing {}..", split)).bold());
                let pb = create_progress_bar(filenames.len() as u64);
                pb.set_message(split.dir_name());
                pb
            };

            let report = self.process_split(split, filenames, &progress)?;

            if self.config.json_progress {
                JsonMessage::split_completed(
                    split,
                    report.processed,
                    report.duration.as_secs_f64(),
                );
            }

            reports.push(report);
        }

        Ok(reports)
    }
}

/// Check that the manifest and the source directory are usable
pub fn validate_paths(manifest_path: &Path, input_dir: &Path) -> Result<()> {
    if !manifest_path.is_file() {
        return Err(anyhow::anyhow!(
            "Manifest file does not exist: {}",
            manifest_path.display()
        ));
    }

    if !input_dir.is_dir() {
        return Err(anyhow::anyhow!(
            "Input directory does not exist: {}",
            input_dir.display()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        input_dir: PathBuf,
        output_dir: PathBuf,
    }

    fn fixture(files: &[&str]) -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let input_dir = root.path().join("img_align_celeba");
        let output_dir = root.path().join("celebA");
        std::fs::create_dir_all(&input_dir).unwrap();

        for (i, name) in files.iter().enumerate() {
            let img = RgbImage::from_fn(178, 218, |x, y| Rgb([x as u8, y as u8, i as u8]));
            img.save(input_dir.join(name)).unwrap();
        }

        Fixture {
            _root: root,
            input_dir,
            output_dir,
        }
    }

    fn engine(fx: &Fixture, dry_run: bool) -> ProcessingEngine {
        ProcessingEngine::new(ProcessingConfig {
            manifest_path: PathBuf::from("unused"),
            input_dir: fx.input_dir.clone(),
            output_dir: fx.output_dir.clone(),
            parallel_jobs: 4,
            verbose: false,
            dry_run,
            json_progress: false,
            report: false,
        })
        .unwrap()
    }

    #[test]
    fn test_process_one_file_writes_cropped_image() {
        let fx = fixture(&["000001.png"]);
        let engine = engine(&fx, false);

        engine.process_one_file("000001.png", Split::Train).unwrap();

        let out = image::open(fx.output_dir.join("train_data/000001.png"))
            .unwrap()
            .to_rgb8();
        assert_eq!(out.dimensions(), (148, 148));
        assert_eq!(out.get_pixel(0, 0), &Rgb([15, 40, 0]));
    }

    #[test]
    fn test_process_one_file_missing_source() {
        let fx = fixture(&[]);
        let engine = engine(&fx, false);

        assert!(engine.process_one_file("000404.png", Split::Val).is_err());
        assert!(!fx.output_dir.join("val_data/000404.png").exists());
    }

    #[test]
    fn test_run_places_files_by_label() {
        let fx = fixture(&["000001.png", "000002.png", "000003.png", "000004.png"]);
        let engine = engine(&fx, false);
        let manifest =
            Manifest::parse("000001.png 0\n000002.png 1\n000003.png 2\n000004.png 0\n").unwrap();

        let reports = engine.run(&manifest).unwrap();

        let counts: Vec<(Split, usize)> = reports.iter().map(|r| (r.split, r.processed)).collect();
        assert_eq!(
            counts,
            vec![(Split::Train, 2), (Split::Val, 1), (Split::Synthesis, 1)]
        );
        assert!(fx.output_dir.join("train_data/000001.png").is_file());
        assert!(fx.output_dir.join("train_data/000004.png").is_file());
        assert!(fx.output_dir.join("val_data/000002.png").is_file());
        assert!(fx.output_dir.join("synthesis_data/000003.png").is_file());
        assert!(!fx.output_dir.join("train_data/000002.png").exists());
    }

    #[test]
    fn test_run_stops_at_failing_split() {
        let fx = fixture(&["000001.png"]);
        let engine = engine(&fx, false);
        let manifest = Manifest::parse("000001.png 0\n000002.png 1\n000003.png 2\n").unwrap();

        let err = engine.run(&manifest).unwrap_err();
        assert!(format!("{:#}", err).contains("000002.png"));

        assert!(fx.output_dir.join("train_data/000001.png").is_file());
        assert!(!fx.output_dir.join("synthesis_data").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fx = fixture(&["000001.png", "000002.png"]);
        let engine = engine(&fx, true);
        let manifest = Manifest::parse("000001.png 0\n000002.png 2\n").unwrap();

        let reports = engine.run(&manifest).unwrap();
        assert_eq!(reports.iter().map(|r| r.processed).sum::<usize>(), 2);
        assert!(!fx.output_dir.exists());
    }

    #[test]
    fn test_dry_run_reports_missing_source() {
        let fx = fixture(&[]);
        let engine = engine(&fx, true);

        let err = engine.process_one_file("000009.png", Split::Train).unwrap_err();
        assert!(err.to_string().contains("Source image not found"));
    }

    #[test]
    fn test_validate_paths() {
        let fx = fixture(&[]);
        let manifest_path = fx.input_dir.join("list_eval_partition.txt");

        assert!(validate_paths(&manifest_path, &fx.input_dir).is_err());

        std::fs::write(&manifest_path, "").unwrap();
        assert!(validate_paths(&manifest_path, &fx.input_dir).is_ok());
        assert!(validate_paths(&manifest_path, &fx.output_dir).is_err());
    }

    #[test]
    fn test_images_per_second() {
        let report = SplitReport {
            split: Split::Train,
            processed: 10,
            output_dir: PathBuf::new(),
            duration: Duration::from_secs(2),
        };
        assert!((report.images_per_second() - 5.0).abs() < f64::EPSILON);
    }
}
