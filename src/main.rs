use anyhow::Result;
use clap::Parser;
use console::style;
use std::time::Instant;

use celeba_preprocess::image_processing::report;
use celeba_preprocess::utils::{
    error_println, format_duration, validate_inputs, verbose_println, warn_println,
};
use celeba_preprocess::{Args, JsonMessage, Manifest, ProcessingEngine, Split};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let mut args = Args::parse();
    args.load_and_merge_config()?;

    let json = args.json_progress;

    if !json {
        println!("{}", style("CelebA Preprocessor").bold().blue());
        println!("{}", style("Face crop and split organizer").dim());
        println!();
    }

    validate_inputs(&args)?;

    let config = args.processing_config();

    if config.verbose && !json {
        println!("{}", style("Configuration:").bold());
        println!("  Manifest: {}", config.manifest_path.display());
        println!("  Source images: {}", config.input_dir.display());
        println!("  Output root: {}", config.output_dir.display());
        println!("  Parallel jobs: {}", config.parallel_jobs);
        if config.dry_run {
            println!("  Dry run mode: enabled (simulation only - no files will be created)");
        }
        println!();
    }

    let manifest = Manifest::load(&config.manifest_path)?;

    if !json {
        for split in Split::ALL {
            verbose_println(
                config.verbose,
                &format!("{}: {} images", split, manifest.filenames(split).len()),
            );
        }
        if manifest.is_empty() {
            warn_println("Manifest lists no images, nothing to do");
        }
    }

    let dry_run = config.dry_run;
    let print_report = config.report;
    let output_dir = config.output_dir.clone();
    let engine = ProcessingEngine::new(config)?;

    let reports = match engine.run(&manifest) {
        Ok(reports) => reports,
        Err(e) => {
            if !json {
                error_println(&format!("{:#}", e));
            }
            return Err(e);
        }
    };

    let processed: usize = reports.iter().map(|r| r.processed).sum();
    let total_time = start_time.elapsed();

    if json {
        JsonMessage::summary(manifest.len(), processed, dry_run, total_time.as_secs_f64());
        return Ok(());
    }

    if print_report {
        report::print(&reports, dry_run);
    }

    println!();
    let header = if dry_run {
        style("Dry Run Results Summary:").bold().cyan()
    } else {
        style("Results Summary:").bold().green()
    };
    println!("{}", header);

    for report in &reports {
        println!(
            "  {}: {}",
            report.split,
            style(report.processed).bold().green()
        );
    }

    let processed_label = if dry_run {
        "Would be processed"
    } else {
        "Successfully processed"
    };
    println!("  {}: {}", processed_label, style(processed).bold().green());

    println!();
    println!("{}", style("Performance:").bold().blue());
    println!(
        "  Total processing time: {}",
        style(format_duration(total_time)).bold()
    );
    if processed > 0 {
        println!(
            "  Average time per image: {}",
            style(format_duration(total_time / processed as u32)).dim()
        );
    }

    println!();
    let location_label = if dry_run {
        "Would be saved to"
    } else {
        "Output root"
    };
    println!("  {}: {}", location_label, output_dir.display());

    Ok(())
}
