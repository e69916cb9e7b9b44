// src/main.rs

// Modules defined in the crate
mod archive;
mod config;
mod constants;
mod database;
mod error;
mod frontmatter;
mod links;
mod naming;
mod normalize;
mod pipeline;
mod vault;
mod views;

// Specific imports
use crate::config::{CommandLineInput, PipelineConfig};
use crate::pipeline::{run_conversion, ConversionReport};
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("notion2obsidian.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Reports completion to the user with vault stats and what the run did.
fn report_completion(config: &PipelineConfig, report: &ConversionReport) {
    println!();
    println!("✓ Vault written to {}", config.output_dir.display());
    println!("  Markdown files:     {}", report.markdown_files);
    println!("  CSV files:          {}", report.csv_files);
    println!("  View files:         {}", report.view_files);
    println!("  Other files:        {}", report.other_files);
    println!("  Folders:            {}", report.folders);
    println!("  ID folders removed: {}", report.folders_collapsed);
    println!(
        "  Names cleaned:      {} files, {} folders",
        report.files_renamed, report.folders_renamed
    );
    println!("  CSVs deduplicated:  {}", report.csv_deduplicated);
    if config.frontmatter {
        println!("  Frontmatter added:  {}", report.frontmatter_written);
        println!("  Views generated:    {}", report.views_emitted);
    }
    println!("  Links updated:      {}", report.links_rewritten);

    if report.name_collisions > 0 {
        eprintln!(
            "⚠️  {} name collision(s) after ID stripping were resolved with numeric suffixes.",
            report.name_collisions
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = PipelineConfig::resolve(cli)?;

    let report = run_conversion(&config)?;

    report_completion(&config, &report);

    Ok(())
}
