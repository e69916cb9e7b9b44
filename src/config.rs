// src/config.rs
use crate::error::AppError;
use clap::Parser;
use std::path::PathBuf;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Path to the Notion "Markdown & CSV" export zip
    pub archive: String,

    /// Output folder for the converted vault
    #[arg(short, long, default_value = "./notion-export")]
    pub output: String,

    /// Keep both the filtered and the complete CSV export of each database
    #[arg(long, default_value_t = false)]
    pub keep_all_csv: bool,

    /// Skip frontmatter synthesis and view generation entirely
    #[arg(long = "no-frontmatter", action = clap::ArgAction::SetTrue)]
    pub no_frontmatter: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Resolved pipeline configuration — validated and ready to drive all
/// six stages.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub archive: PathBuf,
    pub output_dir: PathBuf,
    pub keep_all_csv: bool,
    pub frontmatter: bool,
    #[allow(dead_code)] // Used by bin crate
    pub verbose: bool,
}

impl PipelineConfig {
    /// Resolves a complete pipeline configuration from CLI input.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let archive = PathBuf::from(cli.archive);
        if !archive.is_file() {
            return Err(AppError::ArchiveNotFound(archive));
        }

        Ok(PipelineConfig {
            archive,
            output_dir: PathBuf::from(cli.output),
            keep_all_csv: cli.keep_all_csv,
            frontmatter: !cli.no_frontmatter,
            verbose: cli.verbose,
        })
    }
}
