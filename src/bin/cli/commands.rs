//! Command implementations for the CLI tool.

use std::path::Path;

use ziprename::resolve::plan as plan_renames;
use ziprename::{
    ArchiveListing, CompressionMethod, Coordinator, Outcome, PipelineOptions, ResolveOptions,
    SourceIndex, WriteOptions, read_archive,
};

use crate::exit_codes::{
    ExitCode, error_to_exit_code, pipeline_error_to_exit_code, stage_to_exit_code,
};
use crate::output::create_formatter;
use crate::{OutputFormat, OverwriteMode};

/// Configuration for the rename command.
pub struct RenameConfig<'a> {
    pub source_path: &'a Path,
    pub target_path: &'a Path,
    pub output_dir: &'a Path,
    pub overwrite: OverwriteMode,
    pub store: bool,
    pub level: u32,
    pub prefix: String,
    pub jobs: usize,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Rename command implementation
pub fn rename(config: &RenameConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    // Build options
    let mut write = match WriteOptions::new().level(config.level) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };
    if config.store {
        write = write.method(CompressionMethod::Stored);
    }
    let options = PipelineOptions::new()
        .write(write)
        .resolve(ResolveOptions::new().concurrency(config.jobs))
        .artifact_prefix(config.prefix.clone());

    let mut coordinator = Coordinator::new(options);

    let source = match read_input(config.source_path) {
        Ok(bytes) => bytes,
        Err(code) => return code,
    };
    if let Err(e) = coordinator.select_source(file_name(config.source_path), source) {
        eprintln!("Error: {}", e);
        return pipeline_error_to_exit_code(&e);
    }

    let target = match read_input(config.target_path) {
        Ok(bytes) => bytes,
        Err(code) => return code,
    };
    if let Err(e) = coordinator.select_target(file_name(config.target_path), target) {
        eprintln!("Error: {}", e);
        return pipeline_error_to_exit_code(&e);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FatalError;
        }
    };

    let artifact = match runtime.block_on(coordinator.process()) {
        Outcome::Success(artifact) => artifact.clone(),
        Outcome::Failure { stage, message } => {
            eprintln!("Error: {}", message);
            return stage_to_exit_code(*stage);
        }
        Outcome::Idle | Outcome::Processing => {
            eprintln!("Error: run did not complete");
            return ExitCode::FatalError;
        }
    };

    // Create output directory if needed
    if let Err(e) = std::fs::create_dir_all(config.output_dir) {
        eprintln!("Error creating output directory: {}", e);
        return ExitCode::IoError;
    }

    let output_path = config.output_dir.join(&artifact.file_name);
    if output_path.exists() {
        let overwrite = match config.overwrite {
            OverwriteMode::Always => true,
            OverwriteMode::Never => false,
            OverwriteMode::Prompt => prompt_overwrite(&output_path),
        };
        if !overwrite {
            if !config.quiet {
                eprintln!("Skipped: {} already exists", output_path.display());
            }
            return ExitCode::Warning;
        }
    }

    if let Err(e) = std::fs::write(&output_path, &artifact.bytes) {
        eprintln!("Error writing {}: {}", output_path.display(), e);
        return ExitCode::IoError;
    }

    if !config.quiet || config.format == OutputFormat::Json {
        println!(
            "{}",
            formatter.format_rename_result(&artifact, &output_path)
        );
    }

    ExitCode::Success
}

/// Plan command implementation
pub fn plan(source_path: &Path, target_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let source_records = match read_input(source_path).and_then(|b| decode(&b)) {
        Ok(records) => records,
        Err(code) => return code,
    };
    let target_records = match read_input(target_path).and_then(|b| decode(&b)) {
        Ok(records) => records,
        Err(code) => return code,
    };

    let index = SourceIndex::build(&source_records);
    let planned = plan_renames(&target_records, &index);
    print!("{}", formatter.format_plan(&planned));
    ExitCode::Success
}

/// List command implementation
pub fn list(archive_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let records = match read_input(archive_path).and_then(|b| decode(&b)) {
        Ok(records) => records,
        Err(code) => return code,
    };

    let listing = ArchiveListing::from_records(&records);
    print!("{}", formatter.format_list(listing.files()));
    ExitCode::Success
}

fn read_input(path: &Path) -> Result<Vec<u8>, ExitCode> {
    std::fs::read(path).map_err(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        ExitCode::IoError
    })
}

fn decode(bytes: &[u8]) -> Result<Vec<ziprename::ArchiveRecord>, ExitCode> {
    read_archive(bytes).map_err(|e| {
        eprintln!("Error: {}", e);
        error_to_exit_code(&e)
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Prompts the user about overwriting an existing output file.
fn prompt_overwrite(path: &Path) -> bool {
    use dialoguer::{Confirm, theme::ColorfulTheme};

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("File exists: {}. Overwrite?", path.display()))
        .default(false)
        .interact()
        .unwrap_or(false)
}
