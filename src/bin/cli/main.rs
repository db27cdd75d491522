//! CLI tool for ziprename.

mod commands;
mod exit_codes;
mod output;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use exit_codes::ExitCode;

/// Rename zip entries after a reference archive
#[derive(Parser)]
#[command(name = "ziprename")]
#[command(author, version, about = "Rename zip entries after a reference archive", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress informational output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rename target entries after matching source entries (alias: r)
    #[command(alias = "r")]
    Rename {
        /// Archive providing the file names
        source: PathBuf,

        /// Archive whose files are renamed
        target: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Overwrite mode for an existing output file
        #[arg(long, value_enum, default_value = "prompt")]
        overwrite: OverwriteMode,

        /// Store entries without compression
        #[arg(long)]
        store: bool,

        /// Compression level (0-9)
        #[arg(short = 'l', long, default_value = "6")]
        level: u32,

        /// Prefix of the output file name
        #[arg(long, default_value = ziprename::pipeline::DEFAULT_ARTIFACT_PREFIX)]
        prefix: String,

        /// Maximum concurrent entry reads (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,
    },

    /// Show how target entries would be renamed, without writing (alias: p)
    #[command(alias = "p")]
    Plan {
        /// Archive providing the file names
        source: PathBuf,

        /// Archive whose files are renamed
        target: PathBuf,
    },

    /// List archive files and their identifiers (alias: l)
    #[command(alias = "l")]
    List {
        /// Archive file to list
        archive: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OverwriteMode {
    Always,
    Never,
    Prompt,
}

fn main() {
    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted");
        std::process::exit(exit_codes::USER_INTERRUPT);
    })
    .ok();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Rename {
            source,
            target,
            output,
            overwrite,
            store,
            level,
            prefix,
            jobs,
        } => commands::rename(&commands::RenameConfig {
            source_path: &source,
            target_path: &target,
            output_dir: &output,
            overwrite,
            store,
            level,
            prefix,
            jobs,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Plan { source, target } => commands::plan(&source, &target, cli.format),

        Commands::List { archive } => commands::list(&archive, cli.format),

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}
