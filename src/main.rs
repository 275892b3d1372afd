use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use covlay::commands::{self, Format};
use covlay::diagnostics;

#[derive(Parser)]
#[command(name = "covlay", version, about = "Overlay coverage records onto source documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log debug detail (skipped lines, dropped ranges) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved annotations for a document
    List {
        /// Document whose coverage records to resolve
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print a document with its coverage applied
    Show {
        /// Document to annotate
        file: PathBuf,
        /// Mark runs as `{style text}` instead of using colors
        #[arg(long)]
        plain: bool,
    },
    /// Print every coverage state with its code, style token, and label
    States,
    /// Summarize every document under a directory that has coverage records
    Summary {
        /// Directory to walk
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Re-apply coverage whenever the document or its records change
    Watch {
        /// Document to annotate
        file: PathBuf,
        /// Mark runs as `{style text}` instead of using colors
        #[arg(long)]
        plain: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::List { file, format } => commands::list(&file, format),
        Commands::Show { file, plain } => commands::show(&file, plain),
        Commands::States => {
            commands::states();
            Ok(ExitCode::SUCCESS)
        },
        Commands::Summary { dir, format } => commands::summary(&dir, format),
        Commands::Watch { file, plain } => commands::watch(&file, plain),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Install the `env_logger` backend. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
