//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::config;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;

/// A terminal-based job application recorder with timed, per-question answers
#[derive(Parser)]
#[command(name = "intervue")]
#[command(version)]
#[command(about = "Record and submit a job application from your terminal")]
#[command(
    long_about = "Record and submit a job application from your terminal.\n\nThe application flow asks for your contact details, then records one answer\nper interview question with a countdown and a live level meter, and finally\nuploads everything in a single submission.\n\nDEFAULT COMMAND:\n    If no command is specified, 'apply' is used by default.\n\nEXAMPLES:\n    # Start the application flow\n    $ intervue\n    $ intervue apply\n    \n    # See the questions before you start\n    $ intervue questions\n    \n    # Edit configuration file\n    $ intervue config"
)]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/intervue/intervue.toml\n    Logs:               ~/.local/state/intervue/intervue.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the application flow (default)
    ///
    /// Collects your contact details, records one timed answer per question,
    /// and uploads the finished application. Press Enter to stop an answer
    /// early, Escape/q to cancel.
    #[command(visible_alias = "a")]
    Apply,

    /// Print the interview question set
    ///
    /// Shows every question in order together with the per-answer time budget
    /// so you can prepare before recording.
    #[command(visible_alias = "q")]
    Questions,

    /// Open configuration file in your preferred editor
    ///
    /// Edit capture settings, the answer time budget, and the submission
    /// endpoint. Uses $EDITOR or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available capture devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct capture device in intervue.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   intervue completions bash > intervue.bash
    ///   intervue completions zsh > _intervue
    ///   intervue completions fish > intervue.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "intervue", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => {
            return match commands::handle_list_devices() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Logs) => {
            return match commands::handle_logs() {
                Ok(()) => Ok(()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            };
        }
        Some(Commands::Questions) => {
            return commands::handle_questions();
        }
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Write a default config file on first run so every knob is visible
    config::ensure_config()?;

    match cli.command {
        None | Some(Commands::Apply) => {
            commands::handle_apply().await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Questions)
        | Some(Commands::Completions { .. })
        | Some(Commands::ListDevices)
        | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
