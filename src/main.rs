//! git-stack CLI
//!
//! Installed as `git-stack`, so git picks it up as `git stack`.

mod cli;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use cli::fixup::FixupOptions;
use cli::init::InitOptions;
use cli::push::PushOptions;
use cli::show::ShowOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "git-stack")]
#[command(about = "Stacked pull requests for plain git branches")]
#[command(version)]
struct Cli {
    /// Path to the repository (defaults to current directory)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Git remote to use (defaults to the configured remote, then origin)
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Verbose output (repeat for trace logging)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all stacks
    #[command(alias = "l")]
    List,

    /// Show the branches of the current stack
    Show {
        /// Also show each branch's pull request
        #[arg(long)]
        prs: bool,
    },

    /// Push the current stack and open or update its pull requests
    Push {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,

        /// Preview the plan and ask before executing
        #[arg(long)]
        confirm: bool,
    },

    /// Commit staged changes as a fixup of a branch in the current stack
    Fixup {
        /// Branch to fix up (prompts when omitted)
        branch: Option<String>,

        /// Stage all tracked changes first, like git commit -a
        #[arg(short, long)]
        add: bool,

        /// Squash the fixup into place with a rebase afterwards
        #[arg(short, long)]
        rebase: bool,
    },

    /// Check out the top branch of a stack
    Switch {
        /// Any branch of the stack to switch to (prompts when omitted)
        branch: Option<String>,
    },

    /// Save settings for this repository to the config file
    Init {
        /// Default branch, overriding the host's
        #[arg(long)]
        default_branch: Option<String>,

        /// Personal access token for the host
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the version
    Version,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("git_stack={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let remote = cli.remote.as_deref();

    match cli.command {
        Commands::List => cli::list::run_list(&path, remote).await?,
        Commands::Show { prs } => {
            cli::show::run_show(&path, remote, ShowOptions { prs }).await?;
        }
        Commands::Push { dry_run, confirm } => {
            let options = PushOptions {
                dry_run,
                confirm,
                verbose: cli.verbose > 0,
            };
            cli::push::run_push(&path, remote, options).await?;
        }
        Commands::Fixup { branch, add, rebase } => {
            let options = FixupOptions {
                branch,
                add_all: add,
                rebase,
            };
            cli::fixup::run_fixup(&path, remote, options).await?;
        }
        Commands::Switch { branch } => {
            cli::switch::run_switch(&path, remote, branch.as_deref()).await?;
        }
        Commands::Init {
            default_branch,
            token,
        } => {
            let options = InitOptions {
                default_branch,
                token,
            };
            cli::init::run_init(&path, remote, options)?;
        }
        Commands::Version => {
            anstream::println!("git-stack {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
