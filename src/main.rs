/*!
 * dss CLI - Command Line Interface
 */

use clap::{Parser, Subcommand, ValueEnum};
use dss::{
    cli_style::{print_error, print_warning},
    commands::{self, CommandContext},
    config::{LogLevel, SyncConfig},
    error::{Result, EXIT_SUCCESS},
    logging,
    remote::Direction,
    sync::Workspace,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dss")]
#[command(version, about = "Track dataset files in a manifest and sync them with remote hosts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tracked directory holding manifest.yml (default: current directory)
    #[arg(short = 'C', long = "directory", value_name = "DIR", global = true)]
    directory: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Path to log file (default: stderr)
    #[arg(long, value_name = "FILE", global = true)]
    log: Option<PathBuf>,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to config file (default: ~/.config/dss/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create manifest.yml, cloning the default remote profiles
    Init {
        /// Local staging directory recorded on every remote profile
        #[arg(long, value_name = "DIR")]
        ref_path: Option<String>,
    },

    /// Track files, or refresh the digest of files that changed
    Add {
        #[arg(required = true, value_name = "FILES")]
        files: Vec<String>,
    },

    /// Upload tracked files (all when none are named)
    Push {
        #[arg(value_name = "FILES")]
        files: Vec<String>,

        /// Remote to use (1 for remote@1, 2 for remote@2, ...)
        #[arg(short, long)]
        remote: Option<String>,
    },

    /// Download tracked files (all when none are named) and verify digests
    Pull {
        #[arg(value_name = "FILES")]
        files: Vec<String>,

        /// Remote to use (1 for remote@1, 2 for remote@2, ...)
        #[arg(short, long)]
        remote: Option<String>,
    },

    /// Show local state and remote copies of every tracked file
    Status,

    /// List this archive's directory on a remote
    List {
        /// Remote to use (1 for remote@1, 2 for remote@2, ...)
        #[arg(short, long)]
        remote: Option<String>,
    },

    /// Sync a profile's local staging directory wholesale
    #[command(subcommand)]
    Mirror(MirrorCommands),
}

#[derive(Subcommand)]
enum MirrorCommands {
    /// Copy the staging directory into the remote base path
    Push {
        #[arg(short, long)]
        remote: Option<String>,
    },

    /// Copy the remote base path (or one path below it) into the staging directory
    Pull {
        #[arg(short, long)]
        remote: Option<String>,

        /// Path below the remote base path to fetch
        #[arg(long, value_name = "PATH")]
        path: Option<String>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            print_error(&e.to_string(), e.suggestion());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = match cli.config {
        Some(ref path) => SyncConfig::from_file(path)?,
        None => SyncConfig::load_default().unwrap_or_else(|e| {
            print_warning(&format!("Failed to load config file: {}", e));
            SyncConfig::default()
        }),
    };

    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if cli.log.is_some() {
        config.log_file = cli.log.clone();
    }
    config.verbose |= cli.verbose;
    Ok(config)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Err(e) = logging::init_logging(&config) {
        print_warning(&format!("Failed to initialize logging: {}", e));
    }

    let directory = match cli.directory {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let ctx = CommandContext::new(Workspace::new(directory), config, cli.json);

    match cli.command {
        Commands::Init { ref_path } => commands::init::run(&ctx, ref_path.as_deref()),
        Commands::Add { files } => commands::add::run(&ctx, &files),
        Commands::Push { files, remote } => {
            commands::sync::run(&ctx, Direction::Push, &files, remote)
        }
        Commands::Pull { files, remote } => {
            commands::sync::run(&ctx, Direction::Pull, &files, remote)
        }
        Commands::Status => commands::status::run(&ctx),
        Commands::List { remote } => commands::list::run(&ctx, remote),
        Commands::Mirror(MirrorCommands::Push { remote }) => {
            commands::mirror::run(&ctx, Direction::Push, remote, None)
        }
        Commands::Mirror(MirrorCommands::Pull { remote, path }) => {
            commands::mirror::run(&ctx, Direction::Pull, remote, path.as_deref())
        }
    }
}
