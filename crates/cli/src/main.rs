mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use envbuild_lib::consts::{DEFAULT_MAX_RETRIES, DEFAULT_SPEC_EXT};
use envbuild_lib::log::Verbosity;

use cmd::{BuildArgs, cmd_build, exit_code};
use output::{OutputFormat, print_error};

/// Build a directory of conda environment specs into versioned prefixes.
#[derive(Parser)]
#[command(name = "envbuild")]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
  /// Directory containing per-platform (linux/, mac/) environment specs
  spec_dir: PathBuf,

  /// Directory to install environments into
  install_dir: PathBuf,

  /// Extension of the environment spec files
  #[arg(short, long, default_value = DEFAULT_SPEC_EXT)]
  ext: String,

  /// Build only the environment with this name
  #[arg(long)]
  envname: Option<String>,

  /// Rebuild environments even if they are up to date
  #[arg(long)]
  force: bool,

  /// Non-interactive mode: always pass --force to the build command and hide skip notices
  #[arg(long)]
  automated: bool,

  /// Maximum number of retries after a failed build attempt
  #[arg(long = "max-retry", default_value_t = DEFAULT_MAX_RETRIES)]
  max_retry: u32,

  /// Build command template ({spec}, {prefix} and {force} are substituted)
  #[arg(long)]
  command: Option<String>,

  /// Report what would be built without running anything
  #[arg(long)]
  dry_run: bool,

  /// Summary output format
  #[arg(long, value_enum, default_value_t)]
  output: OutputFormat,

  /// Print build tool output and debug logs
  #[arg(short, long, conflicts_with = "silent")]
  verbose: bool,

  /// Only print errors
  #[arg(short, long)]
  silent: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  let verbosity = Verbosity::from_flags(cli.verbose, cli.silent);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();

  let args = BuildArgs {
    spec_dir: cli.spec_dir,
    install_dir: cli.install_dir,
    ext: cli.ext,
    env_name: cli.envname,
    force: cli.force,
    automated: cli.automated,
    max_retries: cli.max_retry,
    command: cli.command,
    dry_run: cli.dry_run,
    output: cli.output,
    verbosity,
  };

  match cmd_build(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::from(u8::try_from(exit_code(&err)).unwrap_or(1))
    }
  }
}
