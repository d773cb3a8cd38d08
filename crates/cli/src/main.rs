use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use generate_symbols::commands::{generate_command, GenerateOptions};

/// Generate Breakpad symbols for a binary and all of its shared libraries.
///
/// Dependencies are listed with ldd (linux), otool (darwin) or dumpbin (win32);
/// only libraries inside the build output directory are processed. Symbols are
/// written to `<symbols_dir>/<name>/<hash>/<name>.sym`.
#[derive(Parser, Debug)]
#[command(name = "generate-symbols", version, long_about = None)]
struct Cli {
    /// Binary to generate symbols for.
    binary: String,

    /// Root of the symbol store.
    symbols_dir: String,

    /// Path to the dump_syms utility. Defaults to dump_syms on PATH.
    #[arg(short = 'd', long = "dump_syms_path")]
    dump_syms_path: Option<String>,

    /// Clear the symbols directory before writing new symbols.
    #[arg(long, default_value_t = false)]
    clear: bool,

    /// Number of parallel tasks to run. Defaults to the number of CPUs.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Print verbose status output.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Target platform of the binary (linux, darwin, win32). Defaults to the host.
    #[arg(long)]
    platform: Option<String>,

    /// Emit the per-binary report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = GenerateOptions {
        binary: cli.binary,
        symbols_dir: cli.symbols_dir,
        dump_syms_path: cli.dump_syms_path,
        clear: cli.clear,
        jobs: cli.jobs,
        verbose: cli.verbose,
        platform: cli.platform,
        json: cli.json,
    };
    generate_command(&options)?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Info } else { LevelFilter::Warn };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .try_init();
}
