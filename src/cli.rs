use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "example-verify",
    about = "Compile and run question-bank code examples and check their documented output",
    version
)]
pub struct Cli {
    /// Question bank JSON file.
    #[arg(value_name = "BANK")]
    pub bank: PathBuf,

    /// C compiler program (default: gcc).
    #[arg(long)]
    pub compiler: Option<String>,

    /// Extra compiler flag, added after the configured VERIFY_COMPILER_FLAGS
    /// (default `-lm`); set VERIFY_COMPILER_FLAGS= to drop those.
    /// Can be used multiple times: --flag -std=c99 --flag -Wall
    #[arg(long = "flag", action = ArgAction::Append, allow_hyphen_values = true, value_name = "FLAG")]
    pub flags: Vec<String>,

    /// Directory for per-example sources and binaries (default: <bank dir>/tmp_verify).
    #[arg(long = "scratch-dir")]
    pub scratch_dir: Option<PathBuf>,

    /// Where to write the JSON report (default: <scratch dir>/verify_results.json).
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Per-step time limit in seconds.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,

    /// Number of examples processed at once.
    #[arg(short = 'j', long, value_parser = clap::value_parser!(usize))]
    pub jobs: Option<usize>,

    /// Additional expected-output label, e.g. "Result" for `// Result: 3`.
    #[arg(long = "marker", action = ArgAction::Append)]
    pub markers: Vec<String>,

    /// Exit with status 1 when any example mismatches or does not run cleanly.
    #[arg(long)]
    pub strict: bool,

    /// Disable colored summary output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
