use std::{io, process::ExitCode};

use anyhow::Result;
use is_terminal::IsTerminal;
use tracing::warn;

use example_verify::{
    cli::Cli,
    config::{Config, Settings},
    logging,
    printer::SummaryPrinter,
    verify,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<ExitCode> {
    let args = Cli::parse();
    let cfg = Config::load();
    logging::init(args.verbose, cfg.get("VERIFY_LOG").as_deref());

    let settings = Settings::resolve(&args, &cfg, io::stdout().is_terminal())?;
    let report = verify::run(&settings).await?;

    let printer = SummaryPrinter { color: settings.color };
    report.print_summary(&mut io::stdout().lock(), &settings.report_path, &printer)?;

    let flagged = report.needs_attention();
    if settings.strict && flagged > 0 {
        warn!(flagged, "examples need attention");
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
