use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::args::LoadArgs;
use crate::config::RunConfig;
use crate::error::AppResult;
use crate::{logger, run, summary};

/// CLI entry point: parse and validate, then drive one run to completion.
///
/// # Errors
///
/// Returns configuration errors before any worker starts, and runtime or
/// join errors from the run itself.
pub fn run() -> AppResult<()> {
    let args = LoadArgs::parse();

    logger::init_logging(args.verbose, args.no_color);

    let config = Arc::new(RunConfig::from_args(&args)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(run::execute(&config))?;
    summary::print_final(&report, config.output_format)?;
    info!("Load test completed.");
    Ok(())
}
