use std::ffi::OsString;
use std::path::Path;

use clap::{CommandFactory, FromArgMatches};
use tracing::info;

use crate::args::CliArgs;
use crate::config::{DEFAULT_CONFIG_FILES, load_config, resolve_master, resolve_slave};
use crate::distributed::{run_master, run_slave};
use crate::error::AppResult;

pub(crate) fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<Option<CliArgs>> {
    let mut cmd = CliArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = CliArgs::from_arg_matches(&matches)?;

    Ok(Some(args))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(args: CliArgs) -> AppResult<()> {
    let config = load_config(args.config.as_deref())?;
    if args.master {
        let master = resolve_master(&config)?;
        info!("Running as master");
        let summary = run_master(master, args.send_urls).await?;
        info!("Run complete: {} record(s)", summary.total);
        Ok(())
    } else {
        let slave = resolve_slave(&config)?;
        info!("Running as slave");
        run_slave(slave).await
    }
}
