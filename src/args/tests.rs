use clap::Parser;

use super::{CliArgs, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult};

#[test]
fn parse_args_defaults_to_slave_mode() -> AppResult<()> {
    let args = CliArgs::try_parse_from(["webswarm"])?;
    if args.master {
        return Err(AppError::validation("Expected slave mode by default"));
    }
    if args.send_urls {
        return Err(AppError::validation("Expected send-urls disabled"));
    }
    if args.config.is_some() {
        return Err(AppError::validation("Expected no config path"));
    }
    Ok(())
}

#[test]
fn parse_args_master_with_send_urls() -> AppResult<()> {
    let args = CliArgs::try_parse_from(["webswarm", "-m", "-s", "-c", "run.toml"])?;
    if !args.master || !args.send_urls {
        return Err(AppError::validation("Expected master + send-urls"));
    }
    if args.config.as_deref() != Some("run.toml") {
        return Err(AppError::validation("Unexpected config path"));
    }
    Ok(())
}

#[test]
fn parse_args_send_urls_requires_master() -> AppResult<()> {
    if CliArgs::try_parse_from(["webswarm", "--send-urls"]).is_ok() {
        return Err(AppError::validation(
            "Expected --send-urls without --master to fail",
        ));
    }
    Ok(())
}

#[test]
fn parse_args_help_is_display_help_error() -> AppResult<()> {
    match CliArgs::try_parse_from(["webswarm", "-h"]) {
        Err(err) if err.kind() == clap::error::ErrorKind::DisplayHelp => Ok(()),
        Err(err) => Err(AppError::validation(format!(
            "Unexpected error kind: {:?}",
            err.kind()
        ))),
        Ok(_) => Err(AppError::validation("Expected help to short-circuit")),
    }
}

#[test]
fn positive_numbers_reject_zero() -> AppResult<()> {
    if PositiveU64::try_from(0).is_ok() {
        return Err(AppError::validation("Expected PositiveU64 to reject 0"));
    }
    if PositiveUsize::try_from(0).is_ok() {
        return Err(AppError::validation("Expected PositiveUsize to reject 0"));
    }
    let value = PositiveU64::try_from(25)?;
    if value.get() != 25 {
        return Err(AppError::validation("Unexpected parsed value"));
    }
    Ok(())
}
