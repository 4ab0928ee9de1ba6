//! `orgcatalog` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, check the caller's API key and run one lookup.
//! - Print results as JSON on stdout; errors go to stderr with a stable
//!   exit code.

mod cli;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::info;
use orgcatalog_core::db::{open_db, open_existing_db};
use orgcatalog_core::db::seed::seed_demo_data;
use orgcatalog_core::{
    core_version, init_logging, ApiKeyVerifier, AppConfig, AuthError, CredentialVerifier,
    OrganizationQueryService, QueryError, SqliteOrganizationStore,
};
use serde::Serialize;

use cli::{Cli, Commands};

const EXIT_FAILURE: u8 = 1;
const EXIT_BAD_INPUT: u8 = 2;
const EXIT_UNAUTHORIZED: u8 = 3;
const EXIT_NOT_FOUND: u8 = 4;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;

    if let Some(log_dir) = &config.logging.dir {
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(&config.logging.level, log_dir)?;
    }

    if matches!(cli.command, Commands::Version) {
        println!("orgcatalog_core version={}", core_version());
        return Ok(());
    }

    if cli.command.requires_credential() {
        ApiKeyVerifier::new(config.api.key.as_str()).verify(cli.api_key.as_deref())?;
    }

    let db_path = &config.database.path;
    if matches!(cli.command, Commands::Seed) {
        let mut conn = open_db(db_path).with_context(|| {
            format!("failed to open catalog database `{}`", db_path.display())
        })?;
        seed_demo_data(&mut conn)?;
        info!("event=cli_seed module=cli status=ok");
        println!("seeded {}", db_path.display());
        return Ok(());
    }

    // Lookups never create the database file.
    let conn = open_existing_db(db_path).with_context(|| {
        format!("failed to open catalog database `{}`", db_path.display())
    })?;
    let service = OrganizationQueryService::new(SqliteOrganizationStore::try_new(&conn)?);
    match cli.command {
        Commands::Building { building_id } => {
            print_json(&service.organizations_in_building(building_id)?, cli.pretty)
        }
        Commands::Activity { name } => {
            print_json(&service.organizations_by_activity_name(&name)?, cli.pretty)
        }
        Commands::ActivityTree { name } => {
            print_json(&service.organizations_by_activity_tree(&name)?, cli.pretty)
        }
        Commands::Search { text } => {
            print_json(&service.organizations_by_name_substring(&text)?, cli.pretty)
        }
        Commands::Geo(args) => {
            print_json(&service.organizations_by_geo(&args.into())?, cli.pretty)
        }
        Commands::Show { organization_id } => {
            print_json(&service.organization_by_id(organization_id)?, cli.pretty)
        }
        Commands::Seed | Commands::Version => Ok(()),
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.logging.dir = Some(log_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<AuthError>().is_some() {
        return EXIT_UNAUTHORIZED;
    }
    match err.downcast_ref::<QueryError>() {
        Some(query_err) if query_err.is_not_found() => EXIT_NOT_FOUND,
        Some(query_err) if query_err.is_bad_input() => EXIT_BAD_INPUT,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::{exit_code_for, EXIT_BAD_INPUT, EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_UNAUTHORIZED};
    use orgcatalog_core::{AuthError, GeoInputError, QueryError};

    #[test]
    fn errors_map_to_stable_exit_codes() {
        let not_found = anyhow::Error::from(QueryError::OrganizationNotFound(7));
        let bad_input = anyhow::Error::from(QueryError::BadInput(GeoInputError::MissingShape));
        let unauthorized = anyhow::Error::from(AuthError::InvalidCredential);
        let other = anyhow::anyhow!("disk on fire");

        assert_eq!(exit_code_for(&not_found), EXIT_NOT_FOUND);
        assert_eq!(exit_code_for(&bad_input), EXIT_BAD_INPUT);
        assert_eq!(exit_code_for(&unauthorized), EXIT_UNAUTHORIZED);
        assert_eq!(exit_code_for(&other), EXIT_FAILURE);
    }

    #[test]
    fn wrapped_messages_print_once() {
        let err = anyhow::Error::from(QueryError::BadInput(GeoInputError::MissingShape));
        assert_eq!(format!("{err:#}"), GeoInputError::MissingShape.to_string());
    }
}
