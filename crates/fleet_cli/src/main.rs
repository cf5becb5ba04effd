//! `fleet` console front-end.
//!
//! # Responsibility
//! - Map command-line and environment settings onto a store configuration.
//! - Drive a `Controller` with a terminal view for one command per run.
//!
//! # Invariants
//! - Exit status is non-zero whenever the command failed.
//! - Controller errors are printed once, by the view.

mod args;
mod view;

use args::{field_map, Cli, Command};
use fleet_core::{
    default_log_level, init_logging, Backend, ConnectionRegistry, Controller, ControllerError,
    DbError, Driver, EntityKind, LoggingError, RepoError, Repository, Route, Shipment,
    StoreConfig, TableEntity, View,
};
use log::info;
use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::process::ExitCode;
use std::rc::Rc;
use view::ConsoleView;

#[derive(Debug)]
enum CliError {
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    /// Already rendered by the view.
    Controller(ControllerError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Controller(err) => write!(f, "{err}"),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ControllerError> for CliError {
    fn from(value: ControllerError) -> Self {
        Self::Controller(value)
    }
}

fn main() -> ExitCode {
    let cli = args::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Controller(_)) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = StoreConfig::new(cli.entity, cli.backend, cli.store.clone());
    info!(
        "event=cli_start module=cli status=ok entity={} backend={} store={}",
        config.entity,
        config.backend,
        config.location.display()
    );

    let mut registry = ConnectionRegistry::new();
    let backend = Backend::from_config(&config, &mut registry)?;
    match config.entity {
        EntityKind::Drivers => execute::<Driver>(backend, &cli.command),
        EntityKind::Routes => execute::<Route>(backend, &cli.command),
        EntityKind::Shipments => execute::<Shipment>(backend, &cli.command),
    }
}

fn execute<E: TableEntity>(backend: Backend, command: &Command) -> Result<(), CliError> {
    let repo = Repository::<E>::open(backend)?;
    let view = Rc::new(RefCell::new(ConsoleView::stdio()));
    let mut controller = Controller::new(repo, Rc::clone(&view));

    match command {
        Command::List { page_size, page } => {
            controller.index(*page_size, *page)?;
        }
        Command::Show { id } => {
            controller.details(*id)?;
        }
        Command::Add { set } => {
            controller.add(&field_map(set))?;
        }
        Command::Edit { id, set } => controller.edit(*id, &field_map(set))?,
        Command::Delete { id } => controller.delete(*id)?,
        Command::Sort { field } => controller.sort(field)?,
        Command::Count => {
            controller.count()?;
        }
        Command::Fields => {
            View::<E>::show_message(&mut *view.borrow_mut(), &E::FIELDS.join("\n"));
        }
    }
    Ok(())
}
