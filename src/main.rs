mod app;
mod kinship;
mod store;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app::{AppConfig, KinlensApp};
use crate::kinship::{DetailPolicy, FocusParams, KinshipError, KinshipService, Principal};
use crate::store::Snapshot;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Snapshot JSON holding families, people and relationships
    #[arg(long, env = "KINLENS_SNAPSHOT", default_value = "family.json", global = true)]
    snapshot: PathBuf,

    /// Family of the person using the viewer
    #[arg(long, env = "KINLENS_FAMILY", global = true)]
    family: Option<String>,

    /// User id that owns saved views
    #[arg(long, env = "KINLENS_USER", default_value = "local", global = true)]
    user: String,

    /// Saved views file
    #[arg(long, default_value = "views.json", global = true)]
    views: PathBuf,

    /// Hide cities of people outside your family
    #[arg(long, global = true)]
    redact_foreign_details: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the interactive graph window
    View,
    /// Shortest relationship chain between two people
    Path {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Neighborhood around one person
    Focus {
        person: String,
        #[arg(long)]
        depth: Option<usize>,
        #[arg(long)]
        no_ancestors: bool,
        #[arg(long)]
        no_descendants: bool,
    },
    /// Fuzzy people search, own family first
    Search {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

impl Args {
    fn principal(&self) -> Principal {
        Principal {
            user_id: self.user.clone(),
            family_id: self.family.clone().unwrap_or_default(),
        }
    }

    fn policy(&self) -> DetailPolicy {
        if self.redact_foreign_details {
            DetailPolicy::OwnFamilyOnly
        } else {
            DetailPolicy::Full
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

/// Prints a query result as pretty JSON.
fn print_json<T: Serialize>(result: Result<T, KinshipError>) -> Result<()> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(error) if error.is_invalid_argument() => Err(anyhow!("{error} (see --help)")),
        Err(error) => Err(error.into()),
    }
}

fn service(args: &Args) -> Result<KinshipService<Snapshot>> {
    let snapshot = Snapshot::load(&args.snapshot)?;
    Ok(KinshipService::new(
        Arc::new(snapshot),
        args.principal(),
        args.policy(),
    ))
}

fn run_viewer(args: &Args) -> Result<()> {
    let config = AppConfig {
        snapshot_path: args.snapshot.clone(),
        views_path: args.views.clone(),
        principal: args.principal(),
        policy: args.policy(),
    };
    info!(snapshot = %config.snapshot_path.display(), "opening viewer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "kinlens",
        options,
        Box::new(move |cc| Ok(Box::new(KinlensApp::new(cc, config)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    match &args.command {
        None | Some(Command::View) => run_viewer(&args),
        Some(Command::Path { from, to }) => {
            print_json(service(&args)?.find_path(Some(from.as_str()), Some(to.as_str())))
        }
        Some(Command::Focus {
            person,
            depth,
            no_ancestors,
            no_descendants,
        }) => print_json(service(&args)?.focus_graph(FocusParams {
            person_id: Some(person.as_str()),
            depth: *depth,
            include_ancestors: Some(!no_ancestors),
            include_descendants: Some(!no_descendants),
        })),
        Some(Command::Search { query, limit }) => {
            print_json(service(&args)?.search_people(query, *limit))
        }
    }
}
