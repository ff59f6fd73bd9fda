use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{HttpDataSource, RefreshOutcome, ViewSynchronizer};
use shared::domain::{MapMode, Selection};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinSet,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod console;

use commands::{apply_to_selection, describe_selection, parse_command, ViewCommand, HELP};
use console::ConsoleSurface;

#[derive(Parser, Debug)]
#[command(about = "Population heat map and hotel viewer for district data")]
struct Args {
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    mode: Option<MapMode>,
    #[arg(long)]
    year: Option<u16>,
    /// District id; omit for all districts.
    #[arg(long)]
    district: Option<String>,
    /// Render once and exit instead of reading commands from stdin.
    #[arg(long)]
    once: bool,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(server_url) = &args.server_url {
        settings = settings.with_server_url(server_url);
    }

    let mut selection = Selection {
        mode: args.mode.unwrap_or(settings.default_mode),
        district: None,
        year: args.year.unwrap_or(settings.default_year),
    };
    if let Some(district) = &args.district {
        selection.set_district_filter(district);
    }

    let source = HttpDataSource::new(&settings.server_url)
        .with_context(|| format!("cannot use server url '{}'", settings.server_url))?;
    let surface = Arc::new(ConsoleSurface::default());
    let sync = Arc::new(ViewSynchronizer::new(Arc::new(source), surface.clone()));

    info!(server_url = %settings.server_url, "mapview starting");
    console::print_base_map(&settings);
    sync.load_district_options().await;

    if args.once {
        let outcome = sync
            .refresh(&selection)
            .await
            .context("map refresh failed")?;
        info!(?outcome, "mapview: refresh finished");
        return Ok(());
    }

    run_console(sync, surface, selection).await
}

async fn run_console(
    sync: Arc<ViewSynchronizer>,
    surface: Arc<ConsoleSurface>,
    mut selection: Selection,
) -> Result<()> {
    let mut refreshes = JoinSet::new();
    spawn_refresh(&mut refreshes, &sync, &selection);

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        // reap finished refreshes so the set does not grow without bound
        while refreshes.try_join_next().is_some() {}

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        if apply_to_selection(&mut selection, &command) {
            println!("selection: {}", describe_selection(&selection));
            continue;
        }

        match command {
            ViewCommand::Update => spawn_refresh(&mut refreshes, &sync, &selection),
            ViewCommand::ShowLayers => {
                let live = surface.live_layers();
                if live.is_empty() {
                    println!("no layers");
                }
                for (id, description) in live {
                    println!("#{} {description}", id.0);
                }
            }
            ViewCommand::ShowDistricts => {
                let districts = surface.district_options();
                if districts.is_empty() {
                    println!("no districts loaded; 'district all' still works");
                }
                for district in districts {
                    println!("{}\t{}", district.id, district.name);
                }
            }
            ViewCommand::Help => println!("{HELP}"),
            ViewCommand::Quit => break,
            ViewCommand::SetMode(_) | ViewCommand::SetYear(_) | ViewCommand::SetDistrict(_) => {}
        }
    }

    while let Some(joined) = refreshes.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "mapview: refresh task ended abnormally");
        }
    }
    Ok(())
}

/// Starts a refresh without waiting for it, the way the page's update button
/// does; the synchronizer drops whichever one is superseded.
fn spawn_refresh(
    refreshes: &mut JoinSet<()>,
    sync: &Arc<ViewSynchronizer>,
    selection: &Selection,
) {
    let sync = sync.clone();
    let selection = selection.clone();
    refreshes.spawn(async move {
        match sync.refresh(&selection).await {
            Ok(RefreshOutcome::Applied) => {
                info!(selection = %describe_selection(&selection), "mapview: map updated");
            }
            Ok(RefreshOutcome::Superseded) => {
                info!(selection = %describe_selection(&selection), "mapview: update superseded");
            }
            Err(err) => error!(error = %err, "mapview: map update failed"),
        }
    });
}
