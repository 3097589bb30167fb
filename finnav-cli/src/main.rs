mod command;
mod terminal;

use std::{io, io::BufRead, path::PathBuf, sync::Arc};

use clap::Parser;
use env_logger::{Builder, Env};
use url::Url;

use finnav_core::{
    actor::{Actor, Capacity},
    app::{App, Event, Services},
    catalog::Catalog,
    config::Config,
    content::{ContentSource, DirContentSource, HttpContentSource},
    error::Error,
    store::{FileStore, MemoryStore, PersistentStore},
};

const ENV_LOG: &str = "FINNAV_LOG";
const ENV_LOG_STYLE: &str = "FINNAV_LOG_STYLE";

/// Terminal front end for browsing the instrument catalog.
#[derive(Parser)]
#[command(name = "finnav", version)]
struct Args {
    /// Base URL or directory that instrument pages are loaded from.
    #[arg(long)]
    content: Option<String>,

    /// Catalog JSON file to use instead of the built-in one.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Starting location; its `item` and `section` parameters are restored.
    #[arg(long, default_value = "http://localhost/index.html")]
    url: Url,

    /// Use the in-memory store, so nothing is remembered between runs.
    #[arg(long)]
    ephemeral: bool,
}

fn main() {
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "warn")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let mut config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            log::warn!("failed to load config, using defaults: {err}");
            Config::default()
        }
    };
    if let Some(content) = args.content {
        config.content_base = content;
    }
    if let Some(catalog) = args.catalog {
        config.catalog_path = Some(catalog);
    }

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    let services = Services {
        catalog: Arc::new(catalog),
        content: content_source(&config),
        store: store(args.ephemeral),
    };

    let location = args.url;
    let handle = App::spawn("finnav_app", Capacity::Unbounded, move |sender| {
        let mut app = App::with_config(services, location, &config, sender);
        app.router_mut()
            .attach_content(Box::new(terminal::Page::default()));
        app.router_mut()
            .attach_loading_indicator(Box::new(terminal::Spinner));
        app.search_mut()
            .attach_surface(Box::new(terminal::DropdownPrinter::default()));
        app.search_mut().attach_input(Box::new(terminal::SearchBox));
        app.search_mut()
            .attach_results_page(Box::new(terminal::ResultsLink));
        app.overlay_mut().attach_sidebar(Box::new(terminal::Sidebar));
        app.overlay_mut()
            .attach_panel(Box::new(terminal::OverlayPrinter::default()));
        app.start();
        app
    })?;

    let sender = handle.sender();
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim() == "help" {
            println!("{}", command::HELP);
            continue;
        }
        match command::parse(&line) {
            Ok(event) => {
                let quit = matches!(event, Event::Shutdown);
                if sender.send(event).is_err() || quit {
                    break;
                }
            }
            Err(command::ParseError::Empty) => {}
            Err(err) => println!("{err}"),
        }
    }
    // Ignored if the loop already stopped.
    let _ = sender.send(Event::Shutdown);
    handle.join();
    Ok(())
}

fn content_source(config: &Config) -> Arc<dyn ContentSource> {
    match Url::parse(&config.content_base) {
        Ok(base) if matches!(base.scheme(), "http" | "https") => Arc::new(
            HttpContentSource::new(base, Config::proxy().as_deref(), config.fetch_timeout()),
        ),
        _ => Arc::new(DirContentSource::new(PathBuf::from(&config.content_base))),
    }
}

fn store(ephemeral: bool) -> Arc<dyn PersistentStore> {
    match Config::storage_dir() {
        Some(dir) if !ephemeral => Arc::new(FileStore::new(dir)),
        Some(_) => Arc::new(MemoryStore::new()),
        None => {
            log::warn!("no storage directory, recent items will not be kept");
            Arc::new(MemoryStore::new())
        }
    }
}
