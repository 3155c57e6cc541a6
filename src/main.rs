use anyhow::{Context, Result};
use clap::Parser;
use doc_finder::cli::{Cli, Commands, FilterArgs, FindFormat};
use doc_finder::config::{Config, clear_index, resolve_config};
use doc_finder::error::{FinderError, is_cancelled};
use doc_finder::index::{ClassIndex, SearchQuery};
use doc_finder::indexer::{IndexOptions, run_index};
use doc_finder::markdown::render_markdown;
use doc_finder::record::ClassRecord;
use doc_finder::select::{FzfSelector, LessPager, run_interactive};
use doc_finder::view::{ViewMode, view_class};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        if is_cancelled(&err) {
            return;
        }
        match err.chain().find_map(|e| e.downcast_ref::<FinderError>()) {
            Some(e @ FinderError::NotFound { .. }) => eprintln!("{e}"),
            _ => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Index { no_jdk } => {
            let index = ClassIndex::open(&config.db_path())?;
            let options = IndexOptions {
                include_jdk: !no_jdk,
            };
            let summary = run_index(&config, &index, options)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Find {
            pattern,
            filters,
            format,
        } => {
            let index = ClassIndex::open(&config.db_path())?;
            let records = index.search(&search_query(&pattern, &filters))?;
            write_find_output(&config, &records, format)?;
        }
        Commands::View { key, source } => {
            let index = ClassIndex::open(&config.db_path())?;
            let text = view_class(&config, &index, key.trim(), view_mode(source))?;
            println!("{text}");
        }
        Commands::Select {
            pattern,
            source,
            filters,
        } => {
            let index = ClassIndex::open(&config.db_path())?;
            run_interactive(
                &config,
                &index,
                &search_query(pattern.as_deref().unwrap_or_default(), &filters),
                view_mode(source),
                &mut FzfSelector::default(),
                &mut LessPager::default(),
            )?;
        }
        Commands::Render { file } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{}", render_markdown(&html)?);
        }
        Commands::Stats => {
            let index = ClassIndex::open(&config.db_path())?;
            println!("{}", serde_json::to_string_pretty(&index.stats()?)?);
        }
        Commands::Clear { extracted } => {
            clear_index(&config, extracted)?;
            info!(db = %config.db_path().display(), extracted, "Index removed");
        }
    }

    Ok(())
}

fn search_query(pattern: &str, filters: &FilterArgs) -> SearchQuery {
    let mut query = if filters.exact {
        SearchQuery::exact(pattern)
    } else {
        SearchQuery::fuzzy(pattern)
    };
    query.filters = filters.coordinate_filters();
    query
}

fn view_mode(source: bool) -> ViewMode {
    if source { ViewMode::Source } else { ViewMode::Markdown }
}

/// Local paths are printed absolute so they can be opened directly.
fn display_path(config: &Config, path: &str) -> String {
    if doc_finder::record::is_url(path) {
        path.to_string()
    } else {
        config.output_root.join(path).to_string_lossy().to_string()
    }
}

fn write_find_output(config: &Config, records: &[ClassRecord], format: FindFormat) -> Result<()> {
    match format {
        FindFormat::Default => {
            let mut keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
            keys.sort_unstable();
            for key in keys {
                println!("{key}");
            }
        }
        FindFormat::Class => {
            for r in records {
                println!("{}", r.name);
            }
        }
        FindFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        FindFormat::Javadoc => {
            for r in records {
                println!("{}", display_path(config, &r.javadoc_path));
            }
        }
        FindFormat::Source => {
            for r in records {
                println!("{}", display_path(config, &r.source_path));
            }
        }
    }
    Ok(())
}
