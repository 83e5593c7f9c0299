// Command-line front end for the catalog. Presentation glue only: parses
// argv into typed commands, dispatches them, renders results as text.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use lore_catalog::{
    bootstrap, dispatch, export_csv, region_set, restore, run_query, BootstrapOutcome,
    CatalogError, CatalogStore, Command, CommandOutcome, QueryParams, RecordFields, SortOrder,
    SourceEntry, SqliteStateStore, StateStore, DEFAULT_SOURCE_FILE,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    // Durable state lives in one SQLite-backed slot
    let db_path = env::var("LORE_CATALOG_DB").unwrap_or_else(|_| "catalog.db".to_string());
    let mut state = SqliteStateStore::open(Path::new(&db_path))
        .with_context(|| format!("could not open state store at {}", db_path))?;

    // Restore a prior session, or start empty and try the default source
    let mut store = restore(&state).unwrap_or_default();
    let base_path =
        env::var("LORE_CATALOG_BASE").unwrap_or_else(|_| DEFAULT_SOURCE_FILE.to_string());
    run_bootstrap(&mut store, &mut state, &base_path);

    let rest = args.get(1..).unwrap_or(&[]);
    match args.first().map(String::as_str) {
        None | Some("list") => cmd_list(&store, rest),
        Some("show") => cmd_show(&store, rest),
        Some("add") => cmd_add(&mut store, &mut state, rest),
        Some("edit") => cmd_edit(&mut store, &mut state, rest),
        Some("remove") => cmd_remove(&mut store, &mut state, rest),
        Some("remove-source") => cmd_remove_source(&mut store, &mut state, rest),
        Some("remove-manual") => cmd_remove_manual(&mut store, &mut state),
        Some("import") => cmd_import(&mut store, &mut state, rest),
        Some("export") => cmd_export(&store, rest),
        Some("sources") => cmd_sources(&store),
        Some("regions") => cmd_regions(&store),
        Some("help") | Some("--help") | Some("-h") => {
            usage();
            Ok(())
        }
        Some(other) => {
            eprintln!("unknown command: {}", other);
            usage();
            std::process::exit(1);
        }
    }
}

fn run_bootstrap(store: &mut CatalogStore, state: &mut dyn StateStore, base_path: &str) {
    match bootstrap(store, state, Path::new(base_path)) {
        BootstrapOutcome::Loaded(batch) => {
            println!(
                "📂 Loaded {} ({} items) automatically",
                batch.file_name, batch.record_count
            );
        }
        BootstrapOutcome::AlreadyPopulated => {}
        BootstrapOutcome::NoData(reason) => {
            tracing::debug!("starting with an empty catalog: {}", reason);
        }
    }
}

fn cmd_list(store: &CatalogStore, args: &[String]) -> Result<()> {
    let flags = parse_flags(args)?;
    let params = QueryParams {
        search: flags.get("search").cloned().unwrap_or_default(),
        region: flags.get("region").cloned().unwrap_or_default(),
        sort: flags
            .get("sort")
            .map(|token| SortOrder::parse(token))
            .unwrap_or_default(),
    };

    let results = run_query(store, &params);
    if results.is_empty() {
        if store.is_empty() {
            println!("No items yet. Import a CSV or add items manually.");
        } else {
            println!("No items match your search/filter");
        }
        return Ok(());
    }

    for record in &results {
        println!("{}  {}  [{}]", record.id, record.name, record.region);
    }
    println!("\n{} item(s)", results.len());
    Ok(())
}

fn cmd_show(store: &CatalogStore, args: &[String]) -> Result<()> {
    let id = args.first().ok_or_else(|| anyhow!("usage: show <id>"))?;
    let record = store
        .get(id)
        .ok_or_else(|| CatalogError::NotFound { id: id.clone() })?;

    println!("{}", record.name);
    println!("  id:          {}", record.id);
    println!("  region:      {}", record.region);
    println!("  description: {}", record.description_lore);
    println!("  lore:        {}", record.lore);
    println!("  image:       {}", record.image);
    println!("  source:      {} ({:?})", record.source_id, record.origin);
    Ok(())
}

fn cmd_add(store: &mut CatalogStore, state: &mut dyn StateStore, args: &[String]) -> Result<()> {
    let flags = parse_flags(args)?;
    let fields = RecordFields {
        name: flags.get("name").cloned().unwrap_or_default(),
        region: flags.get("region").cloned().unwrap_or_default(),
        description_lore: flags.get("description").cloned().unwrap_or_default(),
        lore: flags.get("lore").cloned().unwrap_or_default(),
        image: flags.get("image").cloned().unwrap_or_default(),
    };

    match dispatch(store, state, Command::AddRecord(fields))? {
        CommandOutcome::Added(record) => {
            println!("✓ Added \"{}\" ({})", record.name, record.id);
        }
        other => bail!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

fn cmd_edit(store: &mut CatalogStore, state: &mut dyn StateStore, args: &[String]) -> Result<()> {
    let id = args
        .first()
        .ok_or_else(|| anyhow!("usage: edit <id> [--name ..] [--region ..] ..."))?
        .clone();
    let flags = parse_flags(&args[1..])?;

    // unspecified fields keep their current value, as an edit form would
    let current = store
        .get(&id)
        .cloned()
        .ok_or_else(|| CatalogError::NotFound { id: id.clone() })?;
    let fields = RecordFields {
        name: flags.get("name").cloned().unwrap_or(current.name),
        region: flags.get("region").cloned().unwrap_or(current.region),
        description_lore: flags
            .get("description")
            .cloned()
            .unwrap_or(current.description_lore),
        lore: flags.get("lore").cloned().unwrap_or(current.lore),
        image: flags.get("image").cloned().unwrap_or(current.image),
    };

    match dispatch(store, state, Command::EditRecord { id, fields })? {
        CommandOutcome::Edited(record) => {
            println!("✓ Saved \"{}\"", record.name);
        }
        other => bail!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

fn cmd_remove(store: &mut CatalogStore, state: &mut dyn StateStore, args: &[String]) -> Result<()> {
    let id = args.first().ok_or_else(|| anyhow!("usage: remove <id>"))?.clone();

    match dispatch(store, state, Command::RemoveRecord { id })? {
        CommandOutcome::Removed(record) => {
            println!("✓ Deleted \"{}\"", record.name);
        }
        other => bail!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

fn cmd_remove_source(
    store: &mut CatalogStore,
    state: &mut dyn StateStore,
    args: &[String],
) -> Result<()> {
    let source_id = args
        .first()
        .ok_or_else(|| anyhow!("usage: remove-source <source-id>"))?
        .clone();

    match dispatch(store, state, Command::RemoveBatch { source_id })? {
        CommandOutcome::BatchRemoved {
            source_id,
            records_removed,
        } => {
            println!("✓ Removed source {} and {} item(s)", source_id, records_removed);
        }
        other => bail!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

fn cmd_remove_manual(store: &mut CatalogStore, state: &mut dyn StateStore) -> Result<()> {
    match dispatch(store, state, Command::RemoveManual)? {
        CommandOutcome::ManualRemoved { records_removed } => {
            println!("✓ Removed {} manually added item(s)", records_removed);
        }
        other => bail!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

fn cmd_import(store: &mut CatalogStore, state: &mut dyn StateStore, args: &[String]) -> Result<()> {
    let path = args.first().ok_or_else(|| anyhow!("usage: import <file.csv>"))?;
    let path = Path::new(path);

    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("invalid file name: {}", path.display()))?
        .to_string();

    match dispatch(store, state, Command::ImportFile { file_name, text })? {
        CommandOutcome::Imported(batch) => {
            println!("✓ Loaded {} ({} items)", batch.file_name, batch.record_count);
        }
        other => bail!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

fn cmd_export(store: &CatalogStore, args: &[String]) -> Result<()> {
    let text = export_csv(store)?;

    match args.first() {
        Some(path) => {
            fs::write(path, &text).with_context(|| format!("could not write {}", path))?;
            println!("✓ Exported {} item(s) to {}", store.len(), path);
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn cmd_sources(store: &CatalogStore) -> Result<()> {
    let summary = store.sources_summary();
    if summary.is_empty() {
        println!("No files loaded");
        return Ok(());
    }

    for entry in summary {
        match entry {
            SourceEntry::File {
                source_id,
                file_name,
                record_count,
            } => println!("{} ({} items)  [{}]", file_name, record_count, source_id),
            SourceEntry::Manual { record_count } => {
                println!("Manually Added ({} items)", record_count)
            }
        }
    }
    Ok(())
}

fn cmd_regions(store: &CatalogStore) -> Result<()> {
    for region in region_set(store) {
        println!("{}", region);
    }
    Ok(())
}

/// Parse trailing `--flag value` pairs.
fn parse_flags(args: &[String]) -> Result<HashMap<String, String>> {
    let mut flags = HashMap::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let name = arg
            .strip_prefix("--")
            .ok_or_else(|| anyhow!("unexpected argument '{}'", arg))?;
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("missing value for --{}", name))?;
        flags.insert(name.to_string(), value.clone());
    }
    Ok(flags)
}

fn usage() {
    eprintln!("Usage: lore-catalog <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  list [--search S] [--region R] [--sort nameAsc|nameDesc|regionAsc|regionDesc]");
    eprintln!("  show <id>");
    eprintln!("  add --name N [--region R] [--description D] [--lore L] [--image URL]");
    eprintln!("  edit <id> [--name N] [--region R] [--description D] [--lore L] [--image URL]");
    eprintln!("  remove <id>");
    eprintln!("  remove-source <source-id>");
    eprintln!("  remove-manual");
    eprintln!("  import <file.csv>");
    eprintln!("  export [file.csv]");
    eprintln!("  sources");
    eprintln!("  regions");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LORE_CATALOG_DB    state database path (default: catalog.db)");
    eprintln!("  LORE_CATALOG_BASE  default source path (default: base-items.csv)");
}
