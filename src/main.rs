mod check;
mod outline;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use timeline_core::accordion::AccordionBuilder;
use timeline_core::glossary::GlossaryMatcher;
use timeline_core::index::SearchIndex;
use timeline_core::query::{NO_RESULTS, QueryEngine, SearchOutcome, Snippet};
use timeline_core::{Config, ContentStore};

#[derive(Parser)]
#[command(
    name = "timeline",
    about = "Authoring tool for the bilingual history timeline content"
)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate a content directory
    Check {
        /// Content directory (defaults to the configured content base)
        dir: Option<PathBuf>,
    },
    /// Print the flattened search index as JSON
    Index { dir: Option<PathBuf> },
    /// Run a query against the index: `timeline search [DIR] -- maurya empire`
    Search {
        dir: Option<PathBuf>,
        #[arg(last = true, required = true)]
        query: Vec<String>,
    },
    /// Print a section's accordion tree with its colour categories
    Outline {
        /// Section id, e.g. "ancient"
        section: String,
        dir: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

/// `Ok(false)` means the command ran but found problems.
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;
    let dir_or_default = |dir: Option<PathBuf>| dir.unwrap_or_else(|| PathBuf::from(&config.content_base));

    match cli.command {
        Command::Check { dir } => run_check(&dir_or_default(dir)),
        Command::Index { dir } => run_index(&dir_or_default(dir)).map(|_| true),
        Command::Search { dir, query } => {
            run_search(&dir_or_default(dir), &config, &query.join(" ")).map(|_| true)
        }
        Command::Outline { section, dir } => {
            run_outline(&dir_or_default(dir), &section).map(|_| true)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn load_store(dir: &Path) -> Result<ContentStore> {
    let store = ContentStore::load_dir(dir)
        .with_context(|| format!("loading content from {}", dir.display()))?;
    info!(dir = %dir.display(), sections = store.section_ids().len(), "loaded content");
    Ok(store)
}

// ── check ────────────────────────────────────────────────────────────────

fn run_check(dir: &Path) -> Result<bool> {
    let store = load_store(dir)?;
    let mut report = check::check_store(&store);
    report.extend(check::stray_files(dir));

    for finding in report.findings() {
        println!("{finding}");
    }
    let errors = report.error_count();
    eprintln!(
        "{}: {} error(s), {} warning(s)",
        dir.display(),
        errors,
        report.findings().len() - errors
    );
    Ok(errors == 0)
}

// ── index ────────────────────────────────────────────────────────────────

fn run_index(dir: &Path) -> Result<()> {
    let store = load_store(dir)?;
    let index = SearchIndex::rebuild(&store);
    let json = serde_json::to_string_pretty(index.records()).context("serializing index")?;
    println!("{json}");
    eprintln!("{} record(s)", index.len());
    Ok(())
}

// ── search ───────────────────────────────────────────────────────────────

fn run_search(dir: &Path, config: &Config, query: &str) -> Result<()> {
    let store = load_store(dir)?;
    let index = SearchIndex::rebuild(&store);
    let engine = QueryEngine::from_config(config);

    let hits = match engine.search(&index, query) {
        SearchOutcome::Inactive => bail!(
            "query {query:?} is shorter than {} character(s)",
            config.min_query_chars
        ),
        SearchOutcome::Results(hits) => hits,
    };
    if hits.is_empty() {
        println!("{NO_RESULTS}");
        return Ok(());
    }
    for hit in &hits {
        println!("{}  [{}]", hit.record.path, hit.record.id);
        println!("    {}", render_snippet(&hit.snippet));
    }
    eprintln!("{} result(s) for {query:?}", hits.len());
    Ok(())
}

/// Highlighted pieces wrapped in `**`.
fn render_snippet(snippet: &Snippet) -> String {
    snippet
        .pieces
        .iter()
        .map(|p| {
            if p.highlighted {
                format!("**{}**", p.text)
            } else {
                p.text.clone()
            }
        })
        .collect()
}

// ── outline ──────────────────────────────────────────────────────────────

fn run_outline(dir: &Path, section: &str) -> Result<()> {
    let store = load_store(dir)?;
    let matcher = GlossaryMatcher::from_glossary(&store.glossary)
        .context("compiling glossary matcher")?;
    let Some(view) = AccordionBuilder::new(&store)
        .with_glossary(&matcher)
        .build_section(section)
    else {
        bail!(
            "no section {section:?}; available: {}",
            store.section_ids().join(", ")
        );
    };
    print!("{}", outline::render_outline(&view));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeline_core::query::SnippetPiece;

    #[test]
    fn test_render_snippet_marks_highlights() {
        let snippet = Snippet {
            pieces: vec![
                SnippetPiece {
                    text: "...the ".to_string(),
                    highlighted: false,
                },
                SnippetPiece {
                    text: "Maurya".to_string(),
                    highlighted: true,
                },
                SnippetPiece {
                    text: " empire".to_string(),
                    highlighted: false,
                },
            ],
        };
        assert_eq!(render_snippet(&snippet), "...the **Maurya** empire");
    }

    #[test]
    fn test_cli_parses_search_after_separator() {
        let cli = Cli::try_parse_from(["timeline", "search", "content", "--", "maurya", "empire"])
            .unwrap();
        match cli.command {
            Command::Search { dir, query } => {
                assert_eq!(dir, Some(PathBuf::from("content")));
                assert_eq!(query, vec!["maurya", "empire"]);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_cli_outline_dir_optional() {
        let cli = Cli::try_parse_from(["timeline", "--config", "c.json", "outline", "ancient"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(
            cli.command,
            Command::Outline { ref section, dir: None } if section == "ancient"
        ));
    }
}
