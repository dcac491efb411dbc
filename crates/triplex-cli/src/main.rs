//! Triplex CLI - Command-line interface
//!
//! Usage:
//!   triplex extract <file> [-e structural|pattern|llm]... [--json] [-o out]
//!   triplex evaluate <file>... [-n samples]
//!   triplex fetch [title]... [-o out]
//!
//! Input files are pre-annotated documents (CoNLL-U or spaCy JSON).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use triplex_core::{AppConfig, ArticleSource, LlmClient, LoggingConfig, RelationRecord};
use triplex_extractor::{
    Evaluation, LlmExtractor, PatternExtractor, RelationExtractor, StructuralExtractor,
};
use triplex_parser::LoaderRegistry;
use triplex_remote::{create_llm_client, WikipediaClient};

#[derive(Parser)]
#[command(name = "triplex")]
#[command(about = "Proper-noun relation triplet extraction")]
#[command(version)]
struct Cli {
    /// TOML configuration file (environment variables still override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract relation triplets from an annotated document
    Extract {
        /// CoNLL-U (.conllu) or spaCy JSON (.json) document
        file: PathBuf,

        /// Extractors to run, in order (default: structural and pattern)
        #[arg(short, long = "extractor", value_enum)]
        extractors: Vec<ExtractorKind>,

        /// Print one JSON object per record
        #[arg(long)]
        json: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run every available extractor and sample its output
    Evaluate {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Records to sample per extractor
        #[arg(short = 'n', long)]
        samples: Option<usize>,
    },
    /// Fetch the plain text of Wikipedia articles
    Fetch {
        /// Article titles (default: `evaluation.titles` from the config)
        titles: Vec<String>,

        /// Output file for one article, or directory for several
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExtractorKind {
    Structural,
    Pattern,
    Llm,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Extract {
            file,
            extractors,
            json,
            output,
        } => extract(&config, &file, extractors, json, output.as_deref()).await,
        Commands::Evaluate { files, samples } => evaluate(&config, &files, samples).await,
        Commands::Fetch { titles, output } => fetch(&config, titles, output.as_deref()).await,
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so that
/// extracted records on stdout stay machine-readable.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn build_extractor(
    kind: ExtractorKind,
    config: &AppConfig,
) -> anyhow::Result<Box<dyn RelationExtractor>> {
    let extractor: Box<dyn RelationExtractor> = match kind {
        ExtractorKind::Structural => Box::new(StructuralExtractor),
        ExtractorKind::Pattern => Box::new(PatternExtractor),
        ExtractorKind::Llm => {
            let client: Arc<dyn LlmClient> = Arc::from(create_llm_client(&config.llm)?);
            Box::new(LlmExtractor::with_config(client, config.extraction.clone())?)
        }
    };
    Ok(extractor)
}

/// Extractors for `evaluate`: both local ones, plus the LLM when configured
fn evaluation_kinds(config: &AppConfig) -> Vec<ExtractorKind> {
    let mut kinds = vec![ExtractorKind::Structural, ExtractorKind::Pattern];
    if config.llm.is_usable() {
        kinds.push(ExtractorKind::Llm);
    } else {
        warn!(
            provider = %config.llm.provider,
            "LLM provider not configured, skipping llm extractor"
        );
    }
    kinds
}

async fn extract(
    config: &AppConfig,
    file: &Path,
    mut kinds: Vec<ExtractorKind>,
    json: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    if kinds.is_empty() {
        kinds = vec![ExtractorKind::Structural, ExtractorKind::Pattern];
    }

    let document = LoaderRegistry::with_defaults()
        .load(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    info!(file = %file.display(), tokens = document.len(), "document loaded");

    let labelled = kinds.len() > 1;
    let mut lines = Vec::new();
    for kind in kinds {
        let extractor = build_extractor(kind, config)?;
        let records = extractor.extract(&document).await?;
        info!(extractor = extractor.name(), records = records.len(), "extraction done");

        lines.extend(render_records(extractor.name(), &records, json, labelled));
    }

    emit(&lines, output)
}

async fn evaluate(
    config: &AppConfig,
    files: &[PathBuf],
    samples: Option<usize>,
) -> anyhow::Result<()> {
    let samples = samples.unwrap_or(config.evaluation.num_samples);
    let extractors = evaluation_kinds(config)
        .into_iter()
        .map(|kind| build_extractor(kind, config))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let evaluation = Evaluation::from_extractors(extractors);
    let registry = LoaderRegistry::with_defaults();

    for file in files {
        let document = registry
            .load(file)
            .with_context(|| format!("Failed to load {}", file.display()))?;
        let reports = evaluation.run(&document).await;

        println!("== {} ==", file.display());
        let mut rng = rand::thread_rng();
        for report in &reports {
            match &report.records {
                Ok(records) => {
                    println!("{} ({} records)", report.name, records.len());
                    for record in report.sample(samples, &mut rng) {
                        println!("  {record}");
                    }
                }
                Err(e) => println!("{} failed: {e}", report.name),
            }
        }
    }

    Ok(())
}

async fn fetch(
    config: &AppConfig,
    titles: Vec<String>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let titles = fetch_titles(titles, config)?;
    let source = WikipediaClient::from_config(&config.article)?;

    if let [title] = titles.as_slice() {
        let text = source.fetch(title).await?;
        info!(title = %title, chars = text.chars().count(), "article fetched");
        return emit(&[text], output);
    }

    if let Some(dir) = output {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    for title in &titles {
        let text = source.fetch(title).await?;
        info!(title = %title, chars = text.chars().count(), "article fetched");

        match output {
            Some(dir) => emit(&[text], Some(dir.join(article_file_name(title)).as_path()))?,
            None => emit(&[format!("== {title} =="), text], None)?,
        }
    }
    Ok(())
}

/// Titles given on the command line, else the configured ones
fn fetch_titles(titles: Vec<String>, config: &AppConfig) -> anyhow::Result<Vec<String>> {
    let titles = if titles.is_empty() {
        config.evaluation.titles.clone()
    } else {
        titles
    };

    if titles.is_empty() {
        bail!("No article titles given and none configured");
    }
    if titles.iter().any(|t| t.trim().is_empty()) {
        bail!("Article title must not be empty");
    }
    Ok(titles)
}

fn article_file_name(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}.txt")
}

/// Canonical `(s, r, o)` lines, or JSON objects tagged with the extractor
fn render_records(
    extractor: &str,
    records: &[RelationRecord],
    json: bool,
    labelled: bool,
) -> Vec<String> {
    if json {
        return records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "extractor": extractor,
                    "subject": r.subject,
                    "relation": r.relation,
                    "object": r.object,
                })
                .to_string()
            })
            .collect();
    }

    let mut lines = Vec::with_capacity(records.len() + 1);
    if labelled {
        lines.push(format!("# {extractor}"));
    }
    lines.extend(records.iter().map(|r| r.to_string()));
    lines
}

fn emit(lines: &[String], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let mut content = lines.join("\n");
            content.push('\n');
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), lines = lines.len(), "output written");
        }
        None => {
            for line in lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn records() -> Vec<RelationRecord> {
        vec![
            RelationRecord::new("Brad Pitt", "married", "Jennifer Aniston"),
            RelationRecord::new("Angelina Jolie", "lives with", "Brad Pitt"),
        ]
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract_args() {
        let cli = Cli::try_parse_from([
            "triplex", "extract", "bio.conllu", "-e", "pattern", "-e", "llm", "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Extract {
                file,
                extractors,
                json,
                output,
            } => {
                assert_eq!(file, PathBuf::from("bio.conllu"));
                assert_eq!(extractors, vec![ExtractorKind::Pattern, ExtractorKind::Llm]);
                assert!(json);
                assert!(output.is_none());
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_evaluate_requires_a_file() {
        assert!(Cli::try_parse_from(["triplex", "evaluate"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["triplex", "fetch", "Donald Trump", "--config", "triplex.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("triplex.toml")));
    }

    #[test]
    fn test_fetch_falls_back_to_configured_titles() {
        let cli = Cli::try_parse_from(["triplex", "fetch"]).unwrap();
        let titles = match cli.command {
            Commands::Fetch { titles, .. } => titles,
            _ => panic!("expected fetch"),
        };
        assert!(titles.is_empty());

        let config = AppConfig::default();
        assert_eq!(
            fetch_titles(titles, &config).unwrap(),
            vec!["Bradley Pitt", "Donald Trump", "J.K. Rowling"]
        );
        assert_eq!(
            fetch_titles(vec!["Marie Curie".to_string()], &config).unwrap(),
            vec!["Marie Curie"]
        );
    }

    #[test]
    fn test_fetch_titles_rejects_blank_and_missing() {
        let mut config = AppConfig::default();
        assert!(fetch_titles(vec!["  ".to_string()], &config).is_err());

        config.evaluation.titles.clear();
        assert!(fetch_titles(Vec::new(), &config).is_err());
    }

    #[test]
    fn test_article_file_name() {
        assert_eq!(article_file_name("J.K. Rowling"), "J.K._Rowling.txt");
        assert_eq!(article_file_name("AC/DC"), "AC_DC.txt");
    }

    #[test]
    fn test_render_canonical() {
        assert_eq!(
            render_records("structural", &records(), false, false),
            vec![
                "(Brad Pitt, married, Jennifer Aniston)",
                "(Angelina Jolie, lives with, Brad Pitt)",
            ]
        );
        assert_eq!(
            render_records("structural", &records(), false, true)[0],
            "# structural"
        );
    }

    #[test]
    fn test_render_json_lines() {
        let lines = render_records("pattern", &records(), true, true);
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(value["extractor"], "pattern");
        assert_eq!(value["relation"], "lives with");
        assert_eq!(value["object"], "Brad Pitt");
    }

    #[test]
    fn test_evaluation_skips_unconfigured_llm() {
        let config = AppConfig::default();
        assert!(!config.llm.is_usable());
        assert_eq!(
            evaluation_kinds(&config),
            vec![ExtractorKind::Structural, ExtractorKind::Pattern]
        );
    }

    #[test]
    fn test_emit_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.txt");

        let lines: Vec<String> = records().iter().map(|r| r.to_string()).collect();
        emit(&lines, Some(path.as_path())).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "(Brad Pitt, married, Jennifer Aniston)\n(Angelina Jolie, lives with, Brad Pitt)\n"
        );
    }
}
