use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use mvvmap_data::{
    AnalysisData, CompanyProfile, DatasetStats, EmbeddingIndex, load_records, preprocess,
    text_features, to_entities,
};
use mvvmap_layout::{
    Entity, LayoutConfig, LayoutPreset, MapLayout, UNCLASSIFIED, layout, text_feature_scores,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no profile rows in {0}")]
    NoRows(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Data(#[from] mvvmap_data::Error),
    #[error("invalid layout config: {0}")]
    Layout(#[from] mvvmap_layout::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: json5::Error,
    },
}

impl CliError {
    fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Summarize organization profiles and lay them out as a similarity map.
#[derive(Parser)]
#[command(name = "mvvmap", version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print dataset statistics for a profile CSV
    Summary {
        csv: PathBuf,
        /// Also write the analysis-ready JSON here
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Lay the entities out and print the map as JSON
    Layout {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        layout: LayoutArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Rank entities by uniqueness, most distinctive first
    Rank {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        layout: LayoutArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Keep only the first N entries
        #[arg(long)]
        top: Option<usize>,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Entities JSON (`[{ id, name, category?, embedding? }]`); `-` reads stdin
    #[arg(conflicts_with = "csv")]
    entities: Option<String>,
    /// Profile CSV to load instead of an entities file
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Embeddings JSON (`{ "company_1": [..], .. }`) joined onto the CSV profiles
    #[arg(long, requires = "csv")]
    embeddings: Option<PathBuf>,
}

#[derive(Args)]
struct LayoutArgs {
    /// competitive-map | similarity-canvas
    #[arg(long, default_value = "competitive-map", value_parser = parse_preset)]
    preset: LayoutPreset,
    /// JSON5 file whose keys override the preset
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long)]
    pretty: bool,
    /// Write to this file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_preset(s: &str) -> Result<LayoutPreset, String> {
    s.parse()
        .map_err(|()| format!("unknown preset `{s}` (expected competitive-map|similarity-canvas)"))
}

struct LoadedInput {
    entities: Vec<Entity>,
    /// Present only for CSV input; feeds the text-feature fallback.
    profiles: Option<Vec<CompanyProfile>>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum ScoreSource {
    Embedding,
    Text,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RankEntry {
    rank: usize,
    id: String,
    name: String,
    category: String,
    score: f64,
    source: ScoreSource,
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::io("<stdin>", e))?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path).map_err(|e| CliError::io(path, e)),
    }
}

fn load_input(args: &InputArgs) -> Result<LoadedInput, CliError> {
    let Some(csv) = args.csv.as_deref() else {
        let text = read_input(args.entities.as_deref())?;
        let entities: Vec<Entity> = serde_json::from_str(&text)?;
        return Ok(LoadedInput {
            entities,
            profiles: None,
        });
    };

    let profiles = preprocess(&load_records(csv)?);
    let index = match args.embeddings.as_deref() {
        Some(path) => EmbeddingIndex::load(path)?,
        None => EmbeddingIndex::default(),
    };
    Ok(LoadedInput {
        entities: to_entities(&profiles, &index),
        profiles: Some(profiles),
    })
}

/// Preset values with the config file's keys merged over them.
fn load_config(args: &LayoutArgs) -> Result<LayoutConfig, CliError> {
    let mut config = LayoutConfig::preset(args.preset);
    if let Some(path) = args.config.as_deref() {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::io(display(path), e))?;
        let overrides: Value = json5::from_str(&text).map_err(|source| CliError::Config {
            path: display(path),
            source,
        })?;
        let mut merged = serde_json::to_value(&config)?;
        deep_merge_value(&mut merged, &overrides);
        config = serde_json::from_value(merged)?;
    }
    config.validate()?;
    Ok(config)
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&Path>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| CliError::io(display(parent), e))?;
            }
            std::fs::write(path, text).map_err(|e| CliError::io(display(path), e))
        }
    }
}

fn summary_text(stats: &DatasetStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("total: {}\n", stats.total));
    out.push_str(&format!("completed: {}\n", stats.completed));
    out.push_str(&format!("categories: {}\n", stats.category_count));
    for (label, filled) in [
        ("mission", stats.mission_filled),
        ("vision", stats.vision_filled),
        ("values", stats.values_filled),
    ] {
        out.push_str(&format!(
            "{label}: {filled}/{} ({:.1}%)\n",
            stats.total,
            stats.fill_rate(filled)
        ));
    }
    out.push_str("top categories:\n");
    for c in &stats.top_categories {
        out.push_str(&format!("  {}: {}\n", c.category, c.count));
    }
    out
}

fn rank_entries(map: &MapLayout, profiles: Option<&[CompanyProfile]>) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = if !map.is_empty() {
        map.positions
            .iter()
            .map(|p| RankEntry {
                rank: 0,
                id: p.id.clone(),
                name: p.name.clone(),
                category: p.category.clone(),
                score: p.uniqueness_score,
                source: ScoreSource::Embedding,
            })
            .collect()
    } else if let Some(profiles) = profiles {
        tracing::info!("no embedding layout; ranking by text features");
        let scores = text_feature_scores(&text_features(profiles));
        profiles
            .iter()
            .zip(scores)
            .map(|(p, score)| RankEntry {
                rank: 0,
                id: p.id.clone(),
                name: p.name.clone(),
                category: if p.category.is_empty() {
                    UNCLASSIFIED.to_string()
                } else {
                    p.category.clone()
                },
                score,
                source: ScoreSource::Text,
            })
            .collect()
    } else {
        tracing::warn!("no embedding layout and no profile text to rank");
        Vec::new()
    };

    // Stable sort keeps input order among equal scores.
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    for (i, e) in entries.iter_mut().enumerate() {
        e.rank = i + 1;
    }
    entries
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Summary { csv, out } => {
            let records = load_records(&csv)?;
            if records.is_empty() {
                return Err(CliError::NoRows(display(&csv)));
            }
            print!("{}", summary_text(&DatasetStats::from_records(&records)));
            if let Some(out) = out {
                AnalysisData::build(&preprocess(&records)).save(&out)?;
            }
            Ok(())
        }
        Command::Layout {
            input,
            layout: layout_args,
            output,
        } => {
            let config = load_config(&layout_args)?;
            let loaded = load_input(&input)?;
            let map = layout(&loaded.entities, &config);
            write_json(&map, output.pretty, output.out.as_deref())
        }
        Command::Rank {
            input,
            layout: layout_args,
            output,
            top,
        } => {
            let config = load_config(&layout_args)?;
            let loaded = load_input(&input)?;
            let map = layout(&loaded.entities, &config);
            let mut entries = rank_entries(&map, loaded.profiles.as_deref());
            if let Some(top) = top {
                entries.truncate(top);
            }
            write_json(&entries, output.pretty, output.out.as_deref())
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
