//! textswap 命令行入口

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use textswap::env::core::{LogLevel, NoColor};
use textswap::env::EnvVar;
use textswap::html::{get_node_name, html_to_dom, serialize_document};
use textswap::translation::{
    build_table, constants, ConfigManager, HtmlTree, KeyValueStore, MemoryStore, RedbStore,
    SelectionPolicy, TextField, TextSwapEngine, TextTree, TranslationCache, TranslationConfig,
    TranslationResult,
};

#[derive(Parser)]
#[command(name = "textswap")]
#[command(version)]
#[command(about = "Reversible in-place text substitution for bilingual HTML pages")]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Storage database for language preference and translation cache
    #[arg(short, long, global = true, value_name = "FILE")]
    storage: Option<PathBuf>,

    /// Keep preference and cache in memory only
    #[arg(long, global = true, conflicts_with = "storage")]
    no_storage: bool,

    /// Extra phrase table merged into the builtin one (TOML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    table: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Switch every eligible node of an HTML document to a language
    Translate {
        /// Input HTML file, "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// Target language (defaults to the configured target language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document character encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },

    /// List the nodes the engine would manage, with their assigned ids
    Scan {
        /// Input HTML file, "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// Document character encoding
        #[arg(short, long, default_value = "utf-8")]
        encoding: String,
    },

    /// Inspect or reset the persisted translation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show entry counts and the saved language preference
    Stats,
    /// Remove every persisted cache entry
    Clear,
    /// Print all cache entries as JSON
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write an example configuration file
    Init {
        #[arg(value_name = "PATH", default_value = "textswap.toml")]
        path: PathBuf,
    },
    /// Print the effective configuration
    Show,
    /// List the environment variables that override the configuration
    Env,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LogLevel::get()
            .ok()
            .and_then(|level| tracing::Level::from_str(&level).ok())
            .unwrap_or(tracing::Level::INFO),
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_ansi(!NoColor::get_or_default(false))
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> TranslationResult<TranslationConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?.into_config(),
        None => ConfigManager::new()?.into_config(),
    };

    if let Some(storage) = &cli.storage {
        config.storage_path = Some(storage.to_string_lossy().into_owned());
    }
    if let Some(table) = &cli.table {
        config.table_path = Some(table.to_string_lossy().into_owned());
    }

    Ok(config)
}

fn open_store(cli: &Cli, config: &TranslationConfig) -> TranslationResult<Box<dyn KeyValueStore>> {
    if cli.no_storage {
        return Ok(Box::new(MemoryStore::new()));
    }

    let store = RedbStore::open(config.resolved_storage_path())?;
    Ok(Box::new(store))
}

/// 存储打不开时退回内存存储，翻译照常进行
fn open_store_or_memory(cli: &Cli, config: &TranslationConfig) -> Box<dyn KeyValueStore> {
    match open_store(cli, config) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(
                "无法打开存储 {}: {}，本次只使用内存状态",
                config.resolved_storage_path().display(),
                e
            );
            Box::new(MemoryStore::new())
        }
    }
}

fn read_input(input: &str) -> io::Result<Vec<u8>> {
    if input == "-" {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        Ok(data)
    } else {
        fs::read(input)
    }
}

fn write_output(output: Option<&Path>, data: &[u8]) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()
        }
    }
}

fn parse_tree(input: &str, encoding: &str, config: &TranslationConfig) -> TranslationResult<HtmlTree> {
    let data = read_input(input)?;
    let dom = html_to_dom(&data, encoding)?;
    Ok(HtmlTree::new(dom, SelectionPolicy::from(config)))
}

async fn run(cli: Cli) -> TranslationResult<()> {
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Translate {
            input,
            lang,
            output,
            encoding,
        } => {
            let tree = parse_tree(input, encoding, &config)?;
            let table = build_table(&config)?;
            let store = open_store_or_memory(&cli, &config);
            let lang = lang.clone().unwrap_or_else(|| config.target_lang.clone());

            let engine = TextSwapEngine::new(tree, table, store, config)?;
            // 切换到源语言只是恢复原文，不需要提示
            if engine.language_state().source() != lang.trim().to_lowercase() {
                eprintln!("{}", constants::LOADING_MESSAGE);
            }
            let report = engine.translate_to(&lang).await?;

            let bytes = serialize_document(&engine.tree().dom().document, encoding)?;
            write_output(output.as_deref(), &bytes)?;

            eprintln!(
                "{}: {}/{} nodes written, {} failed",
                report.language,
                report.nodes_written,
                report.nodes_total,
                report.failed.len()
            );
            for failure in &report.failed {
                eprintln!("  {} {:?}: {}", failure.id, failure.text, failure.error);
            }
        }

        Commands::Scan { input, encoding } => {
            let tree = parse_tree(input, encoding, &config)?;
            let engine = TextSwapEngine::new(tree, build_table(&config)?, MemoryStore::new(), config)?;
            engine.snapshot_originals();

            let tree = engine.tree();
            let mut stdout = io::stdout().lock();
            for node in tree.eligible_nodes() {
                let id = tree.node_id(&node).map(|id| id.to_string()).unwrap_or_default();
                let text = tree.read_text(&node);

                let mut line = format!("{}\t{}", id, get_node_name(&node).unwrap_or("?"));
                for field in TextField::ALL {
                    if let Some(value) = text.field(field) {
                        let name = field.attr_name().unwrap_or("text");
                        line.push_str(&format!("\t{}={:?}", name, value));
                    }
                }
                writeln!(stdout, "{}", line)?;
            }

            let stats = tree.stats();
            eprintln!(
                "{} eligible nodes, {} excluded subtrees",
                stats.eligible_nodes, stats.exempt_subtrees
            );
        }

        Commands::Cache { action } => {
            let store = open_store(&cli, &config)?;

            match action {
                CacheAction::Stats => {
                    let cache = TranslationCache::load_from(store.as_ref())?;
                    let preference = store.get(constants::PREFERENCE_KEY)?;

                    println!("entries: {}", cache.len());
                    let mut per_lang = std::collections::BTreeMap::new();
                    for entry in cache.entries() {
                        *per_lang.entry(entry.lang).or_insert(0usize) += 1;
                    }
                    for (lang, count) in per_lang {
                        println!("  {}: {}", lang, count);
                    }
                    println!(
                        "preferred language: {}",
                        preference.as_deref().unwrap_or("(none)")
                    );
                }
                CacheAction::Clear => {
                    let removed = store.remove(constants::CACHE_KEY)?;
                    println!(
                        "{}",
                        if removed {
                            "translation cache cleared"
                        } else {
                            "translation cache already empty"
                        }
                    );
                }
                CacheAction::Export { output } => {
                    let cache = TranslationCache::load_from(store.as_ref())?;
                    let json = serde_json::to_string_pretty(&cache.entries())?;
                    write_output(output.as_deref(), format!("{}\n", json).as_bytes())?;
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { path } => {
                ConfigManager::generate_example_config(path)?;
                println!("wrote {}", path.display());
            }
            ConfigAction::Show => {
                let content = toml::to_string_pretty(&config).map_err(|e| {
                    textswap::translation::TranslationError::SerializationError(e.to_string())
                })?;
                print!("{}", content);
            }
            ConfigAction::Env => print!("{}", textswap::env::generate_env_docs()),
        },
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
