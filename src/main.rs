//! htmlchunk - HTML ⇄ editable chunk converter

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use htmlchunk::chunk::{self, ChunkConfig, DEFAULT_MAX_CHUNK_CHARS};
use htmlchunk::tree::{self, TreeStats};
use htmlchunk::{EditMap, Result, render, update};

#[derive(Parser)]
#[command(name = "htmlchunk")]
#[command(version, about = "Convert HTML to id-tagged chunks for external editing and back", long_about = None)]
#[command(after_help = "EXAMPLES:
    htmlchunk to-json page.html -o page.json        Build the tree
    htmlchunk extract page.json --split chunks/     One file per chunk
    htmlchunk apply page.json chunks/* --html       Merge edited chunks, print HTML
    htmlchunk info page.json                        Show tree statistics")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Convert HTML into tree JSON
    ToJson(Io),

    /// Render tree JSON back into HTML
    ToHtml(Io),

    /// Extract editable text from tree JSON as chunks
    Extract {
        #[command(flatten)]
        io: Io,

        /// Cut a chunk once it reaches this many characters
        #[arg(long, env = "HTMLCHUNK_MAX_CHARS", default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
        max_chars: usize,

        /// Write a JSON array of chunks instead of concatenated text
        #[arg(long, conflicts_with = "split")]
        json: bool,

        /// Write each chunk to DIR/chunk-NNN.txt
        #[arg(long, value_name = "DIR")]
        split: Option<PathBuf>,
    },

    /// Parse edited chunk text into an edit map (JSON)
    Parse(Io),

    /// Merge edited chunk files into tree JSON
    Apply {
        /// Tree JSON produced by `to-json`
        #[arg(value_name = "TREE")]
        tree: PathBuf,

        /// Edited chunk files, concatenated in the order given
        #[arg(value_name = "EDITED", required = true)]
        edited: Vec<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Render the updated tree as HTML instead of JSON
        #[arg(long)]
        html: bool,
    },

    /// Show tree statistics
    Info {
        /// Tree JSON (stdin if omitted or `-`)
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Chunk size used for the chunk count
        #[arg(long, env = "HTMLCHUNK_MAX_CHARS", default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
        max_chars: usize,
    },
}

#[derive(Args)]
struct Io {
    /// Input file (stdin if omitted or `-`)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool, verbose: u8) {
    let default_level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::ToJson(io) => {
            let html = read_input(io.input.as_deref())?;
            write_output(io.output.as_deref(), &htmlchunk::html_to_json(&html)?)
        }
        Command::ToHtml(io) => {
            let json = read_input(io.input.as_deref())?;
            write_output(io.output.as_deref(), &htmlchunk::json_to_html(&json)?)
        }
        Command::Extract {
            io,
            max_chars,
            json,
            split,
        } => {
            let tree = tree::from_json(&read_input(io.input.as_deref())?, "extract_chunks")?;
            let config = ChunkConfig::new().with_max_chars(max_chars);
            let chunks = chunk::extract_chunks(&tree, &config);

            if let Some(dir) = split {
                fs::create_dir_all(&dir)?;
                for c in &chunks {
                    fs::write(dir.join(format!("chunk-{:03}.txt", c.index)), c.to_string())?;
                }
                tracing::info!("wrote {} chunks to {}", chunks.len(), dir.display());
                return Ok(());
            }

            let lines: Vec<String> = chunks.iter().map(ToString::to_string).collect();
            let out = if json {
                serde_json::to_string_pretty(&lines)?
            } else {
                lines.concat()
            };
            write_output(io.output.as_deref(), &out)
        }
        Command::Parse(io) => {
            let edits = EditMap::parse(&read_input(io.input.as_deref())?);
            write_output(io.output.as_deref(), &serde_json::to_string_pretty(&edits)?)
        }
        Command::Apply {
            tree: tree_path,
            edited,
            output,
            html,
        } => {
            let tree = tree::from_json(&fs::read_to_string(&tree_path)?, "apply_edits")?;

            let mut text = String::new();
            for path in &edited {
                text.push_str(&fs::read_to_string(path)?);
            }
            let edits = EditMap::parse(&text);
            let updated = update::update_tree(&tree, &edits);

            let out = if html {
                render::render(&updated)
            } else {
                tree::to_json(&updated)?
            };
            write_output(output.as_deref(), &out)
        }
        Command::Info { input, max_chars } => {
            let tree = tree::from_json(&read_input(input.as_deref())?, "info")?;
            let stats = TreeStats::collect(&tree);
            let chunks =
                chunk::extract_chunks(&tree, &ChunkConfig::new().with_max_chars(max_chars));

            println!("Nodes: {}", stats.nodes);
            println!("Elements: {}", stats.elements);
            println!("Text nodes: {}", stats.texts);
            println!("Editable: {}", stats.editable);
            println!("Depth: {}", stats.depth);
            println!("Chunks: {} (limit {max_chars} chars)", chunks.len());
            Ok(())
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => Ok(fs::read_to_string(p)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(p) => fs::write(p, content)?,
        // No trailing newline: it would become part of the last chunk's text
        None => io::stdout().lock().write_all(content.as_bytes())?,
    }
    Ok(())
}
