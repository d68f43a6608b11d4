use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use email_triage::config::TriageConfig;
use email_triage::engine::TriageEngine;
use email_triage::reply::response_kind;

#[derive(Parser)]
#[command(name = "email-triage")]
#[command(version, about = "Rule-based triage for Portuguese email: classify, summarize, reply")]
struct Cli {
    /// JSON pattern overrides (takes precedence over TRIAGE_PATTERNS_PATH)
    #[arg(long, global = true)]
    patterns: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one email
    Classify {
        /// Read the email from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Extractive summary of one email
    Summarize {
        #[arg(long)]
        file: Option<PathBuf>,
        /// Sentences to keep (1-10)
        #[arg(long)]
        sentences: Option<usize>,
    },

    /// Suggested reply, from labels or by classifying an email
    Respond {
        #[arg(long)]
        file: Option<PathBuf>,
        /// Category label; when given, no email is read
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        subcategory: String,
        #[arg(long, default_value = "")]
        tone: String,
        #[arg(long, default_value = "")]
        urgency: String,
    },

    /// Classify and answer several emails separated by `---` lines
    Batch {
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Split a pasted thread into individual emails
    Thread {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct LabelReply {
    suggested_response: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = TriageConfig::from_env().context("invalid TRIAGE_* environment")?;
    if let Some(path) = cli.patterns {
        config.patterns_path = Some(path);
    }
    let engine = TriageEngine::from_config(config).context("failed to build triage engine")?;

    match cli.command {
        Commands::Classify { file } => {
            let text = read_input(file.as_deref())?;
            print_json(&engine.classify(&text))
        }
        Commands::Summarize { file, sentences } => {
            let text = read_input(file.as_deref())?;
            print_json(&engine.summarize(&text, sentences))
        }
        Commands::Respond {
            file: _,
            category: Some(category),
            subcategory,
            tone,
            urgency,
        } => {
            let suggested_response =
                engine.generate_response_from_labels(&category, &subcategory, &tone, &urgency);
            print_json(&LabelReply { suggested_response })
        }
        Commands::Respond {
            file,
            category: None,
            ..
        } => {
            let text = read_input(file.as_deref())?;
            let c = engine.classify(&text);
            print_json(&serde_json::json!({
                "suggested_response": engine.generate_response(c.category, c.subcategory, c.tone, c.urgency),
                "response_kind": response_kind(c.subcategory, c.tone, c.urgency),
                "classification": c,
            }))
        }
        Commands::Batch { file } => {
            let input = read_input(file.as_deref())?;
            let texts = split_batch(&input);
            debug!(count = texts.len(), "Batch input split");
            let report = engine.classify_batch(texts).await?;
            print_json(&report)
        }
        Commands::Thread { file } => {
            let text = read_input(file.as_deref())?;
            print_json(&engine.parse_thread(&text))
        }
    }
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One email per block; blocks are separated by lines containing only `---`.
/// Whitespace-only blocks are dropped.
fn split_batch(input: &str) -> Vec<String> {
    let mut blocks = vec![String::new()];
    for line in input.lines() {
        if line.trim() == "---" {
            blocks.push(String::new());
            continue;
        }
        if let Some(current) = blocks.last_mut() {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    blocks.retain(|b| !b.trim().is_empty());
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_input_is_split_on_separator_lines() {
        let input = "Primeiro email\ncom duas linhas\n---\nSegundo email\n  ---  \n\n---\n";
        assert_eq!(
            split_batch(input),
            vec!["Primeiro email\ncom duas linhas", "Segundo email"]
        );
    }

    #[test]
    fn dashes_inside_a_line_do_not_split() {
        assert_eq!(split_batch("a --- b\nc"), vec!["a --- b\nc"]);
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from(["email-triage", "summarize", "--sentences", "2"]).unwrap();
        assert!(matches!(cli.command, Commands::Summarize { sentences: Some(2), .. }));
    }
}
