use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use seqsim_core::alphabet::clean_sequence;
use seqsim_search::{Config, Prediction, Predictor, SearchContext, SearchError, SearchMode};

use crate::fasta::read_fasta;

/// Arguments of `seqsim predict`.
#[derive(Debug)]
pub struct PredictArgs {
    pub sequence: Option<String>,
    pub fasta: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub exhaustive: bool,
    pub json: bool,
}

/// A cleaned query and the label it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Query {
    label: String,
    sequence: String,
}

/// Outcome of one query. Fatal errors abort the run instead.
#[derive(Debug)]
enum Outcome {
    Found(Prediction),
    Rejected(String),
}

pub async fn run_predict(config: &Config, args: PredictArgs) -> Result<()> {
    let queries = collect_queries(args.sequence, args.fasta.as_ref())?;
    let batch = args.fasta.is_some();
    let top_n = args.top_n.unwrap_or(config.top_n);
    let mode = if args.exhaustive {
        SearchMode::Exhaustive
    } else {
        SearchMode::Fast
    };

    // A lone query that is too short fails before the corpus is opened.
    if !batch {
        if let Some(query) = queries.first() {
            check_length(query, config.min_sequence_length)?;
        }
    }

    let context = SearchContext::init(config).context("Failed to initialize search context")?;
    let predictor = Arc::new(Predictor::from_config(context, config)?);

    log::info!(
        "Searching {} quer{} in {mode} mode (top {top_n})",
        queries.len(),
        if queries.len() == 1 { "y" } else { "ies" }
    );
    let outcomes = predict_all(
        &predictor,
        &queries,
        top_n,
        mode,
        config.min_sequence_length,
    )
    .await?;

    if !batch {
        if let Some(Outcome::Rejected(reason)) = outcomes.first() {
            bail!("{reason}");
        }
    }

    if args.json {
        print_json(&queries, &outcomes)?;
    } else {
        for (query, outcome) in queries.iter().zip(&outcomes) {
            print!("{}", render_text(query, outcome)?);
        }
    }

    Ok(())
}

fn collect_queries(sequence: Option<String>, fasta: Option<&PathBuf>) -> Result<Vec<Query>> {
    match (sequence, fasta) {
        (Some(sequence), None) => Ok(vec![Query {
            label: "query".to_string(),
            sequence: clean_sequence(&sequence),
        }]),
        (None, Some(path)) => Ok(read_fasta(path)?
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                if let Some(description) = &record.description {
                    log::debug!("Record {}: {} {description}", i + 1, record.id);
                }
                let label = if record.id.is_empty() {
                    format!("record {}", i + 1)
                } else {
                    record.id
                };
                Query {
                    label,
                    sequence: clean_sequence(&record.sequence),
                }
            })
            .collect()),
        (Some(_), Some(_)) => bail!("Give either a SEQUENCE or --fasta, not both"),
        (None, None) => bail!("Give a SEQUENCE or --fasta FILE"),
    }
}

fn check_length(query: &Query, min_length: usize) -> Result<()> {
    if query.sequence.len() < min_length {
        bail!(
            "{}: sequence has {} residues after cleaning, at least {min_length} required",
            query.label,
            query.sequence.len()
        );
    }
    Ok(())
}

/// Run one blocking task per query and collect outcomes in input order.
async fn predict_all(
    predictor: &Arc<Predictor>,
    queries: &[Query],
    top_n: usize,
    mode: SearchMode,
    min_length: usize,
) -> Result<Vec<Outcome>> {
    let mut pending = Vec::with_capacity(queries.len());
    for query in queries {
        if let Err(e) = check_length(query, min_length) {
            pending.push(Err(e.to_string()));
            continue;
        }
        let task = Arc::clone(predictor).predict_async(query.sequence.clone(), top_n, mode);
        pending.push(Ok(tokio::spawn(task)));
    }

    let mut outcomes = Vec::with_capacity(pending.len());
    for (query, slot) in queries.iter().zip(pending) {
        let outcome = match slot {
            Err(reason) => Outcome::Rejected(reason),
            Ok(handle) => {
                let result = handle
                    .await
                    .map_err(|e| SearchError::Worker(e.to_string()))
                    .and_then(|r| r);
                match result {
                    Ok(prediction) => Outcome::Found(prediction),
                    Err(e) if e.is_recoverable() => {
                        log::warn!("{}: {e}", query.label);
                        Outcome::Rejected(format!("{}: {e}", query.label))
                    }
                    Err(e) => {
                        return Err(e).with_context(|| format!("Search failed for {}", query.label))
                    }
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn print_json(queries: &[Query], outcomes: &[Outcome]) -> Result<()> {
    let values: Vec<serde_json::Value> = queries
        .iter()
        .zip(outcomes)
        .map(|(query, outcome)| match outcome {
            Outcome::Found(prediction) => serde_json::json!({
                "query": query.label,
                "prediction": prediction,
            }),
            Outcome::Rejected(reason) => serde_json::json!({
                "query": query.label,
                "error": reason,
            }),
        })
        .collect();

    let output = if let [single] = values.as_slice() {
        serde_json::to_string_pretty(single)?
    } else {
        serde_json::to_string_pretty(&values)?
    };
    println!("{output}");
    Ok(())
}

fn render_text(query: &Query, outcome: &Outcome) -> Result<String, std::fmt::Error> {
    use std::fmt::Write;

    let mut out = String::new();
    match outcome {
        Outcome::Rejected(reason) => {
            writeln!(out, "\n✗ {reason}")?;
        }
        Outcome::Found(prediction) => {
            writeln!(
                out,
                "\n{} ({} residues): {} candidates from {} in {:.1} ms",
                query.label,
                prediction.query_length,
                prediction.candidates_scored,
                prediction.strategy,
                prediction.timing.total_ms
            )?;
            writeln!(
                out,
                "  {:>4}  {:<14} {:>10} {:>9} {:>7}  Name",
                "Rank", "ID", "Similarity", "Distance", "Length"
            )?;
            for result in &prediction.results {
                write!(
                    out,
                    "  {:>4}  {:<14} {:>9.1}% {:>9.4} {:>7}  {}",
                    result.rank,
                    result.id.as_str(),
                    result.similarity,
                    result.distance,
                    result.sequence_length,
                    result.name
                )?;
                if !result.organism.is_empty() {
                    write!(out, " [{}]", result.organism)?;
                }
                out.push('\n');
            }
        }
    }
    Ok(out)
}
