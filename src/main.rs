//! Gvgap CLI entrypoint.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use gvgap::config::{Config, ProviderKind};
use gvgap::generate::CotGenerator;
use gvgap::inject::Injector;
use gvgap::judge::LlmJudge;
use gvgap::metrics::{self, report};
use gvgap::pipeline;
use gvgap::provider::build_provider;
use gvgap::record::io::{load_references, read_jsonl, write_jsonl};
use gvgap::record::{GenerationRecord, VerifiedRecord};
use gvgap::taxonomy::summary;
use gvgap::{dataset, inject};

/// Generation-Verification Gap evaluation pipeline.
#[derive(Parser)]
#[command(name = "gvgap", version, about = "Generation-Verification Gap evaluation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in pilot question set as JSONL
    Prepare {
        /// Output JSONL file for the question records
        #[arg(long, default_value = "data/processed/gsm8k/pilot.jsonl")]
        out: PathBuf,
        /// Dataset name used in record ids
        #[arg(long, default_value = "gsm8k")]
        dataset: String,
        /// Split name used in record ids
        #[arg(long, default_value = "pilot")]
        split: String,
    },

    /// Generate chain-of-thought candidates for each question
    Generate {
        /// Input JSONL file with question records
        #[arg(long = "in")]
        input: PathBuf,
        /// Output JSONL file for generation records
        #[arg(long)]
        out: PathBuf,
        /// Generation model (overrides GVGAP_MODEL)
        #[arg(long)]
        model: Option<String>,
        /// Provider adapter: genai or openai-compat
        #[arg(long)]
        provider: Option<ProviderKind>,
        /// Candidates per question (overrides GVGAP_N_SAMPLES)
        #[arg(long)]
        n_samples: Option<usize>,
    },

    /// Judge every candidate and aggregate the verdicts
    Verify {
        /// Input JSONL file with generation records
        #[arg(long = "in")]
        input: PathBuf,
        /// Output JSONL file for verified records
        #[arg(long)]
        out: PathBuf,
        /// Judge model (overrides GVGAP_JUDGE_MODEL)
        #[arg(long)]
        model: Option<String>,
        /// Provider adapter: genai or openai-compat
        #[arg(long)]
        provider: Option<ProviderKind>,
    },

    /// Annotate verified records with taxonomy error codes
    Tag {
        /// Input JSONL file with verified records
        #[arg(long = "in")]
        input: PathBuf,
        /// Output JSONL file for tagged records
        #[arg(long)]
        out: PathBuf,
        /// Optional reference JSONL; when given, tagging gates on actual
        /// generation correctness instead of the judge's verdict
        #[arg(long = "ref")]
        reference: Option<PathBuf>,
    },

    /// Compute GV-Gap metrics for a verified run
    Metrics {
        /// Input JSONL file with verified records
        #[arg(long = "in")]
        input: PathBuf,
        /// Reference JSONL file with the correct answers
        #[arg(long = "ref")]
        reference: PathBuf,
        /// Output CSV with one row per scope (overall + per domain)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output CSV with one row per question
        #[arg(long)]
        detail: Option<PathBuf>,
        /// Output text file for the summary block
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Rebuild the cumulative taxonomy table from tagged-record files
    Taxonomy {
        /// Tagged-record JSONL files (full rescan, repeatable)
        #[arg(long = "in", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        /// Output markdown file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Corrupt reference answers into known-wrong generation records
    Inject {
        /// Input JSONL file with question records
        #[arg(long = "in")]
        input: PathBuf,
        /// Output JSONL file for corrupted generation records
        #[arg(long)]
        out: PathBuf,
        /// Optional reference JSONL matching the injected ids
        #[arg(long)]
        ref_out: Option<PathBuf>,
        /// Corrupted variants per question
        #[arg(long, default_value_t = 5)]
        variants: usize,
        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Per-error-type verifier miss rates on an injected, verified run
    MissRate {
        /// Input JSONL file with verified injected records
        #[arg(long = "in")]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate()?;

    match cli.command {
        Commands::Prepare {
            out,
            dataset: dataset_name,
            split,
        } => run_prepare(&out, &dataset_name, &split),
        Commands::Generate {
            input,
            out,
            model,
            provider,
            n_samples,
        } => run_generate(&config, &input, &out, model, provider, n_samples).await,
        Commands::Verify {
            input,
            out,
            model,
            provider,
        } => run_verify(&config, &input, &out, model, provider).await,
        Commands::Tag {
            input,
            out,
            reference,
        } => run_tag(&input, &out, reference.as_deref()),
        Commands::Metrics {
            input,
            reference,
            out,
            detail,
            summary,
        } => run_metrics(
            &input,
            &reference,
            out.as_deref(),
            detail.as_deref(),
            summary.as_deref(),
        ),
        Commands::Taxonomy { inputs, out } => run_taxonomy(&inputs, out.as_deref()),
        Commands::Inject {
            input,
            out,
            ref_out,
            variants,
            seed,
        } => run_inject(&input, &out, ref_out.as_deref(), variants, seed),
        Commands::MissRate { input } => run_miss_rate(&input),
    }
}

fn run_prepare(out: &Path, dataset_name: &str, split: &str) -> anyhow::Result<()> {
    let questions = dataset::pilot_questions(dataset_name, split);
    write_jsonl(out, &questions)?;
    info!(
        count = questions.len(),
        out = %out.display(),
        "wrote pilot questions"
    );
    println!("Wrote {} questions to {}", questions.len(), out.display());
    Ok(())
}

async fn run_generate(
    config: &Config,
    input: &Path,
    out: &Path,
    model: Option<String>,
    provider_kind: Option<ProviderKind>,
    n_samples: Option<usize>,
) -> anyhow::Result<()> {
    let run_id = uuid::Uuid::new_v4();
    let started = chrono::Utc::now();
    let model = model.unwrap_or_else(|| config.model.clone());
    let kind = provider_kind.unwrap_or(config.provider);
    let n_samples = n_samples.unwrap_or(config.n_samples).max(1);

    info!(%run_id, %model, provider = %kind, n_samples, "starting generation run");

    let questions = read_jsonl(input)?;
    if questions.skipped > 0 {
        warn!(skipped = questions.skipped, "malformed question lines skipped");
    }

    let provider = build_provider(kind, &model, config)?;
    let generator = CotGenerator::new(provider, n_samples);
    let (records, stats) = pipeline::generate_run(&generator, &questions.records, config.fan_out).await;

    write_jsonl(out, &records)?;

    println!(
        "Generated {}/{} questions ({} failed, {} malformed input lines) in {:.1}s → {}",
        stats.generated,
        stats.questions,
        stats.failed,
        questions.skipped,
        (chrono::Utc::now() - started).num_milliseconds() as f64 / 1000.0,
        out.display()
    );
    Ok(())
}

async fn run_verify(
    config: &Config,
    input: &Path,
    out: &Path,
    model: Option<String>,
    provider_kind: Option<ProviderKind>,
) -> anyhow::Result<()> {
    let run_id = uuid::Uuid::new_v4();
    let model = model.unwrap_or_else(|| config.judge_model.clone());
    let kind = provider_kind.unwrap_or(config.provider);

    info!(%run_id, %model, provider = %kind, "starting verification run");

    let generations: gvgap::record::io::ScanOutcome<GenerationRecord> = read_jsonl(input)?;
    if generations.skipped > 0 {
        warn!(
            skipped = generations.skipped,
            "malformed generation lines skipped"
        );
    }

    let provider = build_provider(kind, &model, config)?;
    let judge = LlmJudge::new(provider);
    let (records, stats) =
        pipeline::verify_run(&judge, generations.records, config.fan_out).await;

    write_jsonl(out, &records)?;

    println!(
        "Verified {}/{} questions ({} skipped, {} judge calls excluded, {} malformed input lines) → {}",
        stats.verified,
        stats.questions,
        stats.skipped,
        stats.excluded,
        generations.skipped,
        out.display()
    );
    Ok(())
}

fn run_tag(input: &Path, out: &Path, reference: Option<&Path>) -> anyhow::Result<()> {
    let verified: gvgap::record::io::ScanOutcome<VerifiedRecord> = read_jsonl(input)?;

    let references = reference
        .map(|path| load_references(path).map(|(refs, _)| refs))
        .transpose()?;

    let (tagged, stats) = pipeline::tag_run(verified.records, references.as_ref());
    write_jsonl(out, &tagged)?;

    println!(
        "Tagged {} records ({} clean, {} malformed input lines) → {}",
        stats.tagged,
        stats.clean,
        verified.skipped,
        out.display()
    );
    Ok(())
}

fn run_metrics(
    input: &Path,
    reference: &Path,
    out: Option<&Path>,
    detail: Option<&Path>,
    summary: Option<&Path>,
) -> anyhow::Result<()> {
    let (references, ref_skipped) = load_references(reference)?;
    info!(count = references.len(), "loaded reference answers");

    let verified: gvgap::record::io::ScanOutcome<VerifiedRecord> = read_jsonl(input)?;
    if verified.skipped + ref_skipped > 0 {
        warn!(
            input_skipped = verified.skipped,
            reference_skipped = ref_skipped,
            "malformed lines skipped"
        );
    }

    let run = metrics::compute_run(&verified.records, &references);

    let summary_text = report::render_summary(&run.overall)
        .context("cannot summarize a run with no scorable questions")?;
    println!("{summary_text}");

    if let Some(path) = out {
        write_text(path, &report::render_scope_csv(&run))?;
        println!("Saved scope metrics to {}", path.display());
    }
    if let Some(path) = detail {
        write_text(path, &report::render_detail_csv(&run.outcomes))?;
        println!("Saved per-question details to {}", path.display());
    }
    if let Some(path) = summary {
        write_text(path, &summary_text)?;
        println!("Saved summary to {}", path.display());
    }

    Ok(())
}

fn run_taxonomy(inputs: &[PathBuf], out: Option<&Path>) -> anyhow::Result<()> {
    let (counts, skipped) = summary::fold_files(inputs)?;
    let table = summary::render_markdown(&counts);

    match out {
        Some(path) => {
            write_text(path, &table)?;
            println!(
                "Rebuilt taxonomy table: {} rows ({} malformed lines skipped) → {}",
                counts.len(),
                skipped,
                path.display()
            );
        }
        None => println!("{table}"),
    }
    Ok(())
}

fn run_inject(
    input: &Path,
    out: &Path,
    ref_out: Option<&Path>,
    variants: usize,
    seed: u64,
) -> anyhow::Result<()> {
    let questions = read_jsonl::<gvgap::record::Question>(input)?;

    let mut injector = Injector::new(seed, variants);
    let mut records: Vec<GenerationRecord> = Vec::new();
    let mut non_numeric = 0usize;
    for question in &questions.records {
        let injected = injector.inject(question);
        if injected.is_empty() {
            non_numeric += 1;
        }
        records.extend(injected);
    }

    write_jsonl(out, &records)?;

    if let Some(path) = ref_out {
        let references: Vec<_> = records.iter().map(Injector::reference_for).collect();
        write_jsonl(path, &references)?;
        println!("Wrote {} matching references to {}", references.len(), path.display());
    }

    println!(
        "Injected {} corrupted records from {} questions ({} non-numeric skipped) → {}",
        records.len(),
        questions.records.len(),
        non_numeric,
        out.display()
    );
    Ok(())
}

fn run_miss_rate(input: &Path) -> anyhow::Result<()> {
    let verified: gvgap::record::io::ScanOutcome<VerifiedRecord> = read_jsonl(input)?;
    let rows = inject::miss_rates(&verified.records);

    println!("{}", inject::render_miss_rates(&rows));
    println!(
        "{} records scored, {} malformed lines skipped",
        verified.records.len(),
        verified.skipped
    );
    Ok(())
}

fn write_text(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
