//! End-to-end pipeline tests over the scripted provider: prepare →
//! generate → verify → tag → metrics, with every stage round-tripping
//! through JSONL files the way the CLI does.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::fixtures::{accept_reply, question, reject_reply};
use gvgap::generate::CotGenerator;
use gvgap::judge::LlmJudge;
use gvgap::metrics::{self, report};
use gvgap::pipeline::{generate_run, tag_run, verify_run};
use gvgap::provider::MockProvider;
use gvgap::record::io::{load_references, read_jsonl, write_jsonl};
use gvgap::record::{GenerationRecord, Question, TaggedRecord, VerdictLabel, VerifiedRecord};
use gvgap::taxonomy::summary;
use gvgap::{dataset, inject};

#[tokio::test]
async fn test_full_pipeline_through_jsonl_files() {
    let dir = tempfile::tempdir().unwrap();
    let questions_path = dir.path().join("pilot.jsonl");
    let gen_path = dir.path().join("01_gen.jsonl");
    let verify_path = dir.path().join("02_verify.jsonl");
    let tagged_path = dir.path().join("02_tagged.jsonl");

    // Prepare: three questions with references 72, 10, 5.
    let questions = vec![question(0, "72"), question(1, "10"), question(2, "5")];
    write_jsonl(&questions_path, &questions).unwrap();

    // Generate: the middle answer is wrong (11 vs 10).
    let gen_provider = Arc::new(MockProvider::with_responses(
        "mock-gen",
        [
            "48/2 = 24; 48+24 = 72.\nFinal: 72",
            "12/60 * 50 = 11.\nFinal: 11",
            "100-50-15-30 = 5.\nFinal: 5",
        ],
    ));
    let generator = CotGenerator::new(gen_provider, 1);
    let loaded = read_jsonl::<Question>(&questions_path).unwrap();
    let (gen_records, gen_stats) = generate_run(&generator, &loaded.records, 1).await;
    assert_eq!(gen_stats.generated, 3);
    write_jsonl(&gen_path, &gen_records).unwrap();

    // Verify: accept, accept (a miss: the answer is wrong), reject (also
    // a miss: the answer is right).
    let judge_provider = Arc::new(MockProvider::with_responses(
        "mock-judge",
        [
            accept_reply(0.95, "matches the worked solution"),
            accept_reply(0.70, "the numbers look plausible"),
            reject_reply(0.60, "a flaw in the final step"),
        ],
    ));
    let judge = LlmJudge::new(judge_provider);
    let loaded = read_jsonl::<GenerationRecord>(&gen_path).unwrap();
    let (verified, verify_stats) = verify_run(&judge, loaded.records, 1).await;
    assert_eq!(verify_stats.verified, 3);
    assert_eq!(verify_stats.excluded, 0);
    write_jsonl(&verify_path, &verified).unwrap();

    // Metrics: generation 2/3 correct, verification 1/3 correct.
    let (references, _) = load_references(&questions_path).unwrap();
    let loaded = read_jsonl::<VerifiedRecord>(&verify_path).unwrap();
    let run = metrics::compute_run(&loaded.records, &references);

    assert_eq!(run.overall.total, 3);
    assert_eq!(run.overall.skipped, 0);
    assert_eq!(run.overall.generation_correct, 2);
    assert_eq!(run.overall.verification_correct, 1);
    assert_eq!(run.overall.matrix.true_positives, 1);
    assert_eq!(run.overall.matrix.false_positives, 1);
    assert_eq!(run.overall.matrix.false_negatives, 1);
    assert_eq!(run.overall.matrix.true_negatives, 0);
    assert!((run.overall.gv_gap().unwrap() - (-1.0 / 3.0)).abs() < 1e-9);

    let summary_text = report::render_summary(&run.overall).unwrap();
    assert!(summary_text.contains("Total Questions: 3"));
    assert!(summary_text.contains("Negative GV-Gap"));

    // Tag with references: both wrong-generation and rejected-correct
    // records stay consistent with the gate (generation correctness).
    let (tagged, tag_stats) = tag_run(loaded.records, Some(&references));
    assert_eq!(tag_stats.tagged, 1);
    assert_eq!(tag_stats.clean, 2);
    write_jsonl(&tagged_path, &tagged).unwrap();

    // The wrong generation was accepted, so its classification rationale
    // falls back to the accept rationale and the math catch-all.
    let wrong = tagged.iter().find(|t| t.verified.id() == "gsm8k/pilot/1").unwrap();
    assert_eq!(wrong.taxonomy_code, "reasoning_gap");

    // Taxonomy summary by full rescan of the tagged file.
    let (counts, skipped) = summary::fold_files(&[tagged_path]).unwrap();
    assert_eq!(skipped, 0);
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[&("gsm8k".to_string(), "reasoning_gap".to_string())], 1);
}

#[tokio::test]
async fn test_multi_sample_verification_aggregates_per_candidate_verdicts() {
    // One question, three candidates; two accepts beat one reject.
    let gen_provider = Arc::new(MockProvider::with_responses(
        "mock-gen",
        ["Final: 72", "Final: 72", "Final: 71"],
    ));
    let generator = CotGenerator::new(gen_provider, 3);
    let questions = vec![question(0, "72")];

    let (gen_records, _) = generate_run(&generator, &questions, 1).await;
    assert_eq!(gen_records[0].generation.candidates.len(), 3);
    // Backward-compat alias points at the first candidate.
    assert_eq!(gen_records[0].generation.answer, "72");

    let judge_provider = Arc::new(MockProvider::with_responses(
        "mock-judge",
        [
            accept_reply(0.9, "ok"),
            accept_reply(0.8, "ok"),
            reject_reply(0.7, "last candidate differs"),
        ],
    ));
    let judge = LlmJudge::new(judge_provider);
    let (verified, _) = verify_run(&judge, gen_records, 1).await;

    let aggregate = &verified[0].verify.aggregate;
    assert_eq!(aggregate.label, VerdictLabel::Accept);
    assert_eq!(aggregate.candidate_count, 3);
    assert_eq!(aggregate.accept_count, 2);
    assert_eq!(aggregate.reject_count, 1);
    // Mean of the accept camp: (0.9 + 0.8) / 2.
    assert!((aggregate.confidence - 0.85).abs() < 1e-9);
    assert_eq!(
        verified[0].verify.candidates.len(),
        verified[0].record.generation.candidates.len()
    );
}

#[tokio::test]
async fn test_injected_errors_flow_through_verify_and_miss_rate() {
    let questions = dataset::pilot_questions("gsm8k", "pilot");
    let mut injector = inject::Injector::new(42, 2);

    let mut injected: Vec<GenerationRecord> = Vec::new();
    for q in &questions {
        injected.extend(injector.inject(q));
    }
    // 3 numeric questions × 2 variants.
    assert_eq!(injected.len(), 6);

    // Judge catches every corruption except one.
    let mut replies: Vec<String> = (0..5)
        .map(|_| reject_reply(0.9, "does not match the reference"))
        .collect();
    replies.push(accept_reply(0.6, "close enough"));
    let judge = LlmJudge::new(Arc::new(MockProvider::with_responses("mock-judge", replies)));

    let (verified, stats) = verify_run(&judge, injected, 1).await;
    assert_eq!(stats.verified, 6);

    let rows = inject::miss_rates(&verified);
    let total: usize = rows.values().map(|r| r.total).sum();
    let caught: usize = rows.values().map(|r| r.caught).sum();
    assert_eq!(total, 6);
    assert_eq!(caught, 5);
    assert!(rows.keys().all(|k| k != "unknown"));

    let table = inject::render_miss_rates(&rows);
    assert!(table.contains("ErrorType"));
}

#[tokio::test]
async fn test_partial_record_set_is_tolerated() {
    // Records without references are skipped and surfaced, never fatal.
    let gen_provider = Arc::new(MockProvider::with_responses("mock-gen", ["Final: 72"]));
    let generator = CotGenerator::new(gen_provider, 1);
    let (gen_records, _) = generate_run(&generator, &[question(7, "72")], 1).await;

    let judge = LlmJudge::new(Arc::new(MockProvider::with_responses(
        "mock-judge",
        [accept_reply(0.9, "ok")],
    )));
    let (verified, _) = verify_run(&judge, gen_records, 1).await;

    let references: HashMap<String, Question> = HashMap::new();
    let result = metrics::compute(&verified, &references);

    assert_eq!(result.total, 0);
    assert_eq!(result.skipped, 1);
    assert!(!result.has_data());
    assert!(report::render_summary(&result).is_err());
}

#[test]
fn test_tagged_records_survive_reserialization() {
    // A tagged file can be re-read for later cumulative summaries.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagged.jsonl");

    let line = r#"{"id":"gsm8k/pilot/1","domain":"math","dataset":"gsm8k","split":"pilot","question":"q","reference_answer":"10","gen":{"candidates":[{"cot":"Final: 11","answer":"11","latency_s":0.5}],"answer":"11"},"verify":{"aggregate":{"label":"reject","confidence":0.8,"candidate_count":1,"accept_count":0,"reject_count":1},"candidates":[{"label":"reject","confidence":0.8,"rationale":"arithmetic slip","latency_s":0.2}]},"taxonomy_code":"calc_error","taxonomy_name":"Calculation error"}"#;
    std::fs::write(&path, format!("{line}\n")).unwrap();

    let outcome = read_jsonl::<TaggedRecord>(&path).unwrap();
    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.taxonomy_code, "calc_error");
    assert_eq!(record.verified.verify.aggregate.label, VerdictLabel::Reject);

    write_jsonl(&path, &outcome.records).unwrap();
    let reread = read_jsonl::<TaggedRecord>(&path).unwrap();
    assert_eq!(reread.records[0].taxonomy_code, "calc_error");
}
