//! Test fixtures for integration tests.

use gvgap::record::{Domain, Question};

pub fn question(index: usize, reference: &str) -> Question {
    Question {
        id: format!("gsm8k/pilot/{index}"),
        domain: Domain::Math,
        dataset: "gsm8k".into(),
        split: "pilot".into(),
        question: format!("question {index}"),
        reference_answer: reference.to_string(),
        gold_cot: None,
        metadata: None,
    }
}

pub fn accept_reply(confidence: f64, rationale: &str) -> String {
    format!(r#"{{"label":"accept","confidence":{confidence},"rationale":"{rationale}"}}"#)
}

pub fn reject_reply(confidence: f64, rationale: &str) -> String {
    format!(r#"{{"label":"reject","confidence":{confidence},"rationale":"{rationale}"}}"#)
}
