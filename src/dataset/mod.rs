//! Dataset preparation.
//!
//! Converts raw problems into [`Question`] records. GSM8K-style sources
//! carry the reference answer after a `####` marker at the end of the
//! worked solution; everything before the marker becomes the gold chain
//! of thought. A small built-in pilot sample supports smoke runs without
//! any external download.

use serde_json::json;

use crate::record::{Domain, Question};

const ANSWER_MARKER: &str = "####";

/// Three GSM8K problems, enough to exercise the whole pipeline.
pub const GSM8K_PILOT: &[(&str, &str)] = &[
    (
        "Natalia sold clips to 48 of her friends in April, and then she sold half as many clips \
         in May. How many clips did Natalia sell altogether in April and May?",
        "Natalia sold 48/2 = 24 clips in May.\nNatalia sold 48+24 = 72 clips altogether in April \
         and May.\n#### 72",
    ),
    (
        "Weng earns $12 an hour for babysitting. Yesterday, she just did 50 minutes of \
         babysitting. How much did she earn?",
        "Weng earns 12/60 = $0.2 per minute.\nWorking 50 minutes, she earned 0.2 x 50 = $10.\n\
         #### 10",
    ),
    (
        "Betty is saving money for a new wallet which costs $100. Betty has only half of the \
         money she needs. Her parents decided to give her $15 for that purpose, and her \
         grandparents twice as much as her parents. How much more money does Betty need to buy \
         the wallet?",
        "In the beginning, Betty has only 100/2 = $50.\nBetty's grandparents gave her 15 * 2 = \
         $30.\nThis means, Betty needs 100 - 50 - 15 - 30 = $5 more.\n#### 5",
    ),
];

/// Splits a worked solution into (reference answer, gold chain of
/// thought). Without the `####` marker the answer is unknown and the
/// whole text is kept as the gold CoT.
pub fn split_reference(answer_text: &str) -> (String, Option<String>) {
    match answer_text.rsplit_once(ANSWER_MARKER) {
        Some((_, tail)) => {
            let reference = tail.trim().to_string();
            let cot = answer_text
                .split(ANSWER_MARKER)
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            (reference, (!cot.is_empty()).then_some(cot))
        }
        None => ("Unknown".to_string(), Some(answer_text.trim().to_string())),
    }
}

/// Builds the pilot Question set for `dataset`/`split`.
pub fn pilot_questions(dataset: &str, split: &str) -> Vec<Question> {
    GSM8K_PILOT
        .iter()
        .enumerate()
        .map(|(index, (question, answer_text))| {
            let (reference_answer, gold_cot) = split_reference(answer_text);
            Question {
                id: format!("{dataset}/{split}/{index}"),
                domain: Domain::Math,
                dataset: dataset.to_string(),
                split: split.to_string(),
                question: (*question).to_string(),
                reference_answer,
                gold_cot,
                metadata: Some(json!({"source": "sample", "difficulty": "easy"})),
            }
        })
        .collect()
}
