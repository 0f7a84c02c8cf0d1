//! Fixed per-domain taxonomy rule tables.
//!
//! Each domain owns an ordered rule list; order encodes priority among
//! overlapping triggers, so a rationale mentioning several symptoms
//! resolves to the earliest matching rule. Triggers are lowercase and
//! matched as substrings.

use crate::record::Domain;

/// One taxonomy rule: a stable code, a human label, and the keyword
/// triggers that select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyRule {
    pub code: &'static str,
    pub name: &'static str,
    pub triggers: &'static [&'static str],
}

pub const MATH_RULES: &[TaxonomyRule] = &[
    TaxonomyRule {
        code: "calc_error",
        name: "Calculation error",
        triggers: &[
            "calculation",
            "arithmetic",
            "miscalculat",
            "computed incorrectly",
            "math error",
            "sum is wrong",
        ],
    },
    TaxonomyRule {
        code: "reasoning_gap",
        name: "Reasoning gap",
        triggers: &[
            "reasoning",
            "missing step",
            "logical",
            "contradict",
            "does not follow",
            "unjustified",
        ],
    },
    TaxonomyRule {
        code: "format_mismatch",
        name: "Format mismatch",
        triggers: &["format", "units", "rounding", "decimal places"],
    },
    TaxonomyRule {
        code: "instruction_miss",
        name: "Instruction not followed",
        triggers: &["instruction", "did not follow", "ignored", "asked for"],
    },
];

pub const CODE_RULES: &[TaxonomyRule] = &[
    TaxonomyRule {
        code: "syntax_error",
        name: "Syntax error",
        triggers: &[
            "syntax",
            "parse error",
            "unparsable",
            "does not compile",
            "compilation",
        ],
    },
    TaxonomyRule {
        code: "logic_bug",
        name: "Logic bug",
        triggers: &[
            "wrong output",
            "incorrect result",
            "failed test",
            "wrong logic",
            "incorrect logic",
            "returns the wrong",
        ],
    },
    TaxonomyRule {
        code: "edge_case_fail",
        name: "Edge case failure",
        triggers: &[
            "edge case",
            "off-by-one",
            "off by one",
            "boundary",
            "last test case",
            "empty input",
        ],
    },
    TaxonomyRule {
        code: "spec_misread",
        name: "Spec misread",
        triggers: &["misread", "misunderstood", "misinterpret", "wrong problem"],
    },
];

pub const FACTUAL_RULES: &[TaxonomyRule] = &[
    TaxonomyRule {
        code: "factual_hallucination",
        name: "Factual hallucination",
        triggers: &[
            "hallucinat",
            "fabricated",
            "made up",
            "fictitious",
            "incorrect fact",
            "false claim",
        ],
    },
    TaxonomyRule {
        code: "misleading_generalization",
        name: "Misleading generalization",
        triggers: &["generaliz", "misleading", "overstate", "oversimplif"],
    },
    TaxonomyRule {
        code: "ambiguous_misread",
        name: "Ambiguous question misread",
        triggers: &["ambiguous", "misread", "misinterpret"],
    },
    TaxonomyRule {
        code: "hedged_nonanswer",
        name: "Hedged non-answer",
        triggers: &[
            "hedge",
            "refus",
            "did not answer",
            "no direct answer",
            "evasive",
            "non-answer",
        ],
    },
];

/// Returns the ordered rule list for a domain.
#[inline]
pub fn rules_for(domain: Domain) -> &'static [TaxonomyRule] {
    match domain {
        Domain::Math => MATH_RULES,
        Domain::Code => CODE_RULES,
        Domain::Factual => FACTUAL_RULES,
    }
}

/// Catch-all rule applied when nothing in the table matches.
#[inline]
pub fn fallback_for(domain: Domain) -> &'static TaxonomyRule {
    match domain {
        Domain::Math => &MATH_RULES[1],    // reasoning_gap
        Domain::Code => &CODE_RULES[1],    // logic_bug
        Domain::Factual => &FACTUAL_RULES[2], // ambiguous_misread
    }
}
