//! Shared lexicons for the pattern detectors.
//!
//! Word lists are bilingual (English and Japanese). English terms are matched
//! on word boundaries and case-insensitively; Japanese terms match as
//! substrings since the script has no word separators.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // =========================================================================
    // CLAIM / RESULT LEXICONS
    // =========================================================================

    static ref NEGATION: Regex = Regex::new(
        r"(?i:\b(?:not|no|never|none|nothing|cannot|can't|won't|doesn't|don't|didn't|isn't|aren't|wasn't|weren't|without|unable|fails?|failed)\b)|ない|ません|できず|無し|なし"
    ).unwrap();

    static ref UNCERTAINTY: Regex = Regex::new(
        r"(?i:\b(?:might|may|could|possibly|perhaps|probably|likely|seems?|appears?|suggests?|uncertain|unclear)\b)|かもしれない|可能性|おそらく|と思われる"
    ).unwrap();

    static ref HIGH_CONFIDENCE: Regex = Regex::new(
        r"(?i:\b(?:definitely|certainly|always|clearly|undoubtedly|absolutely|guaranteed|proven|conclusively|obviously|surely)\b)|100%|確実|必ず|間違いなく|明らか"
    ).unwrap();

    static ref WORD: Regex = Regex::new(r"[\w']+").unwrap();

    static ref STOP_WORDS: HashSet<&'static str> = [
        "that", "this", "with", "from", "have", "been", "were", "they", "their",
        "there", "which", "when", "what", "will", "would", "should", "could",
        "into", "than", "then", "them", "also", "only", "some", "such", "these",
        "those", "about", "after", "before", "because", "does", "each", "more",
        "most", "other", "over", "very", "just", "being", "made", "make", "like",
        "where", "while", "shall", "must", "might",
    ]
    .into_iter()
    .collect();

    // =========================================================================
    // SPECIFICITY SIGNALS
    // =========================================================================

    static ref FILE_REFERENCE: Regex = Regex::new(
        r"\w\.(?:rs|ts|tsx|js|jsx|mjs|py|go|java|kt|rb|c|h|cc|cpp|hpp|cs|swift|php|md|json|ya?ml|toml|sh|sql|html|css|txt|lock)\b"
    ).unwrap();

    static ref LINE_REFERENCE: Regex = Regex::new(
        r"(?i:\blines?\s*#?\d+|\bL\d+\b)|\w:\d+\b|\d+\s*行目"
    ).unwrap();

    static ref INLINE_CODE: Regex = Regex::new(r"`[^`\n]+`").unwrap();

    // =========================================================================
    // CONCLUSION / ALTERNATIVES
    // =========================================================================

    static ref CONCLUSION: Regex = Regex::new(
        r"(?m)^\s*(?:CONCLUSION|RESULT):|結論|したがって|従って|(?i:\b(?:therefore|in conclusion|thus|hence)\b)"
    ).unwrap();

    static ref ALTERNATIVE: Regex = Regex::new(
        r"(?m)^\s*ALTERNATIVES?:|(?i:\b(?:alternatively|alternative explanations?|other explanations?|another possibility|other possibilit(?:y|ies)|could also be)\b)|代替|別の可能性|他の可能性"
    ).unwrap();

    static ref COUNTER_EVIDENCE: Regex = Regex::new(
        r"(?m)^\s*COUNTER_EVIDENCE:|(?i:\bcounter[- ]?(?:evidence|examples?)\b|\bcontradict(?:s|ing|ory)?\b)|反証|反例"
    ).unwrap();

    static ref LIMITATION: Regex = Regex::new(
        r"(?m)^\s*LIMITATIONS?:|(?i:\b(?:limitations?|caveats?)\b)|制限|限界|制約"
    ).unwrap();

    static ref DISCUSSION: Regex = Regex::new(r"(?m)^\s*DISCUSSION:|考察").unwrap();

    // =========================================================================
    // CONFIRMATION BIAS
    // =========================================================================

    static ref POSITIVE_OUTCOME: Regex = Regex::new(
        r"(?i:\b(?:success|successful|successfully|succeeded|pass|passes|passed|works?|working|confirmed|verified|correct|correctly|valid|ok)\b)|成功|確認済|正常|合格"
    ).unwrap();

    static ref NEGATIVE_OUTCOME: Regex = Regex::new(
        r"(?i:\b(?:fail|fails|failed|failure|failures|errors?|broken|incorrect|invalid|unexpected|regressions?|crash|crashes|crashed|bugs?|warnings?)\b)|失敗|エラー|異常|不具合"
    ).unwrap();

    static ref COUNTER_EVIDENCE_SEARCH: Regex = Regex::new(
        r"(?i:\b(?:searched|looked|checked|tested)\s+for\s+(?:counter[- ]?evidence|counter[- ]?examples?|contradict\w*|failure\s+cases|edge\s+cases|disconfirming\s+evidence)\b)|反証を(?:探|検討|確認)|反例を(?:探|検討|確認)"
    ).unwrap();

    /// "As expected", "no problems", "works correctly", in both languages.
    static ref EXPECTED_OUTCOME_PHRASES: [Regex; 3] = [
        Regex::new(r"(?i:\bas\s+expected\b)|期待通り|想定通り").unwrap(),
        Regex::new(r"(?i:\bno\s+(?:problems?|issues?)\b)|問題(?:ない|なし|無し)").unwrap(),
        Regex::new(r"(?i:\b(?:works|working|functions)\s+correctly\b)|正常に動作").unwrap(),
    ];
}

pub fn has_negation(text: &str) -> bool {
    NEGATION.is_match(text)
}

pub fn has_uncertainty(text: &str) -> bool {
    UNCERTAINTY.is_match(text)
}

pub fn uncertainty_count(text: &str) -> usize {
    UNCERTAINTY.find_iter(text).count()
}

pub fn has_high_confidence(text: &str) -> bool {
    HIGH_CONFIDENCE.is_match(text)
}

pub fn high_confidence_count(text: &str) -> usize {
    HIGH_CONFIDENCE.find_iter(text).count()
}

/// Lowercased words longer than three characters.
pub fn long_words(text: &str) -> HashSet<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() > 3)
        .collect()
}

/// Long words with stop words removed.
pub fn salient_terms(text: &str) -> HashSet<String> {
    long_words(text)
        .into_iter()
        .filter(|w| !STOP_WORDS.contains(w.as_str()))
        .collect()
}

/// Score 0-3: one point each for a file reference, a line reference, inline code.
pub fn specificity_score(text: &str) -> u8 {
    [&*FILE_REFERENCE, &*LINE_REFERENCE, &*INLINE_CODE]
        .iter()
        .filter(|re| re.is_match(text))
        .count() as u8
}

pub fn has_conclusion(text: &str) -> bool {
    CONCLUSION.is_match(text)
}

pub fn has_alternative(text: &str) -> bool {
    ALTERNATIVE.is_match(text)
}

pub fn has_counter_evidence(text: &str) -> bool {
    COUNTER_EVIDENCE.is_match(text)
}

pub fn has_limitation(text: &str) -> bool {
    LIMITATION.is_match(text)
}

pub fn has_discussion(text: &str) -> bool {
    DISCUSSION.is_match(text)
}

pub fn positive_outcome_count(text: &str) -> usize {
    POSITIVE_OUTCOME.find_iter(text).count()
}

pub fn negative_outcome_count(text: &str) -> usize {
    NEGATIVE_OUTCOME.find_iter(text).count()
}

pub fn mentions_counter_evidence_search(text: &str) -> bool {
    COUNTER_EVIDENCE_SEARCH.is_match(text)
}

/// Total occurrences of the expected-outcome phrases.
pub fn expected_outcome_phrase_count(text: &str) -> usize {
    EXPECTED_OUTCOME_PHRASES
        .iter()
        .map(|re| re.find_iter(text).count())
        .sum()
}
