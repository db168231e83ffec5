//! Message frequency summary.

use std::collections::BTreeMap;

/// Informational lines that do not count as messages.
const RULES_RUN_PREFIX: &str = "Rules run:";

/// Marker of identification difficulty messages,
/// `{organisation}:{group}:difficulty:{level}:{details}`.
const DIFFICULTY_MARKER: &str = ":difficulty:";

/// Phenology messages are cut after these phrases, dropping the date range.
const ABBREVIATIONS: [&str; 2] = [
    "Date is CLOSE TO the expected period",
    "Date is FAR FROM the expected period",
];

fn abbreviate(message: &str) -> String {
    for phrase in ABBREVIATIONS {
        if let Some(pos) = message.find(phrase) {
            return format!("{}.", &message[..pos + phrase.len()]);
        }
    }
    if let Some(pos) = message.find(DIFFICULTY_MARKER) {
        let level_start = pos + DIFFICULTY_MARKER.len();
        let level_len = message[level_start..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        return message[..level_start + level_len].to_string();
    }
    message.to_string()
}

/// Count distinct messages, sorted by text.
///
/// `Rules run:` lines are dropped, difficulty messages lose their details,
/// and phenology messages lose their date ranges before counting.
pub fn message_summary<S: AsRef<str>>(messages: &[S]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for message in messages {
        let message = message.as_ref();
        if message.starts_with(RULES_RUN_PREFIX) {
            continue;
        }
        *counts.entry(abbreviate(message)).or_default() += 1;
    }
    counts.into_iter().collect()
}
