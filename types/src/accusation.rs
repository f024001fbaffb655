use regex::Regex;

pub const SUSPICION_WORDS: [&str; 13] = [
    "suspect",
    "guilty",
    "wolf",
    "liar",
    "blame",
    "accuse",
    "hide",
    "suspicious",
    "sketchy",
    "shady",
    "lying",
    "kill",
    "vote",
];

/// Tokens on either side of the name that are searched for a suspicion word.
const WINDOW: usize = 5;

fn name_regex(name: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name))).expect("Escaped name is a valid regex")
}

fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Whether `text` contains `name` as a whole word, ignoring case.
pub fn mentions_name(text: &str, name: &str) -> bool {
    if text.is_empty() || name.trim().is_empty() {
        return false;
    }
    name_regex(name.trim()).is_match(text)
}

/// Whether `text` accuses `target`: the name must appear as a whole word and a
/// suspicion word must sit within five tokens of it.
///
/// Only the window around the first token naming the target is inspected, so a
/// later, more pointed mention of the same player does not count.
pub fn is_accusation(text: &str, target: &str) -> bool {
    let target = target.trim();
    if text.is_empty() || target.is_empty() {
        return false;
    }
    let name_re = name_regex(target);
    if !name_re.is_match(text) {
        return false;
    }

    let raw_tokens: Vec<&str> = text.split_whitespace().collect();
    let Some(idx) = raw_tokens.iter().position(|token| name_re.is_match(token)) else {
        return false;
    };
    let start = idx.saturating_sub(WINDOW);
    let end = (idx + WINDOW + 1).min(raw_tokens.len());

    raw_tokens[start..end]
        .iter()
        .map(|token| normalize_token(token))
        .any(|token| SUSPICION_WORDS.contains(&token.as_str()))
}
