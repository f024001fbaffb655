//! Reads the structured lines of a system prompt back out of a conversation.
//!
//! Prompts list names as `Label: a, b, c` lines and open with `You are <name>`.

use regex::Regex;
use types::{Turn, TurnRole};

fn system_prompt(conversation: &[Turn]) -> Option<&str> {
    conversation
        .iter()
        .find(|turn| turn.role == TurnRole::System)
        .map(|turn| turn.content.as_str())
}

/// The character a conversation is addressed to.
pub fn speaker(conversation: &[Turn]) -> Option<String> {
    let re = Regex::new(r"(?m)^You are (?<name>[\p{L}'-]+)").expect("Valid speaker regex");
    let caps = re.captures(system_prompt(conversation)?)?;
    Some(caps.name("name")?.as_str().to_string())
}

/// The comma-separated names listed after `label:` in the system prompt.
pub fn listed_names(conversation: &[Turn], label: &str) -> Vec<String> {
    let Some(prompt) = system_prompt(conversation) else {
        return vec![];
    };
    let re = Regex::new(&format!(r"(?m){}:\s*(?<names>.*)$", regex::escape(label)))
        .expect("Escaped label is a valid regex");
    let Some(caps) = re.captures(prompt) else {
        return vec![];
    };
    caps.name("names")
        .map(|m| m.as_str())
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "none")
        .map(str::to_string)
        .collect()
}
