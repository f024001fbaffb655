//! Instruction text and conversations sent to the text generator.

use itertools::Itertools;
use types::{ChatMessage, Player, Role, Roster, Turn};

pub const SPEECH_CUE: &str = "It's {name}'s turn. What do you say now?";
pub const WHISPER_CUE: &str = "You whisper to your partner. What do you say?";
pub const VOTE_CUE: &str = "Who do you vote for and why?";

pub fn role_directive(role: Role) -> &'static str {
    match role {
        Role::Werewolf => "You are a werewolf. Work with your partner to choose one villager each night. Hide your role and deflect suspicion.",
        Role::Seer => "You are the Seer. You may know hidden information but you must hide your identity unless strategic.",
        Role::Doctor => "You are the Doctor. Your priority is to survive. Bluff or defend to look like a villager.",
        Role::Villager => "You are a villager. Find and lynch werewolves. Use logic, bluff, or accusation to survive.",
    }
}

fn names_or_none<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let joined = names.into_iter().join(", ");
    if joined.is_empty() {
        "none".to_string()
    } else {
        joined
    }
}

pub fn day_prompt(player: &Player, roster: &Roster) -> String {
    format!(
        "You are {name} in the village of Havenwood.
Alive players: {alive}
Dead players: {dead}
Role guideline: {directive}

Rules:
- It is DAY. Debate who might be werewolves.
- Speak like a real person. Use 1-2 short sentences.
- Do not use commas or semicolons to extend sentences.
- Base reasoning only on what is in the chat history.",
        name = player.name,
        alive = names_or_none(roster.alive_names()),
        dead = names_or_none(roster.dead_names()),
        directive = role_directive(player.role),
    )
}

pub fn night_prompt(wolf: &Player, roster: &Roster) -> String {
    format!(
        "You are {name}, secretly a werewolf in Havenwood.
Villagers alive: {villagers}

Instructions:
- It is NIGHT. Whisper with your partner to pick one villager to kill.
- Reply to your partner's suggestion and help converge on one target.
- Show fear of exposure and a will to survive.
- Never say out loud that you are a werewolf.
- Use 1-2 short sentences. No commas or semicolons.",
        name = wolf.name,
        villagers = names_or_none(roster.targets().map(|p| p.name.as_str())),
    )
}

pub fn vote_prompt(voter: &Player, accused: &[Player], roster: &Roster) -> String {
    format!(
        "You are {name} in Havenwood.
Alive players: {alive}

Task:
- Choose ONE name from: {options}
- Give a 1-2 sentence reason based on the chat history.
- No commas or semicolons.",
        name = voter.name,
        alive = names_or_none(roster.alive_names()),
        options = accused.iter().map(|p| p.name.as_str()).join(", "),
    )
}

fn conversation(system: String, chat: &[ChatMessage], cue: String) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(chat.len() + 2);
    turns.push(Turn::system(system));
    turns.extend(chat.iter().map(Turn::replay));
    turns.push(Turn::user(cue));
    turns
}

/// A day speech or defense, with the public transcript so far as context.
pub fn speech_conversation(player: &Player, roster: &Roster, chat: &[ChatMessage]) -> Vec<Turn> {
    conversation(
        day_prompt(player, roster),
        chat,
        SPEECH_CUE.replace("{name}", &player.name),
    )
}

/// A night whisper, with only tonight's wolf chat as context.
pub fn whisper_conversation(wolf: &Player, roster: &Roster, wolf_chat: &[ChatMessage]) -> Vec<Turn> {
    conversation(night_prompt(wolf, roster), wolf_chat, WHISPER_CUE.to_string())
}

pub fn vote_conversation(
    voter: &Player,
    accused: &[Player],
    roster: &Roster,
    chat: &[ChatMessage],
) -> Vec<Turn> {
    conversation(vote_prompt(voter, accused, roster), chat, VOTE_CUE.to_string())
}

/// Trims a generated reply, optionally drops commas and semicolons, and keeps at
/// most `max_sentences` sentences when a limit is given.
pub fn sanitize_response(raw: &str, max_sentences: Option<usize>, strip_commas: bool) -> String {
    let mut text = raw.trim().to_string();
    if strip_commas {
        text.retain(|c| c != ',' && c != ';');
    }
    let Some(max) = max_sentences else {
        return text;
    };
    let sentences = split_sentences(&text);
    if sentences.len() <= max {
        return text;
    }
    sentences[..max].join(" ").trim().to_string()
}

/// Splits after `.`, `!` or `?` wherever whitespace follows.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = idx + c.len_utf8();
        let mut next = end;
        while let Some(&(ws_idx, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                break;
            }
            next = ws_idx + ws.len_utf8();
            chars.next();
        }
        if next > end {
            sentences.push(&text[start..end]);
            start = next;
        }
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}
