use std::io::Write;

use async_trait::async_trait;
use itertools::Itertools;
use tokio::io::{self, AsyncBufReadExt, BufReader, Stdin};
use types::{GenerationError, TextGenerator, Turn, TurnRole};

/// Lets a person at the terminal speak for a character.
#[derive(Debug, Default)]
pub struct InputGenerator {
    /// How many replayed chat lines to show before asking.
    pub context_lines: usize,
    /// Kept across turns so lines buffered past the current reply are not lost.
    stdin: Option<BufReader<Stdin>>,
}

impl InputGenerator {
    pub fn new(context_lines: usize) -> Self {
        Self {
            context_lines,
            stdin: None,
        }
    }
}

#[async_trait]
impl TextGenerator for InputGenerator {
    async fn generate(&mut self, conversation: &[Turn]) -> Result<String, GenerationError> {
        print_conversation(conversation, self.context_lines);

        let stdin = self
            .stdin
            .get_or_insert_with(|| BufReader::new(io::stdin()));
        let mut buf = String::new();
        loop {
            print!("Your line? >> ");
            std::io::stdout()
                .flush()
                .map_err(|err| GenerationError::Input(err.to_string()))?;
            match read_reply(stdin, &mut buf).await? {
                Some(reply) => return Ok(reply),
                None => {
                    buf.clear();
                    log::warn!("Empty reply, try again")
                }
            }
        }
    }
}

fn print_conversation(conversation: &[Turn], context_lines: usize) {
    if let Some(system) = conversation.iter().find(|t| t.role == TurnRole::System) {
        println!("{}", system.content);
    }
    let replayed = conversation
        .iter()
        .filter(|t| t.role == TurnRole::Assistant)
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>();
    let skip = replayed.len().saturating_sub(context_lines);
    if context_lines > 0 && !replayed.is_empty() {
        println!("Recent chat:\n{}", replayed.iter().skip(skip).join("\n"));
    }
    if let Some(cue) = conversation.iter().rev().find(|t| t.role == TurnRole::User) {
        println!("{}", cue.content);
    }
}

/// `Ok(None)` means the line was blank and the caller should ask again.
async fn read_reply<R>(reader: &mut R, buf: &mut String) -> Result<Option<String>, GenerationError>
where
    R: AsyncBufReadExt + Unpin,
{
    let read = reader
        .read_line(buf)
        .await
        .map_err(|err| GenerationError::Input(err.to_string()))?;
    if read == 0 {
        return Err(GenerationError::Input("stdin closed".to_string()));
    }
    let reply = buf.trim();
    if reply.is_empty() {
        return Ok(None);
    }
    Ok(Some(reply.to_string()))
}
