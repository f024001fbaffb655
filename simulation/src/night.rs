use std::collections::HashSet;

use rand::seq::SliceRandom;
use types::{mentions_name, ChatMessage, Phase, Player, Roster};

use crate::prompts;
use crate::table::{RoundOutcome, Table};
use crate::SimulationError;

/// Plays one night: the living werewolves whisper until they agree on a victim, or
/// pick one at random once the whisper rounds run out, and that player dies.
pub async fn run_night(
    roster: &Roster,
    prior_chat: &[ChatMessage],
    round: u32,
    table: &mut Table<'_>,
) -> Result<RoundOutcome, SimulationError> {
    let mut roster = roster.clone();
    let mut transcript = prior_chat.to_vec();
    let mut wolf_chat = Vec::new();
    let wolves: Vec<Player> = roster.werewolves().cloned().collect();
    let targets: Vec<Player> = roster.targets().cloned().collect();

    table.observer.start_phase(round, Phase::Night).await?;
    table
        .narrate(&mut transcript, format!("Night {round} falls."))
        .await?;

    let mut chosen = None;
    if wolves.is_empty() {
        log::warn!("No werewolves left alive, nobody hunts tonight");
    } else if targets.is_empty() {
        log::warn!("No one left for the werewolves to hunt tonight");
    } else {
        'whispers: for pass in 1..=table.settings.whisper_rounds {
            log::debug!("Whisper pass {pass}");
            for wolf in &wolves {
                let conversation = prompts::whisper_conversation(wolf, &roster, &wolf_chat);
                let reply = table.speak(wolf, &conversation).await?;
                let whisper = ChatMessage::from_player(wolf, reply);
                table.observer.on_whisper(&whisper).await?;
                if table.settings.reveal_whispers {
                    let revealed = ChatMessage::whisper(wolf, whisper.text.clone());
                    table.announce(&mut transcript, revealed).await?;
                }
                wolf_chat.push(whisper);

                if let Some(target) = consensus(&targets, wolves.len(), &wolf_chat) {
                    log::info!("Werewolves agreed on {}", target.name);
                    chosen = Some(target.clone());
                    break 'whispers;
                }
            }
        }

        if chosen.is_none() {
            if let Some(target) = targets.choose(&mut *table.rng) {
                table
                    .narrate(
                        &mut transcript,
                        format!("Werewolves could not agree. They pick {}.", target.name),
                    )
                    .await?;
                chosen = Some(target.clone());
            }
        }
    }

    let mut eliminated = None;
    if let Some(victim) = chosen {
        roster.mark_dead(victim.id)?;
        table
            .narrate(
                &mut transcript,
                format!("{} was killed during the night!", victim.name),
            )
            .await?;
        eliminated = Some(victim.id);
    }

    Ok(RoundOutcome {
        roster,
        transcript,
        wolf_chat,
        eliminated,
    })
}

/// The first target, in roster order, named by at least `wolf_count` distinct wolves.
fn consensus<'a>(
    targets: &'a [Player],
    wolf_count: usize,
    wolf_chat: &[ChatMessage],
) -> Option<&'a Player> {
    targets.iter().find(|target| {
        let mentioners: HashSet<u32> = wolf_chat
            .iter()
            .filter(|whisper| mentions_name(&whisper.text, &target.name))
            .map(|whisper| whisper.id)
            .collect();
        mentioners.len() >= wolf_count
    })
}
