use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use types::{is_accusation, mentions_name, ChatMessage, Phase, Player, Roster};

use crate::prompts;
use crate::table::{RoundOutcome, Table};
use crate::SimulationError;

/// Plays one day: open discussion in a random order, then, if anyone was accused,
/// a defense from each accused player, a vote by every living player and a lynch.
pub async fn run_day(
    roster: &Roster,
    prior_chat: &[ChatMessage],
    round: u32,
    table: &mut Table<'_>,
) -> Result<RoundOutcome, SimulationError> {
    let mut roster = roster.clone();
    let mut transcript = prior_chat.to_vec();

    table.observer.start_phase(round, Phase::Day).await?;
    table
        .narrate(&mut transcript, format!("Day {round} begins. Discuss and accuse."))
        .await?;

    let mut order: Vec<Player> = roster.alive().cloned().collect();
    order.shuffle(&mut *table.rng);

    let mut accused: Vec<Player> = Vec::new();
    for speaker in &order {
        let reply = say(table, speaker, &roster, &mut transcript).await?;
        for target in roster.alive() {
            if target.id != speaker.id
                && !accused.contains(target)
                && is_accusation(&reply, &target.name)
            {
                log::debug!("{} accused {}", speaker.name, target.name);
                accused.push(target.clone());
            }
        }
    }

    if accused.is_empty() {
        table
            .narrate(&mut transcript, "No one was strongly accused today.")
            .await?;
        return Ok(RoundOutcome {
            roster,
            transcript,
            wolf_chat: vec![],
            eliminated: None,
        });
    }

    let names = accused.iter().map(|p| p.name.as_str()).join(", ");
    table
        .narrate(&mut transcript, format!("Accused: {names}."))
        .await?;
    for defendant in &accused {
        say(table, defendant, &roster, &mut transcript).await?;
    }

    table.narrate(&mut transcript, "Voting begins now.").await?;
    let mut tally = vec![0usize; accused.len()];
    let voters: Vec<Player> = roster.alive().cloned().collect();
    for voter in &voters {
        let conversation = prompts::vote_conversation(voter, &accused, &roster, &transcript);
        let reply = table.speak(voter, &conversation).await?;
        let pick = match accused
            .iter()
            .position(|candidate| mentions_name(&reply, &candidate.name))
        {
            Some(idx) => idx,
            None => {
                let idx = table.rng.gen_range(0..accused.len());
                log::debug!(
                    "{} named nobody on the ballot, counting {}",
                    voter.name,
                    accused[idx].name
                );
                idx
            }
        };
        tally[pick] += 1;
        table
            .announce(&mut transcript, ChatMessage::from_player(voter, reply))
            .await?;
    }
    log::info!(
        "Votes: {}",
        accused
            .iter()
            .zip(&tally)
            .map(|(p, votes)| format!("{}={votes}", p.name))
            .join(", ")
    );

    let mut eliminated = None;
    if let Some(idx) = tally_winner(&tally, &mut *table.rng) {
        let lynched = &accused[idx];
        roster.mark_dead(lynched.id)?;
        table
            .narrate(&mut transcript, format!("{} was lynched by vote.", lynched.name))
            .await?;
        eliminated = Some(lynched.id);
    }

    Ok(RoundOutcome {
        roster,
        transcript,
        wolf_chat: vec![],
        eliminated,
    })
}

/// Speaks one public line for `speaker` with the transcript so far as context.
async fn say(
    table: &mut Table<'_>,
    speaker: &Player,
    roster: &Roster,
    transcript: &mut Vec<ChatMessage>,
) -> Result<String, SimulationError> {
    let conversation = prompts::speech_conversation(speaker, roster, transcript);
    let reply = table.speak(speaker, &conversation).await?;
    table
        .announce(transcript, ChatMessage::from_player(speaker, reply.clone()))
        .await?;
    Ok(reply)
}

/// Index of the highest tally, ties broken uniformly at random.
fn tally_winner<R: Rng + ?Sized>(tally: &[usize], rng: &mut R) -> Option<usize> {
    let max = *tally.iter().max()?;
    let tied: Vec<usize> = tally
        .iter()
        .enumerate()
        .filter(|(_, votes)| **votes == max)
        .map(|(idx, _)| idx)
        .collect();
    tied.choose(rng).copied()
}
