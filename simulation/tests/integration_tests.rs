use std::collections::HashSet;

use generators::{prompt_parsing, RandomGenerator, ScriptedGenerator};
use rand::{rngs::StdRng, SeedableRng};
use recorder::{NoopRecorder, TranscriptCollector};
use simulation::prompts::{VOTE_CUE, WHISPER_CUE};
use simulation::{
    run_day, run_night, FailurePolicy, Game, RoundOutcome, RoundSettings, SimulationError, Table,
};
use types::{ChatMessage, GenerationError, Player, Role, Roster, Turn};

/// Two wolves (Lucie, Antoine) among six players.
fn village() -> Roster {
    Roster::new(vec![
        Player::new(1, "Henri", Role::Villager),
        Player::new(2, "Lucie", Role::Werewolf),
        Player::new(3, "Elise", Role::Seer),
        Player::new(4, "Antoine", Role::Werewolf),
        Player::new(5, "Jacques", Role::Villager),
        Player::new(6, "Colette", Role::Doctor),
    ])
    .expect("Valid roster")
}

fn prior_chat() -> Vec<ChatMessage> {
    vec![ChatMessage::narrator("Welcome to Havenwood. The game begins!")]
}

fn speaker(turns: &[Turn]) -> String {
    prompt_parsing::speaker(turns).unwrap_or_default()
}

fn cue(turns: &[Turn]) -> &str {
    turns.last().map(|t| t.content.as_str()).unwrap_or("")
}

fn narration(transcript: &[ChatMessage]) -> Vec<&str> {
    transcript
        .iter()
        .filter(|m| m.is_narrator())
        .map(|m| m.text.as_str())
        .collect()
}

/// The returned transcript is the prior chat followed by exactly what the observer saw.
fn assert_streamed(prior: &[ChatMessage], outcome: &RoundOutcome, collector: &TranscriptCollector) {
    assert_eq!(&outcome.transcript[..prior.len()], prior);
    assert_eq!(&outcome.transcript[prior.len()..], collector.messages());
}

fn alive_ids(roster: &Roster) -> HashSet<u32> {
    roster.alive().map(|p| p.id).collect()
}

#[tokio::test]
async fn test_night_consensus_kills_the_named_villager() {
    let roster = village();
    let prior = prior_chat();
    let mut generator = ScriptedGenerator::from_fn(|turns| {
        assert_eq!(cue(turns), WHISPER_CUE);
        Ok("Let us take Jacques tonight.".to_string())
    });
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(1);
    let settings = RoundSettings::default();

    let outcome = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_night(&roster, &prior, 1, &mut table).await.unwrap()
    };

    assert_eq!(outcome.eliminated, Some(5));
    assert!(!outcome.roster.get(5).unwrap().alive);
    assert_eq!(alive_ids(&outcome.roster).len(), 5);
    assert_eq!(generator.calls.len(), 2);
    assert_eq!(outcome.wolf_chat.len(), 2);
    assert_eq!(
        narration(&outcome.transcript),
        vec![
            "Welcome to Havenwood. The game begins!",
            "Night 1 falls.",
            "Jacques was killed during the night!"
        ]
    );
    // whispers stay private
    assert_eq!(collector.whispers().len(), 2);
    assert!(outcome.transcript.iter().all(|m| m.is_narrator()));
    assert_streamed(&prior, &outcome, &collector);
    // the caller's roster is untouched
    assert!(roster.get(5).unwrap().alive);
}

#[tokio::test]
async fn test_night_whispers_see_only_wolf_chat() {
    let roster = village();
    let prior = prior_chat();
    let mut generator = ScriptedGenerator::from_replies(["Henri?", "Henri."]);
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(1);
    let settings = RoundSettings::default();

    let outcome = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_night(&roster, &prior, 2, &mut table).await.unwrap()
    };

    assert_eq!(outcome.eliminated, Some(1));
    assert_eq!(speaker(&generator.calls[0]), "Lucie");
    assert_eq!(speaker(&generator.calls[1]), "Antoine");
    // system prompt and cue only, then the first whisper replayed
    assert_eq!(generator.calls[0].len(), 2);
    assert_eq!(generator.calls[1].len(), 3);
    assert_eq!(generator.calls[1][1].content, "Lucie: Henri?");
}

#[tokio::test]
async fn test_night_fallback_kills_one_living_villager() {
    let roster = village();
    let prior = prior_chat();
    let mut victims = HashSet::new();

    for seed in 0..20 {
        let mut generator = ScriptedGenerator::from_fn(|turns| match speaker(turns).as_str() {
            "Lucie" => Ok("Henri must die.".to_string()),
            _ => Ok("Elise knows too much.".to_string()),
        });
        let mut collector = TranscriptCollector::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let settings = RoundSettings::default();

        let outcome = {
            let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
            run_night(&roster, &prior, 1, &mut table).await.unwrap()
        };

        // four passes over both wolves
        assert_eq!(generator.calls.len(), 8);
        let victim = outcome.eliminated.expect("Someone always dies");
        let victim = roster.get(victim).unwrap();
        assert!(!victim.is_werewolf());
        assert_eq!(
            alive_ids(&roster).difference(&alive_ids(&outcome.roster)).count(),
            1
        );
        let narrated = narration(&outcome.transcript);
        assert!(narrated.contains(&format!("Werewolves could not agree. They pick {}.", victim.name).as_str()));
        assert_streamed(&prior, &outcome, &collector);
        victims.insert(victim.id);
    }
    assert!(victims.len() > 1, "Fallback should not always pick the same target");
}

#[tokio::test]
async fn test_night_reveal_whispers_shows_them_publicly() {
    let roster = village();
    let prior = prior_chat();
    let mut generator = ScriptedGenerator::from_fn(|_| Ok("Colette.".to_string()));
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(3);
    let settings = RoundSettings {
        reveal_whispers: true,
        ..RoundSettings::default()
    };

    let outcome = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_night(&roster, &prior, 1, &mut table).await.unwrap()
    };

    let revealed: Vec<&str> = outcome
        .transcript
        .iter()
        .filter(|m| !m.is_narrator())
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(revealed, vec!["Lucie (wolf whisper)", "Antoine (wolf whisper)"]);
    assert_eq!(outcome.wolf_chat[0].name, "Lucie");
    assert_eq!(outcome.eliminated, Some(6));
    assert_streamed(&prior, &outcome, &collector);
}

#[tokio::test]
async fn test_night_without_wolves_kills_nobody() {
    let mut roster = village();
    roster.mark_dead(2).unwrap();
    roster.mark_dead(4).unwrap();
    let mut generator = ScriptedGenerator::from_replies(Vec::<String>::new());
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(3);
    let settings = RoundSettings::default();

    let outcome = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_night(&roster, &[], 3, &mut table).await.unwrap()
    };
    assert_eq!(outcome.eliminated, None);
    assert!(generator.calls.is_empty());
    assert_eq!(narration(&outcome.transcript), vec!["Night 3 falls."]);
}

#[tokio::test]
async fn test_night_without_targets_skips_whispers() {
    let mut roster = village();
    for id in [1, 3, 5, 6] {
        roster.mark_dead(id).unwrap();
    }
    let mut generator = ScriptedGenerator::from_replies(Vec::<String>::new());
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(5);
    let settings = RoundSettings::default();

    let outcome = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_night(&roster, &[], 1, &mut table).await.unwrap()
    };
    assert_eq!(outcome.eliminated, None);
    assert!(generator.calls.is_empty());
    assert!(outcome.wolf_chat.is_empty());
    assert_eq!(narration(&outcome.transcript), vec!["Night 1 falls."]);
    assert_eq!(alive_ids(&outcome.roster), HashSet::from([2, 4]));
}

/// Henri accuses Lucie and Jacques accuses Antoine; everyone else is polite. Votes
/// come from `ballot`.
fn day_generator(ballot: fn(&str) -> &'static str) -> ScriptedGenerator {
    ScriptedGenerator::from_fn(move |turns| {
        let who = speaker(turns);
        if cue(turns) == VOTE_CUE {
            return Ok(ballot(&who).to_string());
        }
        Ok(match who.as_str() {
            "Henri" => "I suspect Lucie is a wolf.",
            "Jacques" => "Antoine is lying to us.",
            _ => "Good morning everyone.",
        }
        .to_string())
    })
}

#[tokio::test]
async fn test_day_majority_is_lynched() {
    let roster = village();
    let prior = prior_chat();
    let mut orders = HashSet::new();

    for seed in 0..20 {
        let mut generator = day_generator(|voter| match voter {
            "Lucie" => "Antoine. He seems off.",
            _ => "I vote Lucie.",
        });
        let mut collector = TranscriptCollector::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let settings = RoundSettings::default();

        let outcome = {
            let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
            run_day(&roster, &prior, 1, &mut table).await.unwrap()
        };

        assert_eq!(outcome.eliminated, Some(2));
        assert!(!outcome.roster.get(2).unwrap().alive);
        assert_eq!(alive_ids(&outcome.roster).len(), 5);
        // six speeches, two defenses, six votes
        assert_eq!(generator.calls.len(), 14);

        // accused players are listed, and defend, in the order they were first accused
        let discussion: Vec<String> = generator.calls[..6].iter().map(|c| speaker(c)).collect();
        let henri = discussion.iter().position(|name| name == "Henri").unwrap();
        let jacques = discussion.iter().position(|name| name == "Jacques").unwrap();
        let expected = if henri < jacques {
            ["Lucie", "Antoine"]
        } else {
            ["Antoine", "Lucie"]
        };
        orders.insert(expected);

        let narrated = narration(&outcome.transcript);
        let accused_line = format!("Accused: {}, {}.", expected[0], expected[1]);
        assert!(
            narrated.contains(&accused_line.as_str()),
            "Seed {seed}: {narrated:?}"
        );
        assert_eq!(speaker(&generator.calls[6]), expected[0]);
        assert_eq!(speaker(&generator.calls[7]), expected[1]);
        assert!(narrated.contains(&"Voting begins now."));
        assert_eq!(narrated.last(), Some(&"Lucie was lynched by vote."));
        assert!(outcome.wolf_chat.is_empty());
        assert_streamed(&prior, &outcome, &collector);
    }
    assert_eq!(orders.len(), 2);
}

#[tokio::test]
async fn test_day_tie_lynches_one_of_the_tied() {
    let roster = village();
    let prior = prior_chat();
    let mut lynched = HashSet::new();

    for seed in 0..30 {
        let mut generator = day_generator(|voter| match voter {
            "Henri" | "Elise" | "Jacques" => "Lucie for sure.",
            _ => "Antoine for sure.",
        });
        let mut collector = TranscriptCollector::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let settings = RoundSettings::default();

        let outcome = {
            let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
            run_day(&roster, &prior, 1, &mut table).await.unwrap()
        };
        let victim = outcome.eliminated.expect("Someone is lynched");
        assert!(victim == 2 || victim == 4, "Lynched {victim}");
        assert_streamed(&prior, &outcome, &collector);
        lynched.insert(victim);
    }
    assert_eq!(lynched.len(), 2);
}

#[tokio::test]
async fn test_day_unmatched_votes_still_count() {
    let roster = village();
    let mut generator = day_generator(|_| "I cannot decide.");
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(4);
    let settings = RoundSettings::default();

    let outcome = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_day(&roster, &[], 1, &mut table).await.unwrap()
    };
    let victim = outcome.eliminated.expect("Random ballots still lynch");
    assert!(victim == 2 || victim == 4);
}

#[tokio::test]
async fn test_day_without_accusations_changes_nothing() {
    let roster = village();
    let prior = prior_chat();
    let mut generator = ScriptedGenerator::from_fn(|_| Ok("Lovely weather today.".to_string()));
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(2);
    let settings = RoundSettings::default();

    let outcome = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_day(&roster, &prior, 1, &mut table).await.unwrap()
    };

    assert_eq!(alive_ids(&outcome.roster), alive_ids(&roster));
    assert_eq!(outcome.eliminated, None);
    assert_eq!(generator.calls.len(), 6);
    let narrated = narration(&outcome.transcript);
    assert_eq!(
        narrated
            .iter()
            .filter(|text| **text == "No one was strongly accused today.")
            .count(),
        1
    );
    assert!(!narrated.contains(&"Voting begins now."));
    assert!(!narrated.iter().any(|text| text.starts_with("Accused")));
    assert!(generator.calls.iter().all(|turns| cue(turns) != VOTE_CUE));
    assert_streamed(&prior, &outcome, &collector);
}

#[tokio::test]
async fn test_day_speakers_see_the_rolling_transcript() {
    let roster = village();
    let prior = prior_chat();
    let mut generator = ScriptedGenerator::from_fn(|turns| Ok(format!("{} says hi.", speaker(turns))));
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(5);
    let settings = RoundSettings::default();

    {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_day(&roster, &prior, 1, &mut table).await.unwrap();
    }

    // system prompt, welcome, day start, earlier speeches, cue
    for (idx, call) in generator.calls.iter().enumerate() {
        assert_eq!(call.len(), 4 + idx);
    }
    let first = speaker(&generator.calls[0]);
    assert_eq!(
        generator.calls[1][3].content,
        format!("{first}: {first} says hi.")
    );
}

#[tokio::test]
async fn test_failing_generator_follows_policy() {
    let roster = village();

    let mut generator =
        ScriptedGenerator::from_fn(|_| Err(GenerationError::Transport("connection refused".to_string())));
    let mut collector = TranscriptCollector::new();
    let mut rng = StdRng::seed_from_u64(5);
    let settings = RoundSettings::default();
    let outcome = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_day(&roster, &[], 1, &mut table).await.unwrap()
    };
    assert!(outcome
        .transcript
        .iter()
        .filter(|m| !m.is_narrator())
        .all(|m| m.text == "…"));
    assert_eq!(outcome.eliminated, None);

    let mut generator =
        ScriptedGenerator::from_fn(|_| Err(GenerationError::Transport("connection refused".to_string())));
    let mut collector = TranscriptCollector::new();
    let settings = RoundSettings {
        failure_policy: FailurePolicy::Abort,
        ..RoundSettings::default()
    };
    let result = {
        let mut table = Table::new(&mut generator, &mut collector, &mut rng, &settings);
        run_night(&roster, &[], 1, &mut table).await
    };
    assert!(matches!(
        result,
        Err(SimulationError::Generation { ref speaker, .. }) if speaker == "Lucie"
    ));
    assert_eq!(collector.messages().len(), 1);
}

#[tokio::test]
async fn test_deaths_are_permanent_across_rounds() {
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let roster = Roster::generate(&mut rng);
        let mut game = Game::new(
            roster,
            Box::new(RandomGenerator::seeded(seed)),
            Box::new(NoopRecorder),
            rng,
            RoundSettings::default(),
        );
        game.welcome().await.unwrap();

        let mut dead: HashSet<u32> = HashSet::new();
        while game.winner().is_none() && game.round <= 10 {
            let deaths = if game.phase == types::Phase::Night {
                game.play_night().await.unwrap()
            } else {
                game.play_day().await.unwrap()
            };
            let now_dead: HashSet<u32> = game.roster.iter().filter(|p| !p.alive).map(|p| p.id).collect();
            assert!(dead.is_subset(&now_dead));
            assert!(now_dead.len() - dead.len() <= 1);
            if let Some(id) = deaths {
                assert!(now_dead.contains(&id));
            }
            dead = now_dead;
        }
        assert_eq!(game.chat[0].text, "Welcome to Havenwood. The game begins!");
    }
}
