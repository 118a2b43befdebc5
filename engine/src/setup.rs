// ═══════════════════════════════════════════════════════════════════════
// Game setup — the Startup phase: map edits, the player list and the
// initial deal of countries.
// ═══════════════════════════════════════════════════════════════════════

use crate::command::{Command, Edit};
use crate::engine;
use crate::error::EngineError;
use crate::log::LogTag;
use crate::map::{CountryId, MapGraph};
use crate::reinforcement;
use crate::rules::Rules;
use crate::types::*;
use rand::seq::SliceRandom;

fn require_startup(state: &GameState, command: &str) -> Result<(), EngineError> {
    if state.phase == Phase::Startup {
        Ok(())
    } else {
        Err(EngineError::InvalidForPhase { command: command.to_string(), phase: state.phase })
    }
}

pub fn add_player(state: &mut GameState, name: &str, strategy: StrategyKind) -> Result<(), EngineError> {
    require_startup(state, "gameplayer")?;
    if name.is_empty() || strategy == StrategyKind::Neutral {
        return Err(EngineError::IllegalArgument(format!("'{}' cannot join as a player", name)));
    }
    if name.eq_ignore_ascii_case(NEUTRAL) || state.players.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
        return Err(EngineError::DuplicateName(name.to_string()));
    }
    state.players.push(Player::new(name, strategy));
    Ok(())
}

pub fn remove_player(state: &mut GameState, name: &str) -> Result<(), EngineError> {
    require_startup(state, "gameplayer")?;
    let before = state.players.len();
    state.players.retain(|p| p.name != name);
    if state.players.len() == before {
        return Err(EngineError::UnknownPlayer(name.to_string()));
    }
    Ok(())
}

/// Validate the map, deal every country out and open round 1.
///
/// Countries are shuffled with the game rng and dealt round-robin in turn
/// order, so when the count doesn't divide evenly the first players get one
/// extra each.
pub fn assign_countries(state: &mut GameState) -> Result<(), EngineError> {
    require_startup(state, "assigncountries")?;
    state.map.validate()?;
    let players: Vec<String> = state.players.iter().filter(|p| !p.is_neutral()).map(|p| p.name.clone()).collect();
    if players.len() < 2 {
        return Err(EngineError::NotEnoughPlayers(players.len()));
    }

    let mut deck: Vec<CountryId> = state.map.countries().iter().map(|c| c.id).collect();
    deck.shuffle(&mut state.rng());

    let armies = state.rules.starting_armies_per_country;
    for (i, id) in deck.into_iter().enumerate() {
        let owner = &players[i % players.len()];
        if let Some(c) = state.map.country_mut(id) {
            c.owner = Some(owner.clone());
            c.armies = armies;
        }
        if let Some(p) = state.player_mut(owner) {
            p.countries.insert(id);
        }
    }
    for name in &players {
        reinforcement::recompute_continents(state, name);
    }

    tracing::info!(
        target: "warzone::engine",
        map = %state.map.name,
        players = players.len(),
        countries = state.map.country_count(),
        "countries assigned"
    );
    state.record(
        LogTag::Start,
        format!(
            "game starts on '{}' with {} players: {}",
            state.map.name,
            players.len(),
            players.join(", ")
        ),
    );
    engine::begin_round(state);
    Ok(())
}

/// Run one Startup command. Phase legality is checked by the caller.
///
/// A command carrying several `-add`/`-remove` edits applies all of them or
/// none: the edits run against a copy that replaces the live map or roster
/// only once every edit has succeeded.
pub fn apply_startup_command(state: &mut GameState, command: &Command) -> Result<(), EngineError> {
    match command {
        Command::EditContinent(edits) => {
            let mut map = state.map.clone();
            for edit in edits {
                match edit {
                    Edit::Add((name, bonus)) => map.add_continent(name, *bonus).map(|_| ())?,
                    Edit::Remove((name, _)) => map.remove_continent(name)?,
                }
            }
            state.map = map;
        }
        Command::EditCountry(edits) => {
            let mut map = state.map.clone();
            for edit in edits {
                match edit {
                    Edit::Add((name, continent)) => map.add_country(name, continent).map(|_| ())?,
                    Edit::Remove((name, _)) => map.remove_country(name)?,
                }
            }
            state.map = map;
        }
        Command::EditNeighbor(edits) => {
            let mut map = state.map.clone();
            for edit in edits {
                match edit {
                    Edit::Add((a, b)) => map.add_neighbor(a, b)?,
                    Edit::Remove((a, b)) => map.remove_neighbor(a, b)?,
                }
            }
            state.map = map;
        }
        Command::ValidateMap => {
            state.map.validate()?;
            state.record(LogTag::Effect, format!("map '{}' is valid", state.map.name));
        }
        Command::GamePlayer(edits) => {
            let roster = state.players.clone();
            for edit in edits {
                let applied = match edit {
                    Edit::Add(name) => add_player(state, name, StrategyKind::Human),
                    Edit::Remove(name) => remove_player(state, name),
                };
                if let Err(e) = applied {
                    state.players = roster;
                    return Err(e);
                }
            }
        }
        Command::AssignCountries => assign_countries(state)?,
        Command::Order(_) | Command::Commit => {
            return Err(EngineError::InvalidForPhase { command: command.name().to_string(), phase: state.phase })
        }
    }
    Ok(())
}

/// A game ready for its first IssueOrder step: players joined, countries
/// dealt and round-1 reinforcements handed out.
pub fn create_initial_state(
    map: MapGraph,
    players: &[(String, StrategyKind)],
    rules: Rules,
    seed: u64,
) -> Result<GameState, EngineError> {
    let mut state = GameState::new(map, rules, seed);
    for (name, strategy) in players {
        add_player(&mut state, name, *strategy)?;
    }
    assign_countries(&mut state)?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::builtin;

    fn roster(names: &[&str]) -> Vec<(String, StrategyKind)> {
        names.iter().map(|n| (n.to_string(), StrategyKind::Random)).collect()
    }

    #[test]
    fn test_create_three_player_game() {
        let state = create_initial_state(builtin("classic").unwrap(), &roster(&["A", "B", "C"]), Rules::default(), 42)
            .unwrap();
        assert_eq!(state.phase, Phase::IssueOrder);
        assert_eq!(state.round, 1);
        // 20 countries over 3 players: 7, 7, 6
        let counts: Vec<usize> = state.players.iter().map(|p| p.countries.len()).collect();
        assert_eq!(counts, vec![7, 7, 6]);
        assert!(state.map.countries().iter().all(|c| c.owner.is_some()));
        for p in &state.players {
            assert!(p.reinforcements >= 3);
        }
    }

    #[test]
    fn test_deterministic_seed() {
        let deal = |seed| {
            let s = create_initial_state(builtin("classic").unwrap(), &roster(&["A", "B"]), Rules::default(), seed)
                .unwrap();
            s.map.countries().iter().map(|c| c.owner.clone()).collect::<Vec<_>>()
        };
        assert_eq!(deal(9), deal(9));
    }

    #[test]
    fn test_needs_two_players() {
        let err = create_initial_state(builtin("tiny").unwrap(), &roster(&["Solo"]), Rules::default(), 1);
        assert_eq!(err.unwrap_err(), EngineError::NotEnoughPlayers(1));
    }

    #[test]
    fn test_invalid_map_blocks_start() {
        let err = create_initial_state(builtin("islands").unwrap(), &roster(&["A", "B"]), Rules::default(), 1);
        assert!(matches!(err, Err(EngineError::MapInvalid(_))));
    }

    #[test]
    fn test_player_names() {
        let mut state = GameState::new(builtin("tiny").unwrap(), Rules::default(), 1);
        add_player(&mut state, "Ann", StrategyKind::Human).unwrap();
        assert_eq!(add_player(&mut state, "ann", StrategyKind::Random), Err(EngineError::DuplicateName("ann".into())));
        assert!(add_player(&mut state, "neutral", StrategyKind::Random).is_err());
        assert_eq!(remove_player(&mut state, "Bob"), Err(EngineError::UnknownPlayer("Bob".into())));
        remove_player(&mut state, "Ann").unwrap();
        assert!(state.players.is_empty());
    }

    #[test]
    fn test_failed_edit_line_changes_nothing() {
        let mut state = GameState::new(builtin("tiny").unwrap(), Rules::default(), 1);
        let before = state.map.clone();
        let line = Command::parse("editcountry -add G West -add A West").unwrap();
        assert_eq!(apply_startup_command(&mut state, &line), Err(EngineError::DuplicateName("A".into())));
        assert_eq!(state.map, before);

        let line = Command::parse("editneighbor -add A F -remove A Atlantis").unwrap();
        assert!(apply_startup_command(&mut state, &line).is_err());
        assert_eq!(state.map, before);

        let line = Command::parse("gameplayer -add Ann -add Bob -remove Cid").unwrap();
        assert_eq!(apply_startup_command(&mut state, &line), Err(EngineError::UnknownPlayer("Cid".into())));
        assert!(state.players.is_empty());
    }

    #[test]
    fn test_starting_armies_from_rules() {
        let rules = Rules { starting_armies_per_country: 2, ..Rules::default() };
        let state = create_initial_state(builtin("tiny").unwrap(), &roster(&["A", "B"]), rules, 5).unwrap();
        assert!(state.map.countries().iter().all(|c| c.armies == 2));
    }
}
