// ═══════════════════════════════════════════════════════════════════════
// Game-level test suite: full games, phase control, the command surface
// and map connectivity properties.
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::engine::{advance, apply_action, produce_orders_for_round, submit_command, Action};
    use crate::error::EngineError;
    use crate::log::LogTag;
    use crate::map::*;
    use crate::orders::Order;
    use crate::reinforcement;
    use crate::rules::Rules;
    use crate::setup::create_initial_state;
    use crate::types::*;
    use std::collections::VecDeque;

    // ── Helpers ──────────────────────────────────────────────────────────

    fn roster(names: &[&str]) -> Vec<(String, StrategyKind)> {
        names.iter().map(|n| (n.to_string(), StrategyKind::Random)).collect()
    }

    fn id(state: &GameState, name: &str) -> CountryId {
        state.map.country_by_name(name).unwrap().id
    }

    /// Two-player game on the tiny map with ownership and armies set by hand.
    fn rigged(layout: &[(&str, &str, u32)]) -> GameState {
        let mut state = create_initial_state(builtin("tiny").unwrap(), &roster(&["X", "Y"]), Rules::default(), 11)
            .unwrap();
        for p in &mut state.players {
            p.countries.clear();
        }
        for &(country, owner, armies) in layout {
            let cid = id(&state, country);
            let c = state.map.country_mut(cid).unwrap();
            c.owner = Some(owner.to_string());
            c.armies = armies;
            state.player_mut(owner).unwrap().countries.insert(cid);
        }
        reinforcement::recompute_continents(&mut state, "X");
        reinforcement::recompute_continents(&mut state, "Y");
        state
    }

    /// Drive one round with a scripted queue of actions per player; a player
    /// whose script runs out answers `Done`.
    fn scripted_round(state: &mut GameState, scripts: &[(&str, Vec<Action>)]) -> Vec<(String, Order)> {
        let mut scripts: Vec<(String, VecDeque<Action>)> =
            scripts.iter().map(|(p, a)| (p.to_string(), a.iter().cloned().collect())).collect();
        produce_orders_for_round(state, |_, player| {
            scripts
                .iter_mut()
                .find(|(p, _)| p == player)
                .and_then(|(_, queue)| queue.pop_front())
                .unwrap_or(Action::Done)
        })
    }

    /// Run a full game with a simple random policy (seed-deterministic).
    fn play_full_game_random(seed: u64, map: &str, players: &[&str]) -> GameState {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let rules = Rules { max_rounds: 60, ..Rules::default() };
        let mut state = create_initial_state(builtin(map).unwrap(), &roster(players), rules, seed).unwrap();
        advance(&mut state);

        let mut step = 0u64;
        while !state.is_over() && step < 200_000 {
            step += 1;
            let player = match &state.pending {
                Some(p) => p.player().to_string(),
                None => break,
            };
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(step.wrapping_mul(999961)));
            let action = random_action(&state, &player, &mut rng);
            apply_action(&mut state, action);
            advance(&mut state);
        }
        state
    }

    /// Deploy everything, then advance or play a card at random.
    fn random_action(state: &GameState, player: &str, rng: &mut impl rand::Rng) -> Action {
        use rand::seq::SliceRandom;

        let me = state.player(player).unwrap();
        let owned: Vec<CountryId> = me.countries.iter().copied().collect();
        let Some(&home) = owned.choose(rng) else { return Action::Done };

        if me.undeployed() > 0 {
            let n = rng.gen_range(1..=me.undeployed());
            return Action::Issue(Order::Deploy { target: home, armies: n });
        }
        if rng.gen_bool(0.25) {
            return Action::Done;
        }
        if let Some(&card) = me.cards.first() {
            let enemy: Vec<CountryId> =
                state.map.countries().iter().filter(|c| !c.is_owned_by(player)).map(|c| c.id).collect();
            let target = enemy.choose(rng).copied().unwrap_or(home);
            return Action::Issue(match card {
                Card::Bomb => Order::Bomb { target },
                Card::Blockade => Order::Blockade { target: home },
                Card::Airlift => Order::Airlift {
                    source: home,
                    target: *owned.choose(rng).unwrap(),
                    armies: 1,
                },
                Card::Negotiate => {
                    let others: Vec<String> = state.active_players().into_iter().filter(|p| p != player).collect();
                    Order::Negotiate { player: others.choose(rng).cloned().unwrap_or_default() }
                }
            });
        }
        let c = state.map.country(home).unwrap();
        match c.neighbors.iter().copied().collect::<Vec<_>>().choose(rng) {
            Some(&target) if c.armies > 0 => Action::Issue(Order::Advance {
                source: home,
                target,
                armies: rng.gen_range(1..=c.armies),
            }),
            _ => Action::Done,
        }
    }

    // ── Full games ───────────────────────────────────────────────────────

    #[test]
    fn test_full_game_terminates() {
        for seed in 0..5 {
            let state = play_full_game_random(seed, "classic", &["Ann", "Bob", "Cy"]);
            assert!(state.is_over(), "seed {} did not finish", seed);
            assert!(state.round <= state.rules.max_rounds);
            assert_eq!(state.log.last().unwrap().tag, LogTag::End);
            if let Some(w) = &state.winner {
                assert!(!state.player(w).unwrap().eliminated);
            }
        }
    }

    #[test]
    fn test_full_game_deterministic() {
        let a = play_full_game_random(77, "classic", &["Ann", "Bob"]);
        let b = play_full_game_random(77, "classic", &["Ann", "Bob"]);
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.round, b.round);
        assert_eq!(a.log, b.log);
    }

    #[test]
    fn test_ownership_consistent_after_game() {
        let state = play_full_game_random(5, "tiny", &["Ann", "Bob"]);
        for c in state.map.countries() {
            let owner = c.owner.as_deref().unwrap();
            assert!(state.player(owner).unwrap().countries.contains(&c.id));
        }
        for p in &state.players {
            let expected = {
                let mut probe = state.clone();
                reinforcement::recompute_continents(&mut probe, &p.name);
                probe.player(&p.name).unwrap().continents.clone()
            };
            assert_eq!(p.continents, expected, "{} continents stale", p.name);
        }
    }

    #[test]
    fn test_round_limit_is_a_draw() {
        let rules = Rules { max_rounds: 3, ..Rules::default() };
        let mut state = create_initial_state(builtin("classic").unwrap(), &roster(&["Ann", "Bob"]), rules, 1).unwrap();
        advance(&mut state);
        while state.pending.is_some() {
            apply_action(&mut state, Action::Done);
            advance(&mut state);
        }
        assert!(state.is_over());
        assert_eq!(state.winner, None);
        assert_eq!(state.round, 3);
        assert!(state.log.last().unwrap().text.contains("draw"));
    }

    // ── Phase control and commands ───────────────────────────────────────

    #[test]
    fn test_console_startup_flow() {
        let mut state = GameState::new(MapGraph::new("handmade"), Rules::default(), 3);
        for cmd in [
            "editcontinent -add West 2 -add East 1",
            "editcountry -add A West -add B West -add C East",
            "editneighbor -add A B -add B C",
            "validatemap",
            "gameplayer -add Ann -add Bob",
            "assigncountries",
        ] {
            submit_command(&mut state, "console", cmd).unwrap();
        }
        assert_eq!(state.phase, Phase::IssueOrder);
        assert_eq!(state.round, 1);
        assert_eq!(state.players.len(), 2);
        assert!(state.map.countries().iter().all(|c| c.owner.is_some()));
    }

    #[test]
    fn test_rejected_edit_line_leaves_map_untouched() {
        let mut state = GameState::new(builtin("tiny").unwrap(), Rules::default(), 3);
        let before = state.map.clone();
        assert_eq!(
            submit_command(&mut state, "console", "editcountry -add G West -add A West"),
            Err(EngineError::DuplicateName("A".into()))
        );
        assert_eq!(state.map, before);
        assert_eq!(state.map.country_count(), 6);
        assert!(state.log.last().unwrap().is_error());
    }

    #[test]
    fn test_two_triangles_become_valid_after_one_edge() {
        let mut state = GameState::new(builtin("islands").unwrap(), Rules::default(), 3);
        assert!(matches!(
            submit_command(&mut state, "console", "validatemap"),
            Err(EngineError::MapInvalid(_))
        ));
        assert!(state.log.last().unwrap().is_error());
        submit_command(&mut state, "console", "editneighbor -add N1 S1").unwrap();
        submit_command(&mut state, "console", "validatemap").unwrap();
    }

    #[test]
    fn test_phase_illegal_command_rejected_without_mutation() {
        let mut state = create_initial_state(builtin("tiny").unwrap(), &roster(&["X", "Y"]), Rules::default(), 4).unwrap();
        advance(&mut state);
        let before = state.clone();

        let err = submit_command(&mut state, "X", "gameplayer -add Zed").unwrap_err();
        assert_eq!(err, EngineError::InvalidForPhase { command: "gameplayer".into(), phase: Phase::IssueOrder });
        assert_eq!(state.players, before.players);
        assert_eq!(state.map, before.map);
        assert_eq!(state.pending, before.pending);
        assert_eq!(state.log.len(), before.log.len() + 1);
        assert!(state.log.last().unwrap().is_error());

        let mut fresh = GameState::new(builtin("tiny").unwrap(), Rules::default(), 4);
        assert!(matches!(
            submit_command(&mut fresh, "X", "deploy A 1"),
            Err(EngineError::InvalidForPhase { .. })
        ));
    }

    #[test]
    fn test_malformed_order_text_rejected() {
        let mut state = create_initial_state(builtin("tiny").unwrap(), &roster(&["X", "Y"]), Rules::default(), 4).unwrap();
        advance(&mut state);
        let player = state.pending.as_ref().unwrap().player().to_string();

        for bad in ["deploy A", "advance A B many", "bomb"] {
            assert!(matches!(
                submit_command(&mut state, &player, bad),
                Err(EngineError::IllegalArgument(_))
            ));
        }
        assert!(matches!(
            submit_command(&mut state, &player, "deploy Nowhere 1"),
            Err(EngineError::UnknownCountry(_))
        ));
        // Nothing queued, still waiting on the same player
        assert_eq!(state.pending.as_ref().unwrap().player(), player);
        assert!(state.player(&player).unwrap().orders.is_empty());

        let other = if player == "X" { "Y" } else { "X" };
        assert_eq!(submit_command(&mut state, other, "commit"), Err(EngineError::NotPending(other.into())));
    }

    #[test]
    fn test_submit_orders_by_text() {
        let mut state = rigged(&[("A", "X", 1), ("B", "X", 1), ("C", "X", 1), ("D", "Y", 1), ("E", "Y", 1), ("F", "Y", 1)]);
        state.player_mut("X").unwrap().reinforcements = 5;
        advance(&mut state);
        assert_eq!(state.pending.as_ref().unwrap().player(), "X");

        submit_command(&mut state, "X", "deploy C 5").unwrap();
        advance(&mut state);
        // Y's turn in the round-robin
        submit_command(&mut state, "Y", "commit").unwrap();
        advance(&mut state);
        submit_command(&mut state, "X", "advance C D 6").unwrap();
        advance(&mut state);
        submit_command(&mut state, "X", "commit").unwrap();
        advance(&mut state);

        // 6 attackers kill 4 (capped at 1), 1 defender kills 1
        let d = id(&state, "D");
        assert!(state.map.country(d).unwrap().is_owned_by("X"));
        assert_eq!(state.map.country(d).unwrap().armies, 5);
        assert_eq!(state.round, 2);
    }

    // ── Issue-time checks ────────────────────────────────────────────────

    #[test]
    fn test_deploy_limited_by_unqueued_pool() {
        let mut state = rigged(&[("A", "X", 0), ("B", "X", 0), ("C", "X", 0), ("D", "Y", 0), ("E", "Y", 0), ("F", "Y", 0)]);
        state.player_mut("X").unwrap().reinforcements = 5;
        let a = id(&state, "A");
        let seq = scripted_round(
            &mut state,
            &[(
                "X",
                vec![
                    Action::Issue(Order::Deploy { target: a, armies: 3 }),
                    Action::Issue(Order::Deploy { target: a, armies: 3 }),
                    Action::Issue(Order::Deploy { target: a, armies: 2 }),
                ],
            )],
        );
        assert_eq!(seq.len(), 2);
        assert_eq!(state.player("X").unwrap().undeployed(), 0);
        assert_eq!(state.player("X").unwrap().orders_issued, 3);
        assert_eq!(state.log.iter().filter(|e| e.is_error()).count(), 1);
    }

    #[test]
    fn test_card_consumed_at_issue() {
        let mut state = rigged(&[("A", "X", 4), ("B", "X", 4), ("C", "X", 4), ("D", "Y", 8), ("E", "Y", 4), ("F", "Y", 4)]);
        state.player_mut("X").unwrap().reinforcements = 0;
        state.player_mut("X").unwrap().cards = vec![Card::Bomb];
        let d = id(&state, "D");
        let seq = scripted_round(
            &mut state,
            &[(
                "X",
                vec![Action::Issue(Order::Bomb { target: d }), Action::Issue(Order::Bomb { target: d })],
            )],
        );
        assert_eq!(seq.len(), 1);
        assert!(state.player("X").unwrap().cards.is_empty());
        advance(&mut state);
        assert_eq!(state.map.country(d).unwrap().armies, 4);
    }

    #[test]
    fn test_order_cap_counts_rejections() {
        let mut state = rigged(&[("A", "X", 0), ("B", "X", 0), ("C", "X", 0), ("D", "Y", 0), ("E", "Y", 0), ("F", "Y", 0)]);
        state.rules.max_orders_per_round = 3;
        let d = id(&state, "D");
        let spam: Vec<Action> = (0..10).map(|_| Action::Issue(Order::Bomb { target: d })).collect();
        let mut asked = 0;
        produce_orders_for_round(&mut state, |_, player| {
            if player == "X" {
                asked += 1;
                spam[0].clone()
            } else {
                Action::Done
            }
        });
        assert_eq!(asked, 3);
        assert!(state.player("X").unwrap().done);
    }

    // ── Round behaviour ──────────────────────────────────────────────────

    #[test]
    fn test_round_robin_execution_sequence() {
        let mut state = rigged(&[("A", "X", 0), ("B", "X", 0), ("C", "X", 0), ("D", "Y", 0), ("E", "Y", 0), ("F", "Y", 0)]);
        state.player_mut("X").unwrap().reinforcements = 3;
        state.player_mut("Y").unwrap().reinforcements = 3;
        let (a, b, e, f) = (id(&state, "A"), id(&state, "B"), id(&state, "E"), id(&state, "F"));
        let seq = scripted_round(
            &mut state,
            &[
                (
                    "X",
                    vec![
                        Action::Issue(Order::Deploy { target: a, armies: 1 }),
                        Action::Issue(Order::Deploy { target: b, armies: 1 }),
                        Action::Issue(Order::Deploy { target: a, armies: 1 }),
                    ],
                ),
                ("Y", vec![Action::Issue(Order::Deploy { target: e, armies: 2 }), Action::Issue(Order::Deploy { target: f, armies: 1 })]),
            ],
        );
        let who: Vec<&str> = seq.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(who, vec!["X", "Y", "X", "Y", "X"]);
        assert_eq!(seq[1].1, Order::Deploy { target: e, armies: 2 });
    }

    #[test]
    fn test_unspent_pool_does_not_carry_over() {
        let mut state =
            create_initial_state(builtin("tiny").unwrap(), &roster(&["Ann", "Bob"]), Rules::default(), 4).unwrap();
        let formula = reinforcement::reinforcements(&state, "Ann");
        assert_eq!(state.player("Ann").unwrap().reinforcements, formula);

        // Both commit straight away without deploying
        scripted_round(&mut state, &[]);
        advance(&mut state);
        assert_eq!(state.round, 2);
        assert_eq!(state.player("Ann").unwrap().reinforcements, formula);
        assert_eq!(state.player("Bob").unwrap().reinforcements, reinforcement::reinforcements(&state, "Bob"));
    }

    #[test]
    fn test_one_card_per_round() {
        let mut state = rigged(&[("A", "X", 5), ("B", "X", 5), ("C", "X", 5), ("D", "Y", 0), ("E", "Y", 0), ("F", "Y", 5)]);
        state.player_mut("X").unwrap().reinforcements = 0;
        let (c, d, e) = (id(&state, "C"), id(&state, "D"), id(&state, "E"));
        scripted_round(
            &mut state,
            &[(
                "X",
                vec![
                    Action::Issue(Order::Advance { source: c, target: d, armies: 3 }),
                    Action::Issue(Order::Advance { source: d, target: e, armies: 1 }),
                ],
            )],
        );
        advance(&mut state);
        assert!(state.map.country(d).unwrap().is_owned_by("X"));
        assert!(state.map.country(e).unwrap().is_owned_by("X"));
        assert_eq!(state.player("X").unwrap().cards.len(), 1);
    }

    #[test]
    fn test_truce_lasts_until_next_issue_phase() {
        let mut state = rigged(&[("A", "X", 5), ("B", "X", 5), ("C", "X", 5), ("D", "Y", 5), ("E", "Y", 5), ("F", "Y", 5)]);
        state.player_mut("X").unwrap().cards = vec![Card::Negotiate];
        let (c, d) = (id(&state, "C"), id(&state, "D"));
        scripted_round(
            &mut state,
            &[
                ("X", vec![Action::Issue(Order::Negotiate { player: "Y".into() })]),
                ("Y", vec![Action::Issue(Order::Advance { source: d, target: c, armies: 5 })]),
            ],
        );
        // X's negotiate runs before Y's attack in the round-robin drain
        advance(&mut state);
        assert!(state.map.country(c).unwrap().is_owned_by("X"));
        assert_eq!(state.map.country(c).unwrap().armies, 5);
        assert!(state.log.iter().any(|e| e.is_error() && e.text.contains("truce")));
        // New IssueOrder phase: the truce is gone
        assert_eq!(state.phase, Phase::IssueOrder);
        assert!(!state.player("X").unwrap().has_truce_with("Y"));
        assert!(!state.player("Y").unwrap().has_truce_with("X"));
    }

    #[test]
    fn test_truce_binds_both_sides() {
        let mut state = rigged(&[("A", "X", 5), ("B", "X", 5), ("C", "X", 5), ("D", "Y", 5), ("E", "Y", 5), ("F", "Y", 5)]);
        state.player_mut("X").unwrap().cards = vec![Card::Negotiate, Card::Bomb];
        state.player_mut("Y").unwrap().cards = vec![Card::Bomb];
        let (c, d) = (id(&state, "C"), id(&state, "D"));
        scripted_round(
            &mut state,
            &[
                (
                    "X",
                    vec![
                        Action::Issue(Order::Negotiate { player: "Y".into() }),
                        Action::Issue(Order::Advance { source: c, target: d, armies: 5 }),
                        Action::Issue(Order::Bomb { target: d }),
                    ],
                ),
                ("Y", vec![Action::Issue(Order::Bomb { target: c })]),
            ],
        );
        // Drain: X negotiate, Y bomb, X advance, X bomb
        advance(&mut state);
        assert!(state.map.country(c).unwrap().is_owned_by("X"));
        assert!(state.map.country(d).unwrap().is_owned_by("Y"));
        assert_eq!(state.map.country(c).unwrap().armies, 5);
        assert_eq!(state.map.country(d).unwrap().armies, 5);
        let refused = state.log.iter().filter(|e| e.is_error() && e.text.contains("truce")).count();
        assert_eq!(refused, 3);
    }

    #[test]
    fn test_cheat_conquers_and_doubles() {
        let mut state = rigged(&[("A", "X", 2), ("B", "X", 2), ("C", "X", 3), ("D", "Y", 4), ("E", "Y", 1), ("F", "Y", 1)]);
        advance(&mut state);
        assert_eq!(state.pending.as_ref().unwrap().player(), "X");
        apply_action(&mut state, Action::Cheat);

        let d = id(&state, "D");
        assert!(state.map.country(d).unwrap().is_owned_by("X"));
        // Conquered armies stay put, then D doubles as it borders E and F
        assert_eq!(state.map.country(d).unwrap().armies, 8);
        // C no longer borders an enemy
        assert_eq!(state.map.country(id(&state, "C")).unwrap().armies, 3);
        assert!(state.player("X").unwrap().done);
        assert!(state.player("X").unwrap().cards.is_empty());
    }

    #[test]
    fn test_cheat_wins_when_board_is_taken() {
        let mut state = rigged(&[("A", "X", 1), ("B", "X", 1), ("C", "X", 1), ("D", "X", 1), ("E", "Y", 1), ("F", "X", 1)]);
        advance(&mut state);
        while let Some(p) = state.pending.clone() {
            let action = if p.player() == "X" { Action::Cheat } else { Action::Done };
            apply_action(&mut state, action);
            advance(&mut state);
        }
        assert_eq!(state.winner.as_deref(), Some("X"));
        assert!(state.player("Y").unwrap().eliminated);
    }

    #[test]
    fn test_blockade_neutral_counts_toward_win() {
        let mut state = rigged(&[("A", "X", 1), ("B", "X", 1), ("C", "X", 4), ("D", "X", 1), ("E", "X", 1), ("F", "Y", 0)]);
        state.player_mut("X").unwrap().cards = vec![Card::Blockade];
        let (a, e, f) = (id(&state, "A"), id(&state, "E"), id(&state, "F"));
        scripted_round(
            &mut state,
            &[(
                "X",
                vec![
                    Action::Issue(Order::Blockade { target: a }),
                    Action::Issue(Order::Advance { source: e, target: f, armies: 1 }),
                ],
            )],
        );
        advance(&mut state);
        assert!(state.is_over());
        assert_eq!(state.winner.as_deref(), Some("X"));
        assert!(state.map.country(a).unwrap().is_owned_by(NEUTRAL));
    }

    // ── Persistence ──────────────────────────────────────────────────────

    #[test]
    fn test_json_round_trip_mid_game() {
        let mut state = create_initial_state(builtin("classic").unwrap(), &roster(&["Ann", "Bob"]), Rules::default(), 8)
            .unwrap();
        advance(&mut state);
        let player = state.pending.as_ref().unwrap().player().to_string();
        let target = *state.player(&player).unwrap().countries.iter().next().unwrap();
        apply_action(&mut state, Action::Issue(Order::Deploy { target, armies: 1 }));
        advance(&mut state);

        let json = state.to_json().unwrap();
        let restored = GameState::from_json(&json).unwrap();
        assert_eq!(restored, state);
    }

    // ── Connectivity property ────────────────────────────────────────────

    mod connectivity {
        use crate::map::{CountryId, MapGraph};
        use proptest::prelude::*;

        fn graph(n: usize, continents: usize, edges: &[(usize, usize)]) -> MapGraph {
            let mut map = MapGraph::new("generated");
            for k in 0..continents {
                map.add_continent(&format!("K{}", k), 1).unwrap();
            }
            let ids: Vec<CountryId> = (0..n)
                .map(|i| map.add_country(&format!("c{}", i), &format!("K{}", i % continents)).unwrap())
                .collect();
            for &(a, b) in edges {
                if a % n != b % n {
                    map.connect(ids[a % n], ids[b % n]).unwrap();
                }
            }
            map
        }

        proptest! {
            #[test]
            fn verdict_does_not_depend_on_start(
                n in 1usize..10,
                continents in 1usize..4,
                edges in prop::collection::vec((0usize..10, 0usize..10), 0..25),
            ) {
                let continents = continents.min(n);
                let map = graph(n, continents, &edges);
                let verdict = map.validate().is_ok();
                for c in map.countries() {
                    prop_assert_eq!(map.validate_from(c.id).is_ok(), verdict);
                }
            }

            #[test]
            fn chain_is_always_valid(n in 1usize..12) {
                let edges: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
                let map = graph(n, 1, &edges);
                prop_assert!(map.validate().is_ok());
            }
        }
    }
}
