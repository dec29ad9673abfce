// ═══════════════════════════════════════════════════════════════════════
// Comprehensive test suite for the conquest engine
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::bonus;
    use crate::cards::{self, find_tris};
    use crate::combat::{ScriptedDice, SeededDice};
    use crate::config::{GameConfig, RuleSet};
    use crate::engine::{Engine, GameAction};
    use crate::error::{EngineError, Missing, Rejection};
    use crate::events::GameEvent;
    use crate::map::{world_board, Board, BoardBuilder};
    use crate::objective::Objective;
    use crate::types::*;
    use crate::visibility::player_view;

    const P0: PlayerId = PlayerId(0);
    const P1: PlayerId = PlayerId(1);
    const P2: PlayerId = PlayerId(2);

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Two continents: North {a, b, c} worth 2, South {d, e} worth 1.
    /// Borders form a chain a-b-c-d-e, so a and c are not adjacent.
    fn mini_board() -> Board {
        BoardBuilder::new()
            .continent("North", 2, &["a", "b", "c"])
            .continent("South", 1, &["d", "e"])
            .border("a", "b")
            .border("b", "c")
            .border("c", "d")
            .border("d", "e")
            .build()
            .unwrap()
    }

    fn unreachable_objective() -> Objective {
        Objective::ConquerTerritories { count: 999, min_troops: 1 }
    }

    /// A main-phase state with explicit holdings and bonus troops per seat.
    /// P0 is the current player on turn 1.
    fn state_on(board: Board, holdings: &[(&str, u8, u32)], bonuses: &[u32]) -> GameState {
        let updates: Vec<_> = holdings
            .iter()
            .map(|&(name, owner, troops)| {
                let mut t = board.territory(name).unwrap().clone();
                t.owner = Some(PlayerId(owner));
                t.troops = troops;
                t
            })
            .collect();
        let board = board.with_territories(updates).unwrap();

        let players: Vec<PlayerState> = bonuses
            .iter()
            .enumerate()
            .map(|(i, &bonus)| {
                let player = Player {
                    id: PlayerId(i as u8),
                    name: format!("Player {i}"),
                    color: Color::ALL[i],
                    kind: PlayerKind::Bot,
                };
                PlayerState::new(player, bonus, unreachable_objective())
            })
            .collect();
        let order = players.iter().map(PlayerState::id).collect();

        GameState {
            deck: cards::territory_deck(&board),
            board,
            players,
            turn: TurnManager {
                order,
                current: 0,
                phase: Phase::Main,
                turn_number: 1,
            },
            trades_completed: 0,
            winner: None,
        }
    }

    fn mini_state(holdings: &[(&str, u8, u32)], bonuses: &[u32]) -> GameState {
        state_on(mini_board(), holdings, bonuses)
    }

    fn scripted(state: GameState, faces: Vec<u8>) -> Engine<ScriptedDice> {
        Engine::from_state(state, RuleSet::default(), ScriptedDice::new(faces))
    }

    fn troops(engine: &Engine<ScriptedDice>, name: &str) -> u32 {
        engine.game_state().board.territory(name).unwrap().troops
    }

    fn owner(engine: &Engine<ScriptedDice>, name: &str) -> Option<PlayerId> {
        engine.game_state().board.territory(name).unwrap().owner
    }

    fn player(engine: &Engine<ScriptedDice>, id: PlayerId) -> &PlayerState {
        engine.game_state().player(id).unwrap()
    }

    fn card(name: &str, symbol: Symbol) -> TerritoryCard {
        TerritoryCard { territory: name.into(), symbol }
    }

    fn place(p: PlayerId, troops: u32, territory: &str) -> GameAction {
        GameAction::PlaceTroops { player: p, troops, territory: territory.into() }
    }

    fn reinforce(p: PlayerId, from: &str, to: &str, troops: u32) -> GameAction {
        GameAction::Reinforce { player: p, from: from.into(), to: to.into(), troops }
    }

    fn attack(p: PlayerId, defender: PlayerId, from: &str, to: &str, troops: u32) -> GameAction {
        GameAction::Attack {
            player: p,
            defender,
            from: from.into(),
            to: to.into(),
            troops,
        }
    }

    fn trade(p: PlayerId, names: &[&str]) -> GameAction {
        GameAction::TradeCards {
            player: p,
            cards: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Assert `action` is rejected with `expected` and leaves no trace.
    fn assert_rejected(engine: &mut Engine<ScriptedDice>, action: GameAction, expected: EngineError) {
        let before = engine.game_state().clone();
        let flag = engine.territory_conquered_this_turn();
        assert_eq!(engine.process_action(action), Err(expected));
        assert_eq!(engine.game_state(), &before);
        assert_eq!(engine.territory_conquered_this_turn(), flag);
    }

    // ── PlaceTroops ──────────────────────────────────────────────────────

    #[test]
    fn test_place_troops_scenario() {
        let state = mini_state(&[("a", 0, 3), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[5, 0]);
        let mut engine = scripted(state, vec![]);

        let next = engine.process_action(place(P0, 3, "a")).unwrap();
        assert_eq!(next.board.territory("a").unwrap().troops, 6);
        assert_eq!(next.player(P0).unwrap().bonus_troops, 2);
        assert_eq!(engine.game_state(), &next);
        assert_eq!(
            engine.drain_events(),
            vec![GameEvent::TroopsPlaced { player: P0, territory: "a".into(), troops: 3 }]
        );
    }

    #[test]
    fn test_place_troops_rejections() {
        let state = mini_state(&[("a", 0, 3), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[5, 0]);
        let mut engine = scripted(state, vec![]);

        assert_rejected(&mut engine, place(P0, 0, "a"), Rejection::NonPositiveTroops.into());
        assert_rejected(
            &mut engine,
            place(P0, 6, "a"),
            Rejection::InsufficientBonus { player: P0, available: 5, requested: 6 }.into(),
        );
        assert_rejected(
            &mut engine,
            place(P0, 1, "b"),
            Rejection::NotOwner { player: P0, territory: "b".into() }.into(),
        );
        assert_rejected(&mut engine, place(P0, 1, "Atlantis"), Missing::Territory("Atlantis".into()).into());
        assert_rejected(&mut engine, place(PlayerId(9), 1, "a"), Missing::Player(PlayerId(9)).into());
        // Unknown players are reported before the troop count.
        assert_rejected(&mut engine, place(PlayerId(9), 0, "a"), Missing::Player(PlayerId(9)).into());
    }

    #[test]
    fn test_place_troops_on_unowned_territory() {
        let state = mini_state(&[("a", 0, 3), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1)], &[5, 0]);
        assert_eq!(state.board.territory("e").unwrap().owner, None);
        let mut engine = scripted(state, vec![]);

        assert_rejected(
            &mut engine,
            place(P0, 1, "e"),
            Rejection::NotOwner { player: P0, territory: "e".into() }.into(),
        );
    }

    #[test]
    fn test_nine_territories_scenario() {
        let p1_names = [
            "Alaska", "Peru", "Iceland", "Egypt", "Ural", "Siberia", "Indonesia", "Quebec", "Congo",
        ];
        let board = world_board();
        let holdings: Vec<(&str, u8, u32)> = board
            .territory_names()
            .map(|n| (n, if p1_names.contains(&n) { 1 } else { 0 }, 1))
            .collect();
        let state = state_on(board.clone(), &holdings, &[0, 0]);
        let mut engine = scripted(state, vec![]);

        engine.process_action(GameAction::EndTurn).unwrap();
        assert_eq!(engine.game_state().current_player(), P1);
        assert_eq!(player(&engine, P1).bonus_troops, 3);

        engine.process_action(place(P1, 1, "Peru")).unwrap();
        assert_eq!(player(&engine, P1).bonus_troops, 2);
        assert_eq!(troops(&engine, "Peru"), 2);
    }

    // ── Reinforce ────────────────────────────────────────────────────────

    #[test]
    fn test_reinforce_repeatable_scenario() {
        let state = mini_state(&[("a", 0, 4), ("b", 0, 2), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        let mut engine = scripted(state, vec![]);

        engine.process_action(reinforce(P0, "a", "b", 1)).unwrap();
        engine.process_action(reinforce(P0, "a", "b", 1)).unwrap();
        assert_eq!(troops(&engine, "a"), 2);
        assert_eq!(troops(&engine, "b"), 4);
    }

    #[test]
    fn test_reinforce_rejections() {
        let state = mini_state(&[("a", 0, 4), ("b", 0, 2), ("c", 0, 3), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        let mut engine = scripted(state, vec![]);

        // a and c are both ours but do not touch.
        assert_rejected(
            &mut engine,
            reinforce(P0, "a", "c", 1),
            Rejection::NotAdjacent { from: "a".into(), to: "c".into() }.into(),
        );
        assert_rejected(
            &mut engine,
            reinforce(P0, "b", "a", 2),
            Rejection::InsufficientTroops { territory: "b".into(), available: 2, requested: 2 }.into(),
        );
        assert_rejected(
            &mut engine,
            reinforce(P0, "c", "d", 1),
            Rejection::NotOwner { player: P0, territory: "d".into() }.into(),
        );
        assert_rejected(&mut engine, reinforce(P0, "a", "b", 0), Rejection::NonPositiveTroops.into());
        assert_rejected(&mut engine, reinforce(P0, "a", "zz", 1), Missing::Territory("zz".into()).into());
    }

    #[test]
    fn test_reinforce_non_adjacent_fails_for_any_owner() {
        let state = mini_state(&[("a", 1, 4), ("b", 0, 2), ("c", 1, 3), ("d", 1, 1), ("e", 0, 1)], &[0, 0]);
        let mut engine = scripted(state, vec![]);
        assert_rejected(
            &mut engine,
            reinforce(P1, "a", "c", 1),
            Rejection::NotAdjacent { from: "a".into(), to: "c".into() }.into(),
        );
    }

    // ── Attack ───────────────────────────────────────────────────────────

    #[test]
    fn test_attack_rejections() {
        let state = mini_state(&[("a", 0, 4), ("b", 1, 2), ("c", 1, 1), ("d", 0, 1), ("e", 0, 1)], &[0, 0]);
        let mut engine = scripted(state, vec![6]);

        assert_rejected(
            &mut engine,
            attack(P0, P1, "a", "b", 4),
            Rejection::InsufficientTroops { territory: "a".into(), available: 4, requested: 4 }.into(),
        );
        assert_rejected(&mut engine, attack(P0, P1, "a", "b", 0), Rejection::NonPositiveTroops.into());
        assert_rejected(&mut engine, attack(P0, P0, "d", "e", 1), Rejection::OwnTerritory("e".into()).into());
        assert_rejected(
            &mut engine,
            attack(P0, P0, "a", "b", 1),
            Rejection::DefenderMismatch { territory: "b".into(), claimed: P0 }.into(),
        );
        assert_rejected(
            &mut engine,
            attack(P0, P1, "a", "c", 1),
            Rejection::NotAdjacent { from: "a".into(), to: "c".into() }.into(),
        );
        assert_rejected(
            &mut engine,
            attack(P1, P0, "c", "d", 1),
            Rejection::InsufficientTroops { territory: "c".into(), available: 1, requested: 1 }.into(),
        );
        assert_rejected(&mut engine, attack(P0, PlayerId(7), "a", "b", 1), Missing::Player(PlayerId(7)).into());
    }

    #[test]
    fn test_attack_without_conquest() {
        let state = mini_state(&[("a", 0, 4), ("b", 1, 3), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        // Attacker 2,2,1 against defender 6,1: one loss each.
        let mut engine = scripted(state, vec![2, 2, 1, 6, 1]);

        engine.process_action(attack(P0, P1, "a", "b", 3)).unwrap();
        assert_eq!(troops(&engine, "a"), 3);
        assert_eq!(troops(&engine, "b"), 2);
        assert_eq!(owner(&engine, "b"), Some(P1));
        assert!(!engine.territory_conquered_this_turn());
    }

    #[test]
    fn test_attack_conquest_moves_survivors() {
        let state = mini_state(&[("a", 0, 4), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        let mut engine = scripted(state, vec![6, 6, 6, 1]);

        let next = engine.process_action(attack(P0, P1, "a", "b", 3)).unwrap();
        assert_eq!(next.board.territory("b").unwrap().owner, Some(P0));
        assert_eq!(next.board.territory("b").unwrap().troops, 3);
        assert_eq!(next.board.territory("a").unwrap().troops, 1);
        assert!(engine.territory_conquered_this_turn());

        let events = engine.drain_events();
        assert!(matches!(&events[0], GameEvent::Battle { report, .. } if report.conquered));
        assert_eq!(
            events[1],
            GameEvent::TerritoryConquered { player: P0, territory: "b".into(), from: P1, troops_moved: 3 }
        );
    }

    #[test]
    fn test_attack_loss_dice_consistency() {
        // Whatever the dice, losses match the report and ownership flips
        // only when the defender is wiped out.
        for seed in 0..30u64 {
            let state = mini_state(&[("a", 0, 6), ("b", 1, 2), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
            let mut engine = Engine::from_state(state, RuleSet::default(), SeededDice::new(seed));
            let next = engine.process_action(attack(P0, P1, "a", "b", 3)).unwrap();
            let report = engine
                .drain_events()
                .into_iter()
                .find_map(|e| match e {
                    GameEvent::Battle { report, .. } => Some(report),
                    _ => None,
                })
                .unwrap();
            let b = next.board.territory("b").unwrap();
            let a = next.board.territory("a").unwrap();
            assert_eq!(report.attacker_losses + report.defender_losses, 2);
            if report.conquered {
                assert_eq!(b.owner, Some(P0));
                assert_eq!(b.troops, 3 - report.attacker_losses);
                assert_eq!(a.troops, 3);
            } else {
                assert_eq!(b.owner, Some(P1));
                assert_eq!(b.troops, 2 - report.defender_losses);
                assert_eq!(a.troops, 6 - report.attacker_losses);
            }
            assert!(a.troops >= 1 && b.troops >= 1);
        }
    }

    #[test]
    fn test_elimination_transfers_cards_and_skips_seat() {
        let mut state = mini_state(&[("a", 0, 4), ("b", 1, 1), ("c", 2, 2), ("d", 2, 1), ("e", 0, 1)], &[0, 0, 0]);
        state.player_mut(P1).unwrap().cards = vec![card("d", Symbol::Infantry), card("e", Symbol::Cavalry)];
        let mut engine = scripted(state, vec![6]);

        engine.process_action(attack(P0, P1, "a", "b", 2)).unwrap();
        assert_eq!(player(&engine, P1).eliminated_by, Some(P0));
        assert!(player(&engine, P1).cards.is_empty());
        assert_eq!(player(&engine, P0).cards.len(), 2);

        assert_rejected(&mut engine, place(P1, 1, "b"), Rejection::PlayerEliminated(P1).into());

        engine.process_action(GameAction::EndTurn).unwrap();
        assert_eq!(engine.game_state().current_player(), P2);
        engine.process_action(GameAction::EndTurn).unwrap();
        assert_eq!(engine.game_state().current_player(), P0);
        assert_eq!(engine.game_state().active_players().count(), 2);
    }

    // ── Cards and EndTurn ────────────────────────────────────────────────

    #[test]
    fn test_conquest_draws_exactly_one_card() {
        let state = mini_state(&[("a", 0, 6), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        let deck_size = state.deck.len();
        let top = state.deck.last().cloned().unwrap();
        // Sixes everywhere: ties go to the attacker, so every attack conquers.
        let mut engine = scripted(state, vec![6]);

        engine.process_action(attack(P0, P1, "a", "b", 2)).unwrap();
        // Second conquest in the same turn still yields a single card.
        engine.process_action(attack(P0, P1, "b", "c", 1)).unwrap();
        engine.process_action(GameAction::EndTurn).unwrap();

        assert_eq!(player(&engine, P0).cards, vec![top]);
        assert_eq!(engine.game_state().deck.len(), deck_size - 1);
        assert!(!engine.territory_conquered_this_turn());

        // P1 conquers nothing and draws nothing.
        engine.process_action(GameAction::EndTurn).unwrap();
        assert!(player(&engine, P1).cards.is_empty());
    }

    #[test]
    fn test_off_turn_conquest_draws_no_card() {
        let state = mini_state(&[("a", 0, 1), ("b", 1, 3), ("c", 0, 1), ("d", 0, 1), ("e", 0, 1)], &[0, 0]);
        let deck_size = state.deck.len();
        let mut engine = scripted(state, vec![6]);

        // P0 is current; P1 attacks out of turn and takes "a".
        engine.process_action(attack(P1, P0, "b", "a", 2)).unwrap();
        assert_eq!(owner(&engine, "a"), Some(P1));
        assert!(!engine.territory_conquered_this_turn());

        engine.process_action(GameAction::EndTurn).unwrap();
        assert!(player(&engine, P0).cards.is_empty());
        assert!(player(&engine, P1).cards.is_empty());
        assert_eq!(engine.game_state().deck.len(), deck_size);
    }

    #[test]
    fn test_empty_deck_is_not_fatal() {
        let mut state = mini_state(&[("a", 0, 4), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        state.deck.clear();
        let mut engine = scripted(state, vec![6, 6, 6, 1]);

        engine.process_action(attack(P0, P1, "a", "b", 2)).unwrap();
        engine.process_action(GameAction::EndTurn).unwrap();
        assert!(player(&engine, P0).cards.is_empty());
        assert_eq!(engine.game_state().current_player(), P1);
    }

    #[test]
    fn test_end_turn_assigns_next_bonus_and_wraps() {
        // P1 holds all of South: 3 base + 1 continent.
        let state = mini_state(&[("a", 0, 1), ("b", 0, 1), ("c", 0, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        let mut engine = scripted(state, vec![]);

        let next = engine.process_action(GameAction::EndTurn).unwrap();
        assert_eq!(next.current_player(), P1);
        assert_eq!(next.turn.turn_number, 2);
        assert_eq!(next.player(P1).unwrap().bonus_troops, bonus::turn_bonus(&next.board, P1));
        assert_eq!(next.player(P1).unwrap().bonus_troops, 4);

        let next = engine.process_action(GameAction::EndTurn).unwrap();
        assert_eq!(next.current_player(), P0);
        assert_eq!(next.player(P0).unwrap().bonus_troops, 3 + 2);
    }

    #[test]
    fn test_trade_cards() {
        let mut state = mini_state(&[("a", 0, 2), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        state.deck.clear();
        state.player_mut(P0).unwrap().cards = vec![
            card("a", Symbol::Infantry),
            card("c", Symbol::Cavalry),
            card("d", Symbol::Artillery),
            card("e", Symbol::Infantry),
        ];
        let mut engine = scripted(state, vec![]);

        let next = engine.process_action(trade(P0, &["a", "c", "d"])).unwrap();
        let me = next.player(P0).unwrap();
        assert_eq!(me.bonus_troops, 4);
        assert_eq!(me.cards, vec![card("e", Symbol::Infantry)]);
        assert_eq!(next.trades_completed, 1);
        assert_eq!(next.deck.len(), 3);
        // Only "a" is ours: it gets the territory bonus directly.
        assert_eq!(next.board.territory("a").unwrap().troops, 4);
        assert_eq!(next.board.territory("c").unwrap().troops, 1);

        let events = engine.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::CardsTraded {
                player: P0,
                cards: vec!["a".into(), "c".into(), "d".into()],
                bonus: 4,
                territory_bonuses: vec![("a".into(), 2)],
            }]
        );
    }

    #[test]
    fn test_trade_values_escalate() {
        let mut state = mini_state(&[("a", 1, 1), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        state.player_mut(P0).unwrap().cards = vec![
            card("a", Symbol::Cavalry),
            card("b", Symbol::Cavalry),
            card("c", Symbol::Cavalry),
            card("d", Symbol::Artillery),
            card("e", Symbol::Artillery),
            card("x", Symbol::Artillery),
        ];
        let mut engine = scripted(state, vec![]);

        engine.process_action(trade(P0, &["a", "b", "c"])).unwrap();
        engine.process_action(trade(P0, &["d", "e", "x"])).unwrap();
        assert_eq!(player(&engine, P0).bonus_troops, 4 + 6);
        assert_eq!(engine.game_state().trades_completed, 2);
    }

    #[test]
    fn test_trade_rejections() {
        let mut state = mini_state(&[("a", 0, 2), ("b", 1, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        state.player_mut(P0).unwrap().cards = vec![
            card("a", Symbol::Infantry),
            card("b", Symbol::Infantry),
            card("c", Symbol::Cavalry),
        ];
        let mut engine = scripted(state, vec![]);

        assert_rejected(&mut engine, trade(P0, &["a", "b"]), Rejection::WrongCardCount(2).into());
        assert_rejected(&mut engine, trade(P0, &["a", "a", "b"]), Rejection::WrongCardCount(2).into());
        assert_rejected(&mut engine, trade(P0, &["a", "b", "c", "d"]), Rejection::WrongCardCount(4).into());
        assert_rejected(
            &mut engine,
            trade(P0, &["a", "b", "e"]),
            Rejection::CardNotHeld { player: P0, territory: "e".into() }.into(),
        );
        assert_rejected(&mut engine, trade(P0, &["a", "b", "c"]), Rejection::InvalidTris.into());
    }

    // ── Phases and turn order ────────────────────────────────────────────

    #[test]
    fn test_setup_phase_gating_and_transition() {
        let mut config = GameConfig::with_players(3, 11);
        config.rules.initial_troops = Some(20);
        let mut engine = Engine::new(&config).unwrap();

        // Keep objectives out of the way so the transition is observable.
        let mut state = engine.game_state().clone();
        for p in &mut state.players {
            p.objective = unreachable_objective();
        }
        engine.set_game_state(state);
        assert_eq!(engine.game_state().phase(), Phase::Setup);

        let mine = engine
            .game_state()
            .board
            .territories_owned_by(P0)
            .next()
            .unwrap()
            .name
            .clone();
        let err = engine.process_action(reinforce(P0, &mine, &mine, 1)).unwrap_err();
        assert_eq!(err, Rejection::WrongPhase(Phase::Setup).into());

        let mut steps = 0;
        while engine.game_state().phase() == Phase::Setup {
            steps += 1;
            assert!(steps < 20, "setup never completed");
            let state = engine.game_state();
            let current = state.current_player();
            let bonus = state.player(current).unwrap().bonus_troops;
            if bonus > 0 {
                let target = state.board.territories_owned_by(current).next().unwrap().name.clone();
                engine.process_action(place(current, bonus, &target)).unwrap();
            }
            engine.process_action(GameAction::EndTurn).unwrap();
        }

        let state = engine.game_state();
        assert_eq!(state.phase(), Phase::Main);
        assert_eq!(state.current_player(), P0);
        assert_eq!(state.turn.turn_number, 1);
        assert_eq!(state.player(P0).unwrap().bonus_troops, bonus::turn_bonus(&state.board, P0));
        assert!(engine
            .drain_events()
            .contains(&GameEvent::PhaseChanged { phase: Phase::Main }));
    }

    #[test]
    fn test_enforce_turn_order() {
        let state = mini_state(&[("a", 0, 1), ("b", 0, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[3, 3]);
        let rules = RuleSet { enforce_turn_order: true, ..RuleSet::default() };
        let mut engine = Engine::from_state(state, rules, ScriptedDice::new(vec![]));

        let err = engine.process_action(place(P1, 1, "c")).unwrap_err();
        assert_eq!(err, Rejection::NotYourTurn { player: P1, current: P0 }.into());
        engine.process_action(place(P0, 1, "a")).unwrap();

        // Default rules let anyone act.
        let state = mini_state(&[("a", 0, 1), ("b", 0, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[3, 3]);
        let mut lax = scripted(state, vec![]);
        lax.process_action(place(P1, 1, "c")).unwrap();
    }

    // ── Victory ──────────────────────────────────────────────────────────

    #[test]
    fn test_objective_met_ends_game() {
        let mut state = mini_state(&[("a", 0, 1), ("b", 0, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[0, 0]);
        state.player_mut(P0).unwrap().objective = Objective::ConquerTerritories { count: 2, min_troops: 1 };
        let mut engine = scripted(state, vec![]);

        let err = engine.process_action(GameAction::EndTurn).unwrap_err();
        assert_eq!(err, EngineError::GameOver { winner: P0 });
        assert!(err.is_terminal());
        assert_eq!(engine.winner(), Some(P0));
        // The turn advance was still applied before the win was detected.
        assert_eq!(engine.game_state().current_player(), P1);

        let frozen = engine.game_state().clone();
        for action in [place(P1, 1, "c"), GameAction::EndTurn] {
            assert_eq!(engine.process_action(action), Err(EngineError::GameOver { winner: P0 }));
            assert_eq!(engine.game_state(), &frozen);
        }
    }

    #[test]
    fn test_win_by_elimination_on_own_turn() {
        let mut state = mini_state(&[("a", 0, 4), ("b", 1, 1), ("c", 2, 1), ("d", 2, 1), ("e", 2, 1)], &[0, 0, 0]);
        state.player_mut(P0).unwrap().objective = Objective::EliminatePlayer { target: P1 };
        let mut engine = scripted(state, vec![6, 6, 6, 1]);

        // Objectives are only checked at EndTurn.
        engine.process_action(attack(P0, P1, "a", "b", 3)).unwrap();
        assert_eq!(engine.winner(), None);

        let err = engine.process_action(GameAction::EndTurn).unwrap_err();
        assert_eq!(err, EngineError::GameOver { winner: P0 });
        assert!(engine.drain_events().contains(&GameEvent::GameOver { winner: P0 }));
    }

    #[test]
    fn test_elimination_by_someone_else_falls_back() {
        let mut state = mini_state(&[("a", 0, 4), ("b", 1, 1), ("c", 2, 1), ("d", 2, 1), ("e", 2, 1)], &[0, 0, 0]);
        state.player_mut(P2).unwrap().objective = Objective::EliminatePlayer { target: P1 };
        let mut engine = scripted(state, vec![6, 6, 6, 1]);

        engine.process_action(attack(P0, P1, "a", "b", 3)).unwrap();
        // P2 now needs the territorial goal (2 of 5) and already holds 3.
        let err = engine.process_action(GameAction::EndTurn).unwrap_err();
        assert_eq!(err, EngineError::GameOver { winner: P2 });
    }

    // ── Visibility ───────────────────────────────────────────────────────

    #[test]
    fn test_player_view_hides_opponent_cards() {
        let mut state = mini_state(&[("a", 0, 1), ("b", 0, 1), ("c", 1, 1), ("d", 1, 1), ("e", 1, 1)], &[2, 0]);
        state.player_mut(P0).unwrap().cards = vec![card("a", Symbol::Infantry)];
        state.player_mut(P1).unwrap().cards = vec![card("c", Symbol::Cavalry), card("d", Symbol::Cavalry)];
        let rules = RuleSet::default();

        let view = player_view(&state, &rules, P0).unwrap();
        assert_eq!(view.my_cards, vec![card("a", Symbol::Infantry)]);
        assert_eq!(view.my_bonus_troops, 2);
        assert_eq!(view.info(P1).unwrap().cards_held, 2);
        assert_eq!(view.info(P1).unwrap().territories, 3);
        assert_eq!(view.next_trade_value, 4);
        assert!(view.is_my_turn());
        assert_eq!(view.my_territories().count(), 2);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("\"d\",\"symbol\":\"Cavalry\""));

        assert_eq!(player_view(&state, &rules, PlayerId(5)).unwrap_err(), Missing::Player(PlayerId(5)));
    }

    // ── Full games ───────────────────────────────────────────────────────

    /// One random but legal-leaning action for whoever is current.
    fn random_action(state: &GameState, rng: &mut impl rand::Rng) -> GameAction {
        use rand::seq::SliceRandom;

        let me = state.current_player();
        let ps = state.player(me).unwrap();
        let owned: Vec<&crate::map::Territory> = state.board.territories_owned_by(me).collect();

        if ps.bonus_troops > 0 {
            let target = owned.choose(rng).unwrap();
            return place(me, ps.bonus_troops, &target.name);
        }
        if state.phase() == Phase::Setup {
            return GameAction::EndTurn;
        }
        if let Some(set) = find_tris(&ps.cards) {
            let names: Vec<&str> = set.iter().map(|c| c.territory.as_str()).collect();
            return trade(me, &names);
        }
        if rng.gen_bool(0.8) {
            let options: Vec<(&str, &str, PlayerId, u32)> = owned
                .iter()
                .copied()
                .filter(|t| t.troops >= 2)
                .flat_map(|t| {
                    t.neighbors.iter().filter_map(move |n| {
                        let target = state.board.territory(n).ok()?;
                        let defender = target.owner.filter(|&o| o != me)?;
                        Some((t.name.as_str(), n.as_str(), defender, (t.troops - 1).min(3)))
                    })
                })
                .collect();
            if let Some(&(from, to, defender, troops)) = options.choose(rng) {
                return attack(me, defender, from, to, troops);
            }
        }
        GameAction::EndTurn
    }

    fn check_invariants(state: &GameState) {
        for t in state.board.territories() {
            assert!(t.owner.is_some(), "{} unowned", t.name);
            assert!(t.troops >= 1, "{} has no troops", t.name);
        }
        for p in &state.players {
            if p.is_eliminated() {
                assert_eq!(state.territory_count(p.id()), 0);
                assert!(p.cards.is_empty());
            }
        }
        let cards: usize = state.players.iter().map(|p| p.cards.len()).sum();
        assert_eq!(cards + state.deck.len(), state.board.len(), "cards leaked");
        assert!(state.turn.current < state.turn.order.len());
    }

    fn play_random_game(seed: u64, players: usize, max_actions: usize) -> (GameState, Option<PlayerId>) {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let mut engine = Engine::new(&GameConfig::with_players(players, seed)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_mul(7919));
        for _ in 0..max_actions {
            let action = random_action(engine.game_state(), &mut rng);
            match engine.process_action(action) {
                Ok(state) => check_invariants(&state),
                Err(EngineError::GameOver { winner }) => return (engine.game_state().clone(), Some(winner)),
                Err(e) => panic!("random agent issued an illegal action: {e}"),
            }
        }
        (engine.game_state().clone(), None)
    }

    #[test]
    fn test_random_games_keep_invariants() {
        for players in 2..=6 {
            let (state, winner) = play_random_game(players as u64, players, 3_000);
            check_invariants(&state);
            if let Some(w) = winner {
                assert_eq!(state.winner, Some(w));
                assert!(!state.player(w).unwrap().is_eliminated());
            }
        }
    }

    #[test]
    fn test_deterministic_game() {
        let (a, wa) = play_random_game(42, 4, 2_000);
        let (b, wb) = play_random_game(42, 4, 2_000);
        assert_eq!(a, b);
        assert_eq!(wa, wb);
    }

    #[test]
    fn test_state_serializes() {
        let engine = Engine::new(&GameConfig::with_players(3, 5)).unwrap();
        let json = serde_json::to_string(engine.game_state()).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, engine.game_state());
    }
}
