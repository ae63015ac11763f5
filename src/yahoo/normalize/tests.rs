//! Unit tests for the response normalizer

use super::*;
use crate::testing::{
    matchup, player_fragments, roster_payload, scoreboard_payload, team_fragments,
    team_stats_payload, teams_page,
};
use serde_json::json;

const LEAGUE: &str = "428.l.1";
const T1: &str = "428.l.1.t.1";
const T2: &str = "428.l.1.t.2";

fn categories() -> Categories {
    Categories::new([
        (StatId::new(9004003), StatKind::Fraction),
        (StatId::new(5), StatKind::Percentage),
        (StatId::new(12), StatKind::Standard),
        (StatId::new(19), StatKind::Inverse),
    ])
}

fn tk(key: &str) -> TeamKey {
    key.parse().unwrap()
}

#[cfg(test)]
mod team_tests {
    use super::*;

    #[test]
    fn test_teams_from_fragments() {
        let payload = teams_page(
            LEAGUE,
            &[team_fragments(T1, "Dunkers", 5, 2), team_fragments(T2, "Bricks", 2, 5)],
            Some(2),
        );

        let out = normalize_teams(&payload);
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.entities.len(), 2);

        let first = &out.entities[0];
        assert_eq!(first.team_key, tk(T1));
        assert_eq!(first.name, "Dunkers");
        assert_eq!(first.managers, vec!["Dunkers GM".to_string()]);
        assert_eq!(first.standing.wins, 5);
        assert_eq!(first.standing.losses, 2);
        assert_eq!(first.standing.rank, 1);
        assert_eq!(out.entities[1].team_key, tk(T2));
    }

    #[test]
    fn test_team_optional_fields_default() {
        let payload = json!({"teams": {"team": {"team_key": T1, "name": "Bare"}}});

        let out = normalize_teams(&payload);
        let team = &out.entities[0];
        assert!(team.managers.is_empty());
        assert_eq!(team.standing, Standing::default());
    }

    #[test]
    fn test_single_team_with_multi_key_tail() {
        let payload = json!({"teams": {"team": [
            [{"team_key": T1}, {"name": "Solo"}],
            {
                "team_points": {"coverage_type": "week", "week": "1", "total": "6"},
                "team_standings": {"rank": 3, "outcome_totals": {"wins": 4, "losses": 1, "ties": 0}}
            }
        ]}});

        let out = normalize_teams(&payload);
        assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.entities[0].standing.rank, 3);
        assert_eq!(out.entities[0].standing.wins, 4);
    }

    #[test]
    fn test_team_without_name_is_malformed() {
        let payload = json!({"teams": {
            "0": {"team": [[{"team_key": T1}]]},
            "1": {"team": [[{"team_key": T2}, {"name": "Kept"}]]},
            "count": 2
        }});

        let out = normalize_teams(&payload);
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.entities[0].name, "Kept");
        match &out.diagnostics[..] {
            [Diagnostic::MalformedEntity {
                kind: EntityKind::Team,
                index: 0,
                ..
            }] => (),
            other => panic!("Expected one MalformedEntity, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod player_tests {
    use super::*;

    #[test]
    fn test_malformed_player_isolated_within_page() {
        let mut players: Vec<Value> = (1..=10)
            .map(|i| player_fragments(&format!("428.p.{}", 5000 + i), &format!("Player {}", i), &["PG"], None))
            .collect();
        players[6] = json!([[{"player_id": "5007"}, {"name": {"full": "No Key"}}]]);

        let payload = json!({"fantasy_content": {"league": [
            {"league_key": LEAGUE},
            {"players": players.iter().enumerate().fold(
                serde_json::Map::new(),
                |mut m, (i, p)| { m.insert(i.to_string(), json!({"player": p})); m }
            )}
        ]}});

        let out = normalize_players(&payload);
        assert_eq!(out.entities.len(), 9);
        assert_eq!(out.diagnostics.len(), 1);
        match &out.diagnostics[0] {
            Diagnostic::MalformedEntity { kind, index, .. } => {
                assert_eq!(*kind, EntityKind::Player);
                assert_eq!(*index, 6);
            }
            other => panic!("Expected MalformedEntity, got {:?}", other),
        }
        // Order follows the payload.
        assert_eq!(out.entities[6].name, "Player 8");
    }

    #[test]
    fn test_player_fields_and_defaults() {
        let payload = roster_payload(
            T1,
            1,
            &[
                player_fragments("428.p.6583", "Luka Doncic", &["PG", "SG", "G", "Util"], Some("PG")),
                json!([[{"player_key": "428.p.1"}, {"name": {"full": "Plain Player"}}]]),
            ],
        );

        let out = normalize_players(&payload);
        assert_eq!(out.entities.len(), 2);

        let luka = &out.entities[0];
        assert_eq!(luka.pro_team, "BOS");
        assert!(luka.eligible_positions.contains(&Position::G));
        assert_eq!(luka.eligible_positions.len(), 4);
        assert_eq!(luka.status, PlayerStatus::Active);

        let plain = &out.entities[1];
        assert_eq!(plain.pro_team, UNKNOWN);
        assert_eq!(plain.display_position, UNKNOWN);
        assert!(plain.eligible_positions.is_empty());
        assert!(!plain.undroppable);
    }

    #[test]
    fn test_single_position_object_shape() {
        let payload = json!({"player": {
            "player_key": "428.p.2",
            "name": {"full": "Big Man"},
            "status": "INJ",
            "eligible_positions": {"position": "C"}
        }});

        let out = normalize_players(&payload);
        let player = &out.entities[0];
        assert_eq!(player.status, PlayerStatus::Injured);
        assert_eq!(
            player.eligible_positions.iter().cloned().collect::<Vec<_>>(),
            vec![Position::C]
        );
    }
}

#[cfg(test)]
mod roster_tests {
    use super::*;

    #[test]
    fn test_roster_keyed_and_fragment_shapes_agree() {
        let fragments = roster_payload(
            T1,
            3,
            &[
                player_fragments("428.p.1", "A", &["PG"], Some("PG")),
                player_fragments("428.p.2", "B", &["C"], Some("BN")),
            ],
        );
        let keyed = json!({"team": {
            "team_key": T1,
            "name": "Roster Team",
            "roster": {
                "coverage_type": "week",
                "week": 3,
                "players": {"player": [
                    {"player_key": "428.p.1", "name": {"full": "A"}, "selected_position": {"position": "PG"}},
                    {"player_key": "428.p.2", "name": {"full": "B"}, "selected_position": {"position": "BN"}}
                ]}
            }
        }});

        let a = normalize_rosters(&fragments);
        let b = normalize_rosters(&keyed);
        assert!(a.diagnostics.is_empty());
        assert_eq!(a.entities, b.entities);

        let roster = &a.entities[0];
        assert_eq!(roster.period, Period::Week(Week::new(3)));
        assert_eq!(roster.slots.len(), 2);
        assert_eq!(roster.slots[1].slot, Position::BN);
    }

    #[test]
    fn test_roster_slot_without_position_is_dropped() {
        let payload = roster_payload(
            T1,
            1,
            &[
                player_fragments("428.p.1", "A", &["PG"], Some("PG")),
                player_fragments("428.p.2", "B", &["C"], None),
            ],
        );

        let out = normalize_rosters(&payload);
        assert_eq!(out.entities[0].slots.len(), 1);
        match &out.diagnostics[..] {
            [Diagnostic::MalformedEntity {
                kind: EntityKind::Roster,
                index: 0,
                reason,
            }] => assert!(reason.contains("slot 1"), "{}", reason),
            other => panic!("Expected one MalformedEntity, got {:?}", other),
        }
    }

    #[test]
    fn test_roster_without_coverage_is_malformed() {
        let payload = json!({"team": [[{"team_key": T1}], {"roster": {"0": {"players": []}}}]});

        let out = normalize_rosters(&payload);
        assert!(out.entities.is_empty());
        assert_eq!(out.diagnostics.len(), 1);
    }
}

#[cfg(test)]
mod stat_tests {
    use super::*;

    #[test]
    fn test_stat_line_values_and_fractions() {
        let payload = team_stats_payload(
            T1,
            2,
            &[(9004003, "301/640"), (5, ".470"), (12, "812"), (19, "101")],
            38,
        );

        let out = normalize_stat_lines(&payload, &categories());
        assert!(out.diagnostics.is_empty());

        let line = &out.entities[0];
        assert_eq!(line.subject, Subject::Team(tk(T1)));
        assert_eq!(line.period, Period::Week(Week::new(2)));
        assert_eq!(line.games_played, 38);
        assert_eq!(line.values[&StatId::new(5)], 0.47);
        assert_eq!(line.values[&StatId::new(12)], 812.0);
        assert_eq!(
            line.fractions[&StatId::new(9004003)],
            Fraction {
                made: 301.0,
                attempted: 640.0
            }
        );
        assert!(!line.values.contains_key(&StatId::new(9004003)));
    }

    #[test]
    fn test_empty_markers_are_not_zero() {
        let payload = team_stats_payload(T1, 1, &[(9004003, "-/-"), (5, "-"), (12, "")], 0);

        let out = normalize_stat_lines(&payload, &categories());
        let line = &out.entities[0];
        assert!(out.diagnostics.is_empty());
        assert!(line.values.is_empty());
        assert_eq!(line.fractions[&StatId::new(9004003)], Fraction::default());
    }

    #[test]
    fn test_unparseable_stat_recorded_and_excluded() {
        let payload = team_stats_payload(T1, 1, &[(12, "1,234"), (19, "NaN"), (5, "0.5")], 0);

        let out = normalize_stat_lines(&payload, &categories());
        let line = &out.entities[0];
        assert_eq!(line.values.len(), 1);
        assert_eq!(out.diagnostics.len(), 2);
        match &out.diagnostics[0] {
            Diagnostic::UnparseableStat { stat_id, raw, .. } => {
                assert_eq!(*stat_id, StatId::new(12));
                assert_eq!(raw, "1,234");
            }
            other => panic!("Expected UnparseableStat, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_dropped_with_diagnostic() {
        let payload = team_stats_payload(T1, 1, &[(12, "100"), (999, "3")], 0);

        let out = normalize_stat_lines(&payload, &categories());
        assert_eq!(out.entities[0].values.len(), 1);
        match &out.diagnostics[..] {
            [Diagnostic::UnknownCategory { stat_id, .. }] => assert_eq!(*stat_id, StatId::new(999)),
            other => panic!("Expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_stat_values_accepted() {
        let payload = json!({"team": [
            [{"team_key": T1}],
            {"team_stats": {"coverage_type": "week", "week": 4, "stats": {"stat": [
                {"stat_id": 12, "value": 99},
                {"stat_id": 5, "value": 0.5}
            ]}}}
        ]});

        let out = normalize_stat_lines(&payload, &categories());
        let line = &out.entities[0];
        assert_eq!(line.values[&StatId::new(12)], 99.0);
        assert_eq!(line.values[&StatId::new(5)], 0.5);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let payload = team_stats_payload(T1, 1, &[(12, "100"), (5, ".455")], 3);

        let a = serde_json::to_string(&normalize(&payload, EntityKind::StatLine, &categories()).entities)
            .unwrap();
        let b = serde_json::to_string(&normalize(&payload, EntityKind::StatLine, &categories()).entities)
            .unwrap();
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod matchup_tests {
    use super::*;

    #[test]
    fn test_completed_matchups_only() {
        let payload = scoreboard_payload(
            LEAGUE,
            3,
            &[
                matchup(3, "postevent", (T1, &[(12, "800")]), (T2, &[(12, "760")]), Some(T1)),
                matchup(3, "midevent", (T1, &[]), (T2, &[]), Some(T2)),
            ],
        );

        let out = normalize_matchups(&payload, &categories());
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.skipped, 1);

        let m = &out.entities[0];
        assert_eq!(m.week, Week::new(3));
        assert_eq!(m.outcome, MatchupOutcome::Winner(tk(T1)));
        assert_eq!(m.sides[0].totals[&StatId::new(12)], 800.0);
        assert_eq!(m.sides[1].team_key, tk(T2));
    }

    #[test]
    fn test_tied_matchup() {
        let payload = scoreboard_payload(
            LEAGUE,
            2,
            &[matchup(2, "postevent", (T1, &[]), (T2, &[]), None)],
        );

        let out = normalize_matchups(&payload, &categories());
        assert_eq!(out.entities[0].outcome, MatchupOutcome::Tie);
    }

    #[test]
    fn test_matchup_with_foreign_winner_is_malformed() {
        let payload = scoreboard_payload(
            LEAGUE,
            2,
            &[matchup(2, "postevent", (T1, &[]), (T2, &[]), Some("428.l.1.t.9"))],
        );

        let out = normalize_matchups(&payload, &categories());
        assert!(out.entities.is_empty());
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn test_matchup_with_one_team_is_malformed() {
        let payload = json!({"matchups": {"matchup": {
            "week": "1",
            "status": "postevent",
            "winner_team_key": T1,
            "teams": {"team": [[{"team_key": T1}]]}
        }}});

        let out = normalize_matchups(&payload, &categories());
        assert!(out.entities.is_empty());
        match &out.diagnostics[..] {
            [Diagnostic::MalformedEntity {
                kind: EntityKind::Matchup,
                ..
            }] => (),
            other => panic!("Expected MalformedEntity, got {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_normalize_dispatch() {
        let payload = scoreboard_payload(
            LEAGUE,
            1,
            &[matchup(1, "postevent", (T1, &[]), (T2, &[]), Some(T2))],
        );

        let out = normalize(&payload, EntityKind::Matchup, &categories());
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.entities[0].kind(), EntityKind::Matchup);
        assert_eq!(out.entities[0].key(), "w001:428.l.1.t.1|428.l.1.t.2");
    }
}
