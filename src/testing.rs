//! Test doubles and payload builders shared by unit tests.

use reqwest::Method;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::core::session::{RawResponse, SessionProvider};
use crate::Result;

struct Route {
    pattern: String,
    responses: VecDeque<RawResponse>,
}

/// Session that answers from a script of canned responses.
///
/// A request is served by the first route whose pattern occurs in the URL.
/// Each route yields its responses in order and keeps repeating the last one.
/// Unmatched URLs get a 404.
pub struct ScriptedSession {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<String>>,
    pub accept_refresh: bool,
    pub refreshes: u32,
}

impl Default for ScriptedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            accept_refresh: true,
            refreshes: 0,
        }
    }

    /// Queue a response for URLs containing `pattern`.
    pub fn on(self, pattern: &str, status: u16, body: impl Into<String>) -> Self {
        let response = RawResponse::new(status, body);
        {
            let mut routes = self.routes.lock().unwrap();
            match routes.iter_mut().find(|r| r.pattern == pattern) {
                Some(route) => route.responses.push_back(response),
                None => routes.push(Route {
                    pattern: pattern.to_string(),
                    responses: VecDeque::from([response]),
                }),
            }
        }
        self
    }

    pub fn on_json(self, pattern: &str, body: &Value) -> Self {
        self.on(pattern, 200, body.to_string())
    }

    /// Append `other`'s routes after this session's, so ours take precedence.
    pub fn merge(self, other: ScriptedSession) -> Self {
        let theirs = other.routes.into_inner().unwrap();
        self.routes.lock().unwrap().extend(theirs);
        self
    }

    pub fn rejecting_refresh(mut self) -> Self {
        self.accept_refresh = false;
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, pattern: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.contains(pattern))
            .count()
    }
}

impl SessionProvider for ScriptedSession {
    async fn authorized_request(
        &self,
        _method: Method,
        url: &str,
        _params: &[(String, String)],
    ) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        let Some(route) = routes.iter_mut().find(|r| url.contains(&r.pattern)) else {
            return Ok(RawResponse::new(404, "no route"));
        };
        let response = if route.responses.len() > 1 {
            route.responses.pop_front()
        } else {
            route.responses.front().cloned()
        };
        Ok(response.unwrap_or_else(|| RawResponse::new(404, "no response")))
    }

    async fn refresh(&mut self) -> Result<bool> {
        self.refreshes += 1;
        Ok(self.accept_refresh)
    }
}

/// Team record in fragment form, as the teams collection returns it.
pub fn team_fragments(team_key: &str, name: &str, wins: u32, losses: u32) -> Value {
    let team_id = team_key.rsplit('.').next().unwrap_or("0");
    json!([
        [
            {"team_key": team_key},
            {"team_id": team_id},
            {"name": name},
            [],
            {"managers": [{"manager": {"manager_id": team_id, "nickname": format!("{} GM", name)}}]}
        ],
        {"team_standings": {
            "rank": team_id,
            "outcome_totals": {"wins": wins, "losses": losses, "ties": 0, "percentage": ".500"}
        }}
    ])
}

/// One page of the league teams collection.
pub fn teams_page(league_key: &str, teams: &[Value], total: Option<usize>) -> Value {
    let mut collection = serde_json::Map::new();
    for (i, team) in teams.iter().enumerate() {
        collection.insert(i.to_string(), json!({ "team": team }));
    }
    collection.insert("count".to_string(), json!(teams.len()));
    if let Some(total) = total {
        collection.insert("total".to_string(), json!(total));
    }
    json!({"fantasy_content": {"league": [
        {"league_key": league_key, "name": "Test League"},
        {"teams": collection}
    ]}})
}

/// Player record in fragment form with an optional roster slot.
pub fn player_fragments(player_key: &str, name: &str, positions: &[&str], slot: Option<&str>) -> Value {
    let eligible: Vec<Value> = positions.iter().map(|p| json!({"position": p})).collect();
    let mut record = json!([
        [
            {"player_key": player_key},
            {"player_id": player_key.rsplit('.').next().unwrap_or("0")},
            {"name": {"full": name, "first": name, "last": name}},
            {"editorial_team_abbr": "BOS"},
            {"display_position": positions.join(",")},
            {"eligible_positions": eligible},
            {"is_undroppable": "0"}
        ]
    ]);
    if let (Some(slot), Some(items)) = (slot, record.as_array_mut()) {
        items.push(json!({"selected_position": [
            {"coverage_type": "week"},
            {"week": "1"},
            {"position": slot}
        ]}));
    }
    record
}

/// Roster payload for one team and week.
pub fn roster_payload(team_key: &str, week: u16, players: &[Value]) -> Value {
    let mut collection = serde_json::Map::new();
    for (i, player) in players.iter().enumerate() {
        collection.insert(i.to_string(), json!({ "player": player }));
    }
    collection.insert("count".to_string(), json!(players.len()));
    json!({"fantasy_content": {"team": [
        [{"team_key": team_key}, {"name": "Roster Team"}],
        {"roster": {
            "coverage_type": "week",
            "week": week.to_string(),
            "is_editable": 0,
            "0": {"players": collection}
        }}
    ]}})
}

/// Stats array in the API's `{"stat": {...}}` form.
pub fn stats(values: &[(u32, &str)]) -> Value {
    Value::Array(
        values
            .iter()
            .map(|(id, v)| json!({"stat": {"stat_id": id.to_string(), "value": v}}))
            .collect(),
    )
}

/// Weekly team stats payload.
pub fn team_stats_payload(team_key: &str, week: u16, values: &[(u32, &str)], completed: u32) -> Value {
    json!({"fantasy_content": {"team": [
        [{"team_key": team_key}, {"name": "Stats Team"}],
        {
            "team_stats": {"coverage_type": "week", "week": week.to_string(), "stats": stats(values)},
            "team_remaining_games": {
                "coverage_type": "week",
                "week": week,
                "total": {"remaining_games": 0, "live_games": 0, "completed_games": completed}
            }
        }
    ]}})
}

/// One matchup record. `winner` of `None` marks a tie.
pub fn matchup(
    week: u16,
    status: &str,
    a: (&str, &[(u32, &str)]),
    b: (&str, &[(u32, &str)]),
    winner: Option<&str>,
) -> Value {
    let side = |key: &str, values: &[(u32, &str)]| {
        json!({"team": [
            [{"team_key": key}, {"name": "Side"}],
            {"team_stats": {"coverage_type": "week", "week": week.to_string(), "stats": stats(values)}}
        ]})
    };
    let tied = u8::from(winner.is_none());
    let mut record = json!({
        "week": week.to_string(),
        "status": status,
        "is_tied": tied,
        "0": {"teams": {"0": side(a.0, a.1), "1": side(b.0, b.1), "count": 2}}
    });
    if let (Some(w), Some(obj)) = (winner, record.as_object_mut()) {
        obj.insert("winner_team_key".to_string(), json!(w));
    }
    record
}

/// Scoreboard payload wrapping matchup records.
pub fn scoreboard_payload(league_key: &str, week: u16, matchups: &[Value]) -> Value {
    let mut collection = serde_json::Map::new();
    for (i, m) in matchups.iter().enumerate() {
        collection.insert(i.to_string(), json!({ "matchup": m }));
    }
    collection.insert("count".to_string(), json!(matchups.len()));
    json!({"fantasy_content": {"league": [
        {"league_key": league_key},
        {"scoreboard": {"week": week.to_string(), "0": {"matchups": collection}}}
    ]}})
}

/// League settings payload for a ten-team head-to-head league.
pub fn league_settings_payload(league_key: &str, scoring_type: &str) -> Value {
    json!({"fantasy_content": {"league": [
        {
            "league_key": league_key,
            "league_id": league_key.rsplit('.').next().unwrap_or("0"),
            "name": "Test League",
            "num_teams": 10,
            "scoring_type": scoring_type,
            "current_week": 3,
            "start_week": "1",
            "end_week": "20",
            "is_finished": 0,
            "season": "2023",
            "game_code": "nba"
        },
        {"settings": [{
            "playoff_start_week": "18",
            "uses_playoff": "1",
            "roster_positions": [
                {"roster_position": {"position": "PG", "count": 1}},
                {"roster_position": {"position": "SG", "count": 1}},
                {"roster_position": {"position": "Util", "count": 3}},
                {"roster_position": {"position": "BN", "count": 3}},
                {"roster_position": {"position": "IL", "count": 2}},
                {"roster_position": {"position": "IL+", "count": 1}}
            ],
            "stat_categories": {"stats": [
                {"stat": {"stat_id": 9004003, "enabled": "1", "display_name": "FGM/A", "sort_order": "1", "is_only_display_stat": "1"}},
                {"stat": {"stat_id": 5, "enabled": "1", "display_name": "FG%", "sort_order": "1"}},
                {"stat": {"stat_id": 12, "enabled": "1", "display_name": "PTS", "sort_order": "1"}},
                {"stat": {"stat_id": 19, "enabled": "1", "display_name": "TO", "sort_order": "0"}}
            ]}
        }]}
    ]}})
}
