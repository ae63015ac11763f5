//! Extraction run: fetch every league resource, normalize it, and upsert the
//! result into the entity store.
//!
//! Resources are extracted in dependency order (teams, then per week rosters,
//! team stats and the scoreboard) by a single sequential worker. A failing
//! resource is recorded in the [`RunManifest`] and the run moves on; only an
//! unrecoverable auth failure ends the run early.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::{
    cli::types::{Period, PlayerKey, TeamKey, Week},
    core::{entity_db_path, league_settings_path, SessionProvider},
    storage::EntityStore,
    yahoo::{
        endpoints::{EndpointClient, RawPayload, Resource, MAX_PAGE_SIZE},
        normalize::{
            normalize_matchups, normalize_players, normalize_rosters, normalize_stat_lines,
            normalize_teams, Categories, Diagnostic,
        },
        paginate::paginate,
        settings::load_or_fetch_league_settings,
        types::{LeagueSettings, Team},
    },
    LeagueContext, Result,
};

use super::{oauth_client, resolve_league_context, LeagueArgs};

/// How one resource fared.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResourceOutcome {
    Succeeded,
    /// Stored, but some records were skipped or some values dropped.
    Partial { diagnostics: Vec<Diagnostic> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceReport {
    pub resource: String,
    #[serde(flatten)]
    pub outcome: ResourceOutcome,
}

/// What a run extracted and whether every resource made it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunManifest {
    pub resources: Vec<ResourceReport>,
    pub complete: bool,
}

impl RunManifest {
    pub fn failed(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources
            .iter()
            .filter(|r| matches!(r.outcome, ResourceOutcome::Failed { .. }))
    }

    pub fn partial(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources
            .iter()
            .filter(|r| matches!(r.outcome, ResourceOutcome::Partial { .. }))
    }

    fn record(&mut self, resource: &Resource, outcome: ResourceOutcome) {
        match &outcome {
            ResourceOutcome::Succeeded => info!("{}: ok", resource),
            ResourceOutcome::Partial { diagnostics } => {
                info!("{}: stored with {} diagnostics", resource, diagnostics.len())
            }
            ResourceOutcome::Failed { error } => warn!("{}: failed: {}", resource, error),
        }
        self.resources.push(ResourceReport {
            resource: resource.to_string(),
            outcome,
        });
    }
}

/// Weeks with data: the season's first week through the current week, or
/// through the last week once the season is over.
pub fn weeks_to_extract(settings: &LeagueSettings) -> Vec<Week> {
    let last = if settings.is_finished {
        settings.end_week
    } else {
        settings.current_week.min(settings.end_week)
    };
    (settings.start_week.as_u16()..=last.as_u16())
        .map(Week::new)
        .collect()
}

/// Runs one extraction against one league.
pub struct Extractor<S> {
    client: EndpointClient<S>,
    store: EntityStore,
    ctx: LeagueContext,
    settings: LeagueSettings,
    categories: Categories,
    page_size: u32,
}

impl<S: SessionProvider> Extractor<S> {
    pub fn new(
        client: EndpointClient<S>,
        store: EntityStore,
        ctx: LeagueContext,
        settings: LeagueSettings,
    ) -> Self {
        let categories = Categories::from_settings(&settings);
        Self {
            client,
            store,
            ctx,
            settings,
            categories,
            page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn client(&self) -> &EndpointClient<S> {
        &self.client
    }

    pub fn into_store(self) -> EntityStore {
        self.store
    }

    /// Extract teams, then rosters, team stats and the scoreboard for each week.
    ///
    /// Returns `Err` only when the session cannot be renewed; every other
    /// failure is recorded against its resource.
    pub async fn run(&mut self, weeks: &[Week]) -> Result<RunManifest> {
        let mut manifest = RunManifest::default();
        info!(
            "Extracting {} for {} weeks",
            self.ctx.league_key(),
            weeks.len()
        );

        let teams = Resource::Teams(self.ctx.league_key());
        let outcome = settle(self.extract_teams(&teams).await)?;
        manifest.record(&teams, outcome);

        let team_keys: Vec<TeamKey> = self
            .store
            .all_as::<Team>()?
            .into_iter()
            .map(|t| t.team_key)
            .collect();
        let mut seen_players = BTreeSet::new();

        for &week in weeks {
            for team in &team_keys {
                let roster = Resource::Roster {
                    team: team.clone(),
                    week,
                };
                let outcome = settle(self.extract_roster(&roster, &mut seen_players).await)?;
                manifest.record(&roster, outcome);

                let stats = Resource::Stats {
                    team: team.clone(),
                    period: Period::Week(week),
                };
                let outcome = settle(self.extract_stats(&stats).await)?;
                manifest.record(&stats, outcome);
            }

            let scoreboard = Resource::Matchups {
                league: self.ctx.league_key(),
                week,
            };
            let outcome = settle(self.extract_matchups(&scoreboard).await)?;
            manifest.record(&scoreboard, outcome);
        }

        let complete = manifest.failed().next().is_none();
        manifest.complete = complete;
        info!(
            "Run finished: {} resources, {} partial, {} failed",
            manifest.resources.len(),
            manifest.partial().count(),
            manifest.failed().count()
        );
        Ok(manifest)
    }

    /// Pages are upserted as they arrive, so a later failure leaves earlier
    /// pages stored.
    async fn extract_teams(&mut self, resource: &Resource) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        let mut cursor = paginate(&mut self.client, resource.clone(), self.page_size)
            .with_expected_total(self.settings.num_teams as usize);

        while let Some(page) = cursor.next_page().await? {
            let teams = normalize_teams(&page.payload);
            self.store.upsert_all(&teams.entities)?;
            diagnostics.extend(teams.diagnostics);
        }
        Ok(diagnostics)
    }

    async fn fetch(&mut self, resource: &Resource) -> Result<RawPayload> {
        self.client.fetch_with_reauth(resource, None).await
    }

    async fn extract_roster(
        &mut self,
        resource: &Resource,
        seen_players: &mut BTreeSet<PlayerKey>,
    ) -> Result<Vec<Diagnostic>> {
        let payload = self.fetch(resource).await?;
        let rosters = normalize_rosters(&payload);
        let players = normalize_players(&payload);

        let new_players: Vec<_> = players
            .entities
            .into_iter()
            .filter(|p| seen_players.insert(p.player_key.clone()))
            .collect();
        self.store.upsert_all(&new_players)?;
        self.store.upsert_all(&rosters.entities)?;

        let mut diagnostics = rosters.diagnostics;
        diagnostics.extend(players.diagnostics);
        Ok(diagnostics)
    }

    async fn extract_stats(&mut self, resource: &Resource) -> Result<Vec<Diagnostic>> {
        let payload = self.fetch(resource).await?;
        let lines = normalize_stat_lines(&payload, &self.categories);
        self.store.upsert_all(&lines.entities)?;
        Ok(lines.diagnostics)
    }

    async fn extract_matchups(&mut self, resource: &Resource) -> Result<Vec<Diagnostic>> {
        let payload = self.fetch(resource).await?;
        let matchups = normalize_matchups(&payload, &self.categories);
        if matchups.skipped > 0 {
            info!("{}: {} matchups not yet final", resource, matchups.skipped);
        }
        self.store.upsert_all(&matchups.entities)?;
        Ok(matchups.diagnostics)
    }
}

/// Turn a resource result into its outcome, passing run-ending errors through.
fn settle(result: Result<Vec<Diagnostic>>) -> Result<ResourceOutcome> {
    match result {
        Ok(diagnostics) if diagnostics.is_empty() => Ok(ResourceOutcome::Succeeded),
        Ok(diagnostics) => Ok(ResourceOutcome::Partial { diagnostics }),
        Err(e) if e.is_fatal_for_run() => Err(e),
        Err(e) => Ok(ResourceOutcome::Failed {
            error: e.to_string(),
        }),
    }
}

/// Parameters for the extract command
#[derive(Debug, Clone)]
pub struct ExtractParams {
    pub league: LeagueArgs,
    pub through_week: Option<Week>,
    pub page_size: u32,
    pub max_attempts: Option<u32>,
    pub as_json: bool,
}

/// Handle the extract command: run into the on-disk store and print the manifest.
pub async fn handle_extract(params: ExtractParams) -> Result<()> {
    let ctx = resolve_league_context(&params.league)?;
    let league_key = ctx.league_key();
    let mut client = oauth_client(params.max_attempts)?;

    let settings =
        load_or_fetch_league_settings(&mut client, &ctx, false, &league_settings_path(&league_key))
            .await?;

    let mut weeks = weeks_to_extract(&settings);
    if let Some(through) = params.through_week {
        weeks.retain(|w| *w <= through);
    }

    let db_path = entity_db_path(&league_key);
    let store = EntityStore::open(&db_path)?;
    println!(
        "Extracting {} ({}) weeks {}",
        settings.name,
        league_key,
        describe_weeks(&weeks)
    );

    let mut extractor =
        Extractor::new(client, store, ctx, settings).with_page_size(params.page_size);
    let manifest = extractor.run(&weeks).await?;

    if params.as_json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    for report in &manifest.resources {
        match &report.outcome {
            ResourceOutcome::Succeeded => println!("  ✓ {}", report.resource),
            ResourceOutcome::Partial { diagnostics } => {
                println!("  ~ {} ({} diagnostics)", report.resource, diagnostics.len());
                for d in diagnostics {
                    println!("      {}", d);
                }
            }
            ResourceOutcome::Failed { error } => println!("  ✗ {}: {}", report.resource, error),
        }
    }
    if manifest.complete {
        println!("✓ Extraction complete. Store: {}", db_path.display());
    } else {
        println!(
            "⚠ Extraction incomplete: {} resources failed. Store: {}",
            manifest.failed().count(),
            db_path.display()
        );
    }
    Ok(())
}

fn describe_weeks(weeks: &[Week]) -> String {
    match (weeks.first(), weeks.last()) {
        (Some(first), Some(last)) => format!("{}-{}", first, last),
        _ => "(none)".to_string(),
    }
}
