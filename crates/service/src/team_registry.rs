//! Raw team name to stable `TeamId`.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use statlines_core::{
    Team, TeamId, derive_short_code, display_name, is_word_prefix, normalize_name,
};
use statlines_storage::{Storage, TeamPlan};

use crate::ServiceError;

/// What a normalized name points at, before anything is written.
enum Lookup {
    /// Stored under exactly this canonical name.
    Exact(Team),
    /// Short code or alias naming one canonical name, which may not be stored yet.
    Canonical { name: String, short_code: Option<String> },
    /// Whole-word prefix of exactly one stored name.
    Prefix(Team),
    Unknown,
}

/// Resolves scraped team names against stored teams, creating teams on first
/// sight. One instance per caller; its cache is not shared.
pub struct TeamRegistry {
    storage: Storage,
    cache: Mutex<HashMap<String, TeamId>>,
}

impl TeamRegistry {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage, cache: Mutex::new(HashMap::new()) }
    }

    /// Resolve a raw name, creating the team if nothing matches.
    ///
    /// The same normalized name resolves to the same id on every call and
    /// across restarts: partial matches are persisted as learned aliases.
    pub fn resolve(&self, raw_name: &str) -> Result<TeamId, ServiceError> {
        let plan = self.plan(raw_name)?;
        let id = self.storage.apply_team_plan(&plan)?;
        match &plan {
            TeamPlan::Create { name, .. } => {
                tracing::info!(team = %name, team_id = %id, "Resolved new team");
            },
            TeamPlan::LearnAlias { canonical_name, .. } => {
                tracing::info!(alias = raw_name, team = %canonical_name, "Learned team alias");
            },
            TeamPlan::SetShortCode { short_code, .. } => {
                tracing::info!(team_id = %id, short_code = %short_code, "Updated team short code");
            },
            TeamPlan::Existing(_) => {},
        }
        self.remember_name(raw_name, id);
        Ok(id)
    }

    /// Work out what resolving `raw_name` would write, without writing it.
    ///
    /// Ambiguity and empty names are reported here, so a caller can check
    /// every name of a row before any of them touches the database.
    pub fn plan(&self, raw_name: &str) -> Result<TeamPlan, ServiceError> {
        let key = normalize_name(raw_name);
        if key.is_empty() {
            return Err(ServiceError::InvalidInput("team name is empty".to_owned()));
        }
        if let Some(id) = self.cached(&key) {
            return Ok(TeamPlan::Existing(id));
        }

        Ok(match self.lookup_normalized(&key)? {
            Lookup::Exact(team) => TeamPlan::Existing(team.id),
            Lookup::Canonical { name, short_code } => self.plan_canonical(name, short_code)?,
            Lookup::Prefix(team) => TeamPlan::LearnAlias {
                id: team.id,
                alias: raw_name.to_owned(),
                canonical_name: team.name,
            },
            Lookup::Unknown => {
                let name = display_name(raw_name);
                let short_code = derive_short_code(&name);
                TeamPlan::Create { name, short_code }
            },
        })
    }

    /// Remember a name whose plan has been committed.
    pub(crate) fn remember_name(&self, raw_name: &str, id: TeamId) {
        self.remember(normalize_name(raw_name), id);
    }

    /// Resolve without writing anything. `None` when the name is unknown.
    pub fn lookup(&self, raw_name: &str) -> Result<Option<TeamId>, ServiceError> {
        let key = normalize_name(raw_name);
        if key.is_empty() {
            return Err(ServiceError::InvalidInput("team name is empty".to_owned()));
        }
        if let Some(id) = self.cached(&key) {
            return Ok(Some(id));
        }
        Ok(match self.lookup_normalized(&key)? {
            Lookup::Exact(team) | Lookup::Prefix(team) => Some(team.id),
            Lookup::Canonical { name, .. } => self.storage.get_team_by_name(&name)?.map(|t| t.id),
            Lookup::Unknown => None,
        })
    }

    fn lookup_normalized(&self, key: &str) -> Result<Lookup, ServiceError> {
        if let Some(team) = self.storage.get_team_by_name(key)? {
            return Ok(Lookup::Exact(team));
        }

        let mut candidates: Vec<(String, Option<String>)> = Vec::new();
        for name in self.storage.team_names_by_short_code(&key.to_uppercase())? {
            push_candidate(&mut candidates, name, None);
        }
        if let Some(alias) = self.storage.find_alias(key)? {
            push_candidate(&mut candidates, alias.canonical_name, alias.short_code);
        }
        if candidates.len() > 1 {
            return Err(ambiguous(key, candidates.into_iter().map(|(name, _)| name).collect()));
        }
        if let Some((name, short_code)) = candidates.pop() {
            return Ok(Lookup::Canonical { name, short_code });
        }

        let mut prefixed: Vec<Team> = self
            .storage
            .list_teams()?
            .into_iter()
            .filter(|team| is_word_prefix(key, &normalize_name(&team.name)))
            .collect();
        if prefixed.len() > 1 {
            return Err(ambiguous(key, prefixed.into_iter().map(|t| t.name).collect()));
        }
        Ok(prefixed.pop().map_or(Lookup::Unknown, Lookup::Prefix))
    }

    fn plan_canonical(
        &self,
        name: String,
        short_code: Option<String>,
    ) -> Result<TeamPlan, ServiceError> {
        let Some(team) = self.storage.get_team_by_name(&name)? else {
            let short_code = short_code.or_else(|| derive_short_code(&name));
            return Ok(TeamPlan::Create { name, short_code });
        };
        Ok(match short_code {
            Some(code) if team.short_code.as_deref() != Some(code.as_str()) => {
                TeamPlan::SetShortCode { id: team.id, short_code: code }
            },
            _ => TeamPlan::Existing(team.id),
        })
    }

    fn cached(&self, key: &str) -> Option<TeamId> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(key).copied()
    }

    fn remember(&self, key: String, id: TeamId) {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).insert(key, id);
    }
}

fn push_candidate(candidates: &mut Vec<(String, Option<String>)>, name: String, code: Option<String>) {
    let normalized = normalize_name(&name);
    if let Some(existing) = candidates.iter_mut().find(|(n, _)| normalize_name(n) == normalized) {
        if code.is_some() {
            existing.1 = code;
        }
        return;
    }
    candidates.push((name, code));
}

fn ambiguous(key: &str, candidates: Vec<String>) -> ServiceError {
    tracing::warn!(name = key, candidates = ?candidates, "Ambiguous team name");
    ServiceError::ResolutionAmbiguous { name: key.to_owned(), candidates }
}
