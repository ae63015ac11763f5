//! Keyed entity queries

use rusqlite::{params, params_from_iter, OptionalExtension};

use super::schema::EntityStore;
use crate::yahoo::types::{
    Entity, EntityKind, Matchup, Player, Roster, StatLine, StoredEntity, Team,
};
use crate::{HoopsError, Result};

fn not_found(kind: EntityKind, key: &str) -> HoopsError {
    HoopsError::NotFound {
        kind: kind.to_string(),
        key: key.to_string(),
    }
}

impl EntityStore {
    /// Insert or replace an entity by its key in one statement.
    pub fn upsert_as<T: StoredEntity>(&mut self, entity: &T) -> Result<()> {
        let body = serde_json::to_string(entity)?;
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (key, body) VALUES (?, ?)",
                T::KIND.table()
            ),
            params![entity.key(), body],
        )?;
        Ok(())
    }

    /// Upsert a batch inside one transaction, in the given order.
    pub fn upsert_all<T: StoredEntity>(&mut self, entities: &[T]) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO {} (key, body) VALUES (?, ?)",
                T::KIND.table()
            ))?;
            for entity in entities {
                stmt.execute(params![entity.key(), serde_json::to_string(entity)?])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// `None` when no entity has this key.
    pub fn find_as<T: StoredEntity>(&self, key: &str) -> Result<Option<T>> {
        let body: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {} WHERE key = ?", T::KIND.table()),
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Like [`find_as`](Self::find_as) but a missing key is `NotFound`.
    pub fn get_as<T: StoredEntity>(&self, key: &str) -> Result<T> {
        self.find_as(key)?.ok_or_else(|| not_found(T::KIND, key))
    }

    /// Every entity of a kind, ordered by key.
    pub fn all_as<T: StoredEntity>(&self) -> Result<Vec<T>> {
        self.select_as(
            &format!("SELECT body FROM {} ORDER BY key", T::KIND.table()),
            None,
        )
    }

    /// Entities whose key matches a SQL `LIKE` pattern, ordered by key.
    pub(crate) fn like_as<T: StoredEntity>(&self, pattern: &str) -> Result<Vec<T>> {
        self.select_as(
            &format!(
                "SELECT body FROM {} WHERE key LIKE ? ORDER BY key",
                T::KIND.table()
            ),
            Some(pattern),
        )
    }

    fn select_as<T: StoredEntity>(&self, sql: &str, pattern: Option<&str>) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(pattern), |row| row.get::<_, String>(0))?;

        let mut entities = Vec::new();
        for body in rows {
            entities.push(serde_json::from_str(&body?)?);
        }
        Ok(entities)
    }

    pub fn count(&self, kind: EntityKind) -> Result<usize> {
        let n: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", kind.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }

    pub fn contains(&self, kind: EntityKind, key: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE key = ?", kind.table()),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Store any normalized entity under its own key.
    pub fn upsert(&mut self, entity: &Entity) -> Result<()> {
        match entity {
            Entity::Team(e) => self.upsert_as(e),
            Entity::Player(e) => self.upsert_as(e),
            Entity::Roster(e) => self.upsert_as(e),
            Entity::Matchup(e) => self.upsert_as(e),
            Entity::StatLine(e) => self.upsert_as(e),
        }
    }

    pub fn get(&self, kind: EntityKind, key: &str) -> Result<Entity> {
        Ok(match kind {
            EntityKind::Team => self.get_as::<Team>(key)?.into_entity(),
            EntityKind::Player => self.get_as::<Player>(key)?.into_entity(),
            EntityKind::Roster => self.get_as::<Roster>(key)?.into_entity(),
            EntityKind::Matchup => self.get_as::<Matchup>(key)?.into_entity(),
            EntityKind::StatLine => self.get_as::<StatLine>(key)?.into_entity(),
        })
    }

    pub fn all(&self, kind: EntityKind) -> Result<Vec<Entity>> {
        fn wrap<T: StoredEntity>(entities: Vec<T>) -> Vec<Entity> {
            entities.into_iter().map(StoredEntity::into_entity).collect()
        }

        Ok(match kind {
            EntityKind::Team => wrap(self.all_as::<Team>()?),
            EntityKind::Player => wrap(self.all_as::<Player>()?),
            EntityKind::Roster => wrap(self.all_as::<Roster>()?),
            EntityKind::Matchup => wrap(self.all_as::<Matchup>()?),
            EntityKind::StatLine => wrap(self.all_as::<StatLine>()?),
        })
    }

    /// Remove every entity of every kind.
    pub fn clear(&mut self) -> Result<()> {
        for kind in EntityKind::ALL {
            self.conn
                .execute(&format!("DELETE FROM {}", kind.table()), [])?;
        }
        Ok(())
    }
}
