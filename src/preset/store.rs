use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::preset::migrations::BASE_MIGRATION;
use crate::preset::{
    PresetError, PresetPayload, PresetRecord, PresetRef, UpdateOutcome, MIN_PRESET_NAME_LEN,
};

pub struct PresetStore {
    conn: Connection,
}

struct RawRow {
    id: i64,
    name: String,
    data: String,
    fingerprint: String,
    created_at: String,
}

impl PresetStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed creating data directory: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed opening preset database: {}", path.display()))?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(BASE_MIGRATION)?;
        Ok(())
    }

    /// Newest first. Rows without a complete bundle are skipped.
    pub fn list(&self) -> Result<Vec<PresetRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
SELECT id, name, data, fingerprint, created_at
FROM presets
ORDER BY created_at DESC, id DESC
"#,
        )?;
        let rows = stmt
            .query_map([], row_to_raw)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for raw in rows {
            let id = raw.id;
            match raw_to_record(raw) {
                Ok(record) => out.push(record),
                Err(err) => warn!("skipping preset {id}: {err}"),
            }
        }
        Ok(out)
    }

    pub fn get(&self, id_or_name: &str) -> Result<Option<PresetRecord>> {
        let Some(id) = self.resolve(id_or_name)? else {
            return Ok(None);
        };
        let raw = self
            .conn
            .query_row(
                r#"
SELECT id, name, data, fingerprint, created_at
FROM presets
WHERE id = ?1
"#,
                params![id],
                row_to_raw,
            )
            .optional()?;
        raw.map(|raw| {
            raw_to_record(raw).with_context(|| format!("preset {id_or_name} is not usable"))
        })
        .transpose()
    }

    /// Stores a new preset. A blank name becomes `Preset <timestamp>`; a name
    /// already in use gets a ` -N` suffix.
    pub fn save(&self, name: &str, payload: &PresetPayload) -> Result<PresetRecord> {
        let now = Utc::now();
        let base = resolve_name(name, now)?;
        let final_name = uniqueize_name(&base, &self.names(None)?);
        let data = serde_json::to_string(payload)?;
        let fingerprint = payload.scenario().fingerprint();

        self.conn.execute(
            r#"
INSERT INTO presets(name, data, fingerprint, created_at)
VALUES (?1, ?2, ?3, ?4)
"#,
            params![final_name, data, fingerprint, timestamp(now)],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("saved preset {final_name} (id {id})");

        Ok(PresetRecord {
            id,
            name: final_name,
            data: payload.clone(),
            fingerprint,
            created_at: now,
        })
    }

    /// Replaces the data of an existing preset and optionally renames it.
    /// An unknown target is not an error: the outcome reports zero rows.
    pub fn update(
        &self,
        id_or_name: &str,
        name: Option<&str>,
        payload: &PresetPayload,
    ) -> Result<UpdateOutcome> {
        let Some(id) = self.resolve(id_or_name)? else {
            debug!("no preset matches {id_or_name}");
            return Ok(UpdateOutcome {
                updated: 0,
                id: None,
            });
        };
        let now = Utc::now();
        let final_name = match name {
            Some(raw) => {
                let base = resolve_name(raw, now)?;
                Some(uniqueize_name(&base, &self.names(Some(id))?))
            }
            None => None,
        };
        let data = serde_json::to_string(payload)?;
        let fingerprint = payload.scenario().fingerprint();

        let updated = self.conn.execute(
            r#"
UPDATE presets
SET name = COALESCE(?1, name), data = ?2, fingerprint = ?3, created_at = ?4
WHERE id = ?5
"#,
            params![final_name, data, fingerprint, timestamp(now), id],
        )?;
        info!("updated preset {id}");
        Ok(UpdateOutcome {
            updated,
            id: Some(id),
        })
    }

    /// Deletes by id, or every preset with exactly this name when no id matches.
    pub fn delete(&self, id_or_name: &str) -> Result<usize> {
        let by_id = match PresetRef::parse(id_or_name) {
            PresetRef::Id(id) => self.find_id(id)?,
            PresetRef::Name(_) => None,
        };
        let removed = match by_id {
            Some(id) => self
                .conn
                .execute("DELETE FROM presets WHERE id = ?1", params![id])?,
            None => self.conn.execute(
                "DELETE FROM presets WHERE name = ?1",
                params![id_or_name.trim()],
            )?,
        };
        info!("deleted {removed} preset(s) matching {id_or_name}");
        Ok(removed)
    }

    /// Fails with [`PresetError::NotFound`] instead of returning `None`.
    pub fn require(&self, id_or_name: &str) -> Result<PresetRecord> {
        self.get(id_or_name)?
            .ok_or_else(|| PresetError::NotFound(id_or_name.to_string()).into())
    }

    /// Numeric input is tried as an id first, then as an exact name.
    fn resolve(&self, id_or_name: &str) -> Result<Option<i64>> {
        if let PresetRef::Id(id) = PresetRef::parse(id_or_name) {
            if let Some(found) = self.find_id(id)? {
                return Ok(Some(found));
            }
        }
        let id = self
            .conn
            .query_row(
                r#"
SELECT id FROM presets
WHERE name = ?1
ORDER BY created_at DESC, id DESC
LIMIT 1
"#,
                params![id_or_name.trim()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn find_id(&self, id: i64) -> Result<Option<i64>> {
        let found = self
            .conn
            .query_row(
                "SELECT id FROM presets WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found)
    }

    fn names(&self, exclude: Option<i64>) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM presets WHERE id != ?1")?;
        let names = stmt
            .query_map(params![exclude.unwrap_or(-1)], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

/// `base`, or `base -1`, `base -2`, ... whichever is first free. Comparison
/// ignores case.
pub fn uniqueize_name(base: &str, taken: &[String]) -> String {
    let exists = |candidate: &str| taken.iter().any(|t| t.eq_ignore_ascii_case(candidate));
    if !exists(base) {
        return base.to_string();
    }
    let mut i = 1;
    while exists(&format!("{base} -{i}")) {
        i += 1;
    }
    format!("{base} -{i}")
}

fn resolve_name(raw: &str, now: DateTime<Utc>) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(format!("Preset {}", now.format("%Y-%m-%d %H:%M:%S")));
    }
    if trimmed.chars().count() < MIN_PRESET_NAME_LEN {
        return Err(PresetError::NameTooShort(trimmed.to_string()).into());
    }
    Ok(trimmed.to_string())
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: row.get(0)?,
        name: row.get(1)?,
        data: row.get(2)?,
        fingerprint: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn raw_to_record(raw: RawRow) -> Result<PresetRecord> {
    let data = PresetPayload::from_json(&raw.data)?;
    let created_at = DateTime::parse_from_rfc3339(&raw.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("invalid created_at `{}`", raw.created_at))?;
    Ok(PresetRecord {
        id: raw.id,
        name: raw.name,
        data,
        fingerprint: raw.fingerprint,
        created_at,
    })
}
