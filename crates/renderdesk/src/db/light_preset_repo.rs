//! Light preset repository. Lights are stored as a JSON array per preset.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DatabaseError};
use crate::model::{Light, LightPreset};
use crate::validation;

struct PresetRow {
    name: String,
    scene: Option<String>,
    episode: Option<String>,
    lights: String,
}

impl PresetRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            name: row.get("name")?,
            scene: row.get("scene")?,
            episode: row.get("episode")?,
            lights: row.get("lights")?,
        })
    }

    fn into_preset(self) -> Result<LightPreset, DatabaseError> {
        Ok(LightPreset {
            name: self.name,
            scene: self.scene,
            episode: self.episode,
            lights: serde_json::from_str(&self.lights)?,
        })
    }
}

/// Inserts a preset. Names are unique.
pub fn insert(db: &Database, preset: &LightPreset) -> Result<(), DatabaseError> {
    validation::validate_light_preset(preset)?;
    let lights = serde_json::to_string(&preset.lights)?;
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO light_presets (name, scene, episode, lights) VALUES (?1, ?2, ?3, ?4)",
            params![preset.name, preset.scene, preset.episode, lights],
        )
        .map_err(|e| DatabaseError::unique(e, "name", &preset.name))?;
        Ok(())
    })
}

pub fn find_by_name(db: &Database, name: &str) -> Result<Option<LightPreset>, DatabaseError> {
    let row = db.with_conn(|conn| {
        Ok(conn
            .query_row(
                "SELECT * FROM light_presets WHERE name = ?1",
                params![name],
                PresetRow::from_row,
            )
            .optional()?)
    })?;
    row.map(PresetRow::into_preset).transpose()
}

/// Presets ordered by name, optionally restricted to one episode.
pub fn list(db: &Database, episode: Option<&str>) -> Result<Vec<LightPreset>, DatabaseError> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM light_presets WHERE ?1 IS NULL OR episode = ?1 ORDER BY name",
        )?;
        let rows = stmt
            .query_map(params![episode], PresetRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;
    rows.into_iter().map(PresetRow::into_preset).collect()
}

/// Replaces the lights of an existing preset.
pub fn replace_lights(db: &Database, name: &str, lights: &[Light]) -> Result<(), DatabaseError> {
    let json = serde_json::to_string(lights)?;
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE light_presets SET lights = ?2 WHERE name = ?1",
            params![name, json],
        )?;
        if changed == 0 {
            return Err(DatabaseError::not_found("Light preset", name));
        }
        Ok(())
    })
}

pub fn delete(db: &Database, name: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let removed = conn.execute("DELETE FROM light_presets WHERE name = ?1", params![name])?;
        Ok(removed > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key_light() -> Light {
        let mut attributes = serde_json::Map::new();
        attributes.insert("intensity".to_string(), json!(8.0));
        Light {
            name: "KEY".to_string(),
            light_type: Some("VRayLightRectShape".to_string()),
            attributes,
            xform: vec![1.0, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_insert_find_list() {
        let db = Database::open_in_memory().unwrap();
        let mut preset = LightPreset::new("warm_interior");
        preset.episode = Some("ep01".to_string());
        preset.lights.push(key_light());
        insert(&db, &preset).unwrap();

        let mut other = LightPreset::new("cold_exterior");
        other.episode = Some("ep02".to_string());
        insert(&db, &other).unwrap();

        assert_eq!(find_by_name(&db, "warm_interior").unwrap().unwrap(), preset);
        assert!(find_by_name(&db, "missing").unwrap().is_none());

        let all = list(&db, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "cold_exterior");
        assert_eq!(list(&db, Some("ep01")).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_name() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &LightPreset::new("a")).unwrap();
        assert!(matches!(
            insert(&db, &LightPreset::new("a")),
            Err(DatabaseError::NotUnique { field: "name", .. })
        ));
    }

    #[test]
    fn test_replace_lights_and_delete() {
        let db = Database::open_in_memory().unwrap();
        insert(&db, &LightPreset::new("a")).unwrap();
        replace_lights(&db, "a", &[key_light()]).unwrap();
        assert_eq!(find_by_name(&db, "a").unwrap().unwrap().lights.len(), 1);
        assert!(replace_lights(&db, "b", &[]).is_err());

        assert!(delete(&db, "a").unwrap());
        assert!(!delete(&db, "a").unwrap());
    }
}
