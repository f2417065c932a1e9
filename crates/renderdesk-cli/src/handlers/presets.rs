use anyhow::{bail, Context};
use renderdesk::db::{light_preset_repo, DatabaseError};
use renderdesk::{with_session, Config, LightPreset};

use crate::args::PresetsCmd;
use crate::print;

pub fn handle(config: &Config, cmd: PresetsCmd) -> anyhow::Result<()> {
    match cmd {
        PresetsCmd::List { episode } => {
            let presets = with_session(&config.database, |db| {
                light_preset_repo::list(db, episode.as_deref())
            })?;
            for preset in presets {
                println!(
                    "{:<24} {:<8} {} light(s)",
                    preset.name,
                    preset.episode.as_deref().unwrap_or("-"),
                    preset.lights.len()
                );
            }
            Ok(())
        }
        PresetsCmd::Show { name } => {
            let preset =
                with_session(&config.database, |db| light_preset_repo::find_by_name(db, &name))?
                    .with_context(|| format!("Light preset not found: {}", name))?;
            print::print_json(&preset)
        }
        PresetsCmd::Import { file, replace } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let preset: LightPreset = serde_json::from_str(&text)
                .with_context(|| format!("parsing {}", file.display()))?;

            with_session(&config.database, |db| {
                match light_preset_repo::insert(db, &preset) {
                    Err(DatabaseError::NotUnique { .. }) if replace => {
                        light_preset_repo::replace_lights(db, &preset.name, &preset.lights)
                    }
                    other => other,
                }
            })?;
            println!("{}", preset);
            Ok(())
        }
        PresetsCmd::Delete { name } => {
            if !with_session(&config.database, |db| light_preset_repo::delete(db, &name))? {
                bail!("Light preset not found: {}", name);
            }
            Ok(())
        }
    }
}
