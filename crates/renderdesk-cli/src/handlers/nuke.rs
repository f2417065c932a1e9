use renderdesk::db::nuke_job_repo::{self, Upsert};
use renderdesk::{with_session, Config, NukeJob};

use crate::args::NukeCmd;
use crate::print;

pub fn handle(config: &Config, cmd: NukeCmd) -> anyhow::Result<()> {
    match cmd {
        NukeCmd::Register {
            comp_file,
            first,
            last,
            nuke_version,
            rez_env,
        } => {
            let mut job = NukeJob::from_comp(config.resolve_scene_path(comp_file), first, last);
            if let Some(version) = nuke_version {
                job.nuke_version = version;
            }
            job.rez_env = rez_env.unwrap_or_default();

            let (job, outcome) =
                with_session(&config.database, |db| nuke_job_repo::upsert_by_scene_file(db, &job))?;
            match outcome {
                Upsert::Created => println!("created {} ({})", job, job.id),
                Upsert::Updated => println!("updated {} ({})", job, job.id),
            }
            Ok(())
        }
        NukeCmd::List => {
            let jobs = with_session(&config.database, nuke_job_repo::list)?;
            print::nuke_rows(&jobs);
            Ok(())
        }
        NukeCmd::Shot { number } => {
            let jobs = with_session(&config.database, |db| {
                nuke_job_repo::find_by_shot_number(db, number)
            })?;
            print::nuke_rows(&jobs);
            Ok(())
        }
    }
}
