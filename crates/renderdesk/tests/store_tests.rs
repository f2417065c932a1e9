//! Job store behaviour across sessions and job kinds.

mod common;

use common::{MayaJobBuilder, TestHarness};
use renderdesk::db::maya_job_repo::{self, MayaJobPatch};
use renderdesk::db::nuke_job_repo::{self, Upsert};
use renderdesk::{with_session, DatabaseError, NukeJob, Session};

#[test]
fn test_duplicate_scene_then_update_by_primary_key() {
    let harness = TestHarness::new();
    let scene = harness.write_scene("ep01_shot_010_light.ma");

    let first = MayaJobBuilder::new("ep01_sc_010", &scene)
        .simple_layer("BEAUTY", "1-10")
        .build();
    maya_job_repo::insert(&harness.db, &first).unwrap();

    let second = MayaJobBuilder::new("ep01_sc_010_v2", &scene).build();
    let err = maya_job_repo::insert(&harness.db, &second).unwrap_err();
    assert!(matches!(
        err,
        DatabaseError::NotUnique {
            field: "scene_file",
            ..
        }
    ));

    maya_job_repo::update(
        &harness.db,
        &first.id,
        &MayaJobPatch {
            batch_name: Some("ep01_sc_010_v2".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let stored = maya_job_repo::find_by_scene_file(&harness.db, &scene)
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.batch_name, "ep01_sc_010_v2");
    assert_eq!(stored.render_layers.len(), 1);
}

#[test]
fn test_scene_must_exist_at_write_time() {
    let harness = TestHarness::new();
    let scene = harness.write_scene("ep01_sc_020_light.ma");
    std::fs::remove_file(&scene).unwrap();

    let job = MayaJobBuilder::new("ep01_sc_020", &scene).build();
    assert!(matches!(
        maya_job_repo::insert(&harness.db, &job),
        Err(DatabaseError::Validation(_))
    ));
}

#[test]
fn test_documents_survive_sessions() {
    let harness = TestHarness::new();
    let config = harness.database_config("rendering");
    let scene = harness.write_scene("ep01_sc_030_light.ma");
    let job = MayaJobBuilder::new("ep01_sc_030", &scene)
        .simple_layer("BEAUTY", "1-10")
        .build();

    with_session(&config, |db| maya_job_repo::insert(db, &job)).unwrap();

    let session = Session::open(&config).unwrap();
    assert_eq!(session.alias(), "test");
    let stored = maya_job_repo::find_by_id(&session, &job.id).unwrap().unwrap();
    assert_eq!(stored.render_layers[0].frames.as_deref(), Some("1-10"));
    assert!(harness.temp_path().join("db").join("rendering.db").exists());
}

#[test]
fn test_shot_number_queries() {
    let harness = TestHarness::new();

    for name in ["ep01_shot_042_comp_v001.nk", "ep01_shot_043_comp.nk", "ep01_misc.nk"] {
        let comp = harness.write_scene(name);
        nuke_job_repo::insert(&harness.db, &NukeJob::new("ep01", &comp, "1001-1010")).unwrap();
    }
    let maya_scene = harness.write_scene("ep01_shot_042.ma");
    maya_job_repo::insert(
        &harness.db,
        &MayaJobBuilder::new("ep01_sc_042", &maya_scene).build(),
    )
    .unwrap();

    let comps = nuke_job_repo::find_by_shot_number(&harness.db, 42).unwrap();
    assert_eq!(comps.len(), 1);
    assert_eq!(comps[0].comp_name(), "ep01_shot_042_comp_v001");
    assert!(nuke_job_repo::find_by_shot_number(&harness.db, 0).unwrap().is_empty());

    let lighting = maya_job_repo::find_by_shot_number(&harness.db, 42).unwrap();
    assert_eq!(lighting.len(), 1);
    assert_eq!(lighting[0].batch_name, "ep01_sc_042");
}

#[test]
fn test_registering_a_comp_twice_updates_it() {
    let harness = TestHarness::new();
    let comp = harness.write_scene("ep01_shot_050_comp.nk");

    let (created, outcome) =
        nuke_job_repo::upsert_by_scene_file(&harness.db, &NukeJob::from_comp(&comp, 1001, 1050))
            .unwrap();
    assert_eq!(outcome, Upsert::Created);

    let mut again = NukeJob::from_comp(&comp, 1001, 1080);
    again.nuke_version = "12.2".to_string();
    let (updated, outcome) = nuke_job_repo::upsert_by_scene_file(&harness.db, &again).unwrap();
    assert_eq!(outcome, Upsert::Updated);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.frames, "1001-1080");
    assert_eq!(updated.nuke_version, "12.2");
    assert_eq!(nuke_job_repo::list(&harness.db).unwrap().len(), 1);
}

#[test]
fn test_scene_file_spellings_share_one_key() {
    let harness = TestHarness::new();
    let scene = harness.write_scene("ep01_sc_060_light.ma");
    let job = MayaJobBuilder::new("ep01_sc_060", &scene).build();
    maya_job_repo::insert(&harness.db, &job).unwrap();

    let dotted = harness.scenes_dir.join(".").join("ep01_sc_060_light.ma");
    let err = maya_job_repo::insert(
        &harness.db,
        &MayaJobBuilder::new("ep01_sc_060_dup", &dotted).build(),
    )
    .unwrap_err();
    assert!(matches!(err, DatabaseError::NotUnique { field: "scene_file", .. }));

    let roundabout = harness
        .scenes_dir
        .join("..")
        .join("ep01")
        .join("ep01_sc_060_light.ma");
    let found = maya_job_repo::find_by_scene_file(&harness.db, &roundabout)
        .unwrap()
        .unwrap();
    assert_eq!(found.id, job.id);
    assert_eq!(found.scene_file, scene);

    let comp = harness.write_scene("ep01_shot_060_comp.nk");
    nuke_job_repo::insert(&harness.db, &NukeJob::new("ep01", &comp, "1-10")).unwrap();
    let dotted_comp = harness.scenes_dir.join(".").join("ep01_shot_060_comp.nk");
    let (_, outcome) = nuke_job_repo::upsert_by_scene_file(
        &harness.db,
        &NukeJob::new("ep01", &dotted_comp, "1-20"),
    )
    .unwrap();
    assert_eq!(outcome, Upsert::Updated);
}

#[test]
fn test_relative_scene_file_is_rejected() {
    let harness = TestHarness::new();
    let job = MayaJobBuilder::new("ep01_sc_070", std::path::Path::new("ep01_sc_070_light.ma")).build();
    assert!(matches!(
        maya_job_repo::insert(&harness.db, &job),
        Err(DatabaseError::Validation(_))
    ));
}
