//! Roundtrip completo: store -> snapshot -> archivo -> snapshot -> store.

use prov_core::{ActivityId, ActivityStatus, ActivityStore, Attachment, ProvisioningPhase};
use prov_persistence::{load_state, save_state, FileStatePersister, PersistedState};

#[test]
fn store_state_survives_a_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let store = ActivityStore::new(10);

    // Una completada con éxito, renombrada al terminar
    let ok_id = ActivityId::with_sub_owner("CloudA", "tmplX", "ok");
    let ok = store.start_activity(ok_id.clone());
    ok.enter_if_not_already(ProvisioningPhase::Launching).unwrap();
    ok.enter_if_not_already(ProvisioningPhase::Operating).unwrap();
    ok.rename("ok (agent-42)");
    store.complete_activity(&ok_id, None);

    // Una fallida (archivada por el Fail) y una todavía operando
    let bad = store.start_activity(ActivityId::new("CloudA", "bad"));
    store.attach(&bad,
                 ProvisioningPhase::Provisioning,
                 Attachment::failure("boom", Some(serde_json::json!({"why": "quota"}))))
         .unwrap();
    let live = store.start_activity(ActivityId::new("CloudB", "live"));
    live.enter_if_not_already(ProvisioningPhase::Launching).unwrap();

    save_state(&path, &PersistedState::from_store(&store.snapshot())).unwrap();
    let loaded = load_state(&path, 10);
    let restored = ActivityStore::from_snapshot(loaded.into_store_snapshot(), 10, None);

    let all = restored.get_activities();
    assert_eq!(all.len(), 3);

    let ok_restored = restored.get_potentially_completed_activity_for(&ok_id).unwrap();
    assert_eq!(ok_restored.name(), "ok (agent-42)");
    assert_eq!(ok_restored.current_phase(), ProvisioningPhase::Completed);
    assert_eq!(ok_restored.status(), ActivityStatus::Ok);

    let bad_restored = restored.get_potentially_completed_activity_for(bad.id()).unwrap();
    assert_eq!(bad_restored.status(), ActivityStatus::Fail);
    let execution = bad_restored.phase_execution(ProvisioningPhase::Provisioning).unwrap();
    assert_eq!(execution.attachments().len(), 1);
    assert_eq!(execution.attachments()[0].detail,
               Some(serde_json::json!({"why": "quota"})));

    // La actividad que quedó lanzando sigue activa (no era Provisioning)
    let live_restored = restored.get_potentially_completed_activity_for(live.id()).unwrap();
    assert_eq!(live_restored.current_phase(), ProvisioningPhase::Launching);
    assert_eq!(restored.get_not_completed_activities().len(), 1);
}

#[test]
fn persister_writes_on_every_store_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let persister = FileStatePersister::new(&path);
    let store = ActivityStore::with_persister(5, Box::new(persister));
    let id = ActivityId::new("CloudA", "n1");
    store.start_activity(id.clone());

    let after_start = load_state(&path, 5);
    assert_eq!(after_start.active.len(), 1);
    assert!(after_start.archived.is_empty());

    store.complete_activity(&id, None);
    let after_complete = load_state(&path, 5);
    assert!(after_complete.active.is_empty());
    assert_eq!(after_complete.archived.len(), 1);
}
