//! Whole-pipeline scenarios
//!
//! These tests run the stages in the order a release build runs them,
//! against one compendium, and check what each stage hands to the next.

use compendium_core::{
    SyncOptions, SyncReport, Workspace, compact_all, import_journals, import_spells,
    update_tokens, validate_notes,
};
use compendium_test_utils::TestCompendium;
use compendium_test_utils::fixtures::{
    self, ACTORS_PATH, SCENES_PATH, SPELL_JOURNALS_PATH, SPELLS_PATH, TABLES_PATH, TEXT_PATH,
};
use pretty_assertions::assert_eq;
use serde_json::json;

/// The spell compendium plus adventure text, a keep scene and one actor.
fn release_compendium() -> TestCompendium {
    let compendium = fixtures::spell_compendium();
    compendium.write_settings("[journals]\npack = \"dcc-core-text\"\n");
    compendium.write_pack(TEXT_PATH, &[]);
    compendium.write("assets/text/Area 1-1 The Gate.html", "<p>A rusted gate.</p>");
    compendium.write(
        "assets/text/level-1/Area 1-2 Hall.html",
        "<p>A hall lined with statues.</p>",
    );
    compendium.write_pack(
        SCENES_PATH,
        &[fixtures::scene(
            "sceneKeep0000001",
            "The Keep",
            &[
                ("note000000000001", "e1", Some("Area 1-1 The Gate")),
                ("note000000000002", "e2", Some("Area 1-2 Hall")),
                ("note000000000003", "e3", Some("Magic Missile")),
            ],
        )],
    );
    compendium.write_pack(
        ACTORS_PATH,
        &[json!({"_id": "actorGoblin00001", "name": "Goblin", "token": {}})],
    );
    compendium
}

async fn run_write_stages(workspace: &Workspace) -> Vec<SyncReport> {
    let options = SyncOptions::default();
    vec![
        import_journals(workspace, options).await.unwrap(),
        import_spells(workspace, options).await.unwrap(),
        update_tokens(workspace, options).await.unwrap(),
        compact_all(workspace, options).await.unwrap(),
    ]
}

#[tokio::test]
async fn test_release_pipeline_produces_valid_scenes() {
    let compendium = release_compendium();
    let workspace = Workspace::load(compendium.root()).unwrap();

    // Notes point at journals that do not exist yet
    let before = validate_notes(&workspace).await.unwrap();
    assert_eq!(before.notes, 3);
    assert_eq!(before.failures.len(), 3);
    assert_eq!(before.exit_code(), 127);

    for report in run_write_stages(&workspace).await {
        assert!(report.success(), "errors: {:?}", report.errors);
    }

    let after = validate_notes(&workspace).await.unwrap();
    assert!(after.passed(), "failures: {:?}", after.failures);
    assert_eq!(after.exit_code(), 0);
    assert_eq!(after.scenes, 1);
}

#[tokio::test]
async fn test_every_stage_leaves_compacted_packages() {
    let compendium = release_compendium();
    let workspace = Workspace::load(compendium.root()).unwrap();

    run_write_stages(&workspace).await;

    for path in [SPELLS_PATH, TABLES_PATH, SPELL_JOURNALS_PATH, TEXT_PATH, ACTORS_PATH] {
        assert_eq!(
            compendium.pack_lines(path).len(),
            compendium.pack_documents(path).len(),
            "{} still carries superseded lines",
            path
        );
    }

    let missile = compendium.find_document(SPELLS_PATH, "Magic Missile");
    assert_eq!(missile["img"], "icons/spells/magic-missile.webp");
    assert_eq!(
        missile["data"]["results"]["table"],
        json!("Magic Missile")
    );
    assert_eq!(
        compendium.find_document(ACTORS_PATH, "Goblin")["token"]["displayBars"],
        20
    );
}

#[tokio::test]
async fn test_second_release_run_writes_nothing() {
    let compendium = release_compendium();
    let workspace = Workspace::load(compendium.root()).unwrap();
    run_write_stages(&workspace).await;

    let snapshot: Vec<String> = [SPELLS_PATH, TABLES_PATH, SPELL_JOURNALS_PATH, TEXT_PATH, ACTORS_PATH]
        .iter()
        .map(|path| compendium.read(path))
        .collect();

    let reports = run_write_stages(&workspace).await;
    let (journals, spells, tokens) = (&reports[0], &reports[1], &reports[2]);

    assert_eq!(journals.processed, 2);
    assert_eq!(spells.processed, 2);
    assert_eq!(tokens.processed, 1);
    for report in [journals, spells, tokens] {
        let documents_written = report
            .actions
            .iter()
            .filter(|action| !matches!(action, compendium_core::SyncAction::Compacted { .. }))
            .count();
        assert_eq!(documents_written, 0, "actions: {:?}", report.actions);
    }

    let after: Vec<String> = [SPELLS_PATH, TABLES_PATH, SPELL_JOURNALS_PATH, TEXT_PATH, ACTORS_PATH]
        .iter()
        .map(|path| compendium.read(path))
        .collect();
    assert_eq!(after, snapshot);
}

#[tokio::test]
async fn test_dry_run_pipeline_changes_no_files() {
    let compendium = release_compendium();
    let workspace = Workspace::load(compendium.root()).unwrap();
    let paths = [SPELLS_PATH, TABLES_PATH, SPELL_JOURNALS_PATH, TEXT_PATH, ACTORS_PATH];
    let snapshot: Vec<String> = paths.iter().map(|path| compendium.read(path)).collect();

    let options = SyncOptions { dry_run: true };
    let journals = import_journals(&workspace, options).await.unwrap();
    let spells = import_spells(&workspace, options).await.unwrap();
    let tokens = update_tokens(&workspace, options).await.unwrap();
    compact_all(&workspace, options).await.unwrap();

    assert!(journals.writes() > 0);
    assert!(spells.writes() > 0);
    assert!(tokens.writes() > 0);
    assert!(spells.dry_run);

    let after: Vec<String> = paths.iter().map(|path| compendium.read(path)).collect();
    assert_eq!(after, snapshot);
}

#[tokio::test]
async fn test_stage_failure_does_not_block_later_stages() {
    let compendium = release_compendium();
    compendium.write_override(fixtures::SPELL_PACK, "sleep", "img: [unterminated\n");
    let workspace = Workspace::load(compendium.root()).unwrap();

    let reports = run_write_stages(&workspace).await;
    let spells = &reports[1];

    assert_eq!(spells.errors.len(), 1);
    assert!(spells.errors[0].document.contains("Sleep"));
    assert_eq!(
        compendium.find_document(SPELLS_PATH, "Magic Missile")["img"],
        "icons/spells/magic-missile.webp"
    );
    assert!(reports[2].success());
    assert!(validate_notes(&workspace).await.unwrap().passed());
}
