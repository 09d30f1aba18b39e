//! Tests for the spell import stage

use compendium_core::link::SYNTHESIZED_JOURNAL_SORT;
use compendium_core::{SyncAction, SyncOptions, Workspace, import_spells};
use compendium_test_utils::fixtures::{
    self, SPELL_JOURNALS_PATH, SPELL_PACK, SPELLS_PATH, TABLES_PATH,
};
use compendium_test_utils::TestCompendium;
use serde_json::json;

async fn run(compendium: &TestCompendium) -> compendium_core::SyncReport {
    let workspace = Workspace::load(compendium.root()).unwrap();
    import_spells(&workspace, SyncOptions::default()).await.unwrap()
}

const JOURNAL_LINK: &str = "<br><p><strong>Spell Data:</strong> @Compendium[dcc-core-book.dcc-core-spell-journals.Magic Missile]{Magic Missile}</p>";

mod linking_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_spell_links_results_table_and_journal() {
        let compendium = fixtures::spell_compendium();
        let report = run(&compendium).await;
        assert!(report.success(), "errors: {:?}", report.errors);

        let spell = compendium.find_document(SPELLS_PATH, "Magic Missile");
        assert_eq!(spell["_id"], "spellMagicMiss01");
        assert_eq!(spell["img"], "icons/spells/magic-missile.webp");
        assert_eq!(
            spell["data"]["results"],
            json!({"table": "Magic Missile", "collection": "dcc-core-book.dcc-core-spell-tables"})
        );
        assert_eq!(
            spell["data"]["description"]["value"],
            format!("<p>A missile of force.</p>{JOURNAL_LINK}")
        );
    }

    #[tokio::test]
    async fn test_results_table_gets_description_and_image() {
        let compendium = fixtures::spell_compendium();
        run(&compendium).await;

        let table = compendium.find_document(TABLES_PATH, "Magic Missile");
        let description = table["description"].as_str().unwrap();
        assert!(description.starts_with("<h1>Magic Missile</h1><p><strong>Level:</strong> 1</p>"));
        assert!(description.contains("<p><strong>Page:</strong> 144</p><br><p>A missile of force.</p>"));
        assert!(description.ends_with(JOURNAL_LINK));
        assert_eq!(table["img"], "icons/spells/magic-missile.webp");
        assert_eq!(table["replacement"], true);
    }

    #[tokio::test]
    async fn test_image_propagates_to_every_linked_table() {
        let compendium = fixtures::spell_compendium();
        run(&compendium).await;

        for name in ["Magic Missile Manifestation", "Magic Missile Misfire"] {
            let table = compendium.find_document(TABLES_PATH, name);
            assert_eq!(table["img"], "icons/spells/magic-missile.webp", "{name}");
            assert!(table.get("description").is_none(), "{name}");
        }
    }

    #[tokio::test]
    async fn test_journal_is_synthesized_with_tables_in_order() {
        let compendium = fixtures::spell_compendium();
        run(&compendium).await;

        let journals = compendium.pack_documents(SPELL_JOURNALS_PATH);
        assert_eq!(journals.len(), 1);
        let journal = &journals[0];
        assert_eq!(journal["name"], "Magic Missile");
        assert_eq!(journal["sort"], SYNTHESIZED_JOURNAL_SORT);
        assert_eq!(journal["img"], "icons/spells/magic-missile.webp");

        let content = journal["content"].as_str().unwrap();
        let manifestation = content.find("<strong>Manifestation:</strong>").unwrap();
        let misfire = content.find("<strong>Misfire:</strong>").unwrap();
        let results = content.find("<strong>Results:</strong>").unwrap();
        assert!(manifestation < misfire && misfire < results);
        assert!(!content.contains("Corruption"));
        assert!(content.contains("<td align=\"left\" height=\"17\">14+</td>"));
        assert!(content.contains("<td align=\"left\" height=\"17\">1</td>\n<td align=\"left\">A glowing arrow.</td>"));
        assert!(content.contains("<td align=\"left\"><strong>Spell Result</td>"));
    }

    #[tokio::test]
    async fn test_spell_without_tables_is_left_alone() {
        let compendium = fixtures::spell_compendium();
        let before = compendium.find_document(SPELLS_PATH, "Sleep");
        run(&compendium).await;

        assert_eq!(compendium.find_document(SPELLS_PATH, "Sleep"), before);
    }

    #[tokio::test]
    async fn test_journal_without_results_table_is_not_linked() {
        let compendium = fixtures::spell_compendium();
        compendium.write_pack(
            SPELL_JOURNALS_PATH,
            &[fixtures::journal("journalSleep0001", "Sleep", "<p>Zzz.</p>")],
        );
        let before = compendium.find_document(SPELLS_PATH, "Sleep");

        run(&compendium).await;

        let sleep = compendium.find_document(SPELLS_PATH, "Sleep");
        assert_eq!(sleep, before);
        assert!(!sleep["data"]["description"]["value"]
            .as_str()
            .unwrap()
            .contains("Spell Data"));
    }

    #[tokio::test]
    async fn test_legacy_fields_are_dropped() {
        let compendium = fixtures::spell_compendium();
        let mut legacy = fixtures::spell("spellSleep000001", "Sleep", "<p>Zzz.</p>");
        legacy["data"]["misfire"] = json!({"table": "old"});
        legacy["data"]["corruption"] = json!([]);
        compendium.write_pack(SPELLS_PATH, &[legacy]);

        run(&compendium).await;

        let sleep = compendium.find_document(SPELLS_PATH, "Sleep");
        assert!(sleep["data"].get("misfire").is_none());
        assert!(sleep["data"].get("corruption").is_none());
        assert_eq!(sleep["data"]["level"], 1);
    }
}

mod idempotence_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_second_run_writes_nothing() {
        let compendium = fixtures::spell_compendium();
        let first = run(&compendium).await;
        assert!(first.writes() > 0);

        let snapshot = [
            compendium.read(SPELLS_PATH),
            compendium.read(TABLES_PATH),
            compendium.read(SPELL_JOURNALS_PATH),
        ];

        let second = run(&compendium).await;
        assert_eq!(second.writes(), 0, "actions: {:?}", second.actions);
        assert!(second.actions.is_empty());
        assert_eq!(
            [
                compendium.read(SPELLS_PATH),
                compendium.read(TABLES_PATH),
                compendium.read(SPELL_JOURNALS_PATH),
            ],
            snapshot
        );
    }

    #[tokio::test]
    async fn test_written_packages_are_compacted() {
        let compendium = fixtures::spell_compendium();
        let report = run(&compendium).await;

        let compacted: Vec<&str> = report
            .actions
            .iter()
            .filter(|action| matches!(action, SyncAction::Compacted { .. }))
            .map(|action| action.package())
            .collect();
        assert_eq!(compacted.len(), 3);
        assert!(compacted.contains(&SPELL_PACK));

        // One line per live document after compaction
        assert_eq!(compendium.pack_lines(TABLES_PATH).len(), 3);
        assert_eq!(compendium.pack_lines(SPELLS_PATH).len(), 2);
    }
}

mod synthesis_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_journal_created_once_for_spells_sharing_a_slug() {
        let compendium = fixtures::spell_compendium();
        compendium.write_pack(
            SPELLS_PATH,
            &[
                fixtures::spell("spellMagicMiss01", "Magic Missile", "<p>One.</p>"),
                fixtures::spell("spellMagicMiss02", "Magic-Missile", "<p>Two.</p>"),
            ],
        );

        let report = run(&compendium).await;
        assert!(report.success());

        let created: Vec<_> = report
            .actions
            .iter()
            .filter(|action| matches!(action, SyncAction::Created { .. }))
            .collect();
        assert_eq!(created.len(), 1);

        let journals = compendium.pack_documents(SPELL_JOURNALS_PATH);
        assert_eq!(journals.len(), 1);

        // The second spell found the journal made for the first and links it
        let second = compendium.find_document(SPELLS_PATH, "Magic-Missile");
        assert!(
            second["data"]["description"]["value"]
                .as_str()
                .unwrap()
                .ends_with(JOURNAL_LINK)
        );
    }

    #[tokio::test]
    async fn test_missing_journal_pack_disables_synthesis() {
        let compendium = fixtures::spell_compendium();
        compendium.write_settings("[spells]\njournal_pack = \"not-in-manifest\"\n");

        let report = run(&compendium).await;
        assert!(report.success());
        assert!(compendium.pack_documents(SPELL_JOURNALS_PATH).is_empty());

        let spell = compendium.find_document(SPELLS_PATH, "Magic Missile");
        assert_eq!(spell["data"]["description"]["value"], "<p>A missile of force.</p>");
        assert_eq!(spell["data"]["results"]["table"], "Magic Missile");
    }
}

mod failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_malformed_override_fails_only_that_spell() {
        let compendium = fixtures::spell_compendium();
        compendium.write_override(SPELL_PACK, "magic-missile", "img: [unclosed\n");
        compendium.write_override(SPELL_PACK, "sleep", "img: icons/spells/sleep.webp\n");

        let report = run(&compendium).await;

        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].document, "Magic Missile (spellMagicMiss01)");
        assert_eq!(
            compendium.find_document(SPELLS_PATH, "Sleep")["img"],
            "icons/spells/sleep.webp"
        );
        assert!(compendium.pack_documents(SPELL_JOURNALS_PATH).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_pack_pattern_is_a_config_error() {
        let compendium = fixtures::spell_compendium();
        compendium.write_settings("[spells]\npack_pattern = \"(\"\n");

        let err = Workspace::load(compendium.root()).unwrap_err();
        assert!(err.is_config());
    }
}

mod dry_run_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_dry_run_reports_writes_without_touching_files() {
        let compendium = fixtures::spell_compendium();
        let before = [
            compendium.read(SPELLS_PATH),
            compendium.read(TABLES_PATH),
            compendium.read(SPELL_JOURNALS_PATH),
        ];

        let workspace = Workspace::load(compendium.root()).unwrap();
        let report = import_spells(&workspace, SyncOptions { dry_run: true })
            .await
            .unwrap();

        assert!(report.dry_run);
        assert!(report.writes() > 0);
        assert_eq!(
            [
                compendium.read(SPELLS_PATH),
                compendium.read(TABLES_PATH),
                compendium.read(SPELL_JOURNALS_PATH),
            ],
            before
        );
    }
}
