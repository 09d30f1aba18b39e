//! Tests for the file-backed package store

use compendium_core::config::{EntityType, PackDescriptor};
use compendium_core::store::{ID_LENGTH, PackStore};
use compendium_core::{Document, Error};
use compendium_test_utils::TestCompendium;
use serde_json::json;

const PATH: &str = "packs/spells.db";

fn descriptor() -> PackDescriptor {
    PackDescriptor::new("spells", EntityType::Item, PATH)
}

fn doc(value: serde_json::Value) -> Document {
    Document::from_value(value).unwrap()
}

mod replay_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_replay_honours_supersession_and_tombstones() {
        let compendium = TestCompendium::new();
        compendium.write(
            PATH,
            concat!(
                "{\"_id\":\"aaaaaaaaaaaaaaa1\",\"name\":\"Sleep\",\"data\":{\"level\":1}}\n",
                "{\"_id\":\"aaaaaaaaaaaaaaa2\",\"name\":\"Light\"}\n",
                "{\"$$indexCreated\":{\"fieldName\":\"name\",\"unique\":false}}\n",
                "{\"_id\":\"aaaaaaaaaaaaaaa1\",\"name\":\"Sleep\",\"data\":{\"level\":2}}\n",
                "{\"$$deleted\":true,\"_id\":\"aaaaaaaaaaaaaaa2\"}\n",
            ),
        );

        let store = PackStore::open(&descriptor(), compendium.root(), false)
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let sleep = store.get("aaaaaaaaaaaaaaa1").unwrap();
        assert_eq!(sleep.get_path("data.level"), Some(&json!(2)));
        assert!(store.get("aaaaaaaaaaaaaaa2").is_none());
    }

    #[tokio::test]
    async fn test_replay_fails_on_mostly_corrupt_log() {
        let compendium = TestCompendium::new();
        compendium.write(PATH, "{\"_id\":\"a\",\"name\":\"Sleep\"}\nnot json\n{broken\n");

        let err = PackStore::open(&descriptor(), compendium.root(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CorruptLog { corrupt: 2, total: 3, .. }));
    }

    #[tokio::test]
    async fn test_unnamed_documents_are_not_content() {
        let compendium = TestCompendium::new();
        compendium.write_pack(
            PATH,
            &[
                json!({"_id": "a", "name": "Sleep"}),
                json!({"_id": "b", "folder": true}),
            ],
        );

        let store = PackStore::open(&descriptor(), compendium.root(), false)
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
        let content = store.find_content();
        assert_eq!(content.len(), 1);
        assert_eq!(content[0].name(), Some("Sleep"));
    }
}

mod write_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_update_sets_fields_and_keeps_others() {
        let compendium = TestCompendium::new();
        compendium.write_pack(PATH, &[json!({"_id": "a", "name": "Sleep", "img": "old.webp"})]);
        let mut store = PackStore::open(&descriptor(), compendium.root(), false)
            .await
            .unwrap();

        let fields = json!({"img": "new.webp", "sort": 3});
        let replaced = store.update("a", fields.as_object().unwrap()).await.unwrap();
        assert_eq!(replaced, 1);

        let missing = store.update("zzz", fields.as_object().unwrap()).await.unwrap();
        assert_eq!(missing, 0);

        assert_eq!(
            compendium.find_document(PATH, "Sleep"),
            json!({"_id": "a", "name": "Sleep", "img": "new.webp", "sort": 3})
        );
    }

    #[tokio::test]
    async fn test_remove_writes_tombstone_once() {
        let compendium = TestCompendium::new();
        compendium.write_pack(PATH, &[json!({"_id": "a", "name": "Sleep"})]);
        let mut store = PackStore::open(&descriptor(), compendium.root(), false)
            .await
            .unwrap();

        assert_eq!(store.remove("a").await.unwrap(), 1);
        assert_eq!(store.remove("a").await.unwrap(), 0);

        let lines = compendium.pack_lines(PATH);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], json!({"$$deleted": true, "_id": "a"}));
        assert!(compendium.pack_documents(PATH).is_empty());
    }

    #[tokio::test]
    async fn test_insert_keeps_unused_id_and_replaces_taken_one() {
        let compendium = TestCompendium::new();
        compendium.write_pack(PATH, &[json!({"_id": "taken", "name": "Sleep"})]);
        let mut store = PackStore::open(&descriptor(), compendium.root(), false)
            .await
            .unwrap();

        let kept = store
            .insert(doc(json!({"_id": "fresh", "name": "Light"})))
            .await
            .unwrap();
        assert_eq!(kept, "fresh");

        let assigned = store
            .insert(doc(json!({"_id": "taken", "name": "Darkness"})))
            .await
            .unwrap();
        assert_ne!(assigned, "taken");
        assert_eq!(assigned.len(), ID_LENGTH);
        assert_eq!(store.get("taken").unwrap().name(), Some("Sleep"));
    }
}

mod compaction_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_compaction_leaves_one_line_per_live_document() {
        let compendium = TestCompendium::new();
        compendium.write_pack(
            PATH,
            &[
                json!({"_id": "a", "name": "Sleep"}),
                json!({"_id": "b", "name": "Light"}),
                json!({"_id": "a", "name": "Sleep", "img": "sleep.webp"}),
                json!({"$$deleted": true, "_id": "b"}),
                json!({"_id": "c", "name": "Darkness"}),
            ],
        );
        let store = PackStore::open(&descriptor(), compendium.root(), false)
            .await
            .unwrap();

        store.compact().await.unwrap();

        let lines = compendium.pack_lines(PATH);
        assert_eq!(
            lines,
            vec![
                json!({"_id": "a", "name": "Sleep", "img": "sleep.webp"}),
                json!({"_id": "c", "name": "Darkness"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_writes_after_compaction_append_to_the_snapshot() {
        let compendium = TestCompendium::new();
        compendium.write_pack(
            PATH,
            &[
                json!({"_id": "a", "name": "Sleep"}),
                json!({"_id": "a", "name": "Sleep", "sort": 2}),
            ],
        );
        let mut store = PackStore::open(&descriptor(), compendium.root(), false)
            .await
            .unwrap();

        store.compact().await.unwrap();
        store
            .insert(doc(json!({"_id": "b", "name": "Light"})))
            .await
            .unwrap();

        assert_eq!(
            compendium.pack_lines(PATH),
            vec![
                json!({"_id": "a", "name": "Sleep", "sort": 2}),
                json!({"_id": "b", "name": "Light"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_dry_run_store_never_touches_the_file() {
        let compendium = TestCompendium::new();
        compendium.write_pack(PATH, &[json!({"_id": "a", "name": "Sleep"})]);
        let before = compendium.read(PATH);

        let mut store = PackStore::open(&descriptor(), compendium.root(), true)
            .await
            .unwrap();
        store
            .insert(doc(json!({"name": "Light"})))
            .await
            .unwrap();
        store.remove("a").await.unwrap();
        store.compact().await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(compendium.read(PATH), before);
    }
}
