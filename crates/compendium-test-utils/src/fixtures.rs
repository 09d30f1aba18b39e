//! A small spell compendium shared by pipeline tests.
//!
//! Layout:
//!
//! | package                   | entity       | path                     |
//! |---------------------------|--------------|--------------------------|
//! | `dcc-core-spells-wizard`  | Item         | `packs/spells-wizard.db` |
//! | `dcc-core-spell-tables`   | RollTable    | `packs/spell-tables.db`  |
//! | `dcc-core-spell-journals` | JournalEntry | `packs/spell-journals.db`|
//! | `dcc-core-text`           | JournalEntry | `packs/text.db`          |
//! | `dcc-core-scenes`         | Scene        | `packs/scenes.db`        |
//! | `dcc-core-actors`         | Actor        | `packs/actors.db`        |
//! | `dcc-core-macros`         | Macro        | `packs/macros.db`        |

use serde_json::{Value, json};

use crate::TestCompendium;

pub const NAMESPACE: &str = "dcc-core-book";

pub const SPELL_PACK: &str = "dcc-core-spells-wizard";
pub const TABLE_PACK: &str = "dcc-core-spell-tables";
pub const SPELL_JOURNAL_PACK: &str = "dcc-core-spell-journals";
pub const TEXT_PACK: &str = "dcc-core-text";
pub const SCENE_PACK: &str = "dcc-core-scenes";
pub const ACTOR_PACK: &str = "dcc-core-actors";

pub const SPELLS_PATH: &str = "packs/spells-wizard.db";
pub const TABLES_PATH: &str = "packs/spell-tables.db";
pub const SPELL_JOURNALS_PATH: &str = "packs/spell-journals.db";
pub const TEXT_PATH: &str = "packs/text.db";
pub const SCENES_PATH: &str = "packs/scenes.db";
pub const ACTORS_PATH: &str = "packs/actors.db";
pub const MACROS_PATH: &str = "packs/macros.db";

/// Write the manifest of the standard layout.
pub fn write_spell_manifest(compendium: &TestCompendium) {
    compendium.write_manifest(
        NAMESPACE,
        &[
            (SPELL_PACK, "Item", SPELLS_PATH),
            (TABLE_PACK, "RollTable", TABLES_PATH),
            (SPELL_JOURNAL_PACK, "JournalEntry", SPELL_JOURNALS_PATH),
            (TEXT_PACK, "JournalEntry", TEXT_PATH),
            (SCENE_PACK, "Scene", SCENES_PATH),
            (ACTOR_PACK, "Actor", ACTORS_PATH),
            ("dcc-core-macros", "Macro", MACROS_PATH),
        ],
    );
}

/// A spell item as stored before import.
pub fn spell(id: &str, name: &str, description: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "type": "spell",
        "img": "icons/svg/book.svg",
        "data": {
            "level": 1,
            "range": "150'",
            "duration": "Instantaneous",
            "castingTime": "1 action",
            "save": "None",
            "page": 144,
            "description": {"value": description}
        }
    })
}

/// A roll table with the given `(min, max, text)` results.
pub fn table(id: &str, name: &str, results: &[(i64, i64, &str)]) -> Value {
    let results: Vec<Value> = results
        .iter()
        .map(|(min, max, text)| json!({"range": [min, max], "text": text, "weight": 1}))
        .collect();
    json!({
        "_id": id,
        "name": name,
        "formula": "1d20",
        "replacement": true,
        "results": results
    })
}

/// A journal entry.
pub fn journal(id: &str, name: &str, content: &str) -> Value {
    json!({"_id": id, "name": name, "sort": 100, "content": content})
}

/// A scene with the given `(note id, entry id, journal name)` notes.
pub fn scene(id: &str, name: &str, notes: &[(&str, &str, Option<&str>)]) -> Value {
    let notes: Vec<Value> = notes
        .iter()
        .map(|(note_id, entry_id, journal_name)| match journal_name {
            Some(journal_name) => json!({
                "_id": note_id,
                "entryId": entry_id,
                "flags": {"dcc": {"journalName": journal_name}}
            }),
            None => json!({"_id": note_id, "entryId": entry_id}),
        })
        .collect();
    json!({"_id": id, "name": name, "notes": notes})
}

/// Write the standard spell compendium: two wizard spells, the Magic Missile
/// tables, an empty spell journal pack and a Magic Missile override.
///
/// Magic Missile's stored description still carries footers from an earlier
/// import; Sleep has neither tables nor an override.
pub fn spell_compendium() -> TestCompendium {
    let compendium = TestCompendium::new();
    write_spell_manifest(&compendium);

    compendium.write_pack(
        SPELLS_PATH,
        &[
            spell(
                "spellMagicMiss01",
                "Magic Missile",
                "<p>A missile of force.</p><br><p><strong>Spell Data:</strong> @Compendium[dcc-core-book.dcc-core-spell-journals.Magic Missile]{Magic Missile}</p>",
            ),
            spell("spellSleep000001", "Sleep", "<p>Zzz.</p>"),
        ],
    );
    compendium.write_pack(
        TABLES_PATH,
        &[
            table(
                "tableMagicMiss01",
                "Magic Missile",
                &[(1, 11, "Lost."), (12, 13, "One missile."), (14, 20, "Many missiles.")],
            ),
            table(
                "tableMagicMiss02",
                "Magic Missile Manifestation",
                &[(1, 1, "A glowing arrow."), (2, 4, "A fist.")],
            ),
            table("tableMagicMiss03", "Magic Missile Misfire", &[(0, 5, "Boom.")]),
        ],
    );
    compendium.write_pack(SPELL_JOURNALS_PATH, &[]);
    compendium.write_override(
        SPELL_PACK,
        "magic-missile",
        "img: icons/spells/magic-missile.webp\n",
    );

    compendium
}
