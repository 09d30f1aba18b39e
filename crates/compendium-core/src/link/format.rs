//! HTML rendering of spell content
//!
//! Output here is compared byte-for-byte against what is already stored in
//! packages, so whitespace and markup must not drift between releases.

use serde_json::Value;

use crate::document::{Document, RollTable, TableResult};
use crate::registry::RegistryEntry;

use super::fragments::Footer;

/// Stat fields rendered under a spell heading, as (label, path under `data`).
const STAT_FIELDS: [(&str, &str); 6] = [
    ("Level", "level"),
    ("Range", "range"),
    ("Duration", "duration"),
    ("Casting Time", "castingTime"),
    ("Save", "save"),
    ("Page", "page"),
];

/// Registered documents a spell links to.
#[derive(Debug, Clone, Default)]
pub struct SpellLinks {
    pub results: Option<RegistryEntry>,
    pub manifestation: Option<RegistryEntry>,
    pub misfire: Option<RegistryEntry>,
    pub corruption: Option<RegistryEntry>,
    pub journal: Option<RegistryEntry>,
}

impl SpellLinks {
    /// Linked tables with the footer each one renders under, in the order
    /// they appear in journal content.
    pub fn tables(&self) -> impl Iterator<Item = (Footer, &RegistryEntry)> {
        [
            (Footer::Manifestation, self.manifestation.as_ref()),
            (Footer::Misfire, self.misfire.as_ref()),
            (Footer::Corruption, self.corruption.as_ref()),
            (Footer::Results, self.results.as_ref()),
        ]
        .into_iter()
        .filter_map(|(footer, entry)| entry.map(|entry| (footer, entry)))
    }
}

/// Renders links and HTML fragments for one manifest namespace.
#[derive(Debug, Clone)]
pub struct Formatter {
    namespace: String,
}

impl Formatter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// `<namespace>.<package>`, the collection a link points into.
    pub fn collection(&self, entry: &RegistryEntry) -> String {
        entry.package.collection(&self.namespace)
    }

    /// `@Compendium[<namespace>.<package>.<name>]{<name>}`
    pub fn link(&self, entry: &RegistryEntry) -> String {
        let name = entry.name();
        format!("@Compendium[{}.{}]{{{}}}", self.collection(entry), name, name)
    }

    pub fn field(name: &str, value: &str) -> String {
        format!("<p><strong>{name}:</strong> {value}</p>")
    }

    /// Render a roll table as a two column HTML table.
    pub fn table(table: &RollTable, heading: &str) -> String {
        let mut html = format!(
            "<table border=\"1\" cellspacing=\"0\">\n\
             <colgroup width=\"34\"></colgroup> \n\
             <colgroup width=\"365\"></colgroup>\n\
             <tbody>\n\
             <tr>\n\
             <td align=\"left\" height=\"17\"><strong>[[/roll {}]]</strong></td>\n\
             <td align=\"left\"><strong>{}</td>\n\
             </tr>",
            table.formula, heading
        );

        let last = table.results.len().saturating_sub(1);
        for (index, result) in table.results.iter().enumerate() {
            html.push_str(&format!(
                "<tr>\n<td align=\"left\" height=\"17\">{}</td>\n<td align=\"left\">{}</td>\n</tr>",
                format_range(result, index == last),
                result.text
            ));
        }

        html.push_str("</tbody></table>");
        html
    }

    /// `<h1>NAME</h1>`, the six stat fields and a trailing `<br>`.
    pub fn stat_header(spell: &Document) -> String {
        let mut html = format!("<h1>{}</h1>", spell.name().unwrap_or_default());
        for (label, key) in STAT_FIELDS {
            let value = spell
                .get_path(&format!("data.{key}"))
                .map(display_value)
                .unwrap_or_default();
            html.push_str(&Self::field(label, &value));
        }
        html.push_str("<br>");
        html
    }

    /// Description shown on the spell item itself.
    pub fn item_description(&self, description: &str, links: &SpellLinks) -> String {
        let mut html = description.to_string();
        self.push_spell_data(&mut html, links);
        html
    }

    /// Description stored on the spell's results table.
    pub fn table_description(
        &self,
        description: &str,
        spell: &Document,
        links: &SpellLinks,
    ) -> String {
        let mut html = Self::stat_header(spell);
        html.push_str(description);
        self.push_spell_data(&mut html, links);
        html
    }

    /// Content of the spell's journal entry.
    ///
    /// Tables that fail to parse as roll tables are rendered without rows.
    pub fn journal_content(
        &self,
        description: &str,
        spell: &Document,
        links: &SpellLinks,
    ) -> String {
        let mut html = Self::stat_header(spell);
        html.push_str(description);

        for (footer, entry) in links.tables() {
            let table = entry.document.payload::<RollTable>().unwrap_or_else(|e| {
                tracing::warn!(table = %entry.document.label(), error = %e, "Unreadable roll table");
                RollTable {
                    formula: String::new(),
                    results: Vec::new(),
                }
            });
            html.push_str("<br>");
            html.push_str(&Self::field(footer.label(), &self.link(entry)));
            html.push_str("<br>");
            html.push_str(&Self::table(&table, footer.table_heading()));
        }
        html
    }

    fn push_spell_data(&self, html: &mut String, links: &SpellLinks) {
        if let Some(journal) = &links.journal {
            html.push_str("<br>");
            html.push_str(&Self::field(Footer::SpellData.label(), &self.link(journal)));
        }
    }
}

/// Range cell of a result row.
///
/// The minimum is floored at 1. A single-value range shows one number, and
/// the last row of a multi-value range is open ended (`min+`).
pub fn format_range(result: &TableResult, is_last: bool) -> String {
    let [min, max] = result.range;
    let min = min.max(1);
    if min == max {
        min.to_string()
    } else if is_last {
        format!("{min}+")
    } else {
        format!("{min} - {max}")
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
