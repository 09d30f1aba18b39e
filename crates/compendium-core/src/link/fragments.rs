//! Derived footer fragments appended to authored descriptions
//!
//! Every footer the formatter emits is one line of the form
//! `<br><p><strong>LABEL:</strong> ...</p>`. Content already shipped in
//! packages carries these lines, so they stay in this exact shape on disk and
//! are recognized by label when stripped.

use std::sync::LazyLock;

use regex::Regex;

/// The kinds of derived footer a description can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footer {
    Results,
    Manifestation,
    Misfire,
    Corruption,
    SpellData,
}

impl Footer {
    /// Strip order; matches the order footers were historically removed in.
    pub const ALL: [Footer; 5] = [
        Footer::Results,
        Footer::Manifestation,
        Footer::Misfire,
        Footer::Corruption,
        Footer::SpellData,
    ];

    /// Label rendered inside `<strong>` for this footer.
    pub fn label(self) -> &'static str {
        match self {
            Self::Results => "Results",
            Self::Manifestation => "Manifestation",
            Self::Misfire => "Misfire",
            Self::Corruption => "Corruption",
            Self::SpellData => "Spell Data",
        }
    }

    /// Heading of the rendered roll table for table-backed footers.
    pub fn table_heading(self) -> &'static str {
        match self {
            Self::Results => "Spell Result",
            other => other.label(),
        }
    }

    fn pattern(self) -> String {
        // Older content pluralized the manifestation label
        let label = match self {
            Self::Manifestation => "Manifestations?".to_string(),
            other => regex::escape(other.label()),
        };
        format!(r"(?:<br>)?<p><strong>{label}:</strong> .*</p>")
    }
}

static FOOTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    Footer::ALL
        .iter()
        .map(|footer| Regex::new(&footer.pattern()).unwrap())
        .collect()
});

/// Remove every derived footer from `description` and trim the result.
///
/// Stripping a description the formatter produced from trimmed authored
/// text returns that authored text exactly. Leading or trailing whitespace
/// in the authored text does not survive: it comes back trimmed.
pub fn strip_derived(description: &str) -> String {
    let mut stripped = description.to_string();
    for pattern in FOOTER_PATTERNS.iter() {
        stripped = pattern.replace_all(&stripped, "").into_owned();
    }
    stripped.trim().to_string()
}
