//! Display-name normalization used as the cross-reference key
//!
//! `slugify` lowercases, transliterates Latin accents and a few symbols
//! (`$` becomes `dollar`, `&` becomes `and`), drops every other character
//! outside `[A-Za-z0-9]` and whitespace, and joins the remaining words with
//! `-`. Replacements are spliced in without spaces, so `"$5"` is `dollar5`.
//! Hyphens in the input count as word separators, so
//! `"Magic Missile - Misfire"` and `"magic missile misfire"` share a slug.

use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s]").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Replacement text for characters the slug keeps in some other form.
///
/// Covers Latin-1, the Latin Extended-A letters and the currency and symbol
/// names the content has used. Anything else outside `[A-Za-z0-9]` and
/// whitespace is dropped by the slug.
fn transliterate(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ª' => "a",
        'Æ' => "AE",
        'æ' => "ae",
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "C",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'Ð' | 'Ď' | 'Đ' => "D",
        'ð' | 'ď' | 'đ' => "d",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĥ' | 'Ħ' => "H",
        'ĥ' | 'ħ' => "h",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ĳ' => "IJ",
        'ĳ' => "ij",
        'Ĵ' => "J",
        'ĵ' => "j",
        'Ķ' => "K",
        'ķ' | 'ĸ' => "k",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "L",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' | 'Ŋ' => "N",
        'ñ' | 'ń' | 'ņ' | 'ň' | 'ŉ' | 'ŋ' => "n",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => "O",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' | 'º' => "o",
        'Œ' => "OE",
        'œ' => "oe",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => "S",
        'ś' | 'ŝ' | 'ş' | 'š' | 'ſ' => "s",
        'ß' => "ss",
        'Ţ' | 'Ť' | 'Ŧ' => "T",
        'ţ' | 'ť' | 'ŧ' => "t",
        'Þ' => "TH",
        'þ' => "th",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ŵ' => "W",
        'ŵ' => "w",
        'Ý' | 'Ŷ' | 'Ÿ' => "Y",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'ź' | 'ż' | 'ž' => "z",
        '$' => "dollar",
        '%' => "percent",
        '&' => "and",
        '<' => "less",
        '>' => "greater",
        '|' => "or",
        '¢' => "cent",
        '£' => "pound",
        '¤' => "currency",
        '¥' => "yen",
        '€' => "euro",
        '©' => "c",
        '®' => "r",
        '∞' => "infinity",
        '♥' => "love",
        '-' => " ",
        _ => return None,
    };
    Some(mapped)
}

/// Normalize a display name into its lookup slug.
pub fn slugify(name: &str) -> String {
    let mut mapped = String::with_capacity(name.len());
    for ch in name.chars() {
        match transliterate(ch) {
            Some(replacement) => mapped.push_str(replacement),
            None => mapped.push(ch),
        }
    }

    let stripped = NON_ALPHANUMERIC.replace_all(&mapped, "");
    WHITESPACE_RUN
        .replace_all(stripped.trim(), "-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Magic Missile", "magic-missile")]
    #[case("Magic Missile - Manifestation", "magic-missile-manifestation")]
    #[case("The Lightning Lord's Lament", "the-lightning-lords-lament")]
    #[case("  Sleep  ", "sleep")]
    #[case("Fire & Ice", "fire-and-ice")]
    #[case("Éclair d'Arcane", "eclair-darcane")]
    #[case("Room 1-3: Vestibule", "room-1-3-vestibule")]
    #[case("???", "")]
    #[case("Łukasz's Ward", "lukaszs-ward")]
    #[case("Cost: 5$", "cost-5dollar")]
    #[case("100% Luck", "100percent-luck")]
    #[case("A < B > C", "a-less-b-greater-c")]
    #[case("Œuvre of Þor", "oeuvre-of-thor")]
    #[case("Dvořák's Čantrip", "dvoraks-cantrip")]
    fn slugify_normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn distinct_names_can_collide() {
        assert_eq!(slugify("Magic-Missile"), slugify("magic missile!"));
    }
}
