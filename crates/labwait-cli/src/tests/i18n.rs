// crates/labwait-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog parity and locale parsing.
// Purpose: Ensure CLI localization remains consistent across supported locales.
// Dependencies: labwait-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies the CLI message catalogs stay in sync, locale parsing is tolerant,
//! and locale templates preserve placeholder parity with English.

use std::collections::BTreeSet;

use crate::i18n::Locale;
use crate::i18n::MessageArg;
use crate::i18n::SUPPORTED_LOCALES;
use crate::i18n::catalog_entries_for;
use crate::i18n::catalog_for;
use crate::i18n::translate_for;

/// Collects `{name}` placeholders, rejecting malformed braces.
fn placeholder_names(template: &str) -> Result<BTreeSet<&str>, String> {
    let mut names = BTreeSet::new();
    let mut rest = template;
    while let Some(open) = rest.find(['{', '}']) {
        if rest[open ..].starts_with('}') {
            return Err(format!("unmatched '}}' in {template}"));
        }
        let after = &rest[open + 1 ..];
        let close = after.find('}').ok_or_else(|| format!("unclosed '{{' in {template}"))?;
        let name = &after[.. close];
        let valid = name.starts_with(|ch: char| ch.is_ascii_lowercase())
            && name.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_');
        if !valid {
            return Err(format!("placeholder '{name}' must use [a-z][a-z0-9_]* in {template}"));
        }
        names.insert(name);
        rest = &after[close + 1 ..];
    }
    Ok(names)
}

#[test]
fn catalogs_have_matching_keys() {
    let en_keys: BTreeSet<&'static str> = catalog_for(Locale::En).keys().copied().collect();
    for locale in SUPPORTED_LOCALES {
        let locale_keys: BTreeSet<&'static str> = catalog_for(*locale).keys().copied().collect();
        assert_eq!(en_keys, locale_keys, "locale catalogs must stay in parity ({locale:?})");
    }
}

#[test]
fn catalogs_have_unique_keys_per_locale() {
    for locale in SUPPORTED_LOCALES {
        let entries = catalog_entries_for(*locale);
        let unique: BTreeSet<&str> = entries.iter().map(|(key, _)| *key).collect();
        assert_eq!(unique.len(), entries.len(), "duplicate catalog keys ({locale:?})");
    }
}

#[test]
fn catalogs_have_placeholder_parity_with_english() {
    for (key, en_template) in catalog_entries_for(Locale::En) {
        let en = placeholder_names(en_template).expect("valid English template");
        for locale in SUPPORTED_LOCALES {
            let template = catalog_for(*locale)
                .get(key)
                .copied()
                .unwrap_or_else(|| panic!("missing key '{key}' in locale {locale:?}"));
            let localized = placeholder_names(template)
                .unwrap_or_else(|error| panic!("invalid template for '{key}' ({locale:?}): {error}"));
            assert_eq!(en, localized, "placeholder mismatch for '{key}' ({locale:?})");
        }
    }
}

#[test]
fn catalan_differs_for_curated_keys() {
    for key in ["config.validate.ok", "wait.timed_out", "i18n.disclaimer.machine_translated"] {
        let en = catalog_for(Locale::En).get(key).copied().expect("en key exists");
        let ca = catalog_for(Locale::Ca).get(key).copied().expect("ca key exists");
        assert_ne!(en, ca, "Catalan must differ from English for '{key}'");
    }
}

#[test]
fn locale_parse_accepts_region_tags_and_case() {
    assert_eq!(Locale::parse("EN"), Some(Locale::En));
    assert_eq!(Locale::parse("en-US"), Some(Locale::En));
    assert_eq!(Locale::parse("ca_ES"), Some(Locale::Ca));
    assert_eq!(Locale::parse(" ca "), Some(Locale::Ca));
    assert_eq!(Locale::parse(""), None);
    assert_eq!(Locale::parse("de"), None);
    assert_eq!(Locale::Ca.as_str(), "ca");
}

#[test]
fn translate_for_substitutes_and_falls_back() {
    let rendered =
        translate_for(Locale::Ca, "wait.timed_out", vec![MessageArg::new("error", "massa lent")]);
    assert_eq!(rendered, "Temps esgotat: massa lent");

    assert_eq!(translate_for(Locale::Ca, "missing.key", Vec::new()), "missing.key");
}
