//! Tag normalization.
//!
//! Canonicalizes a locale-qualified raw tag (`en:Hard-Rock`) into the
//! normalized identifier used as a similarity-table key (`en:hard rock`).
//! Pure and deterministic: the same raw tag always yields the same
//! normalized tag, and normalizing an already-normalized tag is a no-op.

use crate::error::Result;
use crate::segment;
use crate::types::{split_qualified, NormalizedTag};

/// Chars replaced by a single blank space.
const SPACE_CHARSET: &[char] = &['_', '-', '/', ',', '・'];

/// Chars removed outright, collapsing around them.
const REMOVE_CHARSET: &[char] = &['(', ')', ':', '.', '!', '$', '\'', '\u{2018}', '\u{2019}'];

/// Normalize a raw `ll:text` tag.
///
/// The text portion is lowercased, `SPACE_CHARSET` chars become spaces and
/// `REMOVE_CHARSET` chars are dropped; the locale prefix is untouched.
/// Japanese text is additionally word-segmented and right-trimmed, since
/// the source text carries no spaces of its own.
///
/// Fails with [`crate::Error::InvalidTagFormat`] when the input does not
/// have the `ll:text` shape.
pub fn normalize(tag: &str) -> Result<NormalizedTag> {
    let (locale, text) = split_qualified(tag)?;
    let lowered = text.to_lowercase();

    let mut scrubbed = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if SPACE_CHARSET.contains(&c) {
            scrubbed.push(' ');
        } else if !REMOVE_CHARSET.contains(&c) {
            scrubbed.push(c);
        }
    }

    if locale.as_str() == "ja" {
        scrubbed = segment::segment(&scrubbed);
        scrubbed.truncate(scrubbed.trim_end().len());
    }

    Ok(NormalizedTag(format!("{locale}:{scrubbed}")))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn lowercases_text_but_not_locale() {
        assert_eq!(normalize("en:Rock").unwrap().as_str(), "en:rock");
    }

    #[test]
    fn space_charset_becomes_spaces() {
        assert_eq!(
            normalize("en:Hard_Rock/Blues-Rock,Jazz").unwrap().as_str(),
            "en:hard rock blues rock jazz"
        );
    }

    #[test]
    fn remove_charset_is_dropped() {
        assert_eq!(
            normalize("en:Rock_(music)").unwrap().as_str(),
            "en:rock music"
        );
        assert_eq!(
            normalize("fr:Rock'n'roll!").unwrap().as_str(),
            "fr:rocknroll"
        );
    }

    #[test]
    fn curly_apostrophes_are_dropped_too() {
        assert_eq!(normalize("en:Rock\u{2019}n").unwrap().as_str(), "en:rockn");
    }

    #[test]
    fn japanese_tags_are_segmented() {
        assert_eq!(normalize("ja:ロック").unwrap().as_str(), "ja:ロック");
        assert_eq!(
            normalize("ja:ヴィジュアル系").unwrap().as_str(),
            "ja:ヴィジュアル 系"
        );
    }

    #[test]
    fn japanese_output_is_right_trimmed() {
        assert_eq!(normalize("ja:ロック・").unwrap().as_str(), "ja:ロック");
    }

    #[test]
    fn malformed_tags_are_rejected() {
        for bad in ["rock", "en", "en-rock", "E:rock", ""] {
            assert!(normalize(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    proptest! {
        /// Normalization reaches a fixed point after one application.
        #[test]
        fn normalize_is_a_fixed_point(locale in "(en|fr|ja|es)", text in "\\PC{0,40}") {
            let tag = format!("{locale}:{text}");
            if let Ok(once) = normalize(&tag) {
                let twice = normalize(once.as_str()).unwrap();
                prop_assert_eq!(once, twice);
            }
        }

        /// Output never contains scrubbed punctuation in the text portion.
        #[test]
        fn normalized_text_is_clean(text in "\\PC{0,40}") {
            let normalized = normalize(&format!("en:{text}")).unwrap();
            let body = &normalized.as_str()[3..];
            for c in body.chars() {
                prop_assert!(!SPACE_CHARSET.contains(&c));
                prop_assert!(!REMOVE_CHARSET.contains(&c));
            }
        }
    }
}
