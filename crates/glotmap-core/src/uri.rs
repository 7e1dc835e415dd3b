//! Encyclopedia (DBPedia) URI name extraction.
//!
//! Two distinct rules, both carried over from the existing corpora:
//! - [`resource_name`] extracts the canonical resource name used to build
//!   raw tags at ingestion time (disambiguation suffix stripped).
//! - [`display_name`] produces the human-readable entity name emitted as
//!   search-index documents (underscores become spaces, suffix kept).

use std::sync::OnceLock;

use regex::Regex;

/// Path marker every resource URI carries.
const RESOURCE_MARKER: &str = "dbpedia.org/resource/";

fn resource_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Optional `ll:` prefix, scheme, optional locale subdomain, the
        // resource marker, then the name with an optional trailing
        // `_(disambiguation)` suffix excluded from the capture.
        Regex::new(r"^(?:\w{2}:)?https?://(?:\w{0,2}\.)?dbpedia\.org/resource/(.+?)(?:_?\(.+\))?$")
            .expect("resource uri pattern compiles")
    })
}

/// Extract the canonical resource name from an encyclopedia URI.
///
/// Returns `None` when the URI does not match the resource pattern, or
/// when the name would be empty.
pub fn resource_name(uri: &str) -> Option<String> {
    let captures = resource_re().captures(uri.trim())?;
    let name = captures.get(1)?.as_str();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Extract the display name from a resource URI: everything after the
/// resource marker, with underscores replaced by spaces.
pub fn display_name(uri: &str) -> String {
    let name = match uri.find(RESOURCE_MARKER) {
        Some(idx) => &uri[idx + RESOURCE_MARKER.len()..],
        None => uri,
    };
    name.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_resource_names() {
        assert_eq!(
            resource_name("http://dbpedia.org/resource/Rock").as_deref(),
            Some("Rock")
        );
        assert_eq!(
            resource_name("https://fr.dbpedia.org/resource/Rock_progressif").as_deref(),
            Some("Rock_progressif")
        );
    }

    #[test]
    fn strips_disambiguation_suffix() {
        assert_eq!(
            resource_name("http://dbpedia.org/resource/Rock_(music)").as_deref(),
            Some("Rock")
        );
        assert_eq!(
            resource_name("http://en.dbpedia.org/resource/Pop_(genre_musical)").as_deref(),
            Some("Pop")
        );
    }

    #[test]
    fn accepts_locale_qualified_uris() {
        assert_eq!(
            resource_name("ja:http://ja.dbpedia.org/resource/ロック").as_deref(),
            Some("ロック")
        );
    }

    #[test]
    fn rejects_non_resource_uris() {
        assert_eq!(resource_name("http://example.org/Rock"), None);
        assert_eq!(resource_name("not a uri"), None);
        assert_eq!(resource_name(""), None);
    }

    #[test]
    fn display_name_keeps_suffix_and_replaces_underscores() {
        assert_eq!(
            display_name("http://dbpedia.org/resource/Daft_Punk"),
            "Daft Punk"
        );
        assert_eq!(
            display_name("http://fr.dbpedia.org/resource/Air_(groupe)"),
            "Air (groupe)"
        );
    }
}
