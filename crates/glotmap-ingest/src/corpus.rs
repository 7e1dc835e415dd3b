//! Corpus file loaders.
//!
//! Three read-only inputs, delimiter conventions preserved for
//! compatibility with existing corpora:
//! - tag corpus: csv, `id` column then one column per locale, each cell a
//!   bracketed list literal of encyclopedia URIs
//! - entity corpus: `externalKey<TAB>URI` lines
//! - language list: `code,label` lines

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use glotmap_core::{uri, Error, Locale, Result};

/// `external key -> locale -> raw locale-qualified tags`, corpus order.
pub type TagCorpus = BTreeMap<String, BTreeMap<Locale, Vec<String>>>;

/// `external key -> locale -> source URI`.
pub type EntityCorpus = BTreeMap<String, BTreeMap<Locale, String>>;

/// Load the tabular tag corpus.
///
/// Cell URIs are converted to raw tags via the resource-name rule
/// (`http://dbpedia.org/resource/Rock` under column `en` becomes
/// `en:Rock`); URIs with no extractable name are skipped. Empty cells
/// mean "no tags in this locale". Malformed rows are fatal.
pub fn load_tag_corpus(path: &Path) -> Result<TagCorpus> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Corpus(format!("{}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| Error::Corpus(format!("{}: {e}", path.display())))?
        .clone();
    let locales: Vec<Locale> = headers
        .iter()
        .skip(1)
        .map(|code| {
            Locale::new(code).map_err(|_| {
                Error::Corpus(format!("{}: bad locale column {code:?}", path.display()))
            })
        })
        .collect::<Result<_>>()?;

    let mut corpus = TagCorpus::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::Corpus(format!("{}: {e}", path.display())))?;
        let external = record
            .get(0)
            .ok_or_else(|| Error::Corpus(format!("{}: empty row {line}", path.display())))?
            .to_string();

        let entry = corpus.entry(external).or_default();
        for (locale, cell) in locales.iter().zip(record.iter().skip(1)) {
            let tags = entry.entry(locale.clone()).or_default();
            if cell.trim().is_empty() {
                continue;
            }
            for item in parse_list_literal(cell).map_err(|e| {
                Error::Corpus(format!("{}: row {line}, locale {locale}: {e}", path.display()))
            })? {
                if let Some(name) = uri::resource_name(&item) {
                    tags.push(format!("{locale}:{name}"));
                }
            }
        }
    }
    Ok(corpus)
}

/// Load the line-oriented entity corpus (`externalKey<TAB>URI`).
///
/// The URI's locale is its subdomain (chars 7..9 of `http://xx.`); bare
/// `dbpedia.org` URIs are English.
pub fn load_entity_corpus(path: &Path) -> Result<EntityCorpus> {
    let content =
        fs::read_to_string(path).map_err(|e| Error::Corpus(format!("{}: {e}", path.display())))?;

    let mut entities = EntityCorpus::new();
    for (line, raw) in content.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let (external, uri) = raw
            .split_once('\t')
            .ok_or_else(|| Error::Corpus(format!("{}: line {line}: missing tab", path.display())))?;
        let code = match uri.get(7..9) {
            Some("db") => "en",
            Some(code) => code,
            None => {
                return Err(Error::Corpus(format!(
                    "{}: line {line}: uri too short: {uri:?}",
                    path.display()
                )))
            }
        };
        let locale = Locale::new(code).map_err(|_| {
            Error::Corpus(format!("{}: line {line}: bad locale in uri {uri:?}", path.display()))
        })?;
        entities
            .entry(external.to_string())
            .or_default()
            .insert(locale, uri.to_string());
    }
    Ok(entities)
}

/// Load the `code,label` locale list, preserving line order.
pub fn load_languages(path: &Path) -> Result<Vec<(Locale, String)>> {
    let content =
        fs::read_to_string(path).map_err(|e| Error::Corpus(format!("{}: {e}", path.display())))?;

    let mut languages = Vec::new();
    for (line, raw) in content.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let (code, label) = raw
            .split_once(',')
            .ok_or_else(|| Error::Corpus(format!("{}: line {line}: missing comma", path.display())))?;
        let locale = Locale::new(code.trim()).map_err(|_| {
            Error::Corpus(format!("{}: line {line}: bad locale {code:?}", path.display()))
        })?;
        languages.push((locale, label.trim().to_string()));
    }
    Ok(languages)
}

/// Parse a bracketed list literal of quoted strings, as emitted by the
/// corpus preparation scripts: `['http://a', "http://b"]`. Both quote
/// styles and backslash escapes are accepted.
fn parse_list_literal(cell: &str) -> std::result::Result<Vec<String>, String> {
    let mut chars = cell.trim().chars().peekable();
    if chars.next() != Some('[') {
        return Err("expected `[`".to_string());
    }

    let mut items = Vec::new();
    loop {
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() || c == ',' {
                chars.next();
            } else {
                break;
            }
        }
        match chars.next() {
            Some(']') => break,
            Some(quote @ ('\'' | '"')) => {
                let mut item = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some(escaped) => item.push(escaped),
                            None => return Err("dangling escape".to_string()),
                        },
                        Some(c) if c == quote => break,
                        Some(c) => item.push(c),
                        None => return Err("unterminated string".to_string()),
                    }
                }
                items.push(item);
            }
            Some(c) => return Err(format!("unexpected char {c:?}")),
            None => return Err("unterminated list".to_string()),
        }
    }

    if chars.any(|c| !c.is_whitespace()) {
        return Err("trailing garbage after `]`".to_string());
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn list_literal_accepts_both_quote_styles() {
        assert_eq!(
            parse_list_literal(r#"['http://a', "http://b"]"#).unwrap(),
            vec!["http://a", "http://b"]
        );
        assert_eq!(parse_list_literal("[]").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn list_literal_rejects_garbage() {
        assert!(parse_list_literal("http://a").is_err());
        assert!(parse_list_literal("['a'").is_err());
        assert!(parse_list_literal("['a'] x").is_err());
    }

    #[test]
    fn tag_corpus_maps_uris_to_locale_qualified_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "corpus.csv",
            concat!(
                "id,en,ja\n",
                "m0001,\"['http://dbpedia.org/resource/Rock', 'http://dbpedia.org/resource/Pop_(music)']\",\"['ja:http://ja.dbpedia.org/resource/ロック']\"\n",
                "m0002,,\n",
            ),
        );

        let corpus = load_tag_corpus(&path).unwrap();
        let en = Locale::new("en").unwrap();
        let ja = Locale::new("ja").unwrap();
        assert_eq!(corpus["m0001"][&en], vec!["en:Rock", "en:Pop"]);
        assert_eq!(corpus["m0001"][&ja], vec!["ja:ロック"]);
        assert!(corpus["m0002"][&en].is_empty());
    }

    #[test]
    fn tag_corpus_skips_unextractable_uris() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "corpus.csv",
            "id,en\nm0001,\"['http://example.org/nope']\"\n",
        );
        let corpus = load_tag_corpus(&path).unwrap();
        assert!(corpus["m0001"][&Locale::new("en").unwrap()].is_empty());
    }

    #[test]
    fn entity_corpus_derives_locale_from_subdomain() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "entities.csv",
            "m0001\thttp://dbpedia.org/resource/Daft_Punk\nm0001\thttp://ja.dbpedia.org/resource/ダフト・パンク\n",
        );

        let entities = load_entity_corpus(&path).unwrap();
        let en = Locale::new("en").unwrap();
        let ja = Locale::new("ja").unwrap();
        assert_eq!(entities["m0001"][&en], "http://dbpedia.org/resource/Daft_Punk");
        assert!(entities["m0001"][&ja].contains("ja.dbpedia.org"));
    }

    #[test]
    fn entity_corpus_rejects_lines_without_tab() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "entities.csv", "m0001 http://dbpedia.org/x\n");
        assert!(load_entity_corpus(&path).is_err());
    }

    #[test]
    fn languages_preserve_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "languages.csv", "en,English\nja,Japanese\n");
        let languages = load_languages(&path).unwrap();
        assert_eq!(languages[0].0.as_str(), "en");
        assert_eq!(languages[1].1, "Japanese");
    }

    #[test]
    fn missing_corpus_file_is_fatal() {
        assert!(load_tag_corpus(Path::new("/nonexistent/corpus.csv")).is_err());
        assert!(load_entity_corpus(Path::new("/nonexistent/entities.csv")).is_err());
        assert!(load_languages(Path::new("/nonexistent/languages.csv")).is_err());
    }
}
