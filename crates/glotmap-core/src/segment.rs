//! Word segmentation for Japanese tag text.
//!
//! Japanese source text carries no spaces, so the normalizer needs a
//! segmentation step before tags can act as stable embedding-space keys.
//! The default implementation splits at Unicode script-class boundaries
//! (kanji / hiragana / katakana / latin), which is deterministic and
//! dictionary-free. `Segmenter` is a seam: a dictionary-based tokenizer
//! can be swapped in without touching the normalizer.

/// A word segmenter for space-less scripts.
pub trait Segmenter {
    /// Insert word boundaries into `text`, returning space-separated output.
    fn segment(&self, text: &str) -> String;
}

/// Script class of a single char, for boundary detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Han,
    Hiragana,
    Katakana,
    Latin,
    Other,
}

fn script_of(c: char) -> Script {
    match c {
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' => Script::Han,
        '\u{3040}'..='\u{309F}' => Script::Hiragana,
        // Includes the prolonged sound mark and the katakana middle dot
        // block; the middle dot itself is scrubbed before segmentation.
        '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => Script::Katakana,
        _ if c.is_ascii_alphanumeric() => Script::Latin,
        _ => Script::Other,
    }
}

/// Default segmenter: one boundary per script-class transition.
///
/// Idempotent -- existing spaces reset the run, so already-segmented text
/// passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptSegmenter;

impl Segmenter for ScriptSegmenter {
    fn segment(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + 8);
        let mut prev: Option<Script> = None;
        for c in text.chars() {
            if c.is_whitespace() {
                out.push(c);
                prev = None;
                continue;
            }
            let script = script_of(c);
            if let Some(p) = prev {
                if p != script {
                    out.push(' ');
                }
            }
            out.push(c);
            prev = Some(script);
        }
        out
    }
}

/// Segment with the process-default segmenter.
pub fn segment(text: &str) -> String {
    ScriptSegmenter.segment(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_katakana_is_untouched() {
        assert_eq!(segment("ロック"), "ロック");
    }

    #[test]
    fn prolonged_sound_mark_stays_inside_katakana_run() {
        assert_eq!(segment("ヘヴィーメタル"), "ヘヴィーメタル");
    }

    #[test]
    fn splits_at_script_transitions() {
        assert_eq!(segment("宇多田ヒカル"), "宇多田 ヒカル");
        assert_eq!(segment("ヴィジュアル系"), "ヴィジュアル 系");
        assert_eq!(segment("jポップ"), "j ポップ");
    }

    #[test]
    fn existing_spaces_make_it_idempotent() {
        let once = segment("演歌ポップス");
        assert_eq!(segment(&once), once);
    }
}
