//! Lexical Skill Matcher — whole-word / whole-phrase catalog scan.

use std::collections::HashSet;

use crate::analysis::catalog::SkillCatalog;

/// Upper bound on skills extracted from a single text source.
pub const MAX_SOURCE_SKILLS: usize = 20;

/// Ordered, case-insensitively deduplicated display-form skills.
pub type SkillSet = Vec<String>;

/// Scans `text` for every catalog phrase, in catalog order.
///
/// `text` is expected to be lowercase (output of `normalize` or
/// `prepare_for_matching`).
pub fn match_skills(text: &str, catalog: &SkillCatalog) -> SkillSet {
    let mut seen = HashSet::new();
    let mut skills = Vec::new();

    for entry in catalog.entries() {
        if skills.len() == MAX_SOURCE_SKILLS {
            break;
        }
        if contains_phrase(text, &entry.phrase) && seen.insert(entry.display.to_lowercase()) {
            skills.push(entry.display.clone());
        }
    }

    skills
}

/// True when `phrase` occurs in `text` delimited by non-word characters.
///
/// A boundary is only required on an edge where the phrase itself ends in a word
/// character: `c++` is delimited by its own `+`, `java` needs a boundary so it is
/// not found inside `javascript`.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }

    let needs_left = phrase.chars().next().is_some_and(is_word_char);
    let needs_right = phrase.chars().next_back().is_some_and(is_word_char);

    // Occurrences may overlap, so a rejected hit only advances the search by one char.
    let step = phrase.chars().next().map_or(1, char::len_utf8);
    let mut from = 0;
    while let Some(offset) = text[from..].find(phrase) {
        let start = from + offset;
        let end = start + phrase.len();
        let left_ok = !needs_left || !text[..start].chars().next_back().is_some_and(is_word_char);
        let right_ok = !needs_right || !text[end..].chars().next().is_some_and(is_word_char);
        if left_ok && right_ok {
            return true;
        }
        from = start + step;
    }
    false
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive membership test over a skill set.
pub fn contains_skill(skills: &[String], skill: &str) -> bool {
    let needle = skill.to_lowercase();
    skills.iter().any(|s| s.to_lowercase() == needle)
}
