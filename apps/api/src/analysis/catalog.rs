//! Skill Catalog — the vocabulary the lexical matcher scans for.
//!
//! Built once at startup (embedded list or CSV file) and shared read-only
//! across every analysis as `Arc<SkillCatalog>`.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

/// Embedded skills vocabulary, grouped by area.
const BUILTIN_PHRASES: &[&str] = &[
    // Programming languages
    "python", "java", "javascript", "typescript", "c++", "c#", "ruby", "php", "go", "rust",
    "swift", "kotlin",
    // Web development
    "html", "css", "react", "angular", "vue", "node.js", "node", "express", "django", "flask",
    "spring", "laravel",
    // Databases
    "sql", "mysql", "postgresql", "mongodb", "redis", "oracle", "sqlite", "database",
    // Cloud & DevOps
    "aws", "azure", "google cloud", "gcp", "docker", "kubernetes", "jenkins", "git", "ci/cd",
    "terraform",
    // Data science & ML
    "machine learning", "data science", "deep learning", "pandas", "numpy", "tensorflow",
    "pytorch", "scikit-learn", "data analysis", "statistics", "power bi", "tableau",
    // Mobile
    "android", "ios", "react native", "flutter",
    // Testing
    "testing", "unit testing", "test automation", "selenium", "jest", "pytest",
    // Soft skills
    "communication", "teamwork", "leadership", "problem solving", "project management",
    "agile", "scrum",
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("skill catalog unavailable at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },
}

/// Where the active catalog came from. Reported on `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Builtin,
    File,
    /// A configured file could not be loaded and the embedded list was substituted.
    Fallback,
}

/// A canonical skill phrase and the form shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillEntry {
    pub phrase: String,
    pub display: String,
}

#[derive(Debug, Clone)]
pub struct SkillCatalog {
    entries: Vec<SkillEntry>,
    source: CatalogSource,
}

impl SkillCatalog {
    /// The embedded vocabulary.
    pub fn builtin() -> Self {
        Self::from_phrases(BUILTIN_PHRASES.iter().copied(), CatalogSource::Builtin)
    }

    /// Builds a catalog from arbitrary phrases, skipping malformed and duplicate ones.
    pub fn from_phrases<'a>(
        phrases: impl IntoIterator<Item = &'a str>,
        source: CatalogSource,
    ) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for phrase in phrases {
            if !is_canonical_phrase(phrase) {
                warn!(phrase, "skipping malformed skill phrase");
                continue;
            }
            if !seen.insert(phrase.to_string()) {
                warn!(phrase, "skipping duplicate skill phrase");
                continue;
            }
            entries.push(SkillEntry {
                phrase: phrase.to_string(),
                display: display_form(phrase),
            });
        }

        Self { entries, source }
    }

    /// Loads one phrase per CSV record (first field, no header row, `#` comments).
    pub fn from_csv_path(path: &Path) -> Result<Self, CatalogError> {
        let file = File::open(path).map_err(|e| CatalogError::Unavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_csv_reader(file, path)
    }

    /// Same as [`SkillCatalog::from_csv_path`] over any reader; `origin` is used in errors.
    pub fn from_csv_reader<R: Read>(reader: R, origin: &Path) -> Result<Self, CatalogError> {
        let unavailable = |reason: String| CatalogError::Unavailable {
            path: origin.to_path_buf(),
            reason,
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut phrases = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| unavailable(format!("malformed record: {e}")))?;
            if let Some(first) = record.get(0) {
                phrases.push(first.to_string());
            }
        }

        let catalog = Self::from_phrases(phrases.iter().map(String::as_str), CatalogSource::File);
        if catalog.is_empty() {
            return Err(unavailable("no usable skill phrases".to_string()));
        }
        Ok(catalog)
    }

    /// Loads the configured catalog file, or the embedded list when no path is set.
    ///
    /// A load failure is recovered with `fallback` when one is supplied; otherwise
    /// the error is returned and startup must halt.
    pub fn load(path: Option<&Path>, fallback: Option<SkillCatalog>) -> Result<Self, CatalogError> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };

        match Self::from_csv_path(path) {
            Ok(catalog) => {
                info!(path = %path.display(), skills = catalog.len(), "skill catalog loaded");
                Ok(catalog)
            }
            Err(err) => match fallback {
                Some(fallback) => {
                    warn!(error = %err, "using fallback skill catalog");
                    Ok(Self {
                        source: CatalogSource::Fallback,
                        ..fallback
                    })
                }
                None => Err(err),
            },
        }
    }

    pub fn entries(&self) -> &[SkillEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn source(&self) -> CatalogSource {
        self.source
    }
}

/// Lowercase, trimmed, single-spaced and containing at least one letter or digit.
fn is_canonical_phrase(phrase: &str) -> bool {
    !phrase.is_empty()
        && phrase == phrase.to_lowercase()
        && phrase.split_whitespace().collect::<Vec<_>>().join(" ") == phrase
        && phrase.chars().any(char::is_alphanumeric)
}

/// Title-cases a phrase, capitalizing each `/` segment on its own.
pub fn display_form(phrase: &str) -> String {
    phrase.split('/').map(title_case).collect::<Vec<_>>().join("/")
}

fn title_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut prev_is_letter = false;
    for c in segment.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_has_unique_phrases() {
        let catalog = SkillCatalog::builtin();
        let unique: HashSet<_> = catalog.entries().iter().map(|e| &e.phrase).collect();
        assert_eq!(unique.len(), catalog.len());
        assert_eq!(catalog.len(), BUILTIN_PHRASES.len());
        assert_eq!(catalog.source(), CatalogSource::Builtin);
    }

    #[test]
    fn test_display_form_title_cases_words() {
        assert_eq!(display_form("aws"), "Aws");
        assert_eq!(display_form("machine learning"), "Machine Learning");
        assert_eq!(display_form("node.js"), "Node.Js");
        assert_eq!(display_form("scikit-learn"), "Scikit-Learn");
        assert_eq!(display_form("c++"), "C++");
    }

    #[test]
    fn test_display_form_capitalizes_slash_segments() {
        assert_eq!(display_form("ci/cd"), "Ci/Cd");
        assert_eq!(display_form("html/css"), "Html/Css");
    }

    #[test]
    fn test_malformed_and_duplicate_phrases_skipped() {
        let catalog = SkillCatalog::from_phrases(
            ["python", "Python", " rust", "", "---", "go  lang", "python", "deep learning"],
            CatalogSource::Builtin,
        );
        let phrases: Vec<_> = catalog.entries().iter().map(|e| e.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["python", "deep learning"]);
    }

    #[test]
    fn test_csv_reads_first_field_and_comments() {
        let data = "# skills\nrust,systems\nkafka\n\ngraphql,api,extra\n";
        let catalog =
            SkillCatalog::from_csv_reader(data.as_bytes(), Path::new("inline.csv")).unwrap();
        let phrases: Vec<_> = catalog.entries().iter().map(|e| e.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["rust", "kafka", "graphql"]);
        assert_eq!(catalog.source(), CatalogSource::File);
    }

    #[test]
    fn test_csv_with_no_usable_rows_is_unavailable() {
        let data = "# nothing here\nPython\n";
        let err = SkillCatalog::from_csv_reader(data.as_bytes(), Path::new("bad.csv")).unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = SkillCatalog::from_csv_path(Path::new("/nonexistent/skills.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/skills.csv"));
    }

    #[test]
    fn test_load_without_path_uses_builtin() {
        let catalog = SkillCatalog::load(None, None).unwrap();
        assert_eq!(catalog.source(), CatalogSource::Builtin);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rust\nelixir").unwrap();
        let catalog = SkillCatalog::load(Some(file.path()), None).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[1].display, "Elixir");
    }

    #[test]
    fn test_load_failure_uses_fallback() {
        let catalog = SkillCatalog::load(
            Some(Path::new("/nonexistent/skills.csv")),
            Some(SkillCatalog::builtin()),
        )
        .unwrap();
        assert_eq!(catalog.source(), CatalogSource::Fallback);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_load_failure_without_fallback_is_fatal() {
        let result = SkillCatalog::load(Some(Path::new("/nonexistent/skills.csv")), None);
        assert!(result.is_err());
    }
}
