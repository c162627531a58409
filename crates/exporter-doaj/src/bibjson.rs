//! DOAJ bibjson mapping
//!
//! Builds the `bibjson` section DOAJ expects for an article:
//!
//! ```json
//! {"bibjson": {
//!     "author": [{"name": "Maria Helena Cardoso"}],
//!     "identifier": [{"id": "1518-8353", "type": "eissn"}, {"id": "10.1590/...", "type": "doi"}],
//!     "title": "..."
//! }}
//! ```

use exporter_articlemeta::Article;
use serde::Serialize;

/// Article cannot be represented as a DOAJ record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BibjsonError {
    NoAuthors,
    NoIssn,
    NoTitle,
}

impl std::fmt::Display for BibjsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAuthors => write!(f, "document has no authors"),
            Self::NoIssn => write!(f, "journal has no ISSN"),
            Self::NoTitle => write!(f, "document has no title"),
        }
    }
}

impl std::error::Error for BibjsonError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibjsonAuthor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibjsonIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bibjson {
    pub author: Vec<BibjsonAuthor>,
    pub identifier: Vec<BibjsonIdentifier>,
    pub title: String,
}

/// A DOAJ article record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoajDocument {
    pub bibjson: Bibjson,
}

impl DoajDocument {
    pub fn from_article(article: &Article) -> Result<Self, BibjsonError> {
        Ok(Self {
            bibjson: Bibjson {
                author: authors(article)?,
                identifier: identifiers(article)?,
                title: title(article)?,
            },
        })
    }

    /// JSON body as submitted to DOAJ
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({ "bibjson": self.bibjson })
    }
}

fn authors(article: &Article) -> Result<Vec<BibjsonAuthor>, BibjsonError> {
    let authors: Vec<_> = article
        .authors()
        .iter()
        .map(|a| BibjsonAuthor { name: a.full_name() })
        .filter(|a| !a.name.is_empty())
        .collect();
    if authors.is_empty() {
        return Err(BibjsonError::NoAuthors);
    }
    Ok(authors)
}

fn identifiers(article: &Article) -> Result<Vec<BibjsonIdentifier>, BibjsonError> {
    let mut ids = Vec::with_capacity(3);
    if let Some(issn) = article.electronic_issn() {
        ids.push(identifier(issn, "eissn"));
    }
    if let Some(issn) = article.print_issn() {
        ids.push(identifier(issn, "pissn"));
    }
    if ids.is_empty() {
        return Err(BibjsonError::NoIssn);
    }
    if let Some(doi) = article.doi() {
        ids.push(identifier(doi, "doi"));
    }
    Ok(ids)
}

fn identifier(id: &str, kind: &'static str) -> BibjsonIdentifier {
    BibjsonIdentifier {
        id: id.to_string(),
        kind,
    }
}

/// Original title, then first translation, then the section name
fn title(article: &Article) -> Result<String, BibjsonError> {
    article
        .original_title()
        .or_else(|| article.translated_titles().first().map(|&(_, t)| t))
        .or_else(|| {
            let code = article.section_code()?;
            article.section_title(code, article.original_language()?)
        })
        .map(str::to_string)
        .ok_or(BibjsonError::NoTitle)
}
