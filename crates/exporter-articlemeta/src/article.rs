//! ArticleMeta article document and field accessors
//!
//! ArticleMeta serves ISIS-style records: every field is a `vNNN` tag holding
//! a list of occurrences, each occurrence an object whose `_` key is the main
//! value and whose single-letter keys are subfields.
//!
//! | Tag | Section | Meaning |
//! |-----|---------|---------|
//! | v10 | article | authors (`n` given names, `s` surname) |
//! | v12 | article | titles (`l` language) |
//! | v40 | article | original language |
//! | v49 | article | section code |
//! | v237 | article | DOI |
//! | v435 | title | ISSN (`t` = `PRINT` / `ONLIN`) |
//! | v935 + v35 | title | legacy ISSN and its type |
//! | v49 | issue | section titles (`c` code, `l` language, `t` title) |

use serde_json::Value;

/// Author name parts as recorded in v10
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub given_names: String,
    pub surname: String,
}

impl Author {
    /// "Given Surname", skipping empty parts
    pub fn full_name(&self) -> String {
        [self.given_names.trim(), self.surname.trim()]
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A single article record as returned by ArticleMeta
#[derive(Debug, Clone)]
pub struct Article {
    data: Value,
}

impl Article {
    /// Wrap a decoded record; `None` for null or empty payloads (not found)
    pub fn from_value(data: Value) -> Option<Self> {
        let present = match &data {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::String(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => true,
        };
        present.then_some(Self { data })
    }

    pub fn code(&self) -> Option<&str> {
        self.data["code"]
            .as_str()
            .or_else(|| self.data["article"]["code"].as_str())
    }

    pub fn authors(&self) -> Vec<Author> {
        occurrences(&self.data["article"]["v10"])
            .map(|a| Author {
                given_names: a["n"].as_str().unwrap_or_default().to_string(),
                surname: a["s"].as_str().unwrap_or_default().to_string(),
            })
            .collect()
    }

    pub fn original_language(&self) -> Option<&str> {
        first_value(&self.data["article"]["v40"])
    }

    /// Title in the article's original language
    pub fn original_title(&self) -> Option<&str> {
        let lang = self.original_language()?;
        self.titles()
            .find(|(l, _)| *l == Some(lang))
            .map(|(_, title)| title)
    }

    /// Titles in languages other than the original, in record order
    pub fn translated_titles(&self) -> Vec<(&str, &str)> {
        let original = self.original_language();
        self.titles()
            .filter_map(|(lang, title)| match lang {
                Some(l) if Some(l) != original => Some((l, title)),
                _ => None,
            })
            .collect()
    }

    fn titles(&self) -> impl Iterator<Item = (Option<&str>, &str)> {
        occurrences(&self.data["article"]["v12"]).filter_map(|t| {
            let title = t["_"].as_str().map(str::trim).filter(|s| !s.is_empty())?;
            Some((t["l"].as_str(), title))
        })
    }

    pub fn doi(&self) -> Option<&str> {
        self.data["doi"]
            .as_str()
            .or_else(|| first_value(&self.data["article"]["v237"]))
            .filter(|d| !d.is_empty())
    }

    pub fn electronic_issn(&self) -> Option<&str> {
        self.issn_of_type("ONLIN")
    }

    pub fn print_issn(&self) -> Option<&str> {
        self.issn_of_type("PRINT")
    }

    fn issn_of_type(&self, kind: &str) -> Option<&str> {
        let title = &self.data["title"];
        occurrences(&title["v435"])
            .find(|i| i["t"].as_str() == Some(kind))
            .and_then(|i| i["_"].as_str())
            .or_else(|| {
                // Legacy records: single ISSN in v935 typed by v35
                (first_value(&title["v35"]) == Some(kind))
                    .then(|| first_value(&title["v935"]))
                    .flatten()
            })
            .filter(|s| !s.is_empty())
    }

    pub fn section_code(&self) -> Option<&str> {
        first_value(&self.data["article"]["v49"])
    }

    /// Title of section `code` in language `lang`, from the issue record
    pub fn section_title(&self, code: &str, lang: &str) -> Option<&str> {
        let issue = &self.data["issue"];
        let sections = if issue["issue"]["v49"].is_array() {
            &issue["issue"]["v49"]
        } else {
            &issue["v49"]
        };
        occurrences(sections)
            .find(|s| s["c"].as_str() == Some(code) && s["l"].as_str() == Some(lang))
            .and_then(|s| s["t"].as_str())
    }
}

fn occurrences(field: &Value) -> impl Iterator<Item = &Value> {
    field.as_array().into_iter().flatten()
}

fn first_value(field: &Value) -> Option<&str> {
    occurrences(field).next().and_then(|v| v["_"].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn article() -> Article {
        Article::from_value(json!({
            "collection": "scl",
            "code": "S0100-1",
            "article": {
                "v10": [{"n": "Ana", "s": "Souza"}, {"s": "Lima"}],
                "v12": [
                    {"_": "Titulo", "l": "pt"},
                    {"_": "Title", "l": "en"},
                    {"_": "Titulo", "l": "es"}
                ],
                "v40": [{"_": "pt"}],
                "v49": [{"_": "AB01"}],
                "v237": [{"_": "10.1590/x"}]
            },
            "title": {"v435": [{"_": "1234-5678", "t": "PRINT"}]},
            "issue": {"issue": {"v49": [{"c": "AB01", "l": "pt", "t": "Artigos"}]}}
        }))
        .unwrap()
    }

    #[test]
    fn empty_payloads_are_absent() {
        assert!(Article::from_value(Value::Null).is_none());
        assert!(Article::from_value(json!({})).is_none());
        assert!(Article::from_value(json!("")).is_none());
    }

    #[test]
    fn identity_fields() {
        let a = article();
        assert_eq!(a.code(), Some("S0100-1"));
        assert_eq!(a.doi(), Some("10.1590/x"));
    }

    #[test]
    fn authors_with_missing_parts() {
        let authors = article().authors();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].full_name(), "Ana Souza");
        assert_eq!(authors[1].given_names, "");
        assert_eq!(authors[1].full_name(), "Lima");
    }

    #[test]
    fn titles_by_language() {
        let a = article();
        assert_eq!(a.original_title(), Some("Titulo"));
        assert_eq!(a.translated_titles(), vec![("en", "Title"), ("es", "Titulo")]);
    }

    #[test]
    fn issn_by_type() {
        let a = article();
        assert_eq!(a.electronic_issn(), None);
        assert_eq!(a.print_issn(), Some("1234-5678"));

        let both = Article::from_value(json!({
            "title": {"v435": [
                {"_": "1111-1111", "t": "PRINT"},
                {"_": "2222-2222", "t": "ONLIN"}
            ]}
        }))
        .unwrap();
        assert_eq!(both.electronic_issn(), Some("2222-2222"));
        assert_eq!(both.print_issn(), Some("1111-1111"));
    }

    #[test]
    fn legacy_issn_fields() {
        let a = Article::from_value(json!({
            "title": {"v35": [{"_": "ONLIN"}], "v935": [{"_": "3333-3333"}]}
        }))
        .unwrap();
        assert_eq!(a.electronic_issn(), Some("3333-3333"));
        assert_eq!(a.print_issn(), None);
    }

    #[test]
    fn section_lookup() {
        let a = article();
        assert_eq!(a.section_code(), Some("AB01"));
        assert_eq!(a.section_title("AB01", "pt"), Some("Artigos"));
        assert_eq!(a.section_title("AB01", "en"), None);
    }
}
