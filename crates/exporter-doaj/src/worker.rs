//! Per-document export work

use std::path::PathBuf;

use exporter_articlemeta::{DocumentSource, SourceError};
use exporter_core::{CancellationToken, JsonSink, RetryPolicy, retry_with_backoff};

use crate::bibjson::{BibjsonError, DoajDocument};

/// One document to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub collection: String,
    pub pid: String,
}

impl ExportJob {
    pub fn new(collection: impl Into<String>, pid: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            pid: pid.into(),
        }
    }
}

/// Why a single document was not exported
#[derive(Debug)]
pub enum ExportError {
    /// The source has no record for this PID
    NotFound,
    /// The source could not be reached or answered badly
    Source(SourceError),
    /// The record lacks fields DOAJ requires
    Bibjson(BibjsonError),
    /// Writing the output file failed
    Io(std::io::Error),
}

impl ExportError {
    /// Short label for log lines and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not found",
            Self::Source(_) => "source",
            Self::Bibjson(_) => "bibjson",
            Self::Io(_) => "io",
        }
    }
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "document not found"),
            Self::Source(e) => write!(f, "could not fetch document: {e}"),
            Self::Bibjson(e) => write!(f, "could not build bibjson: {e}"),
            Self::Io(e) => write!(f, "could not write document: {e}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound => None,
            Self::Source(e) => Some(e),
            Self::Bibjson(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<SourceError> for ExportError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

impl From<BibjsonError> for ExportError {
    fn from(e: BibjsonError) -> Self {
        Self::Bibjson(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Fetch, map and write one document.
///
/// Returns `Ok(None)` without touching the source or the filesystem when the
/// token is already poisoned, and skips the write if it gets poisoned while
/// the fetch is in flight.
pub fn export_document(
    source: &dyn DocumentSource,
    sink: &JsonSink,
    job: &ExportJob,
    token: &CancellationToken,
    retry: &RetryPolicy,
) -> Result<Option<PathBuf>, ExportError> {
    if token.is_poisoned() {
        return Ok(None);
    }

    let article = retry_with_backoff(&job.pid, retry, token, || {
        source.document(&job.collection, &job.pid)
    })?
    .ok_or(ExportError::NotFound)?;

    let document = DoajDocument::from_article(&article)?;

    if token.is_poisoned() {
        log::debug!("{}: skipping write, run is shutting down", job.pid);
        return Ok(None);
    }

    let path = sink.write(&job.collection, &job.pid, &document.to_request_body())?;
    log::debug!("{}: wrote {}", job.pid, path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use exporter_articlemeta::Article;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Source replaying a scripted list of responses
    struct Scripted {
        responses: Mutex<Vec<Result<Option<Article>, SourceError>>>,
        calls: Mutex<usize>,
    }

    impl Scripted {
        fn new(mut responses: Vec<Result<Option<Article>, SourceError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl DocumentSource for Scripted {
        fn document(&self, _: &str, _: &str) -> Result<Option<Article>, SourceError> {
            *self.calls.lock().unwrap() += 1;
            self.responses.lock().unwrap().pop().unwrap_or(Ok(None))
        }
    }

    fn article() -> Article {
        Article::from_value(json!({
            "article": {
                "v10": [{"n": "Ana", "s": "Souza"}],
                "v12": [{"_": "Titulo", "l": "pt"}],
                "v40": [{"_": "pt"}]
            },
            "title": {"v435": [{"_": "1234-5678", "t": "ONLIN"}]}
        }))
        .unwrap()
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        }
    }

    fn unavailable() -> SourceError {
        SourceError::Http {
            status: Some(503),
            message: "unavailable".into(),
        }
    }

    #[test]
    fn writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonSink::new(dir.path());
        let source = Scripted::new(vec![Ok(Some(article()))]);
        let job = ExportJob::new("scl", "S1");

        let path = export_document(&source, &sink, &job, &CancellationToken::new(), &fast_retry())
            .unwrap()
            .unwrap();

        assert_eq!(path, dir.path().join("scl").join("S1.json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["bibjson"]["identifier"][0]["type"], "eissn");
    }

    #[test]
    fn poisoned_token_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let source = Scripted::new(vec![Ok(Some(article()))]);
        let token = CancellationToken::new();
        token.poison();

        let out = export_document(
            &source,
            &JsonSink::new(dir.path()),
            &ExportJob::new("scl", "S1"),
            &token,
            &fast_retry(),
        )
        .unwrap();

        assert!(out.is_none());
        assert_eq!(source.calls(), 0);
        assert!(!dir.path().join("scl").exists());
    }

    #[test]
    fn missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = Scripted::new(vec![Ok(None)]);
        let err = export_document(
            &source,
            &JsonSink::new(dir.path()),
            &ExportJob::new("scl", "S404"),
            &CancellationToken::new(),
            &fast_retry(),
        )
        .unwrap_err();

        assert!(matches!(err, ExportError::NotFound));
        assert_eq!(err.kind(), "not found");
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn transient_failures_are_retried() {
        let dir = tempfile::tempdir().unwrap();
        let source = Scripted::new(vec![Err(unavailable()), Ok(Some(article()))]);
        let out = export_document(
            &source,
            &JsonSink::new(dir.path()),
            &ExportJob::new("scl", "S1"),
            &CancellationToken::new(),
            &fast_retry(),
        )
        .unwrap();

        assert!(out.is_some());
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn source_failure_after_retries() {
        let dir = tempfile::tempdir().unwrap();
        let source = Scripted::new(vec![Err(unavailable()), Err(unavailable()), Err(unavailable())]);
        let err = export_document(
            &source,
            &JsonSink::new(dir.path()),
            &ExportJob::new("scl", "S1"),
            &CancellationToken::new(),
            &fast_retry(),
        )
        .unwrap_err();

        assert!(matches!(err, ExportError::Source(_)));
        assert_eq!(source.calls(), 3);
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn unmappable_document_is_bibjson_error() {
        let dir = tempfile::tempdir().unwrap();
        let bare = Article::from_value(json!({"code": "S1"})).unwrap();
        let source = Scripted::new(vec![Ok(Some(bare))]);
        let err = export_document(
            &source,
            &JsonSink::new(dir.path()),
            &ExportJob::new("scl", "S1"),
            &CancellationToken::new(),
            &fast_retry(),
        )
        .unwrap_err();

        assert!(matches!(err, ExportError::Bibjson(BibjsonError::NoAuthors)));
    }
}
