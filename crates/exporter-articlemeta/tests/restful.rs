//! RESTful client against a mock ArticleMeta server.
//!
//! The client blocks on the shared runtime, so the mock server lives on its
//! own runtime and the calls are made from a plain test thread.

use exporter_articlemeta::{AmClient, Connection, DocumentSource, SourceError};
use exporter_core::{HttpSettings, Retryable};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PID: &str = "S0100-19651998000200002";
const FIXTURE: &str = include_str!("fixtures/S0100-19651998000200002.json");

struct Harness {
    rt: tokio::runtime::Runtime,
    server: MockServer,
}

impl Harness {
    fn start() -> Self {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let server = rt.block_on(MockServer::start());
        Self { rt, server }
    }

    fn respond(&self, pid: &str, template: ResponseTemplate) {
        self.rt.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v1/article/"))
                .and(query_param("collection", "scl"))
                .and(query_param("code", pid))
                .and(query_param("format", "json"))
                .respond_with(template)
                .mount(&self.server),
        );
    }

    fn client(&self) -> AmClient {
        AmClient::new(
            Connection::Restful,
            Some(&self.server.uri()),
            &HttpSettings::default(),
        )
        .unwrap()
    }
}

#[test]
fn fetches_and_decodes_article() {
    let h = Harness::start();
    h.respond(
        PID,
        ResponseTemplate::new(200).set_body_raw(FIXTURE, "application/json"),
    );

    let article = h.client().document("scl", PID).unwrap().expect("article");
    assert_eq!(article.code(), Some(PID));
    assert_eq!(article.authors().len(), 2);
    assert_eq!(article.electronic_issn(), Some("1518-8353"));
}

#[test]
fn not_found_variants_are_none() {
    let h = Harness::start();
    h.respond("S404", ResponseTemplate::new(404));
    h.respond("SNULL", ResponseTemplate::new(200).set_body_string("null"));
    h.respond("SEMPTY", ResponseTemplate::new(200).set_body_string(""));
    h.respond("SOBJ", ResponseTemplate::new(200).set_body_string("{}"));

    let client = h.client();
    for pid in ["S404", "SNULL", "SEMPTY", "SOBJ"] {
        assert!(client.document("scl", pid).unwrap().is_none(), "{pid}");
    }
}

#[test]
fn server_error_is_retryable() {
    let h = Harness::start();
    h.respond(PID, ResponseTemplate::new(503));

    let err = h.client().document("scl", PID).unwrap_err();
    assert!(matches!(err, SourceError::Http { status: Some(503), .. }));
    assert!(err.is_retryable());
}

#[test]
fn malformed_body_is_protocol_error() {
    let h = Harness::start();
    h.respond(
        PID,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    );

    let err = h.client().document("scl", PID).unwrap_err();
    assert!(matches!(err, SourceError::Protocol(_)));
    assert!(!err.is_retryable());
}
