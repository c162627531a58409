//! Document source abstraction and the transport-selecting ArticleMeta client

use std::str::FromStr;

use exporter_core::HttpSettings;
use serde::Deserialize;

use crate::article::Article;
use crate::error::SourceError;
use crate::restful::RestfulClient;
use crate::thrift::ThriftClient;

/// Anything that can look up an article by collection and PID.
///
/// Implementations are shared by every export worker and must tolerate
/// concurrent calls. `Ok(None)` means the identifier does not resolve.
pub trait DocumentSource: Send + Sync {
    fn document(&self, collection: &str, pid: &str) -> Result<Option<Article>, SourceError>;
}

/// Wire transport used to reach ArticleMeta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connection {
    #[default]
    Restful,
    Thrift,
}

impl Connection {
    pub fn name(self) -> &'static str {
        match self {
            Self::Restful => "restful",
            Self::Thrift => "thrift",
        }
    }
}

impl FromStr for Connection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "restful" | "rest" | "http" => Ok(Self::Restful),
            "thrift" => Ok(Self::Thrift),
            other => Err(format!("unknown connection type: {other}")),
        }
    }
}

/// ArticleMeta client over the selected transport
pub enum AmClient {
    Restful(RestfulClient),
    Thrift(ThriftClient),
}

impl AmClient {
    /// Build a client; `domain` overrides the transport's default endpoint
    pub fn new(
        connection: Connection,
        domain: Option<&str>,
        http: &HttpSettings,
    ) -> Result<Self, SourceError> {
        let client = match connection {
            Connection::Restful => Self::Restful(RestfulClient::new(domain, http)?),
            Connection::Thrift => Self::Thrift(ThriftClient::new(domain, http)),
        };
        log::debug!(
            "ArticleMeta client: {} at {}",
            connection.name(),
            client.endpoint()
        );
        Ok(client)
    }

    pub fn connection(&self) -> Connection {
        match self {
            Self::Restful(_) => Connection::Restful,
            Self::Thrift(_) => Connection::Thrift,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::Restful(c) => c.base_url(),
            Self::Thrift(c) => c.address(),
        }
    }
}

impl DocumentSource for AmClient {
    fn document(&self, collection: &str, pid: &str) -> Result<Option<Article>, SourceError> {
        match self {
            Self::Restful(c) => c.document(collection, pid),
            Self::Thrift(c) => c.document(collection, pid),
        }
    }
}

/// Decode an article payload; blank, `null` and `{}` mean not found
pub(crate) fn parse_article(body: &str) -> Result<Option<Article>, SourceError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SourceError::Protocol(format!("malformed article JSON: {e}")))?;
    Ok(Article::from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_from_str() {
        assert_eq!("restful".parse::<Connection>(), Ok(Connection::Restful));
        assert_eq!("THRIFT".parse::<Connection>(), Ok(Connection::Thrift));
        assert!("carrier-pigeon".parse::<Connection>().is_err());
    }

    #[test]
    fn default_connection_is_restful() {
        assert_eq!(Connection::default(), Connection::Restful);
    }

    #[test]
    fn client_reports_transport() {
        let http = HttpSettings::default();
        let rest = AmClient::new(Connection::Restful, None, &http).unwrap();
        assert_eq!(rest.connection(), Connection::Restful);
        assert_eq!(rest.endpoint(), crate::restful::DEFAULT_DOMAIN);

        let thrift = AmClient::new(Connection::Thrift, Some("localhost:9090"), &http).unwrap();
        assert_eq!(thrift.connection(), Connection::Thrift);
        assert_eq!(thrift.endpoint(), "localhost:9090");
    }

    #[test]
    fn parse_article_empty_variants() {
        assert!(parse_article("").unwrap().is_none());
        assert!(parse_article("  null ").unwrap().is_none());
        assert!(parse_article("{}").unwrap().is_none());
        assert!(parse_article(r#"{"code": "S1"}"#).unwrap().is_some());
    }

    #[test]
    fn parse_article_malformed() {
        let err = parse_article("{not json").unwrap_err();
        assert!(matches!(err, SourceError::Protocol(_)));
    }
}
