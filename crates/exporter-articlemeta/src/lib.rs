//! ArticleMeta client: fetches SciELO article records by collection and PID
//! over the RESTful API or the Thrift service.

pub mod article;
pub mod client;
pub mod error;
pub mod restful;
pub mod thrift;

pub use article::{Article, Author};
pub use client::{AmClient, Connection, DocumentSource};
pub use error::SourceError;
pub use restful::RestfulClient;
pub use thrift::ThriftClient;
