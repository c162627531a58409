//! ArticleMeta Thrift transport.
//!
//! Binary protocol (strict), unframed, over a fresh TCP connection per call.
//! Only `get_article` is implemented:
//!
//! ```text
//! string get_article(1: string code, 2: string collection,
//!                    3: bool replace_journal_metadata, 4: string fmt)
//!     throws (1: ValueError value_err, 2: ServerError server_err)
//! ```
//!
//! The reply carries the article as a JSON string; an empty string means the
//! PID is unknown.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use exporter_core::HttpSettings;
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TFieldIdentifier, TInputProtocol,
    TMessageIdentifier, TMessageType, TOutputProtocol, TStructIdentifier, TType,
};

use crate::article::Article;
use crate::client::parse_article;
use crate::error::SourceError;

pub const DEFAULT_ADDRESS: &str = "articlemeta.scielo.org:11621";
const DEFAULT_PORT: u16 = 11621;
const METHOD: &str = "get_article";

pub struct ThriftClient {
    address: String,
    settings: HttpSettings,
}

impl ThriftClient {
    /// `domain` is `host[:port]`; the port defaults to 11621
    pub fn new(domain: Option<&str>, settings: &HttpSettings) -> Self {
        let address = match domain.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) if d.contains(':') => d.to_string(),
            Some(d) => format!("{d}:{DEFAULT_PORT}"),
            None => DEFAULT_ADDRESS.to_string(),
        };
        Self {
            address,
            settings: *settings,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn document(&self, collection: &str, pid: &str) -> Result<Option<Article>, SourceError> {
        let payload = self.get_article(pid, collection)?;
        parse_article(&payload)
    }

    fn connect(&self) -> Result<TcpStream, SourceError> {
        let mut last_err = None;
        for addr in self.address.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.settings.connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.settings.request_timeout))?;
                    stream.set_write_timeout(Some(self.settings.request_timeout))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => SourceError::Io(e),
            None => SourceError::Protocol(format!("{} resolved to no addresses", self.address)),
        })
    }

    fn get_article(&self, code: &str, collection: &str) -> Result<String, SourceError> {
        let stream = self.connect()?;
        let mut o_prot = TBinaryOutputProtocol::new(BufWriter::new(stream.try_clone()?), true);
        write_get_article(&mut o_prot, code, collection)?;

        let mut i_prot = TBinaryInputProtocol::new(BufReader::new(stream), true);
        read_get_article_reply(&mut i_prot)
    }
}

fn write_get_article(
    o: &mut dyn TOutputProtocol,
    code: &str,
    collection: &str,
) -> thrift::Result<()> {
    o.write_message_begin(&TMessageIdentifier::new(METHOD, TMessageType::Call, 0))?;
    o.write_struct_begin(&TStructIdentifier::new("get_article_args"))?;
    write_string_field(o, "code", 1, code)?;
    write_string_field(o, "collection", 2, collection)?;
    o.write_field_begin(&TFieldIdentifier::new(
        "replace_journal_metadata",
        TType::Bool,
        3,
    ))?;
    o.write_bool(true)?;
    o.write_field_end()?;
    write_string_field(o, "fmt", 4, "xylose")?;
    o.write_field_stop()?;
    o.write_struct_end()?;
    o.write_message_end()?;
    o.flush()
}

fn write_string_field(
    o: &mut dyn TOutputProtocol,
    name: &str,
    id: i16,
    value: &str,
) -> thrift::Result<()> {
    o.write_field_begin(&TFieldIdentifier::new(name, TType::String, id))?;
    o.write_string(value)?;
    o.write_field_end()
}

fn read_get_article_reply(i: &mut dyn TInputProtocol) -> Result<String, SourceError> {
    let message = i.read_message_begin()?;
    if message.name != METHOD {
        return Err(SourceError::Protocol(format!(
            "unexpected reply to {:?}",
            message.name
        )));
    }
    match message.message_type {
        TMessageType::Reply => {
            let result = read_result(i)?;
            i.read_message_end()?;
            result
        }
        TMessageType::Exception => {
            let e = thrift::Error::read_application_error_from_in_protocol(i)?;
            i.read_message_end()?;
            Err(SourceError::Protocol(format!(
                "application exception: {}",
                e.message
            )))
        }
        other => Err(SourceError::Protocol(format!(
            "unexpected message type {other:?}"
        ))),
    }
}

/// `get_article_result`: 0 = success, 1 = ValueError, 2 = ServerError.
///
/// The outer `Result` is a wire failure, the inner one the call's outcome.
fn read_result(i: &mut dyn TInputProtocol) -> Result<Result<String, SourceError>, SourceError> {
    i.read_struct_begin()?;
    let mut outcome = None;
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(0), TType::String) => outcome = Some(Ok(i.read_string()?)),
            (Some(1), TType::Struct) => {
                let msg = read_exception_message(i)?;
                outcome = Some(Err(SourceError::Protocol(format!("value error: {msg}"))));
            }
            (Some(2), TType::Struct) => {
                outcome = Some(Err(SourceError::Remote(read_exception_message(i)?)));
            }
            (_, other) => i.skip(other)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(outcome.unwrap_or_else(|| {
        Err(SourceError::Protocol(
            "get_article reply has no result".to_string(),
        ))
    }))
}

/// Exception structs all carry their text in field 1
fn read_exception_message(i: &mut dyn TInputProtocol) -> Result<String, SourceError> {
    i.read_struct_begin()?;
    let mut message = String::new();
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        if field.id == Some(1) && field.field_type == TType::String {
            message = i.read_string()?;
        } else {
            i.skip(field.field_type)?;
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(message)
}
