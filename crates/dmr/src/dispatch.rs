//! Request/response plumbing between operations and a management endpoint.
//!
//! The HTTP exchange itself is left to a [`Transport`]; this module only
//! encodes requests, decodes responses and applies the `outcome` contract.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::codec;
use crate::composite::{Composite, CompositeResult};
use crate::error::CodecError;
use crate::node::ModelNode;
use crate::operation::Operation;
use crate::RESULT;

pub const APPLICATION_DMR_ENCODED: &str = "application/dmr-encoded";
pub const APPLICATION_JSON: &str = "application/json";

/// Body encoding of a request and its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    /// Base64 of the binary format.
    #[default]
    DmrEncoded,
    Json,
}

impl ContentType {
    pub fn header(self) -> &'static str {
        match self {
            ContentType::DmrEncoded => APPLICATION_DMR_ENCODED,
            ContentType::Json => APPLICATION_JSON,
        }
    }

    /// Matches a `Content-Type` header value, ignoring parameters such as
    /// `; charset=utf-8`.
    pub fn from_header(header: &str) -> Option<Self> {
        let mime = header.split(';').next().unwrap_or_default().trim();
        if mime.eq_ignore_ascii_case(APPLICATION_DMR_ENCODED) {
            Some(ContentType::DmrEncoded)
        } else if mime.eq_ignore_ascii_case(APPLICATION_JSON) {
            Some(ContentType::Json)
        } else {
            None
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The server answered with an `outcome` other than `success`.
    #[error("operation failed: {0}")]
    Failed(String),
    #[error("{}", status_message(.0))]
    Status(u16),
    #[error("communication error: {0}")]
    Transport(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

fn status_message(status: &u16) -> String {
    match *status {
        0 | 401 | 403 => format!("authentication required ({status})"),
        404 => "management interface not found (404)".to_owned(),
        503 => "service temporarily unavailable, is the server still booting? (503)".to_owned(),
        _ => format!("unexpected status code {status}"),
    }
}

/// Sends one encoded request body and returns the response body.
///
/// Implementations report HTTP statuses other than 200 and 500 as
/// [`DispatchError::Status`]; a 500 still carries a DMR failure payload.
pub trait Transport {
    fn execute(&self, body: &str, content: ContentType) -> Result<String, DispatchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, body: &str, content: ContentType) -> Result<String, DispatchError> {
        (**self).execute(body, content)
    }
}

/// Decodes a response body.
pub fn parse_payload(content: ContentType, text: &str) -> Result<ModelNode, CodecError> {
    match content {
        ContentType::DmrEncoded => codec::base64::decode(text),
        ContentType::Json => codec::json::decode_str(text),
    }
}

pub fn encode_request(operation: &Operation, content: ContentType) -> Result<String, CodecError> {
    match content {
        ContentType::DmrEncoded => codec::base64::encode(operation.as_model_node()),
        ContentType::Json => Ok(operation.to_json_string(true)),
    }
}

pub struct Dispatcher<T> {
    transport: T,
    content: ContentType,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            content: ContentType::default(),
        }
    }

    pub fn with_content_type(mut self, content: ContentType) -> Self {
        self.content = content;
        self
    }

    /// Runs `operation` and returns its `result` node (UNDEFINED when the
    /// response has none).
    pub fn execute(&self, operation: &Operation) -> Result<ModelNode, DispatchError> {
        let body = encode_request(operation, self.content)?;
        debug!(operation = %operation, content = %self.content, len = body.len(), "dispatching");
        let response = self.transport.execute(&body, self.content)?;
        let payload = parse_payload(self.content, &response)?;
        if payload.is_failure() {
            let failure = payload.failure_description();
            warn!(operation = %operation, failure = %failure, "operation failed");
            return Err(DispatchError::Failed(failure));
        }
        Ok(payload.child(RESULT).cloned().unwrap_or_default())
    }

    pub fn execute_composite(&self, composite: &Composite) -> Result<CompositeResult, DispatchError> {
        let result = self.execute(composite)?;
        Ok(CompositeResult::new(&result))
    }
}
