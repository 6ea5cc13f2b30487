//! Database session
//!
//! The boundary operations that use the conversion layer: transact, query,
//! pull, entity lookup and datom iteration. The engine itself sits behind
//! the [`Peer`] trait; each call is one request and one response, with no
//! retry or batching here. Retry policy belongs to the caller.
//!
//! # Critical Invariants
//!
//! - Peer failures reach the caller unmodified as the error source
//! - Every value leaving a session method has been through ForeignToHost

use async_trait::async_trait;
use serde_json::Map;
use thiserror::Error;
use tracing::debug;

use crate::convert::{Converter, PayloadError};
use crate::models::{ForeignValue, HostInput, HostValue, Keyword};
use crate::reader::ReadError;

/// Error produced by the engine, passed through untouched
pub type PeerError = Box<dyn std::error::Error + Send + Sync>;

/// The external engine client
///
/// Every method is a single-shot request/response future.
#[async_trait]
pub trait Peer: Send + Sync {
    /// Commit transaction data; responds with a map holding `:tempids` and
    /// optionally `:tx-data`
    async fn transact(&self, tx_data: ForeignValue) -> Result<ForeignValue, PeerError>;

    async fn q(&self, query: ForeignValue, inputs: Vec<ForeignValue>) -> Result<ForeignValue, PeerError>;

    async fn pull(&self, pattern: ForeignValue, eid: ForeignValue) -> Result<ForeignValue, PeerError>;

    /// Value of one attribute of an entity
    async fn entity_attr(&self, eid: ForeignValue, attr: ForeignValue) -> Result<ForeignValue, PeerError>;

    /// Datoms of an index, constrained by leading components
    async fn datoms(
        &self,
        index: ForeignValue,
        components: Vec<ForeignValue>,
    ) -> Result<Vec<ForeignValue>, PeerError>;
}

/// Errors raised by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Malformed literal: {0}")]
    Read(#[from] ReadError),

    #[error("Invalid transaction payload: {0}")]
    Payload(#[from] PayloadError),

    #[error("Peer call failed: {0}")]
    Peer(#[source] PeerError),

    #[error("Unexpected {operation} response: {reason}")]
    UnexpectedResponse {
        operation: &'static str,
        reason: String,
    },
}

/// Transaction data as supplied by the application
#[derive(Debug, Clone, PartialEq)]
pub enum TxInput {
    /// Literal notation, e.g. `[[:db/add "u" :user/name "ahab"]]`
    Edn(String),
    /// Operation tuples or entity maps
    Payload(Vec<HostInput>),
}

/// Host view of a commit response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxResult {
    /// Temp id string → resolved entity id
    pub tempids: Map<String, HostValue>,
    /// Asserted and retracted datoms as 5-element arrays
    pub tx_data: Vec<HostValue>,
}

impl TxResult {
    /// Entity id resolved for a temp id
    pub fn tempid(&self, name: &str) -> Option<&HostValue> {
        self.tempids.get(name)
    }
}

/// Session over one peer
///
/// # Example
/// ```ignore
/// let session = Session::new(peer, Converter::new());
/// let result = session
///     .transact(TxInput::Payload(vec![json!({":user/username": "ahab"}).into()]))
///     .await?;
/// let users = session
///     .q("[:find ?e :where [?e :user/username]]", &[])
///     .await?;
/// ```
pub struct Session<P> {
    peer: P,
    converter: Converter,
}

impl<P: Peer> Session<P> {
    pub fn new(peer: P, converter: Converter) -> Self {
        Self { peer, converter }
    }

    pub fn peer(&self) -> &P {
        &self.peer
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Commit transaction data
    ///
    /// # Errors
    ///
    /// - `Read` / `Payload` if the input cannot be built, before the peer is called
    /// - `Peer` if the commit fails
    /// - `UnexpectedResponse` if the response is not a map, or `:tempids` is
    ///   not a map
    pub async fn transact(&self, input: TxInput) -> Result<TxResult, SessionError> {
        let tx_data = match input {
            TxInput::Edn(text) => self.converter.read(&text)?,
            TxInput::Payload(items) => self.converter.tx_payload(&items)?,
        };
        debug!(tx = %tx_data.to_edn(), "Transacting");

        let response = self.peer.transact(tx_data).await.map_err(SessionError::Peer)?;
        if response.entries().is_none() {
            return Err(unexpected("transact", "response is not a map", &response));
        }

        let tempids = match response.get(&Keyword::new("tempids").into()) {
            None | Some(ForeignValue::Nil) => Map::new(),
            Some(value) => match self.converter.to_host(value) {
                HostValue::Object(map) => map,
                _ => return Err(unexpected("transact", ":tempids is not a map", value)),
            },
        };
        let tx_data = match response.get(&Keyword::new("tx-data").into()) {
            Some(value) => match value.elements() {
                Some(datoms) => datoms.iter().map(|d| self.converter.to_host(d)).collect(),
                None if value.is_nil() => Vec::new(),
                None => return Err(unexpected("transact", ":tx-data is not a collection", value)),
            },
            None => Vec::new(),
        };
        debug!(tempids = tempids.len(), datoms = tx_data.len(), "Transaction committed");

        Ok(TxResult { tempids, tx_data })
    }

    /// Run a query given in literal notation
    pub async fn q(&self, query: &str, inputs: &[HostInput]) -> Result<HostValue, SessionError> {
        let query = self.converter.read(query)?;
        let inputs = inputs
            .iter()
            .map(|input| self.converter.to_foreign(input))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(query = %query.to_edn(), inputs = inputs.len(), "Querying");
        let result = self.peer.q(query, inputs).await.map_err(SessionError::Peer)?;
        Ok(self.converter.to_host(&result))
    }

    /// Pull a pattern for one entity
    pub async fn pull(&self, pattern: &str, eid: &HostInput) -> Result<HostValue, SessionError> {
        let pattern = self.converter.read(pattern)?;
        let eid = self.converter.to_reference(eid)?;
        debug!(pattern = %pattern.to_edn(), eid = %eid.to_edn(), "Pulling");
        let result = self.peer.pull(pattern, eid).await.map_err(SessionError::Peer)?;
        Ok(self.converter.to_host(&result))
    }

    /// Lazy handle on one entity
    pub fn entity(&self, eid: &HostInput) -> Result<Entity<'_, P>, SessionError> {
        Ok(Entity {
            session: self,
            eid: self.converter.to_reference(eid)?,
        })
    }

    /// Datoms of an index, e.g. `datoms(":eavt", &[":user/username"])`
    ///
    /// Components are literal text. Datoms are converted as the iterator
    /// is advanced.
    pub async fn datoms(&self, index: &str, components: &[&str]) -> Result<Datoms<'_>, SessionError> {
        let index = self.converter.read(index)?;
        let components = components
            .iter()
            .map(|c| self.converter.read(c))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(index = %index.to_edn(), components = components.len(), "Reading datoms");
        let datoms = self
            .peer
            .datoms(index, components)
            .await
            .map_err(SessionError::Peer)?;
        Ok(Datoms {
            converter: &self.converter,
            inner: datoms.into_iter(),
        })
    }
}

fn unexpected(operation: &'static str, reason: &str, value: &ForeignValue) -> SessionError {
    SessionError::UnexpectedResponse {
        operation,
        reason: format!("{} ({})", reason, value.class_name().unwrap_or("nil")),
    }
}

/// Entity handle; attributes are fetched on demand
pub struct Entity<'a, P> {
    session: &'a Session<P>,
    eid: ForeignValue,
}

impl<P: Peer> Entity<'_, P> {
    pub fn eid(&self) -> &ForeignValue {
        &self.eid
    }

    /// Attribute value, e.g. `get(":user/username")`
    pub async fn get(&self, attr: &str) -> Result<HostValue, SessionError> {
        let attr = self.session.converter.read(attr)?;
        let value = self
            .session
            .peer
            .entity_attr(self.eid.clone(), attr)
            .await
            .map_err(SessionError::Peer)?;
        Ok(self.session.converter.to_host(&value))
    }
}

/// Iterator of host datom arrays
pub struct Datoms<'a> {
    converter: &'a Converter,
    inner: std::vec::IntoIter<ForeignValue>,
}

impl Iterator for Datoms<'_> {
    type Item = HostValue;

    fn next(&mut self) -> Option<HostValue> {
        self.inner.next().map(|datom| self.converter.to_host(&datom))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Datoms<'_> {}
