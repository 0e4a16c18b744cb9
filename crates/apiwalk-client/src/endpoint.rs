//! Fluent navigation: `client.path("users").path(42).get(None)`.
//!
//! Navigation only records segments. Nothing is checked against the OpenAPI
//! document until a verb is invoked.

use apiwalk_types::{Outcome, Verb};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::future::IntoFuture;

use crate::cache::Resource;
use crate::client::ApiClient;
use crate::error::ClientError;
use crate::executor::Response;

/// A position in the API reached by navigating segments.
#[derive(Clone)]
pub struct Endpoint {
    client: ApiClient,
    chain: Vec<String>,
}

impl Endpoint {
    pub(crate) fn new(client: ApiClient, chain: Vec<String>) -> Self {
        Self { client, chain }
    }

    /// Extends the chain by one segment.
    pub fn path(&self, segment: impl ToString) -> Endpoint {
        let mut chain = self.chain.clone();
        chain.push(segment.to_string());
        Endpoint::new(self.client.clone(), chain)
    }

    /// Segments navigated so far.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn token(&self) -> Option<String> {
        self.client.token()
    }

    pub fn get_token(&self) -> Option<String> {
        self.client.get_token()
    }

    pub fn set_token(&self, token: Option<String>) {
        self.client.set_token(token);
    }

    pub fn clear(&self) {
        self.client.clear();
    }

    /// Binds the chain to `verb`. The returned request can carry a payload
    /// and is sent with `.send()` or by awaiting it.
    pub fn method(&self, verb: Verb) -> Request {
        Request { client: self.client.clone(), chain: self.chain.clone(), verb, payload: Ok(None) }
    }

    /// `GET`; a payload object becomes the query string. The result is cached.
    pub async fn get(&self, payload: Option<Value>) -> Result<Outcome<Resource>, ClientError> {
        self.client.executor().read(&self.chain, payload.as_ref()).await
    }

    pub async fn post(&self, payload: Option<Value>) -> Result<Outcome<Value>, ClientError> {
        self.write(Verb::Post, payload).await
    }

    pub async fn put(&self, payload: Option<Value>) -> Result<Outcome<Value>, ClientError> {
        self.write(Verb::Put, payload).await
    }

    pub async fn patch(&self, payload: Option<Value>) -> Result<Outcome<Value>, ClientError> {
        self.write(Verb::Patch, payload).await
    }

    pub async fn delete(&self, payload: Option<Value>) -> Result<Outcome<Value>, ClientError> {
        self.write(Verb::Delete, payload).await
    }

    async fn write(
        &self,
        verb: Verb,
        payload: Option<Value>,
    ) -> Result<Outcome<Value>, ClientError> {
        self.client.executor().write(&self.chain, verb, payload.as_ref()).await
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Endpoint(/{})", self.chain.join("/"))
    }
}

/// A chain bound to a verb, ready to send.
pub struct Request {
    client: ApiClient,
    chain: Vec<String>,
    verb: Verb,
    payload: Result<Option<Value>, String>,
}

impl Request {
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Attaches a payload: query parameters for `get`, JSON body for
    /// `post`/`put`/`patch`. Serialization errors surface on send.
    pub fn payload<P: Serialize + ?Sized>(mut self, payload: &P) -> Self {
        self.payload = serde_json::to_value(payload).map(Some).map_err(|e| e.to_string());
        self
    }

    pub fn json(mut self, payload: Value) -> Self {
        self.payload = Ok(Some(payload));
        self
    }

    pub async fn send(self) -> Result<Outcome<Response>, ClientError> {
        let payload = self.payload.map_err(ClientError::InvalidPayload)?;
        self.client.executor().execute(&self.chain, self.verb, payload.as_ref()).await
    }
}

impl IntoFuture for Request {
    type Output = Result<Outcome<Response>, ClientError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}
