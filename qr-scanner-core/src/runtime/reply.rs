use std::fmt;
use std::sync::Arc;

use crate::models::command::{RequestId, Response, ResponsePayload};
use crate::models::error::ScannerError;
use crate::models::status::StatusSnapshot;
use crate::traits::response_sink::ResponseSink;

/// The right to answer one request.
///
/// Not cloneable and consumed by every resolving method, so a request can
/// be answered at most once. A reply dropped unanswered delivers
/// `unexpected_error`, so it is also answered at least once.
pub struct Reply {
    request_id: RequestId,
    sink: Arc<dyn ResponseSink>,
    resolved: bool,
}

impl Reply {
    pub fn new(request_id: RequestId, sink: Arc<dyn ResponseSink>) -> Self {
        Self {
            request_id,
            sink,
            resolved: false,
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn resolve(mut self, outcome: Result<ResponsePayload, ScannerError>) {
        self.send(outcome);
    }

    pub fn status(self, snapshot: StatusSnapshot) {
        self.resolve(Ok(ResponsePayload::Status(snapshot)));
    }

    pub fn decoded(self, value: String) {
        self.resolve(Ok(ResponsePayload::Decoded(value)));
    }

    pub fn fail(self, error: ScannerError) {
        self.resolve(Err(error));
    }

    fn send(&mut self, outcome: Result<ResponsePayload, ScannerError>) {
        self.resolved = true;
        if let Err(error) = &outcome {
            log::warn!("request {} failed: {} ({})", self.request_id, error.name(), error.code());
        }
        self.sink.deliver(Response {
            request_id: self.request_id.clone(),
            outcome,
        });
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if !self.resolved {
            log::error!("request {} dropped without a response", self.request_id);
            self.send(Err(ScannerError::UnexpectedError));
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("request_id", &self.request_id)
            .field("resolved", &self.resolved)
            .finish()
    }
}
