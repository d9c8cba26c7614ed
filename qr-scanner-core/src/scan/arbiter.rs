use chrono::{DateTime, Utc};

use crate::models::command::{RequestId, ResponsePayload};
use crate::models::error::ScannerError;
use crate::runtime::reply::Reply;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Active,
    Cancelled,
    Fulfilled,
}

/// One pending "give me the next decoded value" command.
#[derive(Debug)]
pub struct ScanRequest {
    reply: Reply,
    status: ScanStatus,
    issued_at: DateTime<Utc>,
}

impl ScanRequest {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            status: ScanStatus::Active,
            issued_at: Utc::now(),
        }
    }

    pub fn request_id(&self) -> &RequestId {
        self.reply.request_id()
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    fn finish(mut self, outcome: Result<ResponsePayload, ScannerError>) -> ScanResolution {
        self.status = match outcome {
            Ok(_) => ScanStatus::Fulfilled,
            Err(_) => ScanStatus::Cancelled,
        };
        ScanResolution {
            request: self,
            outcome,
        }
    }
}

/// A scan request that reached a terminal status, with the result its
/// caller is owed.
///
/// Produced while the scanner state is locked; `deliver` once unlocked.
#[derive(Debug)]
pub struct ScanResolution {
    request: ScanRequest,
    outcome: Result<ResponsePayload, ScannerError>,
}

impl ScanResolution {
    pub fn status(&self) -> ScanStatus {
        self.request.status
    }

    pub fn request_id(&self) -> &RequestId {
        self.request.request_id()
    }

    pub fn deliver(self) {
        let elapsed = Utc::now() - self.request.issued_at;
        log::debug!(
            "scan {} {:?} after {}ms",
            self.request.request_id(),
            self.request.status,
            elapsed.num_milliseconds()
        );
        self.request.reply.resolve(self.outcome);
    }
}

/// Holds at most one active scan request and decides what each decode
/// event resolves.
///
/// `scanning` is true only while a request is active and not paused;
/// `paused` only while an active request's preview is paused. The two are
/// never both true.
#[derive(Debug, Default)]
pub struct ScanArbiter {
    pending: Option<ScanRequest>,
    scanning: bool,
    paused: bool,
}

impl ScanArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pending(&self) -> Option<&ScanRequest> {
        self.pending.as_ref()
    }

    /// Install a new active request.
    ///
    /// A request that was still active is superseded and resolves with
    /// `scan_canceled`; the returned resolution must be delivered.
    pub fn begin_scan(&mut self, reply: Reply) -> Option<ScanResolution> {
        let superseded = self.pending.take().map(|prior| {
            log::warn!(
                "scan {} superseded by {}",
                prior.request_id(),
                reply.request_id()
            );
            prior.finish(Err(ScannerError::ScanCanceled))
        });

        log::debug!("scan {} active", reply.request_id());
        self.pending = Some(ScanRequest::new(reply));
        self.scanning = true;
        self.paused = false;
        superseded
    }

    /// Offer a decoded value. Ignored unless a request is active and
    /// scanning.
    pub fn on_decode(&mut self, value: &str) -> Option<ScanResolution> {
        if !self.scanning {
            log::debug!("decode ignored: not scanning");
            return None;
        }
        let request = self.pending.take()?;
        self.scanning = false;
        self.paused = false;
        Some(request.finish(Ok(ResponsePayload::Decoded(value.to_string()))))
    }

    pub fn cancel_scan(&mut self) -> Option<ScanResolution> {
        let request = self.pending.take()?;
        self.scanning = false;
        self.paused = false;
        Some(request.finish(Err(ScannerError::ScanCanceled)))
    }

    pub fn pause(&mut self) {
        if self.scanning {
            self.scanning = false;
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.scanning = true;
        }
    }
}
