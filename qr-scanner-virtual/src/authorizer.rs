//! Scripted camera permission.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use qr_scanner_core::models::state::AuthorizationStatus;
use qr_scanner_core::traits::authorizer::{AccessCallback, CameraAuthorizer};

/// How the virtual user answers the permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Grant,
    Deny,
    /// Leave the prompt open until `answer_pending` is called.
    Defer,
}

pub struct VirtualAuthorizer {
    status: Mutex<AuthorizationStatus>,
    answer: PromptAnswer,
    pending: Mutex<Vec<AccessCallback>>,
    prompts: AtomicUsize,
}

impl VirtualAuthorizer {
    pub fn new(status: AuthorizationStatus, answer: PromptAnswer) -> Self {
        Self {
            status: Mutex::new(status),
            answer,
            pending: Mutex::new(Vec::new()),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn authorized() -> Self {
        Self::new(AuthorizationStatus::Authorized, PromptAnswer::Grant)
    }

    pub fn set_status(&self, status: AuthorizationStatus) {
        *self.status.lock() = status;
    }

    /// How many times the prompt was shown.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn has_pending_prompt(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Answer a deferred prompt.
    pub fn answer_pending(&self, granted: bool) {
        let callbacks: Vec<AccessCallback> = self.pending.lock().drain(..).collect();
        if callbacks.is_empty() {
            return;
        }
        self.record(granted);
        for callback in callbacks {
            callback(granted);
        }
    }

    fn record(&self, granted: bool) {
        *self.status.lock() = if granted {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
    }
}

impl CameraAuthorizer for VirtualAuthorizer {
    fn status(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    fn request_access(&self, callback: AccessCallback) {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        log::debug!("virtual permission prompt shown ({:?})", self.answer);

        match self.answer {
            PromptAnswer::Grant | PromptAnswer::Deny => {
                let granted = self.answer == PromptAnswer::Grant;
                self.record(granted);
                callback(granted);
            }
            PromptAnswer::Defer => self.pending.lock().push(callback),
        }
    }
}
