use std::sync::Arc;

use crate::models::error::ScannerError;
use crate::models::state::AuthorizationStatus;
use crate::traits::authorizer::CameraAuthorizer;

/// Tracks camera permission and makes sure the platform prompt is shown at
/// most once while the answer is pending.
pub struct AuthorizationGate {
    authorizer: Arc<dyn CameraAuthorizer>,
    status: AuthorizationStatus,
    prompt_pending: bool,
}

impl AuthorizationGate {
    pub fn new(authorizer: Arc<dyn CameraAuthorizer>) -> Self {
        let status = authorizer.status();
        Self {
            authorizer,
            status,
            prompt_pending: false,
        }
    }

    /// Last status observed. Never queries the platform.
    pub fn status(&self) -> AuthorizationStatus {
        self.status
    }

    /// Re-read the platform status (non-prompting).
    pub fn refresh(&mut self) -> AuthorizationStatus {
        self.status = self.authorizer.status();
        self.status
    }

    pub fn is_prompt_pending(&self) -> bool {
        self.prompt_pending
    }

    /// Mark a prompt as pending. Returns the authorizer to prompt with, or
    /// `None` if a prompt is already showing.
    pub fn begin_prompt(&mut self) -> Option<Arc<dyn CameraAuthorizer>> {
        if self.prompt_pending {
            return None;
        }
        self.prompt_pending = true;
        Some(Arc::clone(&self.authorizer))
    }

    /// Record the prompt's answer.
    pub fn finish_prompt(&mut self, granted: bool) -> Result<(), ScannerError> {
        self.prompt_pending = false;
        self.status = match self.authorizer.status() {
            AuthorizationStatus::NotDetermined if granted => AuthorizationStatus::Authorized,
            AuthorizationStatus::NotDetermined => AuthorizationStatus::Denied,
            status => status,
        };

        if granted {
            Ok(())
        } else {
            Err(ScannerError::CameraAccessDenied)
        }
    }
}
