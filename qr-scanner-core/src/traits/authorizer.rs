use crate::models::state::AuthorizationStatus;

/// Receives the outcome of a permission prompt: `true` when access was granted.
pub type AccessCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform camera permission.
pub trait CameraAuthorizer: Send + Sync {
    /// Current permission status. Must not prompt the user.
    fn status(&self) -> AuthorizationStatus;

    /// Show the system permission prompt.
    ///
    /// `callback` may be invoked on any thread, and may be invoked before
    /// this method returns.
    fn request_access(&self, callback: AccessCallback);
}
