use crate::models::error::BackendError;

/// Navigation to the platform's privacy settings for this app.
pub trait SettingsOpener: Send + Sync {
    fn can_open(&self) -> bool;

    fn open(&self) -> Result<(), BackendError>;
}
