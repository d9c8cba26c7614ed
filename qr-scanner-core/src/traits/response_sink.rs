use crate::models::command::Response;

/// Host channel receiving command results.
///
/// Called on the scanner's response thread, one call per request.
pub trait ResponseSink: Send + Sync {
    fn deliver(&self, response: Response);
}
