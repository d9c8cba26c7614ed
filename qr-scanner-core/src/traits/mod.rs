pub mod authorizer;
pub mod capture_backend;
pub mod capture_session;
pub mod preview_sink;
pub mod response_sink;
pub mod settings_opener;
