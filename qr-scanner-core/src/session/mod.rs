pub mod focus;
pub mod manager;
pub mod registry;
pub mod relay;
pub mod torch;
