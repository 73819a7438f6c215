pub mod api;
pub mod cycle;
pub mod model;
pub mod poller;
pub mod settings;
pub mod state;

pub use api::Error;
