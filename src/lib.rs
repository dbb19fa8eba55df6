pub mod analysis;
pub mod backend;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod mock;
pub mod model;
pub mod poller;
pub mod ui;
