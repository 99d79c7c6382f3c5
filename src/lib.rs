pub mod camera;
pub mod cell;
pub mod client;
pub mod config;
pub mod events;
pub mod grid;
pub mod io;
pub mod logging;
pub mod protocol;
pub mod render;
pub mod rules;
pub mod server;
pub mod session;
pub mod viewport;
pub mod world;
