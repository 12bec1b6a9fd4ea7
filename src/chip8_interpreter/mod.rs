pub mod app;
pub mod config;
pub mod cpu;
pub mod decode;
pub mod error;
pub mod io;
pub mod machine;
pub mod quirks;
pub mod state;
