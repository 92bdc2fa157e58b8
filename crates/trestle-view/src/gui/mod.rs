mod app;
mod model;
mod shell;

pub use shell::run_gui;
