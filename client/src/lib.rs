mod app;
mod dom;
mod persistence;
mod render;
mod state;

pub use app::run;
