//! Command-line interface for the bbq demo

mod args;

pub use args::Args;
