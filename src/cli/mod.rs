mod logs;
mod root;

pub use root::Cli;
