pub mod app;
pub mod cli;
pub mod config;
pub mod loader;
pub mod output;
pub mod pager;
pub mod query;
pub mod record;
pub mod session;

#[cfg(test)]
mod tests;
