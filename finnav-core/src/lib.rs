pub mod actor;
pub mod app;
pub mod catalog;
pub mod config;
pub mod content;
pub mod debounce;
pub mod error;
pub mod find;
pub mod history;
pub mod markup;
pub mod overlay;
pub mod promise;
pub mod recent;
pub mod router;
pub mod search;
pub mod slug;
pub mod store;
pub mod view;

#[cfg(test)]
mod testing;
