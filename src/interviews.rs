mod api;
mod handlers;
#[cfg(test)]
mod memory;
mod models;
mod repository;

pub use handlers::handle;
