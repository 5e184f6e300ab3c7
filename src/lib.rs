mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod memory;
    pub mod postgres;
    pub mod relation;
    pub mod schema;
    pub mod store;
}
mod authentication {
    pub mod permissions;
}
mod config;
mod constants;
mod gatekeeper;

mod shopping {
    pub mod aggregate;
    pub mod render;

    pub use aggregate::*;
    pub use render::*;
}

pub use authentication::permissions::*;
pub use authentication::*;
pub use config::*;
pub use constants::*;
pub use database::actions::*;
pub use database::memory::MemoryStore;
pub use database::postgres::PgStore;
pub use database::*;
pub use gatekeeper::*;
pub use shopping::*;
