#![deny(clippy::all)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::todo)]
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]


pub mod cfg {
    mod app_settings;
    mod database_settings;
    mod loader_settings;
    mod server_settings;

    pub use app_settings::*;
    pub use database_settings::*;
    pub use loader_settings::*;
    pub use server_settings::*;
}

pub mod core {
    mod context;
    mod dbpool;

    pub use context::*;
    pub use dbpool::*;
}

pub mod loader {
    mod page_data;

    pub use page_data::*;
}

pub mod db {
    mod students;

    pub use students::*;
}

pub mod routes {
    pub mod health;
    pub mod students;
}

pub mod app {
    mod cli;
    mod migrations;
    mod router;
    mod server;

    pub use cli::*;
    pub use migrations::*;
    pub use router::*;
    pub use server::*;
}
