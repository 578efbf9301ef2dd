pub mod connection;
pub mod migrations;

pub mod arcades;
pub mod friends;
pub mod games;
pub mod promos;
pub mod reservations;
pub mod scores;
pub mod tickets;
pub mod users;

pub use connection::{DatabaseConfig, get_db_pool};
