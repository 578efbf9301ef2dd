pub mod admin;
pub mod arcades;
pub mod auth;
pub mod friends;
pub mod games;
pub mod promos;
pub mod reservations;
pub mod scores;
pub mod tickets;
pub mod users;

use serde::Serialize;

/// Plain acknowledgement body used by mutation endpoints.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
