//! Per-resource admin services: validation + queries + commit for the
//! operations behind `/admin/...`. One stateless instance is built per
//! request around the shared pool.

pub mod arcades;
pub mod games;
pub mod promos;
pub mod stats;
pub mod users;

pub use arcades::ArcadeAdminService;
pub use games::GameAdminService;
pub use promos::PromoAdminService;
pub use stats::StatsService;
pub use users::UserAdminService;
