pub mod error;
pub mod router;
pub mod routes;
pub mod setup;
pub mod shutdown;
pub mod state;
