pub mod error;
pub mod routes;
pub mod server;

pub use error::{Error, RestError, Result};
pub use routes::{create_routes, ServerState};
pub use server::{A2AServer, A2AServerBuilder};
