pub mod catalog;
pub mod games;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod ws;

pub use routes::create_router;
pub use ws::WsMessage;
