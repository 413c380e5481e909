//! HTTP host server subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, middleware stack)
//!     → assets.rs (static files or dev server, may short-circuit)
//!     → routes.rs (exact routes, then the catch-all)
//!     → adapter (portable handler)
//!     → error.rs (handler failures become a 500)
//! ```

pub mod assets;
pub mod error;
pub mod routes;
pub mod server;

pub use assets::{serve_assets, AssetMiddleware, Assets, DevAssets, StaticAssets};
pub use routes::Routes;
pub use server::EntryServer;
