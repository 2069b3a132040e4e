//! HTTP API module
//!
//! REST surface for bill uploads: extract records as JSON or apply a bill
//! straight into a downloadable report workbook. Run with `utilibill-server`.

pub mod handlers;
pub mod server;

pub use server::run_api_server;
