//! Port implementations backed by external crates.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
