mod http_policy;
mod server;

pub use http_policy::*;
pub use server::*;
