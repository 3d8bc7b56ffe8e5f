pub mod endpoint_list;
pub mod host_port;

pub use host_port::{HostPort, HostPortError};
