mod http_transport;
mod prepared_upstream;

pub use http_transport::HttpTransport;
pub use prepared_upstream::{build_upstream_headers, PreparedUpstream};
