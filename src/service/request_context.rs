//! Request context structure for per-request information used in logs and links

use actix_web::dev::{ConnectionInfo, ServiceRequest};
use actix_web::HttpRequest;

/// MDC key holding the client address, printed by the log pattern as `{X(remote)}`
pub const REMOTE_KEY: &str = "remote";

/// Request context containing what handlers need about the caller
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// Client address, `unknown` when the connection does not expose one
    pub remote_addr: String,
    /// `http` or `https`, as seen by the server (honours forwarding headers)
    pub scheme: String,
    /// Host (and port) the request was addressed to
    pub host: String,
    /// Request path and query string
    pub path_and_query: String,
}

impl RequestContext {
    /// Build the context from a request
    pub fn from_request(req: &HttpRequest) -> Self {
        let info = req.connection_info();
        Self {
            remote_addr: remote_addr(&info),
            scheme: info.scheme().to_string(),
            host: info.host().to_string(),
            path_and_query: req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| req.path().to_string()),
        }
    }

    /// `scheme://host/`
    pub fn base_url(&self) -> String {
        format!("{}://{}/", self.scheme, self.host)
    }

    /// The full URL of this request
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path_and_query)
    }

    /// Shareable link to a single quote
    pub fn quote_link(&self, id: i64) -> String {
        format!("{}quote/{}", self.base_url(), id)
    }
}

fn remote_addr(info: &ConnectionInfo) -> String {
    info.realip_remote_addr().unwrap_or("unknown").to_string()
}

/// Tag this worker thread's log lines with the caller's address.
///
/// Runs for every request, matched or not, so no line carries the address of
/// an earlier request.
pub fn tag_remote_addr(req: &ServiceRequest) {
    log_mdc::insert(REMOTE_KEY, remote_addr(&req.connection_info()));
}
