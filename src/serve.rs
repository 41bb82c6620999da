//! HTTP front end.
//!
//! A tiny_http listener whose request loop hands each request to a rayon
//! pool. Every request is resolved and rendered by [`Site::handle`]; this
//! module only translates between HTTP and [`site::Response`].
//!
//! Only `GET` and `HEAD` are served. `HEAD` gets the same status and headers
//! as `GET` with an empty body.

use crate::config::ServeConfig;
use crate::gateway::Transport;
use crate::site::{self, Site};
use std::io::{Cursor, Read};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("invalid serve.interface '{0}'")]
    Interface(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Bind the listener described by `config`. Returns the address actually
/// bound (relevant when the configured port is 0).
pub fn bind(config: &ServeConfig) -> Result<(Server, SocketAddr), ServeError> {
    let ip: IpAddr = config
        .interface
        .parse()
        .map_err(|_| ServeError::Interface(config.interface.clone()))?;
    let addr = SocketAddr::new(ip, config.port);
    let server = Server::http(addr).map_err(|source| ServeError::Bind { addr, source })?;
    let bound = server.server_addr().to_ip().unwrap_or(addr);
    Ok((server, bound))
}

/// Serve requests until the listener shuts down.
pub fn run<T: Transport + 'static>(
    site: Arc<Site<T>>,
    server: Server,
    workers: usize,
) -> Result<(), ServeError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("quire-worker-{i}"))
        .build()?;

    for request in server.incoming_requests() {
        let site = Arc::clone(&site);
        pool.spawn(move || handle_request(&site, request));
    }
    Ok(())
}

fn handle_request<T: Transport>(site: &Site<T>, request: Request) {
    let method = request.method().clone();
    let target = request.url().to_string();

    // tiny_http drops the body itself when answering HEAD.
    let response = match method {
        Method::Get | Method::Head => to_http(site.handle(&target)),
        _ => method_not_allowed(),
    };
    let status = response.status_code().0;

    if let Err(e) = request.respond(response) {
        log::warn!("{method} {target}: failed to send response: {e}");
        return;
    }
    log::info!("{method} {target} {status}");
}

fn to_http(page: site::Response) -> Response<Cursor<Vec<u8>>> {
    let response =
        Response::from_data(page.body.into_bytes()).with_status_code(StatusCode(page.status));
    with_header(response, "Content-Type", page.content_type)
}

fn method_not_allowed() -> Response<Cursor<Vec<u8>>> {
    let response =
        Response::from_data(b"Method Not Allowed".to_vec()).with_status_code(StatusCode(405));
    let response = with_header(response, "Allow", "GET, HEAD");
    with_header(response, "Content-Type", "text/plain; charset=utf-8")
}

fn with_header<R: Read>(response: Response<R>, name: &str, value: &str) -> Response<R> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => {
            log::warn!("dropping invalid header {name}: {value}");
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MemoryTransport, site_with};
    use std::io::Write;
    use std::net::TcpStream;

    #[test]
    fn to_http_keeps_status_and_type() {
        let page = site::Response {
            status: 404,
            content_type: site::HTML,
            body: "<p>gone</p>".into(),
        };
        let response = to_http(page);
        assert_eq!(response.status_code().0, 404);
        assert_eq!(response.data_length(), Some(11));
        assert!(
            response
                .headers()
                .iter()
                .any(|h| h.field.equiv("Content-Type") && h.value.as_str() == site::HTML)
        );
    }

    #[test]
    fn bad_interface_is_rejected() {
        let config = ServeConfig {
            interface: "not-an-ip".into(),
            ..ServeConfig::default()
        };
        assert!(matches!(bind(&config), Err(ServeError::Interface(_))));
    }

    fn raw_request(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(request.as_bytes()).unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn serves_pages_over_loopback() {
        let config = ServeConfig {
            interface: "127.0.0.1".into(),
            port: 0,
            workers: 2,
        };
        let (server, addr) = bind(&config).unwrap();
        let site = Arc::new(site_with(MemoryTransport::new().with("posts?type=blog", "[]")));
        std::thread::spawn(move || run(site, server, 2));

        let ok = raw_request(
            addr,
            "GET /blog HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        );
        assert!(ok.starts_with("HTTP/1.1 200"), "{ok}");
        assert!(ok.contains("No posts found."));

        let missing = raw_request(
            addr,
            "GET /nope/nope/nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        );
        assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

        let post = raw_request(
            addr,
            "POST /blog HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        assert!(post.starts_with("HTTP/1.1 405"), "{post}");

        let head = raw_request(
            addr,
            "HEAD /blog HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        );
        assert!(head.starts_with("HTTP/1.1 200"), "{head}");
        assert!(!head.contains("No posts found."));
    }
}
