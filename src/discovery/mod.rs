// ABOUTME: SSH endpoint discovery over HTTP.
// ABOUTME: Reads the advertised host:port from the X-SSH-Endpoint response header.

mod error;

pub use error::{Error, Result};

use bytes::Bytes;
use http_body_util::Empty;
use hyper_util::rt::TokioIo;
use std::str::FromStr;
use tokio::net::TcpStream;

/// Response header naming the SSH endpoint, formatted as `host:port`.
pub const ENDPOINT_HEADER: &str = "X-SSH-Endpoint";

/// A resolved SSH connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Split on the first colon; everything after it must be a port number.
    fn from_str(s: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedEndpoint {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = s.split_once(':').ok_or_else(|| malformed("missing ':'"))?;
        if host.is_empty() {
            return Err(malformed("empty host"));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| malformed("port is not a number"))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Resolve the SSH endpoint advertised by the server at `base_url`.
///
/// Issues a GET to `<base_url>/login` and reads the `X-SSH-Endpoint` response
/// header. A missing header means the server does not offer SSH and yields
/// `Ok(None)` so the caller can fall back to another transport; a present but
/// unparsable header is a hard error.
pub async fn resolve(base_url: &str) -> Result<Option<Endpoint>> {
    let uri: hyper::Uri = base_url.parse().map_err(|e| Error::InvalidUrl {
        url: base_url.to_string(),
        reason: format!("{e}"),
    })?;

    match uri.scheme_str() {
        Some("http") => {}
        Some(other) => return Err(Error::UnsupportedScheme(other.to_string())),
        None => {
            return Err(Error::InvalidUrl {
                url: base_url.to_string(),
                reason: "missing scheme".to_string(),
            });
        }
    }

    let host = uri.host().ok_or_else(|| Error::InvalidUrl {
        url: base_url.to_string(),
        reason: "missing host".to_string(),
    })?;
    let port = uri.port_u16().unwrap_or(80);
    let addr = format!("{host}:{port}");

    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|e| Error::Unreachable {
            addr: addr.clone(),
            source: e,
        })?;
    let io = TokioIo::new(stream);

    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

    // Drive the connection in the background until the exchange completes.
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::warn!("discovery connection error: {}", e);
        }
    });

    let req = hyper::Request::builder()
        .method("GET")
        .uri(login_path(uri.path()))
        .header("Host", &addr)
        .body(Empty::<Bytes>::new())?;

    let resp = sender.send_request(req).await?;
    tracing::debug!("GET {}/login -> {}", base_url, resp.status());

    let Some(value) = resp.headers().get(ENDPOINT_HEADER) else {
        tracing::warn!("no {} header returned by {}", ENDPOINT_HEADER, base_url);
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| Error::MalformedEndpoint {
        value: format!("{value:?}"),
        reason: "header value is not valid ASCII".to_string(),
    })?;

    let endpoint = value.parse::<Endpoint>()?;
    tracing::debug!("connecting via SSH to {}", endpoint);
    Ok(Some(endpoint))
}

/// Join the base path with the login page, collapsing a trailing slash.
fn login_path(base_path: &str) -> String {
    format!("{}/login", base_path.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_parses_host_and_port() {
        let ep: Endpoint = "build.example.com:2222".parse().unwrap();
        assert_eq!(ep.host, "build.example.com");
        assert_eq!(ep.port, 2222);
    }

    #[test]
    fn endpoint_splits_on_first_colon() {
        // Anything after the first colon must be a bare port number.
        let err = "host:2222:extra".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, Error::MalformedEndpoint { .. }));
    }

    #[test]
    fn endpoint_without_colon_is_malformed() {
        let err = "bad-endpoint".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, Error::MalformedEndpoint { .. }));
    }

    #[test]
    fn endpoint_with_non_numeric_port_is_malformed() {
        let err = "host:notanumber".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, Error::MalformedEndpoint { .. }));
    }

    #[test]
    fn endpoint_with_empty_host_is_malformed() {
        let err = ":22".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, Error::MalformedEndpoint { .. }));
    }

    #[test]
    fn endpoint_displays_as_host_port() {
        let ep: Endpoint = "example.org:22".parse().unwrap();
        assert_eq!(ep.to_string(), "example.org:22");
    }

    #[test]
    fn login_path_collapses_trailing_slash() {
        assert_eq!(login_path("/"), "/login");
        assert_eq!(login_path(""), "/login");
        assert_eq!(login_path("/ci/"), "/ci/login");
        assert_eq!(login_path("/ci"), "/ci/login");
    }
}
