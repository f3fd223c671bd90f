//! Request building: client defaults + endpoint overrides → [`RestRequest`].
//!
//! | Part | Resolution |
//! |------|------------|
//! | Port | endpoint override, else client default |
//! | Scheme | endpoint SSL override, else client flag (`https` / `http`) |
//! | Headers | client headers merged with endpoint headers, endpoint wins |
//! | Query | client parameters, then endpoint parameters |
//! | Path | endpoint path verbatim |
//! | Body | endpoint body through the request encoder |
//!
//! Building is pure. Any failure is reported before a transport is involved.

use crate::client::ClientConfig;
use crate::codec::RequestEncoder;
use crate::endpoint::Endpoint;
use crate::error::BuildError;
use crate::protocol::{format_query, merge_headers, merge_query, to_header_map};
use crate::types::RestRequest;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use url::Url;

/// Resolve `endpoint` against `config`, encoding the body with `encoder`.
///
/// When the endpoint has a body and no explicit `Content-Type`, the
/// encoder's content type is added.
///
/// # Errors
///
/// - [`BuildError::Encode`] when the body fails to encode
/// - [`BuildError::InvalidComponents`] when host, port or path do not form a URL
/// - [`BuildError::InvalidHeader`] when a merged header is not valid HTTP
///
/// # Examples
///
/// ```
/// use typed_rest::client::{build_request, ClientConfig};
/// use typed_rest::codec::EmptyEncoder;
/// use typed_rest::Endpoint;
///
/// let config = ClientConfig::new("api.example.com");
/// let request = build_request(&config, &Endpoint::get("/status").with_port(8443), &EmptyEncoder).unwrap();
/// assert_eq!(request.url.as_str(), "https://api.example.com:8443/status");
/// ```
pub fn build_request<B, E>(
    config: &ClientConfig,
    endpoint: &Endpoint<B>,
    encoder: &E,
) -> Result<RestRequest, BuildError>
where
    E: RequestEncoder<B> + ?Sized,
{
    let use_ssl = endpoint.use_ssl().unwrap_or(config.use_ssl);
    let scheme = if use_ssl { "https" } else { "http" };
    let port = endpoint.port().resolve(config.port);

    let mut url = base_url(scheme, &config.hostname, port)?;
    url.set_path(endpoint.path());
    let query = merge_query(
        &config.required_query_parameters,
        endpoint.query_parameters(),
    );
    url.set_query(format_query(&query).as_deref());

    let mut headers = to_header_map(&merge_headers(
        &config.required_headers,
        endpoint.headers(),
    ))?;

    let body = match endpoint.body() {
        Some(value) => {
            let body = encoder.encode(value)?;
            if let Some(content_type) = encoder.content_type() {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
                }
            }
            body
        }
        None => Bytes::new(),
    };

    Ok(RestRequest {
        method: endpoint.method().clone(),
        url,
        headers,
        body,
    })
}

fn base_url(scheme: &str, hostname: &str, port: u16) -> Result<Url, BuildError> {
    let invalid = |reason: String| BuildError::InvalidComponents {
        component: "host",
        reason,
    };

    if hostname.is_empty() {
        return Err(invalid("hostname is empty".to_string()));
    }

    let url = Url::parse(&format!("{}://{}:{}", scheme, hostname, port))
        .map_err(|e| invalid(format!("{:?}: {}", hostname, e)))?;

    // Anything beyond a bare host would be silently reinterpreted as path,
    // credentials or query.
    let bare = url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
        && url.username().is_empty()
        && url.password().is_none()
        && url.port_or_known_default() == Some(port);
    if !bare {
        return Err(invalid(format!("{:?} is not a bare host", hostname)));
    }
    Ok(url)
}
