//! Api-request nodes perform an outbound HTTP call and expose the response
//! as `API_RESPONSE` in the branch's variables bag.
//!
//! Outbound calls are hardened: hostnames are resolved up front and any address in a
//! private, loopback, link-local, unique-local or site-local range is rejected, hop-by-hop
//! and identity headers are stripped, redirects and cookies are disabled, and the whole
//! call has a hard timeout.

use super::HandlerResult;

use crate::{
    designer::models::ApiRequest,
    flow::{
        variables::{replace_data_variables, Variables},
        FlowContext,
    },
};

use futures::StreamExt as _;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect::Policy,
    ClientBuilder,
};
use serde_json::Value;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::{event, instrument, Level};
use url::Url;

/// Hard timeout for the whole outbound call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);
/// At most this many bytes of the response body are read
const MAX_RESPONSE_BYTES: usize = 2048;

/// Hop-by-hop and identity headers that are never forwarded from user-supplied headers
const FORBIDDEN_HEADERS: [&str; 10] = [
    "connection",
    "content-length",
    "content-type",
    "host",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "transfer-encoding",
    "upgrade",
    "user-agent",
];

/// `true` for every address range the SSRF guard refuses to connect to
#[must_use]
pub fn is_private_address(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(address) => {
            address.is_loopback() || address.is_private() || address.is_link_local()
        }
        IpAddr::V6(address) => {
            if let Some(mapped) = address.to_ipv4_mapped() {
                return is_private_address(IpAddr::V4(mapped));
            }

            let segments = address.segments();

            address.is_loopback()
                // fc00::/7 (unique local)
                || segments[0] & 0xfe00 == 0xfc00
                // fe80::/10 (link local)
                || segments[0] & 0xffc0 == 0xfe80
                // fec0::/10 (site local)
                || segments[0] & 0xffc0 == 0xfec0
        }
    }
}

/// Resolves the URL's host and keeps only addresses outside the guarded ranges.
/// # Returns
/// `None` when the URL is malformed or every resolved address is refused
async fn resolve_safe_addrs(url: &Url) -> Option<(String, Vec<SocketAddr>)> {
    let host = url.host_str()?.to_owned();
    let port = url.port_or_known_default()?;

    if let Ok(address) = host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>() {
        if is_private_address(address) {
            return None;
        }

        return Some((host, vec![SocketAddr::new(address, port)]));
    }

    let resolved = tokio::net::lookup_host((host.as_str(), port)).await.ok()?;
    let safe_addrs: Vec<_> = resolved
        .filter(|address| !is_private_address(address.ip()))
        .collect();

    if safe_addrs.is_empty() {
        return None;
    }

    Some((host, safe_addrs))
}

fn safe_headers(base_headers: Option<&std::collections::HashMap<String, String>>) -> HeaderMap {
    let mut headers = HeaderMap::new();

    let Some(base_headers) = base_headers else {
        return headers;
    };

    for (name, value) in base_headers {
        if FORBIDDEN_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }

        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            continue;
        };

        headers.insert(name, value);
    }

    headers
}

async fn read_response_head(response: reqwest::Response) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::with_capacity(MAX_RESPONSE_BYTES);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(&chunk?);

        if body.len() >= MAX_RESPONSE_BYTES {
            body.truncate(MAX_RESPONSE_BYTES);
            break;
        }
    }

    Ok(body)
}

fn parse_response_body(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Performs the call and stores the parsed response under `API_RESPONSE`.
/// # Notes
/// Any transport failure, including an SSRF refusal, cuts the branch without raising.
#[instrument(skip(ctx, api_request, variables), fields(api_request_id = api_request.id))]
pub async fn handle(
    ctx: &FlowContext,
    api_request: &ApiRequest,
    variables: &mut Variables,
) -> HandlerResult {
    let Ok(url) = Url::parse(&api_request.url) else {
        event!(Level::WARN, url = api_request.url, "Invalid api-request URL");

        return Ok(None);
    };

    let Some((host, safe_addrs)) = resolve_safe_addrs(&url).await else {
        event!(
            Level::WARN,
            url = %url,
            "Refusing api-request: host resolves to no public address",
        );

        return Ok(None);
    };

    let client = ClientBuilder::new()
        .user_agent(format!(
            "ConstructorTelegramBots (constructor.exg1o.org; bot_id={bot_id})",
            bot_id = ctx.client.bot_id,
        ))
        .redirect(Policy::none())
        .timeout(REQUEST_TIMEOUT)
        .resolve_to_addrs(&host, &safe_addrs)
        .build();
    let Ok(client) = client else {
        event!(Level::WARN, "Cannot build an api-request client");

        return Ok(None);
    };

    let mut request = client
        .request(api_request.method.into(), url)
        .headers(safe_headers(api_request.headers.as_ref()));

    if let Some(body) = &api_request.body {
        request = request.json(&replace_data_variables(body, variables, true).await);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            event!(Level::WARN, error = %err, "Api-request failed, cutting the branch");

            return Ok(None);
        }
    };

    let body = match read_response_head(response).await {
        Ok(body) => body,
        Err(err) => {
            event!(Level::WARN, error = %err, "Cannot read api-request response, cutting the branch");

            return Ok(None);
        }
    };

    variables.add("API_RESPONSE", parse_response_body(&body));

    Ok(Some(api_request.source_connections.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn guarded_ranges_are_refused() {
        let refused = [
            "127.0.0.1",
            "127.255.0.1",
            "10.0.0.1",
            "172.16.0.1",
            "172.31.255.255",
            "192.168.1.1",
            "169.254.0.1",
            "::1",
            "fc00::1",
            "fd12::1",
            "fe80::1",
            "fec0::1",
            "::ffff:127.0.0.1",
            "::ffff:10.0.0.1",
        ];
        let allowed = ["1.1.1.1", "8.8.8.8", "172.32.0.1", "2606:4700:4700::1111"];

        for address in refused {
            assert!(
                is_private_address(address.parse().unwrap()),
                "{address} must be refused",
            );
        }
        for address in allowed {
            assert!(
                !is_private_address(address.parse().unwrap()),
                "{address} must be allowed",
            );
        }
    }

    #[test]
    fn forbidden_headers_are_stripped() {
        let base = std::collections::HashMap::from([
            ("Host".to_owned(), "evil.test".to_owned()),
            ("User-Agent".to_owned(), "spoofed".to_owned()),
            ("Transfer-Encoding".to_owned(), "chunked".to_owned()),
            ("X-Custom".to_owned(), "kept".to_owned()),
        ]);

        let headers = safe_headers(Some(&base));

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-custom").unwrap(), "kept");
    }

    #[test]
    fn response_body_parses_as_json_or_text() {
        assert_eq!(parse_response_body(b"{\"n\": 7}"), json!({"n": 7}));
        assert_eq!(parse_response_body(b"plain"), json!("plain"));
    }

    #[tokio::test]
    async fn loopback_url_resolves_to_nothing() {
        let url = Url::parse("http://127.0.0.1/").unwrap();

        assert!(resolve_safe_addrs(&url).await.is_none());
    }
}
