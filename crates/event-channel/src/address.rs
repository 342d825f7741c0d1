//! Connection address handling.
//!
//! The auth token travels as a `token=<url-encoded>` query parameter on the
//! address used for the initial handshake.

use emsg_protocol::constants::TOKEN_QUERY_PARAM;
use url::Url;

use crate::error::ChannelError;

/// Validates `address` and appends the auth token, if any.
///
/// Only `ws://` and `wss://` addresses with a host are accepted. Existing
/// query parameters are preserved.
pub fn connection_url(address: &str, token: Option<&str>) -> Result<Url, ChannelError> {
    let mut url = Url::parse(address)
        .map_err(|e| ChannelError::InvalidAddress(format!("{address}: {e}")))?;

    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(ChannelError::InvalidAddress(format!(
                "{address}: unsupported scheme '{other}'"
            )));
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ChannelError::InvalidAddress(format!("{address}: missing host")));
    }

    if let Some(token) = token {
        let param = format!("{TOKEN_QUERY_PARAM}={}", urlencoding::encode(token));
        let query = match url.query() {
            Some(q) if !q.is_empty() => format!("{q}&{param}"),
            _ => param,
        };
        url.set_query(Some(&query));
    }

    Ok(url)
}

/// Returns `url` without its query string, for logging.
pub(crate) fn display_endpoint(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => "<invalid address>".into(),
    }
}
