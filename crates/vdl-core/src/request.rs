//! Download request data and URL construction.

use url::Url;

use crate::config::{QueryParam, VdlConfig};
use crate::error::DownloadError;

/// Input for one download invocation. Immutable once handed to the engine.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Auth token issued by the storage service. Becomes a URL path segment,
    /// so treat logs containing the full URL as sensitive.
    pub auth_token: String,
    /// Id of the file to fetch.
    pub file_id: u64,
    /// Version to fetch; `None` means the latest version.
    pub version_id: Option<u64>,
    /// Per-request query parameters, appended after the configured ones in
    /// the order given.
    pub query_params: Vec<QueryParam>,
}

impl DownloadRequest {
    pub fn new(auth_token: &str, file_id: u64) -> Self {
        Self {
            auth_token: auth_token.to_string(),
            file_id,
            version_id: None,
            query_params: Vec::new(),
        }
    }
}

/// Builds the absolute download URL:
/// `<scheme>://<authority><path>/<auth-token>/<file-id>[/<version-id>]`.
///
/// Path segments are percent-encoded as needed. Query parameters keep their
/// given order, configuration-wide ones first, and duplicates are preserved.
/// Fails with `InvalidUrl` when the base does not parse, or when the parsed
/// authority differs from the configured one (an empty authority would
/// otherwise promote the first path segment to the host).
pub fn build_download_url(
    config: &VdlConfig,
    request: &DownloadRequest,
) -> Result<Url, DownloadError> {
    let base = format!(
        "{}://{}{}",
        config.download_url_scheme, config.download_url_authority, config.download_url_path
    );
    let mut url =
        Url::parse(&base).map_err(|e| DownloadError::InvalidUrl(format!("{base}: {e}")))?;

    let configured = &config.download_url_authority;
    let host = url.host_str().unwrap_or_default();
    let authority_eq = |port: Option<u16>| match port {
        Some(port) => configured.eq_ignore_ascii_case(&format!("{host}:{port}")),
        None => configured.eq_ignore_ascii_case(host),
    };
    if !authority_eq(url.port()) && !authority_eq(url.port_or_known_default()) {
        return Err(DownloadError::InvalidUrl(format!(
            "{base}: authority {configured:?} did not survive URL parsing"
        )));
    }

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| DownloadError::InvalidUrl(format!("{base}: cannot be a base URL")))?;
        segments.pop_if_empty();
        segments.push(&request.auth_token);
        segments.push(&request.file_id.to_string());
        if let Some(version_id) = request.version_id {
            segments.push(&version_id.to_string());
        }
    }

    let params: Vec<&QueryParam> = config
        .query_params
        .iter()
        .chain(request.query_params.iter())
        .collect();
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for param in params {
            pairs.append_pair(&param.name, &param.value);
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> VdlConfig {
        VdlConfig {
            download_url_scheme: "https".to_string(),
            download_url_authority: "www.vaultstore.net".to_string(),
            download_url_path: "/api/1.0/download".to_string(),
            ..VdlConfig::default()
        }
    }

    #[test]
    fn builds_latest_version_url() {
        let url = build_download_url(&test_config(), &DownloadRequest::new("abc123", 42))
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://www.vaultstore.net/api/1.0/download/abc123/42"
        );
    }

    #[test]
    fn includes_version_segment_when_set() {
        let mut request = DownloadRequest::new("abc123", 42);
        request.version_id = Some(7);
        let url = build_download_url(&test_config(), &request).expect("url");
        assert_eq!(
            url.as_str(),
            "https://www.vaultstore.net/api/1.0/download/abc123/42/7"
        );
    }

    #[test]
    fn appends_query_params_in_order() {
        let mut config = test_config();
        config.query_params.push(QueryParam {
            name: "a".to_string(),
            value: "1".to_string(),
        });
        let mut request = DownloadRequest::new("t", 1);
        request.query_params.push(QueryParam {
            name: "b".to_string(),
            value: "2".to_string(),
        });
        request.query_params.push(QueryParam {
            name: "a".to_string(),
            value: "3".to_string(),
        });
        let url = build_download_url(&config, &request).expect("url");
        assert_eq!(url.query(), Some("a=1&b=2&a=3"));
    }

    #[test]
    fn no_params_means_no_query_string() {
        let url = build_download_url(&test_config(), &DownloadRequest::new("t", 1)).expect("url");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn token_is_percent_encoded_into_one_segment() {
        let url = build_download_url(&test_config(), &DownloadRequest::new("ab/cd e", 5))
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://www.vaultstore.net/api/1.0/download/ab%2Fcd%20e/5"
        );
    }

    #[test]
    fn trailing_slash_on_base_path_is_collapsed() {
        let mut config = test_config();
        config.download_url_path = "/api/1.0/download/".to_string();
        let url = build_download_url(&config, &DownloadRequest::new("tok", 9)).expect("url");
        assert_eq!(
            url.as_str(),
            "https://www.vaultstore.net/api/1.0/download/tok/9"
        );
    }

    #[test]
    fn authority_with_port_survives_round_trip() {
        let mut config = test_config();
        config.download_url_authority = "files.example.net:8080".to_string();
        let url = build_download_url(&config, &DownloadRequest::new("t", 1)).expect("url");
        assert_eq!(
            url.as_str(),
            "https://files.example.net:8080/api/1.0/download/t/1"
        );

        // An explicit default port is dropped from the rendered URL but
        // still matches the configured authority.
        config.download_url_authority = "files.example.net:443".to_string();
        let url = build_download_url(&config, &DownloadRequest::new("t", 1)).expect("url");
        assert_eq!(url.as_str(), "https://files.example.net/api/1.0/download/t/1");
    }

    #[test]
    fn authority_must_survive_parsing_unchanged() {
        // An empty authority would otherwise promote the first path segment
        // to the host, pointing the token-bearing request at "api".
        let mut config = test_config();
        config.download_url_authority = String::new();
        let err = build_download_url(&config, &DownloadRequest::new("secret", 1)).unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl(_)));

        // Extra path segments cannot ride in on the authority.
        config.download_url_authority = "files.example.net/extra".to_string();
        let err = build_download_url(&config, &DownloadRequest::new("secret", 1)).unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl(_)));

        // A base path without its leading slash fuses into the host.
        config.download_url_authority = "files.example.net".to_string();
        config.download_url_path = "api/1.0/download".to_string();
        let err = build_download_url(&config, &DownloadRequest::new("secret", 1)).unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl(_)));
    }

    #[test]
    fn bad_authority_is_reported_as_invalid_url() {
        let mut config = test_config();
        config.download_url_authority = "not a host".to_string();
        let err = build_download_url(&config, &DownloadRequest::new("t", 1)).unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl(_)));

        config.download_url_authority = String::new();
        let err = build_download_url(&config, &DownloadRequest::new("t", 1)).unwrap_err();
        assert!(matches!(err, DownloadError::InvalidUrl(_)));
    }
}
