//! URL feature extraction
//!
//! The URL string is decomposed once into an immutable [`UrlContext`]; every
//! feature is a pure function of that context. Parsing is permissive:
//! scheme-less input is retried with an `http://` prefix, and input that
//! still fails to parse degrades to an empty decomposition so the raw-string
//! features keep working.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::config::ExtractorConfig;
use crate::entropy::shannon_entropy;
use crate::error::{FeatureError, Result};
use crate::patterns::{self, URL_KEYWORDS};
use crate::types::FeatureMap;
use crate::FeatureExtractor;

static IPV4_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$").unwrap());

/// Immutable decomposition of one URL.
#[derive(Debug)]
pub struct UrlContext {
    /// Original URL string, verbatim
    pub raw: String,
    /// Scheme, defaulted to `http` for scheme-less input
    pub scheme: String,
    /// Network location: optional userinfo, host, optional port
    pub netloc: String,
    /// Path component
    pub path: String,
    /// Query string without the leading `?`, empty when absent
    pub query: String,
}

impl UrlContext {
    /// Decompose `raw` once. Never fails; see the module docs for the
    /// degradation rules.
    pub fn parse(raw: &str) -> Self {
        if let Ok(url) = Url::parse(raw) {
            return Self::from_parts(raw, raw, url.scheme());
        }
        let prefixed = format!("http://{raw}");
        match Url::parse(&prefixed) {
            Ok(url) => Self::from_parts(raw, &prefixed, url.scheme()),
            Err(_) => Self {
                raw: raw.to_string(),
                scheme: "http".to_string(),
                netloc: String::new(),
                path: String::new(),
                query: String::new(),
            },
        }
    }

    // The url crate validates the input and supplies the scheme, but the
    // components are sliced from the text itself: canonicalization would
    // synthesize a `/` path for pathless URLs and drop explicit default
    // ports, and the length/count features are defined over what the URL
    // actually says.
    fn from_parts(raw: &str, effective: &str, scheme: &str) -> Self {
        let after_scheme = &effective[scheme.len() + 1..];
        let (netloc, rest) = match after_scheme.strip_prefix("//") {
            Some(stripped) => {
                let end = stripped.find(['/', '?', '#']).unwrap_or(stripped.len());
                stripped.split_at(end)
            }
            None => ("", after_scheme),
        };
        let rest = &rest[..rest.find('#').unwrap_or(rest.len())];
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        Self {
            raw: raw.to_string(),
            scheme: scheme.to_string(),
            netloc: netloc.to_string(),
            path: path.to_string(),
            query: query.to_string(),
        }
    }
}

/// Shannon entropy of the whole URL string.
pub fn url_entropy(ctx: &UrlContext) -> f64 {
    shannon_entropy(&ctx.raw)
}

/// Total URL length in characters.
pub fn url_length(ctx: &UrlContext) -> usize {
    ctx.raw.chars().count()
}

/// Path length in characters.
pub fn path_length(ctx: &UrlContext) -> usize {
    ctx.path.chars().count()
}

/// Network-location length in characters, port suffix included.
pub fn host_length(ctx: &UrlContext) -> usize {
    ctx.netloc.chars().count()
}

/// Whether the host is a literal IPv4 address.
pub fn host_is_ip(ctx: &UrlContext) -> bool {
    IPV4_HOST.is_match(&ctx.netloc)
}

/// Whether the network location carries an explicit numeric port suffix.
pub fn has_port(ctx: &UrlContext) -> bool {
    match ctx.netloc.rsplit_once(':') {
        Some((_, suffix)) => !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Digit characters across the whole URL.
pub fn digit_count(ctx: &UrlContext) -> usize {
    ctx.raw.chars().filter(char::is_ascii_digit).count()
}

/// Number of `&`-separated query parameters; zero when the query is empty.
pub fn parameter_count(ctx: &UrlContext) -> usize {
    if ctx.query.is_empty() {
        0
    } else {
        ctx.query.split('&').count()
    }
}

/// Whether the URL contains percent-encoded characters.
pub fn is_encoded(ctx: &UrlContext) -> bool {
    ctx.raw.contains('%')
}

/// Literal `%` occurrences.
pub fn encoded_char_count(ctx: &UrlContext) -> usize {
    ctx.raw.matches('%').count()
}

/// Number of `/`-delimited path segments.
pub fn subdirectory_count(ctx: &UrlContext) -> usize {
    ctx.path.split('/').count()
}

/// Period characters across the whole URL.
pub fn period_count(ctx: &UrlContext) -> usize {
    ctx.raw.matches('.').count()
}

/// Whether the network location contains a hyphen, a typosquatting signal.
pub fn prefix_suffix_presence(ctx: &UrlContext) -> bool {
    ctx.netloc.contains('-')
}

/// Whether the URL references a known shortening-service host.
pub fn uses_shortening_service(ctx: &UrlContext) -> bool {
    patterns::matches_shortening_service(&ctx.raw)
}

/// Whether a `//` occurs past the scheme separator (index > 7), flagging
/// protocol-relative redirection tricks.
pub fn has_double_slash(ctx: &UrlContext) -> bool {
    ctx.raw.rfind("//").is_some_and(|pos| pos > 7)
}

/// Whether the URL contains an `@`, a credential-obfuscation signal.
pub fn has_at_sign(ctx: &UrlContext) -> bool {
    ctx.raw.contains('@')
}

/// Case-insensitive keyword presence anywhere in the URL.
pub fn has_keyword(ctx: &UrlContext, keyword: &str) -> bool {
    ctx.raw.to_lowercase().contains(keyword)
}

/// URL feature extractor: one decomposition, 19 deterministic features.
#[derive(Debug)]
pub struct UrlFeatureExtractor {
    ctx: UrlContext,
    keywords: Vec<String>,
}

impl UrlFeatureExtractor {
    /// Decompose `url` and set up the built-in keyword table.
    pub fn new(url: &str) -> Self {
        debug!(bytes = url.len(), "parsing url");
        Self {
            ctx: UrlContext::parse(url),
            keywords: URL_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Decompose `url` with custom keyword rows from `config`.
    pub fn with_config(url: &str, config: &ExtractorConfig) -> Result<Self> {
        if url.len() > config.max_length {
            return Err(FeatureError::ContentTooLarge {
                size: url.len(),
                max: config.max_length,
            });
        }

        let mut extractor = Self::new(url);
        extractor
            .keywords
            .extend(config.custom_url_keywords.iter().map(|k| k.to_lowercase()));
        Ok(extractor)
    }

    /// The parsed context backing every feature.
    pub fn context(&self) -> &UrlContext {
        &self.ctx
    }
}

impl FeatureExtractor for UrlFeatureExtractor {
    fn features(&self) -> FeatureMap {
        let ctx = &self.ctx;
        let mut map = FeatureMap::new();
        map.insert("use_shortening_service".into(), uses_shortening_service(ctx).into());
        map.insert("prefix_suffix_presence".into(), prefix_suffix_presence(ctx).into());
        map.insert("has_double_slash".into(), has_double_slash(ctx).into());
        // key name kept from the published schema, misspelling included
        map.insert("has_haveat_sign".into(), has_at_sign(ctx).into());
        map.insert("has_port".into(), has_port(ctx).into());
        for keyword in &self.keywords {
            map.insert(
                format!("has_{keyword}_keyword"),
                has_keyword(ctx, keyword).into(),
            );
        }
        map.insert("host_is_ip".into(), host_is_ip(ctx).into());
        map.insert("is_encoded".into(), is_encoded(ctx).into());
        map.insert("length".into(), url_length(ctx).into());
        map.insert("path_length".into(), path_length(ctx).into());
        map.insert("host_length".into(), host_length(ctx).into());
        map.insert("entropy".into(), url_entropy(ctx).into());
        map.insert("digits_num".into(), digit_count(ctx).into());
        map.insert("subdirectories_num".into(), subdirectory_count(ctx).into());
        map.insert("periods_num".into(), period_count(ctx).into());
        map.insert("params_num".into(), parameter_count(ctx).into());
        debug!(features = map.len(), "extracted url features");
        map
    }
}
