//! HTML feature extraction
//!
//! The document is parsed exactly once into an immutable [`HtmlContext`];
//! every feature is a pure function of that context, so repeated calls on
//! one extractor return identical values and individual features can be
//! tested against hand-built fixtures.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::config::ExtractorConfig;
use crate::entropy::{round3, shannon_entropy};
use crate::error::{FeatureError, Result};
use crate::patterns::{self, SCRIPT_KEYWORDS, SUSPICIOUS_FUNCTIONS};
use crate::types::FeatureMap;
use crate::FeatureExtractor;

/// The compiled selectors behind the structural counts.
struct Selectors {
    all: Selector,
    script: Selector,
    hidden: [Selector; 4],
    frames: Selector,
    object: Selector,
    embed: Selector,
    internal_link: Selector,
    external_link: Selector,
    includable: Selector,
}

static SELECTORS: Lazy<Selectors> = Lazy::new(|| Selectors {
    all: Selector::parse("*").unwrap(),
    script: Selector::parse("script").unwrap(),
    hidden: [
        Selector::parse(".hidden").unwrap(),
        Selector::parse("#hidden").unwrap(),
        Selector::parse(r#"[visibility="none"]"#).unwrap(),
        Selector::parse(r#"[display="none"]"#).unwrap(),
    ],
    frames: Selector::parse("iframe, frame").unwrap(),
    object: Selector::parse("object").unwrap(),
    embed: Selector::parse("embed").unwrap(),
    internal_link: Selector::parse(r#"a[href^="/"]"#).unwrap(),
    external_link: Selector::parse(r#"a[href^="http"]"#).unwrap(),
    includable: Selector::parse("script, iframe, frame, embed, form, object").unwrap(),
});

// Open tags are counted against the raw markup; the parser folds repeated
// <html>/<head>/<body> into one element and would hide the duplicates.
static STRUCTURAL_OPEN_TAGS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)<\s*html[\s/>]").unwrap(),
        Regex::new(r"(?i)<\s*head[\s/>]").unwrap(),
        Regex::new(r"(?i)<\s*body[\s/>]").unwrap(),
    ]
});

static SCRIPT_TOKEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+|\W").unwrap());

/// Immutable parse of one HTML document.
#[derive(Debug)]
pub struct HtmlContext {
    /// Original markup, verbatim. Whole-document scans (capitalization,
    /// whitespace, right-click detection) must see tags, not just text.
    pub raw: String,
    /// Parsed document tree
    pub document: Html,
    /// Visible text of the whole document, whitespace-normalized
    pub text: String,
    /// Text content of each script element, in document order
    pub scripts: Vec<String>,
}

impl HtmlContext {
    /// Parse `html` once. Markup that cannot be parsed into any structure
    /// still yields an empty tree; structural counts degrade to zero.
    pub fn parse(html: &str) -> Self {
        // the parser synthesizes an html/head/body skeleton even for blank
        // input, which would put phantom elements in the structural counts
        let document = if html.trim().is_empty() {
            Html::new_document()
        } else {
            Html::parse_document(html)
        };
        let text = document_text(&document);
        let scripts = document
            .select(&SELECTORS.script)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();

        Self {
            raw: html.to_string(),
            document,
            text,
            scripts,
        }
    }

    /// All script bodies joined into one analysis buffer.
    fn script_text(&self) -> String {
        self.scripts.join(" ")
    }
}

fn document_text(document: &Html) -> String {
    // an empty tree has no root element to walk
    let Some(root) = document.tree.root().children().find_map(ElementRef::wrap) else {
        return String::new();
    };
    let joined = root.text().collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shannon entropy of the page's visible text.
pub fn page_entropy(ctx: &HtmlContext) -> f64 {
    shannon_entropy(&ctx.text)
}

/// Number of characters of visible text.
pub fn html_length(ctx: &HtmlContext) -> usize {
    ctx.text.chars().count()
}

/// Number of whitespace-separated, case-folded tokens of visible text.
pub fn page_token_count(ctx: &HtmlContext) -> usize {
    ctx.text.to_lowercase().split_whitespace().count()
}

/// Number of `.`-separated sentence segments. Splitting always yields at
/// least one segment, so the tokens-per-sentence average can never divide
/// by zero.
pub fn sentence_count(ctx: &HtmlContext) -> usize {
    ctx.text.split('.').count()
}

/// Average number of tokens per sentence segment, rounded to 3 decimals.
pub fn avg_sentence_token_count(ctx: &HtmlContext) -> f64 {
    let lengths: Vec<usize> = ctx
        .text
        .split('.')
        .map(|sentence| sentence.split_whitespace().count())
        .collect();
    round3(lengths.iter().sum::<usize>() as f64 / lengths.len() as f64)
}

/// ASCII punctuation characters in visible text. `<`, `>` and `/` are
/// markup artifacts, not prose punctuation, and are excluded.
pub fn punctuation_count(ctx: &HtmlContext) -> usize {
    ctx.text
        .chars()
        .filter(|c| c.is_ascii_punctuation() && !matches!(c, '<' | '>' | '/'))
        .count()
}

/// Uppercase characters across the raw markup, tags included.
pub fn capitalization_count(ctx: &HtmlContext) -> usize {
    ctx.raw.chars().filter(|c| c.is_uppercase()).count()
}

/// Literal space characters across the raw markup.
pub fn whitespace_count(ctx: &HtmlContext) -> usize {
    ctx.raw.chars().filter(|&c| c == ' ').count()
}

/// Total number of elements in the parsed tree.
pub fn tag_count(ctx: &HtmlContext) -> usize {
    ctx.document.select(&SELECTORS.all).count()
}

/// Number of script elements.
pub fn script_tag_count(ctx: &HtmlContext) -> usize {
    ctx.scripts.len()
}

/// Elements hidden by class/id `hidden` or a `visibility="none"` /
/// `display="none"` attribute. The four match sets are unioned with
/// duplicates kept: an element matching two predicates counts twice.
pub fn hidden_tag_count(ctx: &HtmlContext) -> usize {
    SELECTORS
        .hidden
        .iter()
        .map(|selector| ctx.document.select(selector).count())
        .sum()
}

/// Number of iframe and frame elements.
pub fn frame_count(ctx: &HtmlContext) -> usize {
    ctx.document.select(&SELECTORS.frames).count()
}

/// Number of object elements.
pub fn object_count(ctx: &HtmlContext) -> usize {
    ctx.document.select(&SELECTORS.object).count()
}

/// Number of embed elements.
pub fn embed_count(ctx: &HtmlContext) -> usize {
    ctx.document.select(&SELECTORS.embed).count()
}

/// Anchors whose `href` starts with `/`.
pub fn internal_link_count(ctx: &HtmlContext) -> usize {
    ctx.document.select(&SELECTORS.internal_link).count()
}

/// Anchors whose `href` starts with `http`.
pub fn external_link_count(ctx: &HtmlContext) -> usize {
    ctx.document.select(&SELECTORS.external_link).count()
}

/// Script/iframe/frame/embed/form/object elements carrying a non-empty
/// `src` attribute, i.e. externally included content.
pub fn included_element_count(ctx: &HtmlContext) -> usize {
    ctx.document
        .select(&SELECTORS.includable)
        .filter(|el| el.value().attr("src").is_some_and(|src| !src.is_empty()))
        .count()
}

/// Extra occurrences of the `<html>`, `<head>` and `<body>` open tags
/// beyond the first of each, summed.
pub fn double_document_count(ctx: &HtmlContext) -> usize {
    STRUCTURAL_OPEN_TAGS
        .iter()
        .map(|re| re.find_iter(&ctx.raw).count().saturating_sub(1))
        .sum()
}

/// Number of `functions` rows present anywhere in the case-folded script
/// text. Each row contributes at most one, repeats notwithstanding.
pub fn suspicious_function_count(ctx: &HtmlContext, functions: &[String]) -> usize {
    let script = ctx.script_text().to_lowercase();
    functions
        .iter()
        .filter(|f| script.contains(f.as_str()))
        .count()
}

/// Ratio of JavaScript reserved words to all script tokens, rounded to
/// 3 decimals. Tokens split on whitespace and non-word characters; empty
/// tokens are discarded. Zero when no tokens remain.
pub fn keyword_word_ratio(ctx: &HtmlContext) -> f64 {
    let script = ctx.script_text();
    let mut total = 0usize;
    let mut keywords = 0usize;
    for token in SCRIPT_TOKEN_SPLIT.split(&script) {
        if token.is_empty() {
            continue;
        }
        total += 1;
        if SCRIPT_KEYWORDS.contains(&token) {
            keywords += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        round3(keywords as f64 / total as f64)
    }
}

/// Total DOM-mutation call sites referenced across all script text.
pub fn dom_mutation_count(ctx: &HtmlContext, patterns: &[Regex]) -> usize {
    patterns::count_matches(patterns, &ctx.script_text())
}

/// Average script body length in characters; zero when no scripts.
pub fn avg_script_length(ctx: &HtmlContext) -> f64 {
    if ctx.scripts.is_empty() {
        return 0.0;
    }
    let total: usize = ctx.scripts.iter().map(|s| s.chars().count()).sum();
    round3(total as f64 / ctx.scripts.len() as f64)
}

/// Average per-script Shannon entropy; zero when no scripts.
pub fn avg_script_entropy(ctx: &HtmlContext) -> f64 {
    if ctx.scripts.is_empty() {
        return 0.0;
    }
    let total: f64 = ctx.scripts.iter().map(|s| shannon_entropy(s)).sum();
    round3(total / ctx.scripts.len() as f64)
}

/// Whether the page wires up the `event.button==2` right-click check
/// anywhere in the raw markup.
pub fn right_click_disabled(ctx: &HtmlContext) -> bool {
    ctx.raw.to_lowercase().contains("event.button==2")
}

/// HTML feature extractor: one parse, ~24 deterministic features.
#[derive(Debug)]
pub struct HtmlFeatureExtractor {
    ctx: HtmlContext,
    suspicious_functions: Vec<String>,
    dom_patterns: Vec<Regex>,
}

impl HtmlFeatureExtractor {
    /// Parse `html` and set up the built-in pattern tables.
    pub fn new(html: &str) -> Self {
        debug!(bytes = html.len(), "parsing html document");
        Self {
            ctx: HtmlContext::parse(html),
            suspicious_functions: SUSPICIOUS_FUNCTIONS.iter().map(|s| s.to_string()).collect(),
            dom_patterns: patterns::dom_mutation_regexes().to_vec(),
        }
    }

    /// Parse `html` with custom table rows from `config`.
    pub fn with_config(html: &str, config: &ExtractorConfig) -> Result<Self> {
        if html.len() > config.max_length {
            return Err(FeatureError::ContentTooLarge {
                size: html.len(),
                max: config.max_length,
            });
        }

        let mut extractor = Self::new(html);
        extractor.suspicious_functions.extend(
            config
                .custom_suspicious_functions
                .iter()
                .map(|s| s.to_lowercase()),
        );
        for pattern in &config.custom_dom_mutation_patterns {
            let re = Regex::new(pattern).map_err(|source| FeatureError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
            extractor.dom_patterns.push(re);
        }
        Ok(extractor)
    }

    /// The parsed context backing every feature.
    pub fn context(&self) -> &HtmlContext {
        &self.ctx
    }

    /// Shannon entropy of the page's visible text.
    pub fn page_entropy(&self) -> f64 {
        page_entropy(&self.ctx)
    }

    /// Number of characters of visible text.
    pub fn html_length(&self) -> usize {
        html_length(&self.ctx)
    }

    /// Number of whitespace-separated tokens of visible text.
    pub fn page_token_count(&self) -> usize {
        page_token_count(&self.ctx)
    }

    /// Number of `.`-separated sentence segments.
    pub fn sentence_count(&self) -> usize {
        sentence_count(&self.ctx)
    }

    /// Average tokens per sentence segment.
    pub fn avg_sentence_token_count(&self) -> f64 {
        avg_sentence_token_count(&self.ctx)
    }

    /// Prose punctuation characters in visible text.
    pub fn punctuation_count(&self) -> usize {
        punctuation_count(&self.ctx)
    }

    /// Uppercase characters in the raw markup.
    pub fn capitalization_count(&self) -> usize {
        capitalization_count(&self.ctx)
    }

    /// Literal spaces in the raw markup.
    pub fn whitespace_count(&self) -> usize {
        whitespace_count(&self.ctx)
    }

    /// Total elements in the parsed tree.
    pub fn tag_count(&self) -> usize {
        tag_count(&self.ctx)
    }

    /// Script elements in the parsed tree.
    pub fn script_tag_count(&self) -> usize {
        script_tag_count(&self.ctx)
    }

    /// Hidden elements (class/id `hidden`, `visibility="none"`,
    /// `display="none"`), duplicates counted.
    pub fn hidden_tag_count(&self) -> usize {
        hidden_tag_count(&self.ctx)
    }

    /// iframe and frame elements.
    pub fn frame_count(&self) -> usize {
        frame_count(&self.ctx)
    }

    /// object elements.
    pub fn object_count(&self) -> usize {
        object_count(&self.ctx)
    }

    /// embed elements.
    pub fn embed_count(&self) -> usize {
        embed_count(&self.ctx)
    }

    /// Anchors with a `/`-prefixed `href`.
    pub fn internal_link_count(&self) -> usize {
        internal_link_count(&self.ctx)
    }

    /// Anchors with an `http`-prefixed `href`.
    pub fn external_link_count(&self) -> usize {
        external_link_count(&self.ctx)
    }

    /// Includable elements with a non-empty `src`.
    pub fn included_element_count(&self) -> usize {
        included_element_count(&self.ctx)
    }

    /// Repeated structural open tags beyond the first of each.
    pub fn double_document_count(&self) -> usize {
        double_document_count(&self.ctx)
    }

    /// Suspicious-function rows present in script text.
    pub fn suspicious_function_count(&self) -> usize {
        suspicious_function_count(&self.ctx, &self.suspicious_functions)
    }

    /// Reserved-word share of all script tokens.
    pub fn keyword_word_ratio(&self) -> f64 {
        keyword_word_ratio(&self.ctx)
    }

    /// DOM-mutation call sites referenced in script text.
    pub fn dom_mutation_count(&self) -> usize {
        dom_mutation_count(&self.ctx, &self.dom_patterns)
    }

    /// Average script body length.
    pub fn avg_script_length(&self) -> f64 {
        avg_script_length(&self.ctx)
    }

    /// Average per-script entropy.
    pub fn avg_script_entropy(&self) -> f64 {
        avg_script_entropy(&self.ctx)
    }

    /// Whether right-click appears disabled.
    pub fn right_click_disabled(&self) -> bool {
        right_click_disabled(&self.ctx)
    }
}

impl FeatureExtractor for HtmlFeatureExtractor {
    fn features(&self) -> FeatureMap {
        let mut map = FeatureMap::new();
        map.insert("suspicious_func_num".into(), self.suspicious_function_count().into());
        map.insert("page_entropy".into(), self.page_entropy().into());
        map.insert("script_tags_num".into(), self.script_tag_count().into());
        map.insert("html_length".into(), self.html_length().into());
        map.insert("tokens_num".into(), self.page_token_count().into());
        map.insert("sentences_num".into(), self.sentence_count().into());
        map.insert("punctuation_num".into(), self.punctuation_count().into());
        map.insert("capitalization_num".into(), self.capitalization_count().into());
        map.insert("avg_sentence_tokens_num".into(), self.avg_sentence_token_count().into());
        map.insert("html_tags_num".into(), self.tag_count().into());
        map.insert("hidden_tags_num".into(), self.hidden_tag_count().into());
        map.insert("iframe_num".into(), self.frame_count().into());
        map.insert("objects_num".into(), self.object_count().into());
        map.insert("embeds_num".into(), self.embed_count().into());
        map.insert("internal_links_num".into(), self.internal_link_count().into());
        map.insert("external_links_num".into(), self.external_link_count().into());
        map.insert("whitespaces_num".into(), self.whitespace_count().into());
        map.insert("included_elements_num".into(), self.included_element_count().into());
        map.insert("double_doc_num".into(), self.double_document_count().into());
        map.insert("keywords_to_words_ratio".into(), self.keyword_word_ratio().into());
        map.insert("dom_mod_func_num".into(), self.dom_mutation_count().into());
        map.insert("avg_script_len".into(), self.avg_script_length().into());
        map.insert("avg_script_entropy".into(), self.avg_script_entropy().into());
        map.insert("right_click_disabled".into(), self.right_click_disabled().into());
        debug!(features = map.len(), "extracted html features");
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_PAGE: &str =
        "<html><head><title>T</title></head><body><p>Hello world. Bye.</p></body></html>";

    #[test]
    fn test_text_statistics() {
        let extractor = HtmlFeatureExtractor::new(SIMPLE_PAGE);
        // Visible text is "T Hello world. Bye."
        assert_eq!(extractor.page_token_count(), 4);
        assert_eq!(extractor.sentence_count(), 3);
        assert_eq!(extractor.punctuation_count(), 2);
        assert_eq!(extractor.html_length(), 19);
        // ("T" "Hello" "world") + ("Bye") + () over 3 segments
        assert_eq!(extractor.avg_sentence_token_count(), 1.333);
    }

    #[test]
    fn test_raw_markup_statistics() {
        let extractor = HtmlFeatureExtractor::new("<DIV>Hi there</DIV>");
        // D,I,V,H,D,I,V uppercase; one literal space
        assert_eq!(extractor.capitalization_count(), 7);
        assert_eq!(extractor.whitespace_count(), 1);
    }

    #[test]
    fn test_structural_counts() {
        let html = r#"<html><body>
            <a href="/home">in</a>
            <a href="https://other.example/">out</a>
            <a href='#top'>anchor</a>
            <object></object><embed src="movie.swf">
            <iframe src="https://ads.example/f"></iframe>
        </body></html>"#;
        let extractor = HtmlFeatureExtractor::new(html);
        assert_eq!(extractor.internal_link_count(), 1);
        assert_eq!(extractor.external_link_count(), 1);
        assert_eq!(extractor.object_count(), 1);
        assert_eq!(extractor.embed_count(), 1);
        assert_eq!(extractor.frame_count(), 1);
        // embed and iframe carry non-empty src
        assert_eq!(extractor.included_element_count(), 2);
    }

    #[test]
    fn test_hidden_tags_union_counts_duplicates() {
        let html = r#"<div class="hidden" id="hidden"></div>
            <span visibility="none"></span>
            <span display="none"></span>"#;
        let extractor = HtmlFeatureExtractor::new(html);
        // div matches both .hidden and #hidden
        assert_eq!(extractor.hidden_tag_count(), 4);
    }

    #[test]
    fn test_unique_structural_tags_are_not_doubles() {
        let extractor = HtmlFeatureExtractor::new(SIMPLE_PAGE);
        assert_eq!(extractor.double_document_count(), 0);
    }

    #[test]
    fn test_repeated_html_tag_counts_once() {
        let extractor = HtmlFeatureExtractor::new("<html><html></html></html><body></body>");
        assert_eq!(extractor.double_document_count(), 1);
    }

    #[test]
    fn test_suspicious_without_dom_mutation() {
        let extractor = HtmlFeatureExtractor::new("<html><script>eval(x)</script></html>");
        assert_eq!(extractor.suspicious_function_count(), 1);
        assert_eq!(extractor.dom_mutation_count(), 0);
    }

    #[test]
    fn test_suspicious_rows_count_at_most_once() {
        let extractor = HtmlFeatureExtractor::new(
            "<script>eval(a); eval(b); document.write(unescape(p))</script>",
        );
        assert_eq!(extractor.suspicious_function_count(), 3);
    }

    #[test]
    fn test_dom_mutation_counts_every_call_site() {
        let extractor = HtmlFeatureExtractor::new(
            "<script>var e = document.createElement('a'); b.appendChild(e); b.appendChild(e);</script>",
        );
        assert_eq!(extractor.dom_mutation_count(), 3);
    }

    #[test]
    fn test_no_scripts_averages_are_zero() {
        let extractor = HtmlFeatureExtractor::new("<html><body><p>text</p></body></html>");
        assert_eq!(extractor.script_tag_count(), 0);
        assert_eq!(extractor.avg_script_length(), 0.0);
        assert_eq!(extractor.avg_script_entropy(), 0.0);
        assert_eq!(extractor.keyword_word_ratio(), 0.0);
    }

    #[test]
    fn test_keyword_word_ratio() {
        let extractor =
            HtmlFeatureExtractor::new("<script>var x = 1; if (x) return x;</script>");
        // tokens: var x 1 if x return x; keywords: var if return
        assert_eq!(extractor.keyword_word_ratio(), 0.429);
    }

    #[test]
    fn test_right_click_disabled() {
        let html = "<body onmousedown=\"if (Event.Button==2) return false;\"></body>";
        assert!(HtmlFeatureExtractor::new(html).right_click_disabled());
        assert!(!HtmlFeatureExtractor::new(SIMPLE_PAGE).right_click_disabled());
    }

    #[test]
    fn test_empty_input_degrades_to_zeroes() {
        let extractor = HtmlFeatureExtractor::new("");
        assert_eq!(extractor.page_entropy(), 0.0);
        assert_eq!(extractor.html_length(), 0);
        assert_eq!(extractor.tag_count(), 0);
        assert_eq!(extractor.script_tag_count(), 0);
        assert_eq!(extractor.internal_link_count(), 0);
        assert_eq!(extractor.double_document_count(), 0);
        // 24 features regardless of input
        assert_eq!(extractor.features().len(), 24);
    }

    #[test]
    fn test_blank_input_has_no_phantom_elements() {
        // the parser must not smuggle its html/head/body skeleton into the
        // structural counts when there is nothing to parse
        let extractor = HtmlFeatureExtractor::new("  \n\t ");
        assert_eq!(extractor.tag_count(), 0);
        assert_eq!(extractor.page_entropy(), 0.0);
    }

    #[test]
    fn test_feature_schema_order() {
        let map = HtmlFeatureExtractor::new(SIMPLE_PAGE).features();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 24);
        assert_eq!(keys[0], "suspicious_func_num");
        assert_eq!(keys[1], "page_entropy");
        assert_eq!(keys[22], "avg_script_entropy");
        assert_eq!(keys[23], "right_click_disabled");
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let html = r#"<html><body><script src="a.js">var x = eval(y);</script>
            <a href="/l">L</a><p>Verify your Account now.</p></body></html>"#;
        let first = HtmlFeatureExtractor::new(html);
        let second = HtmlFeatureExtractor::new(html);
        assert_eq!(first.features(), second.features());
        // repeated calls on one instance are idempotent
        assert_eq!(first.features(), first.features());
    }

    #[test]
    fn test_custom_suspicious_function_row() {
        let config = ExtractorConfig::default().with_suspicious_function("atob");
        let extractor =
            HtmlFeatureExtractor::with_config("<script>atob(p)</script>", &config).unwrap();
        assert_eq!(extractor.suspicious_function_count(), 1);
    }

    #[test]
    fn test_invalid_custom_pattern_is_rejected() {
        let config = ExtractorConfig::default().with_dom_mutation_pattern("unclosed(");
        let err = HtmlFeatureExtractor::with_config("<p></p>", &config).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidPattern { .. }));
    }

    #[test]
    fn test_oversized_input_is_rejected() {
        let config = ExtractorConfig::default().with_max_length(8);
        let err = HtmlFeatureExtractor::with_config(SIMPLE_PAGE, &config).unwrap_err();
        assert!(matches!(err, FeatureError::ContentTooLarge { .. }));
    }
}
