//! Declarative pattern tables behind the pattern-count features
//!
//! Each feature family is a table of rows consumed by a generic matching
//! routine; extending a catalogue means adding a row, not writing a new
//! accessor. Built-in rows are static and compile once.

use once_cell::sync::Lazy;
use regex::Regex;

/// Script substrings associated with obfuscated or injected payloads.
/// Matched case-folded; each row contributes at most one to the count.
pub const SUSPICIOUS_FUNCTIONS: &[&str] = &["eval", "unescape", "document.write", "innerhtml"];

/// JavaScript reserved words counted by the keyword-to-word ratio.
pub const SCRIPT_KEYWORDS: &[&str] = &["var", "const", "let", "for", "while", "if", "return"];

/// Independent keyword booleans checked against the whole URL, case-folded.
pub const URL_KEYWORDS: &[&str] = &["admin", "server", "login", "client"];

/// Call sites that create or alter DOM structure at runtime. Every match of
/// every row counts, repeats included.
pub const DOM_MUTATION_PATTERNS: &[&str] = &[
    r"createElement\s*\(",
    r"appendChild\s*\(",
    r"removeChild\s*\(",
    r"replaceChild\s*\(",
    r"insertBefore\s*\(",
    r"getElementsByClassName\s*\(",
    r"getElementsByTagName\s*\(",
    r"getElementById\s*\(",
    r"querySelector\s*\(",
    r"querySelectorAll\s*\(",
    r"setAttribute\s*\(",
    r"getAttribute\s*\(",
    r"removeAttribute\s*\(",
    r"clearAttributes\s*\(",
    r"insertAdjacentElement\s*\(",
    r"replaceNode\s*\(",
];

/// Hosts of known URL-shortening services, matched anywhere in the raw URL.
pub const SHORTENING_SERVICES: &[&str] = &[
    r"bit\.ly",
    r"bitly\.com",
    r"bit\.do",
    r"goo\.gl",
    r"shorte\.st",
    r"go2l\.ink",
    r"x\.co",
    r"ow\.ly",
    r"t\.co",
    r"tinyurl",
    r"tinyurl\.com",
    r"tr\.im",
    r"is\.gd",
    r"cli\.gs",
    r"yfrog\.com",
    r"migre\.me",
    r"ff\.im",
    r"tiny\.cc",
    r"url4\.eu",
    r"twit\.ac",
    r"su\.pr",
    r"twurl\.nl",
    r"snipurl\.com",
    r"short\.to",
    r"BudURL\.com",
    r"ping\.fm",
    r"post\.ly",
    r"Just\.as",
    r"bkite\.com",
    r"snipr\.com",
    r"fic\.kr",
    r"loopt\.us",
    r"doiop\.com",
    r"short\.ie",
    r"kl\.am",
    r"wp\.me",
    r"rubyurl\.com",
    r"om\.ly",
    r"to\.ly",
    r"lnkd\.in",
    r"db\.tt",
    r"qr\.ae",
    r"adf\.ly",
    r"cur\.lv",
    r"ity\.im",
    r"q\.gs",
    r"po\.st",
    r"bc\.vc",
    r"twitthis\.com",
    r"u\.to",
    r"j\.mp",
    r"buzurl\.com",
    r"cutt\.us",
    r"u\.bb",
    r"yourls\.org",
    r"prettylinkpro\.com",
    r"scrnch\.me",
    r"filoops\.info",
    r"vzturl\.com",
    r"qr\.net",
    r"1url\.com",
    r"tweez\.me",
    r"v\.gd",
    r"link\.zip\.net",
];

static DOM_MUTATION_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    DOM_MUTATION_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

static SHORTENING_SERVICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&SHORTENING_SERVICES.join("|")).unwrap());

/// The built-in DOM-mutation rows, compiled.
pub(crate) fn dom_mutation_regexes() -> &'static [Regex] {
    &DOM_MUTATION_REGEXES
}

/// Whether `url` references a known shortening-service host.
pub fn matches_shortening_service(url: &str) -> bool {
    SHORTENING_SERVICE_PATTERN.is_match(url)
}

/// Total number of matches of every `patterns` row in `text`.
pub fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|re| re.find_iter(text).count()).sum()
}
