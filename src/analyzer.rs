use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static STOP_WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();

static PERCENT_OCTET: Lazy<Regex> = Lazy::new(|| Regex::new(r"%[a-fA-F0-9]{2}").unwrap());

/// Words too common to narrow a search. Kept deliberately short: matching is
/// substring based, so a large list would silently widen result sets.
fn get_stop_words() -> &'static HashSet<&'static str> {
    STOP_WORDS.get_or_init(|| {
        HashSet::from([
            "about", "an", "are", "as", "at", "be", "by", "com", "for", "from", "how", "in",
            "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "what", "when",
            "where", "who", "will", "with", "www",
        ])
    })
}

/// A character filter receives the original text and can transform it by adding,
/// removing, or changing characters, e.g. stripping HTML elements like <b> from the stream.
pub trait CharacterFilter: Send + Sync {
    fn filter(&self, text: String) -> String;
}

/// Reduces a markup fragment to its text nodes. Script, style and noscript
/// contents are dropped; block-level elements are separated by a newline.
#[derive(Debug, Default)]
pub struct HTMLTagFilter;

impl HTMLTagFilter {
    pub fn get_dom(html: &str) -> RcDom {
        parse_document(RcDom::default(), Default::default()).one(html)
    }

    pub fn is_block_like(local: &LocalName) -> bool {
        matches!(
            &**local,
            "p" | "div"
                | "section"
                | "article"
                | "li"
                | "ul"
                | "ol"
                | "br"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "blockquote"
        )
    }

    pub fn walk_html(handle: &Handle, out: &mut String) {
        match &handle.data {
            NodeData::Text { contents } => {
                let s = contents.borrow();
                if !s.trim().is_empty() {
                    out.push_str(&s);
                }
            }
            NodeData::Element { name, .. } => {
                let local = &name.local;
                if matches!(&**local, "script" | "style" | "noscript" | "template") {
                    return;
                }
                let block = Self::is_block_like(local);
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
                if block && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {
                for child in handle.children.borrow().iter() {
                    Self::walk_html(child, out);
                }
            }
        }
    }
}

impl CharacterFilter for HTMLTagFilter {
    fn filter(&self, html: String) -> String {
        if !html.contains(['<', '&']) {
            return html;
        }
        let dom = Self::get_dom(&html);
        let mut out = String::new();
        Self::walk_html(&dom.document, &mut out);
        out
    }
}

/// Removes percent-encoded octets such as `%20` left over from double-encoded input.
#[derive(Debug, Default)]
pub struct PercentOctetFilter;

impl CharacterFilter for PercentOctetFilter {
    fn filter(&self, text: String) -> String {
        if !text.contains('%') {
            return text;
        }
        PERCENT_OCTET.replace_all(&text, "").into_owned()
    }
}

/// Collapses every whitespace run (line breaks and tabs included) into one space and trims.
#[derive(Debug, Default)]
pub struct WhitespaceCollapseFilter;

impl CharacterFilter for WhitespaceCollapseFilter {
    fn filter(&self, text: String) -> String {
        text.split_whitespace().collect::<Vec<&str>>().join(" ")
    }
}

/// A tokenizer receives a stream of characters, breaks it up into individual tokens,
/// and outputs a stream of tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: String) -> Vec<String>;
}

pub struct WhiteSpaceTokenizer;

impl Tokenizer for WhiteSpaceTokenizer {
    fn tokenize(&self, text: String) -> Vec<String> {
        text.split_whitespace()
            .map(|w| w.to_string())
            .collect::<Vec<String>>()
    }
}

/// Splits a search box entry into terms. Terms are separated by spaces, tabs,
/// commas or `+`; a double-quoted phrase stays one term (quotes removed) and
/// an unterminated quote runs to the end of the input. A leading `-` is kept
/// so exclusions survive tokenization.
pub struct SearchTermTokenizer;

impl SearchTermTokenizer {
    fn is_separator(c: char) -> bool {
        matches!(c, ' ' | '\t' | ',' | '+' | '\n' | '\r')
    }
}

impl Tokenizer for SearchTermTokenizer {
    fn tokenize(&self, text: String) -> Vec<String> {
        let mut terms = Vec::new();
        let mut chars = text.chars().peekable();
        loop {
            while chars.peek().is_some_and(|c| Self::is_separator(*c)) {
                chars.next();
            }
            let Some(&first) = chars.peek() else {
                break;
            };

            let mut term = String::new();
            if first == '-' {
                term.push('-');
                chars.next();
            }

            if chars.peek() == Some(&'"') {
                chars.next();
                for c in chars.by_ref() {
                    if c == '"' {
                        break;
                    }
                    term.push(c);
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if Self::is_separator(c) {
                        break;
                    }
                    term.push(c);
                    chars.next();
                }
            }

            let trimmed = term.trim();
            if !trimmed.is_empty() && trimmed != "-" {
                terms.push(trimmed.to_string());
            }
        }
        terms
    }
}

/// A token filter receives the token stream and may add, remove, or change tokens.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken>;
}

pub struct LowerCaseTokenFilter;

impl TokenFilter for LowerCaseTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .map(|mut t| {
                t.term = t.term.to_lowercase();
                t
            })
            .collect()
    }
}

pub struct StopWordTokenFilter;

impl TokenFilter for StopWordTokenFilter {
    fn filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        let stop_words = get_stop_words();
        tokens.retain(|t| !stop_words.contains(t.term.trim_start_matches('-')));
        tokens
    }
}

/// Drops single ASCII letters and lone dashes, which would match nearly everything.
pub struct SingleLetterFilter;

impl TokenFilter for SingleLetterFilter {
    fn filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens.retain(|t| {
            let bare = t.term.trim_start_matches('-');
            let mut chars = bare.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => !c.is_ascii_alphabetic(),
                (None, _) => false,
                _ => true,
            }
        });
        tokens
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextToken {
    pub term: String,
    pub pos: usize,
}

impl std::ops::Deref for TextToken {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.term
    }
}

/// Pure text analysis pipeline - no async, no store, just text transformations
pub struct TextAnalyzer {
    char_filters: Vec<Box<dyn CharacterFilter>>,
    tokenizer: Box<dyn Tokenizer>,
    token_filters: Vec<Box<dyn TokenFilter>>,
}

impl TextAnalyzer {
    pub fn new(
        char_filters: Vec<Box<dyn CharacterFilter>>,
        tokenizer: Box<dyn Tokenizer>,
        token_filters: Vec<Box<dyn TokenFilter>>,
    ) -> Self {
        Self {
            char_filters,
            tokenizer,
            token_filters,
        }
    }

    /// Markup-free single-line text, the shape user-entered keywords are stored in.
    pub fn plain_text() -> Self {
        Self::new(
            vec![
                Box::new(HTMLTagFilter),
                Box::new(PercentOctetFilter),
                Box::new(WhitespaceCollapseFilter),
            ],
            Box::new(WhiteSpaceTokenizer),
            vec![],
        )
    }

    /// Splits a keyword into lowercase search terms.
    pub fn search_terms() -> Self {
        Self::new(
            vec![],
            Box::new(SearchTermTokenizer),
            vec![
                Box::new(LowerCaseTokenFilter),
                Box::new(SingleLetterFilter),
                Box::new(StopWordTokenFilter),
            ],
        )
    }

    pub fn char_filter(&self, mut content: String) -> String {
        for filter in self.char_filters.iter() {
            content = filter.filter(content);
        }
        content
    }

    pub fn tokenize(&self, content: String) -> Vec<TextToken> {
        self.tokenizer
            .tokenize(content)
            .into_iter()
            .enumerate()
            .map(|(pos, term)| TextToken { term, pos })
            .collect()
    }

    pub fn token_filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        for filter in self.token_filters.iter() {
            tokens = filter.filter(tokens);
        }
        tokens
    }

    /// Analyzes raw content and returns a list of tokens
    pub fn analyze(&self, raw_content: String) -> Vec<TextToken> {
        let content = self.char_filter(raw_content);
        let tokens = self.tokenize(content);
        self.token_filter(tokens)
    }
}

/// Strips markup and normalizes whitespace, leaving a trimmed single line of text.
pub fn sanitize_text(raw: &str) -> String {
    TextAnalyzer::plain_text().char_filter(raw.to_string()).trim().to_string()
}

/// Terms a keyword expands to: every `include` term must occur, no `exclude` term may.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl SearchTerms {
    pub fn parse(analyzer: &TextAnalyzer, keyword: &str) -> SearchTerms {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return SearchTerms::default();
        }

        let mut terms = SearchTerms::default();
        for token in analyzer.analyze(keyword.to_string()) {
            match token.term.strip_prefix('-') {
                Some(excluded) if !excluded.is_empty() => terms.exclude.push(excluded.to_string()),
                _ => terms.include.push(token.term),
            }
        }

        // Only stop words or single letters: search for the whole entry instead.
        if terms.include.is_empty() && terms.exclude.is_empty() {
            terms.include.push(keyword.to_lowercase());
        }
        terms
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// `haystacks` must already be lowercase.
    pub fn matches(&self, haystacks: &[&str]) -> bool {
        let found = |term: &String| haystacks.iter().any(|h| h.contains(term.as_str()));
        self.include.iter().all(found) && !self.exclude.iter().any(found)
    }
}
