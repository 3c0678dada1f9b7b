//! Compiles the recognizer patterns for a pair of mustache delimiters.

use std::sync::OnceLock;

use getset::Getters;
use regex::Regex;

/// ASCII whitespace as a regex class.
const WHITESPACE: &str = r"[\t\n\x0C\r ]";

/// Characters that may not appear in a bare identifier.
pub const UNALLOWED_ID_CHARS: &str = " \n\t!\"#%&'()*+,./;<=>@[\\]^`{|}~";

/// The open and close tags of a mustache.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Getters)]
pub struct Delimiters {
    /// Get the open tag.
    #[get = "pub"]
    open: String,

    /// Get the close tag.
    #[get = "pub"]
    close: String,
}

impl Delimiters {
    /// Creates a new delimiter pair, or `None` if either tag is empty.
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Option<Self> {
        let (open, close) = (open.into(), close.into());

        (!open.is_empty() && !close.is_empty()).then_some(Self { open, close })
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// Which of the two comment syntaxes is being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommentStyle {
    /// `{{!-- ... --}}`, may contain the close tag.
    Dash,
    /// `{{! ... }}`
    Plain,
}

/// Patterns that do not depend on the delimiters.
#[derive(Debug)]
struct ExpressionPatterns {
    id: Regex,
    dot_id: Regex,
    boolean: Regex,
    open_block_params: Regex,
    alphanumeric: Regex,
}

fn expression_patterns() -> &'static ExpressionPatterns {
    static PATTERNS: OnceLock<ExpressionPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let lookahead = format!(r"(?:{WHITESPACE}|[=~}}/)|])");
        let literal_lookahead = format!(r"(?:{WHITESPACE}|[~}})])");

        ExpressionPatterns {
            id: anchored(&format!("[^{}]+", regex::escape(UNALLOWED_ID_CHARS))),
            dot_id: anchored(&format!(r"\.{lookahead}")),
            boolean: anchored(&format!("(?:true|false){literal_lookahead}")),
            open_block_params: anchored(&format!(r"as{WHITESPACE}+\|")),
            // letters and decimal digits only, `½` or `²` may follow a number
            alphanumeric: anchored(r"[_\p{L}\p{Nd}]"),
        }
    })
}

/// Compiles `pattern` so that it only matches at the start of the haystack.
fn anchored(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})"))
        .unwrap_or_else(|err| unreachable!("pattern `{pattern}` is invalid: {err}"))
}

/// Every recognizer the lexer needs for one delimiter pair.
///
/// A pattern set is never mutated: reassigning the delimiters compiles a new one.
#[derive(Debug, Clone, Getters)]
pub struct PatternSet {
    /// Get the delimiters the set was compiled for.
    #[get = "pub"]
    delimiters: Delimiters,

    pub(crate) escaped_escaped_open: String,
    pub(crate) escaped_open: String,
    pub(crate) close_strip: String,
    pub(crate) close_set_delimiters: String,

    pub(crate) id: Regex,
    pub(crate) dot_id: Regex,
    pub(crate) boolean: Regex,
    pub(crate) open_block_params: Regex,
    pub(crate) alphanumeric: Regex,

    pub(crate) open_raw: Regex,
    pub(crate) close_raw: Regex,
    pub(crate) open_end_raw: Regex,
    pub(crate) open_end_raw_lookahead: Regex,
    pub(crate) open_unescaped: Regex,
    pub(crate) close_unescaped: Regex,
    pub(crate) open_block: Regex,
    pub(crate) open_end_block: Regex,
    pub(crate) open_partial: Regex,
    pub(crate) inverse: Regex,
    pub(crate) open_inverse: Regex,
    pub(crate) open_inverse_chain: Regex,
    pub(crate) open: Regex,
    pub(crate) close: Regex,
    pub(crate) open_set_delimiters: Regex,
    pub(crate) close_set_delimiters_pattern: Regex,
    pub(crate) open_comment_dash: Regex,
    pub(crate) close_comment_dash: Regex,
    pub(crate) open_comment: Regex,
    pub(crate) close_comment: Regex,
}

impl PatternSet {
    /// Compiles the patterns for the given delimiters.
    #[must_use]
    pub fn compile(delimiters: Delimiters) -> Self {
        let open = regex::escape(&delimiters.open);
        let close = regex::escape(&delimiters.close);
        let expression = expression_patterns();

        Self {
            escaped_escaped_open: format!(r"\\{}", delimiters.open),
            escaped_open: format!(r"\{}", delimiters.open),
            close_strip: format!("~{}", delimiters.close),
            close_set_delimiters: format!("={}", delimiters.close),

            id: expression.id.clone(),
            dot_id: expression.dot_id.clone(),
            boolean: expression.boolean.clone(),
            open_block_params: expression.open_block_params.clone(),
            alphanumeric: expression.alphanumeric.clone(),

            open_raw: anchored(&format!("{open}{open}")),
            close_raw: anchored(&format!("{close}{close}")),
            open_end_raw: anchored(&format!("{open}{open}/")),
            open_end_raw_lookahead: Regex::new(&format!("{open}{open}/"))
                .unwrap_or_else(|err| unreachable!("raw block end pattern is invalid: {err}")),
            open_unescaped: anchored(&format!(r"{open}~?\{{")),
            close_unescaped: anchored(&format!(r"\}}~?{close}")),
            open_block: anchored(&format!("{open}~?#")),
            open_end_block: anchored(&format!("{open}~?/")),
            open_partial: anchored(&format!("{open}~?>")),
            inverse: anchored(&format!(
                r"{open}~?\^{WHITESPACE}*~?{close}|{open}~?{WHITESPACE}*else{WHITESPACE}*~?{close}"
            )),
            open_inverse: anchored(&format!(r"{open}~?\^")),
            open_inverse_chain: anchored(&format!("{open}~?{WHITESPACE}*else")),
            open: anchored(&format!("{open}~?&?")),
            close: anchored(&format!("~?{close}")),
            open_set_delimiters: anchored(&format!("{open}=")),
            close_set_delimiters_pattern: anchored(&format!("={close}")),
            open_comment_dash: anchored(&format!("{open}~?!--{WHITESPACE}*")),
            close_comment_dash: anchored(&format!("{WHITESPACE}*--~?{close}")),
            open_comment: anchored(&format!("{open}~?!{WHITESPACE}*")),
            close_comment: anchored(&format!("{WHITESPACE}*~?{close}")),

            delimiters,
        }
    }

    /// Returns the open tag.
    #[must_use]
    pub fn open_tag(&self) -> &str {
        &self.delimiters.open
    }

    /// Returns the close tag.
    #[must_use]
    pub fn close_tag(&self) -> &str {
        &self.delimiters.close
    }

    /// Returns the pattern that closes a comment of the given style.
    #[must_use]
    pub fn close_comment(&self, style: CommentStyle) -> &Regex {
        match style {
            CommentStyle::Dash => &self.close_comment_dash,
            CommentStyle::Plain => &self.close_comment,
        }
    }

    /// Whether `rest` starts with anything that ends an expression.
    ///
    /// The unescaped close is derived from the active close tag, so `}~}}` and `}}}` for the
    /// default delimiters become `}~%>` and `}%>` for `<% %>`.
    #[must_use]
    pub fn is_close(&self, rest: &str) -> bool {
        rest.starts_with(self.close_tag())
            || rest.starts_with(&self.close_set_delimiters)
            || rest.starts_with(&self.close_strip)
            || self.close_unescaped.is_match(rest)
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::compile(Delimiters::default())
    }
}

/// Returns the text matched by `pattern` at the start of `rest`, if any.
pub(crate) fn find_at_start<'a>(pattern: &Regex, rest: &'a str) -> Option<&'a str> {
    pattern.find(rest).map(|found| found.as_str())
}
