use serde::{Deserialize, Serialize};

/// Default field separator.
pub const DEFAULT_SEPARATOR: char = ',';
/// Default set of characters trimmed from both ends of a field.
pub const DEFAULT_CUTSET: &str = " \t";
/// Default comment line prefix.
pub const DEFAULT_COMMENT_PREFIX: &str = "#";

/// Shared configuration for [`Reader`](crate::Reader) and
/// [`Writer`](crate::Writer) instances.
///
/// A `Config` is pure data: it can be cloned freely, shared between a reader
/// and a writer, serialized to or from any serde format, and mutated between
/// rows (mutation mid-stream only affects subsequent rows).
///
/// # Defaults
///
/// - Separator: comma (`,`)
/// - Trimming: disabled; cutset is space and tab when enabled
/// - Comment prefix: `#`; comment handling disabled
///
/// # Examples
///
/// ```
/// use csvutil::Config;
///
/// let config = Config::new()
///     .separator('\t')
///     .trim(true)
///     .comments(true);
///
/// assert!(config.is_separator('\t'));
/// assert!(config.looks_like_comment("# a comment"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Field separator code point.
    pub separator: char,
    /// Trim leading/trailing cutset characters from every field.
    pub trim: bool,
    /// Characters stripped from both ends of a field when `trim` is set.
    pub cutset: String,
    /// Prefix marking a line as a comment.
    pub comment_prefix: String,
    /// Whether comment lines may appear in the input at all.
    pub comments: bool,
    /// Whether comment lines may appear after the first data row.
    /// Meaningful only when `comments` is true.
    pub comments_in_body: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            trim: false,
            cutset: DEFAULT_CUTSET.to_string(),
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            comments: false,
            comments_in_body: false,
        }
    }
}

impl Config {
    /// Creates a configuration with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field separator code point.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Enables or disables field trimming.
    pub fn trim(mut self, yes: bool) -> Self {
        self.trim = yes;
        self
    }

    /// Sets the characters stripped from both ends of a trimmed field.
    pub fn cutset(mut self, cutset: impl Into<String>) -> Self {
        self.cutset = cutset.into();
        self
    }

    /// Sets the prefix that marks a line as a comment.
    pub fn comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    /// Enables or disables comment-line handling.
    pub fn comments(mut self, yes: bool) -> Self {
        self.comments = yes;
        self
    }

    /// Allows or forbids comment lines after the first data row.
    pub fn comments_in_body(mut self, yes: bool) -> Self {
        self.comments_in_body = yes;
        self
    }

    /// Returns true when the line starts with the configured comment prefix.
    pub fn looks_like_comment(&self, line: &str) -> bool {
        !self.comment_prefix.is_empty() && line.starts_with(&self.comment_prefix)
    }

    /// Returns true when `c` is the configured field separator.
    pub fn is_separator(&self, c: char) -> bool {
        c == self.separator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration() {
        let config = Config::default();
        assert_eq!(config.separator, ',');
        assert!(!config.trim);
        assert_eq!(config.cutset, " \t");
        assert_eq!(config.comment_prefix, "#");
        assert!(!config.comments);
        assert!(!config.comments_in_body);
    }

    #[test]
    fn builder_style_setters_chain() {
        let config = Config::new()
            .separator(';')
            .trim(true)
            .cutset(" ")
            .comment_prefix("//")
            .comments(true)
            .comments_in_body(true);

        assert_eq!(config.separator, ';');
        assert!(config.trim);
        assert_eq!(config.cutset, " ");
        assert_eq!(config.comment_prefix, "//");
        assert!(config.comments);
        assert!(config.comments_in_body);
    }

    #[test]
    fn comment_detection() {
        let config = Config::new().comment_prefix("//");
        assert!(config.looks_like_comment("// This should be a comment.\n"));
        assert!(!config.looks_like_comment("/ This, is not, a comment\n"));
        // Shorter than the prefix must not match (or panic).
        assert!(!config.looks_like_comment("/"));
        assert!(!config.looks_like_comment(""));
    }

    #[test]
    fn separator_detection() {
        let config = Config::new().separator('\t');
        assert!(config.is_separator('\t'));
        assert!(!config.is_separator('4'));
    }

    #[test]
    fn round_trips_through_serde() {
        let config = Config::new().separator('|').comments(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
