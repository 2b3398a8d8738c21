//! Index classifiers
//!
//! Decide whether an index belongs to a log group, and under which key.

use regex::Regex;

use crate::error::{ImpactError, ImpactResult};

/// Name of the capture group holding the log name
pub const LOG_NAME_GROUP: &str = "log_name";

/// `prefix-{log_name}-{six-digit rollover number}`
///
/// The log name may itself contain dashes; it extends up to the final
/// rollover suffix.
pub const DEFAULT_INDEX_PATTERN: &str = r"^[^-]+-(?P<log_name>.+)-\d{6}$";

/// Decides log group membership for index names
pub trait IndexClassifier {
    /// Group key for `index_name`, or `None` to leave it ungrouped
    fn classify(&self, index_name: &str) -> Option<String>;

    /// Short human-readable description of the rule
    fn describe(&self) -> String;
}

/// Regex classifier with a required `log_name` capture
///
/// The pattern must match the whole index name; a match on a substring
/// does not count.
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    pattern: String,
    regex: Regex,
}

impl PatternClassifier {
    /// Compile a grouping pattern
    ///
    /// # Errors
    ///
    /// Returns [`ImpactError::Pattern`] if the pattern does not compile or
    /// has no `log_name` named capture group.
    pub fn new(pattern: &str) -> ImpactResult<Self> {
        let invalid = |e: regex::Error| {
            ImpactError::Pattern(format!("invalid pattern {:?}: {}", pattern, e))
        };

        // The anchoring wrapper could balance a stray parenthesis
        let bare = Regex::new(pattern).map_err(invalid)?;
        if !bare.capture_names().flatten().any(|n| n == LOG_NAME_GROUP) {
            return Err(ImpactError::Pattern(format!(
                "pattern {:?} has no named capture group '{}'",
                pattern, LOG_NAME_GROUP
            )));
        }

        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(invalid)?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// The stock rollover naming convention
    pub fn default_pattern() -> Self {
        Self {
            pattern: DEFAULT_INDEX_PATTERN.to_string(),
            regex: Regex::new(DEFAULT_INDEX_PATTERN).expect("default pattern is valid"),
        }
    }

    /// The pattern as given, without the anchoring wrapper
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::default_pattern()
    }
}

impl IndexClassifier for PatternClassifier {
    /// A match whose capture is empty or did not participate groups under
    /// the full index name.
    fn classify(&self, index_name: &str) -> Option<String> {
        let caps = self.regex.captures(index_name)?;
        let log_name = caps
            .name(LOG_NAME_GROUP)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(index_name);
        Some(log_name.to_string())
    }

    fn describe(&self) -> String {
        self.pattern.clone()
    }
}
