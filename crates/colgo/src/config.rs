/// A spider configuration record that left required fields unset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{spider} must define the following field(s): {}", .missing.join(", "))]
pub struct ConfigError {
    pub spider: String,
    pub missing: Vec<&'static str>,
}

impl ConfigError {
    /// Collects every field flagged as absent, so one error names all of them.
    pub(crate) fn missing(spider: Option<&str>, fields: &[(&'static str, bool)]) -> Self {
        Self {
            spider: spider.unwrap_or("<unnamed spider>").to_string(),
            missing: fields
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| *name)
                .collect(),
        }
    }
}

/// Treats an empty string the same as an unset field.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_every_missing_field() {
        let err = ConfigError::missing(
            Some("colgo_test"),
            &[("name", false), ("agency", true), ("location", true)],
        );
        assert_eq!(err.missing, vec!["agency", "location"]);
        assert_eq!(
            err.to_string(),
            "colgo_test must define the following field(s): agency, location"
        );
        assert_eq!(
            ConfigError::missing(None, &[("name", true)]).spider,
            "<unnamed spider>"
        );
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("x".into())), Some("x".to_string()));
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(None), None);
    }
}
