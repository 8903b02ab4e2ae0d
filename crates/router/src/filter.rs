use serde_json::Value;

/// Gate on the `commandId` carried in an invoke payload.
///
/// A filter without an identifier accepts every command. Otherwise the
/// payload's `commandId` must be a string equal to the identifier, byte for
/// byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandFilter {
    command_id: Option<String>,
}

impl CommandFilter {
    pub fn new(command_id: Option<String>) -> Self {
        Self { command_id }
    }

    /// Filter accepting every command.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn command_id(&self) -> Option<&str> {
        self.command_id.as_deref()
    }

    pub fn is_wildcard(&self) -> bool {
        self.command_id.is_none()
    }

    pub fn matches(&self, payload_command_id: Option<&str>) -> bool {
        match self.command_id.as_deref() {
            None => true,
            Some(expected) => payload_command_id == Some(expected),
        }
    }

    pub fn matches_payload(&self, payload: &Value) -> bool {
        self.matches(command_id(payload))
    }
}

/// The `commandId` of a payload, when it is a string.
pub fn command_id(payload: &Value) -> Option<&str> {
    payload.get("commandId").and_then(Value::as_str)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    #[rstest]
    #[case(None, Some("command"), true)]
    #[case(None, Some("anything"), true)]
    #[case(None, None, true)]
    #[case(Some("command"), Some("command"), true)]
    #[case(Some("command"), Some("wrong"), false)]
    #[case(Some("command"), Some("Command"), false)]
    #[case(Some("command"), Some("command "), false)]
    #[case(Some("command"), None, false)]
    fn matches_command(
        #[case] configured: Option<&str>,
        #[case] payload: Option<&str>,
        #[case] expected: bool,
    ) {
        let filter = CommandFilter::new(configured.map(str::to_string));
        assert_eq!(filter.matches(payload), expected);
    }

    #[test]
    fn non_string_command_id_never_matches_a_configured_filter() {
        let filter = CommandFilter::new(Some("1".into()));
        assert!(!filter.matches_payload(&json!({ "commandId": 1 })));
        assert!(filter.matches_payload(&json!({ "commandId": "1" })));
        assert!(CommandFilter::any().matches_payload(&json!({ "commandId": 1 })));
    }

    #[test]
    fn accessors() {
        let filter = CommandFilter::new(Some("search".into()));
        assert_eq!(filter.command_id(), Some("search"));
        assert!(!filter.is_wildcard());
        assert!(CommandFilter::any().is_wildcard());
        assert_eq!(command_id(&json!({ "commandId": "x" })), Some("x"));
        assert_eq!(command_id(&json!("not an object")), None);
    }
}
