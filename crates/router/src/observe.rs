//! Diagnostics port of the router.
//!
//! Observers see what the router did with each activity. They never affect
//! routing. The default [`NoopObserver`] discards everything;
//! [`TracingObserver`] forwards to `tracing`.

use {
    serde_json::Value,
    tracing::{debug, warn},
};

use crate::route::RouteKey;

/// Activity summary reported when a named activity arrives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityDiagnostics<'a> {
    pub name: &'a str,
    pub detail: DiagnosticDetail<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagnosticDetail<'a> {
    /// A command-filtered router records only the command and its parameters.
    Command {
        command_id: Option<&'a Value>,
        parameters: Option<&'a Value>,
    },
    /// A wildcard router, or an activity without payload, records the payload.
    Payload(Option<&'a Value>),
}

/// Why an activity was passed on without a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallthroughReason {
    MissingName,
    UnknownName,
    MissingPayload,
    CommandMismatch,
    MissingCapability,
}

impl FallthroughReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingName => "missing activity name",
            Self::UnknownName => "not an invoke route",
            Self::MissingPayload => "missing payload",
            Self::CommandMismatch => "commandId does not match",
            Self::MissingCapability => "capability not registered",
        }
    }
}

pub trait TurnObserver: Send + Sync {
    fn activity_received(&self, _diagnostics: &ActivityDiagnostics<'_>) {}

    fn fell_through(&self, _name: Option<&str>, _reason: FallthroughReason) {}

    fn responded(&self, _route: RouteKey, _status: u16) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TurnObserver for NoopObserver {}

/// Observer logging through `tracing` under the `msgext::activity` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TurnObserver for TracingObserver {
    fn activity_received(&self, diagnostics: &ActivityDiagnostics<'_>) {
        match diagnostics.detail {
            DiagnosticDetail::Command {
                command_id,
                parameters,
            } => debug!(
                target: "msgext::activity",
                activity_name = diagnostics.name,
                command_id = %command_id.unwrap_or(&serde_json::Value::Null),
                parameters = %parameters.unwrap_or(&serde_json::Value::Null),
                "activity received"
            ),
            DiagnosticDetail::Payload(value) => debug!(
                target: "msgext::activity",
                activity_name = diagnostics.name,
                value = %value.unwrap_or(&serde_json::Value::Null),
                "activity received"
            ),
        }
    }

    fn fell_through(&self, name: Option<&str>, reason: FallthroughReason) {
        debug!(
            target: "msgext::activity",
            activity_name = name.unwrap_or_default(),
            reason = reason.as_str(),
            "passing activity on"
        );
    }

    fn responded(&self, route: RouteKey, status: u16) {
        if status >= 500 {
            warn!(target: "msgext::activity", route = %route, status, "invoke failed");
        } else {
            debug!(target: "msgext::activity", route = %route, status, "invoke answered");
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use {super::*, serde_json::json};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<String> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("msgext=debug"))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.lines()
    }

    #[test]
    fn tracing_observer_logs_command_and_parameters() {
        let payload = json!({ "commandId": "search", "parameters": [{ "name": "q" }] });
        let lines = capture(|| {
            TracingObserver.activity_received(&ActivityDiagnostics {
                name: "composeExtension/query",
                detail: DiagnosticDetail::Command {
                    command_id: payload.get("commandId"),
                    parameters: payload.get("parameters"),
                },
            });
        });

        assert_eq!(lines.len(), 1, "{lines:?}");
        let line = &lines[0];
        assert!(line.contains("DEBUG"), "{line}");
        assert!(line.contains("msgext::activity"), "{line}");
        assert!(line.contains("activity received"), "{line}");
        assert!(line.contains("activity_name=\"composeExtension/query\""), "{line}");
        assert!(line.contains(r#"command_id="search""#), "{line}");
        assert!(line.contains(r#"parameters=[{"name":"q"}]"#), "{line}");
    }

    #[test]
    fn tracing_observer_logs_full_payload_for_wildcards() {
        let payload = json!({ "commandId": "x", "state": "s" });
        let lines = capture(|| {
            TracingObserver.activity_received(&ActivityDiagnostics {
                name: "composeExtension/query",
                detail: DiagnosticDetail::Payload(Some(&payload)),
            });
            TracingObserver.fell_through(None, FallthroughReason::MissingName);
        });

        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].contains(r#"value={"commandId":"x","state":"s"}"#), "{}", lines[0]);
        assert!(!lines[0].contains("command_id="), "{}", lines[0]);
        assert!(lines[1].contains("passing activity on"), "{}", lines[1]);
        assert!(lines[1].contains("reason=\"missing activity name\""), "{}", lines[1]);
    }

    #[test]
    fn tracing_observer_warns_on_failed_invokes() {
        let lines = capture(|| {
            TracingObserver.responded(RouteKey::Query, 200);
            TracingObserver.responded(RouteKey::Query, 500);
        });

        assert_eq!(lines.len(), 2, "{lines:?}");
        assert!(lines[0].contains("DEBUG"), "{}", lines[0]);
        assert!(lines[0].contains("invoke answered"), "{}", lines[0]);
        assert!(lines[1].contains("WARN"), "{}", lines[1]);
        assert!(lines[1].contains("msgext::activity"), "{}", lines[1]);
        assert!(lines[1].contains("invoke failed"), "{}", lines[1]);
        assert!(lines[1].contains("route=onQuery"), "{}", lines[1]);
        assert!(lines[1].contains("status=500"), "{}", lines[1]);
    }

    #[test]
    fn noop_observer_logs_nothing() {
        let lines = capture(|| {
            NoopObserver.fell_through(Some("composeExtension/query"), FallthroughReason::UnknownName);
            NoopObserver.responded(RouteKey::Query, 500);
        });
        assert!(lines.is_empty(), "{lines:?}");
    }

    #[test]
    fn reasons_are_described() {
        assert_eq!(
            FallthroughReason::CommandMismatch.as_str(),
            "commandId does not match"
        );
        assert_eq!(
            FallthroughReason::MissingCapability.as_str(),
            "capability not registered"
        );
    }
}
