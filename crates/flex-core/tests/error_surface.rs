use flex_core::errors::{ErrorInfo, FlexError};
use flex_core::{CodecOperation, FlexWarning, InputTarget};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("path", "runs/log.csv")
        .with_context("reason", "example")
}

#[test]
fn unsupported_format_surface() {
    let err = FlexError::UnsupportedFormat(sample_info("F001", "no codec for xlsx"));
    assert_eq!(err.info().code, "F001");
    assert!(err.info().context.contains_key("path"));
}

#[test]
fn shape_helper_records_counts() {
    let err = FlexError::shape("config-rows", "1", 3);
    assert!(matches!(err, FlexError::Shape(_)));
    assert_eq!(err.info().context.get("expected").map(String::as_str), Some("1"));
    assert_eq!(err.info().context.get("actual").map(String::as_str), Some("3"));
}

#[test]
fn empty_helper_names_document() {
    let err = FlexError::empty("current-unset", "current config");
    assert!(matches!(err, FlexError::EmptyDocument(_)));
    assert!(err.to_string().contains("current config holds no rows"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = FlexError::Io(sample_info("IO01", "failed to open").with_hint("check permissions"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("io error: failed to open (code: IO01)"));
    assert!(rendered.contains("path=runs/log.csv"));
    assert!(rendered.ends_with("hint: check permissions"));
}

#[test]
fn warnings_render_readably() {
    let warning = FlexWarning::UnsupportedInput {
        target: InputTarget::Logs,
        detail: "no input".into(),
    };
    assert!(warning.to_string().starts_with("no logs records loaded"));

    let warning = FlexWarning::RoundTripFidelity {
        format: "html".into(),
        path: "runs/log.html".into(),
        operation: CodecOperation::Load,
    };
    assert!(warning.to_string().contains("html codec is lossy"));
}
