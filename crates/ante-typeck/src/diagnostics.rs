//! Ariadne-based diagnostic rendering for type errors (spec section 7).
//!
//! Grounded on `snow_typeck::diagnostics`'s `Report`/`Label`/error-code
//! shape. The core never reads source text (spec section 1), so there is
//! no byte range to hand ariadne the way the teacher does from a rowan
//! `TextRange` into real source — every report here renders against a
//! one-line synthetic placeholder whose only job is to give ariadne
//! something to draw a box around; the real `file:line:col` is spelled
//! out in the label text itself.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use crate::error::TypeError;
use crate::ty::TypeContext;

fn error_code(err: &TypeError) -> &'static str {
    match err {
        TypeError::Mismatch { .. } => "E0001",
        TypeError::InfiniteType { .. } => "E0002",
        TypeError::ArityMismatch { .. } => "E0003",
        TypeError::UnboundVariable { .. } => "E0004",
        TypeError::UnknownType { .. } => "E0005",
        TypeError::NotAFunction { .. } => "E0006",
        TypeError::TraitNotSatisfied { .. } => "E0007",
        TypeError::AmbiguousTraitImpl { .. } => "E0008",
        TypeError::MissingTraitMethod { .. } => "E0009",
        TypeError::TraitMethodSignatureMismatch { .. } => "E0010",
        TypeError::UnknownField { .. } => "E0011",
        TypeError::UnknownVariant { .. } => "E0012",
        TypeError::NonExhaustiveMatch { .. } => "E0013",
        TypeError::RedundantArm { .. } => "W0001",
        TypeError::MonomorphisationFailed { .. } => "E0014",
        TypeError::Internal { .. } => "E0015",
    }
}

/// Render a single `TypeError` into a colorless, stable-snapshottable
/// diagnostic string.
pub fn render_diagnostic(ctx: &TypeContext, err: &TypeError) -> String {
    let loc = err.location();
    // One placeholder column per character the location's own rendering
    // occupies, so the label's underline has somewhere to point.
    let marker = format!("at {loc}");
    let placeholder = " ".repeat(marker.len().max(1));
    let span: Range<usize> = 0..placeholder.len();
    let config = Config::default().with_color(false);
    let code = error_code(err);
    let kind = if err.is_warning() { ReportKind::Warning } else { ReportKind::Error };
    let color = if err.is_warning() { Color::Yellow } else { Color::Red };

    let mut builder = Report::build(kind, span.clone())
        .with_code(code)
        .with_message(err.render(ctx))
        .with_config(config)
        .with_label(Label::new(span).with_message(marker).with_color(color));

    if let TypeError::MonomorphisationFailed { cause, .. } = err {
        builder.set_help(cause.render(ctx));
    }

    let report = builder.finish();
    let mut buf = Vec::new();
    report
        .write(Source::from(placeholder), &mut buf)
        .expect("rendering to an in-memory buffer cannot fail");
    String::from_utf8(buf).expect("ariadne output is always valid utf8")
}

/// Render every error in `errors`, in order.
pub fn render_all(ctx: &TypeContext, errors: &[TypeError]) -> Vec<String> {
    errors.iter().map(|e| render_diagnostic(ctx, e)).collect()
}
