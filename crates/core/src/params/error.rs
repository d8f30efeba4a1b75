use snafu::Snafu;

/// One violated parameter constraint.
///
/// `field` carries the name the caller supplied the value under, in the
/// `camelCase` spelling of the parameter mapping, so orchestrators can map
/// a violation back to their own input without string matching on
/// `message`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

/// Rejected parameter set.
///
/// Validation never stops at the first problem: `violations` holds one
/// entry per violated field, so a caller can fix everything in one pass.
#[derive(Debug, Snafu)]
#[snafu(display("{}", render_violations(violations)))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn render_violations(violations: &[Violation]) -> String {
    let details = violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ");
    format!("invalid deployment parameters: {details}")
}
