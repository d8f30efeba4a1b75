use snafu::Snafu;

/// Internal assembly failure.
///
/// Validation already accepted the parameters when assembly starts, so any
/// of these variants signals a defect in this crate rather than bad caller
/// input. Callers surface the error and stop; there is nothing for them to
/// retry or correct.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AssemblyError {
    #[snafu(display(
        "Selector label '{key}' of generated deployment '{name}' does not match its pod template"
    ))]
    SelectorMismatch { name: String, key: String },

    #[snafu(display("Failed to serialize manifest of deployment '{name}', error: {source}"))]
    SerializeManifest { name: String, source: serde_yaml::Error },
}
