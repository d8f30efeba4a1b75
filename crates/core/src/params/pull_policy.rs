use std::{fmt, str::FromStr};

use snafu::Snafu;

/// Image pull behaviour of the executor container.
///
/// This is the only parameter with a default: omitting it selects
/// `IfNotPresent`. Parsing is case-insensitive; rendering always emits the
/// canonical Kubernetes spelling.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ImagePullPolicy {
    #[default]
    IfNotPresent,
    Always,
    Never,
}

impl ImagePullPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IfNotPresent => "IfNotPresent",
            Self::Always => "Always",
            Self::Never => "Never",
        }
    }
}

impl fmt::Display for ImagePullPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImagePullPolicy {
    type Err = ParseImagePullPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "ifnotpresent" => Ok(Self::IfNotPresent),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(ParseImagePullPolicyError::Invalid { value: value.to_string() }),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ParseImagePullPolicyError {
    #[snafu(display("'{value}' is not a valid image pull policy"))]
    Invalid { value: String },
}
