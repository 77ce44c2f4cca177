//! Declared kinds of attribute and element values.

use bitflags::bitflags;
use thiserror::Error;

/// What a value means, used for completion, navigation and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Unknown,
    /// Opaque content that is never parsed.
    Data,
    /// Must be empty.
    Nothing,
    String,
    Bool,
    Int,
    Float,
    Char,
    Guid,
    Url,
    Version,
    /// A version with an optional `-suffix`.
    SuffixedVersion,
    Lcid,
    Culture,
    Condition,

    TargetName,
    ItemName,
    PropertyName,
    MetadataName,
    TaskName,
    TaskOutputParameterName,
    TaskParameterType,

    File,
    Folder,
    FolderWithSlash,
    FileOrFolder,
    ProjectFile,
    Extension,
    Filename,

    Configuration,
    Platform,
    TargetFramework,
    TargetFrameworks,
    TargetFrameworkIdentifier,
    TargetFrameworkVersion,

    Importance,
    ContinueOnError,
    ToolsVersion,
    Sdk,
    SdkVersion,
    SdkWithVersion,
    Xmlns,
    Label,
}

bitflags! {
    /// Modifiers on a declared value kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ValueFlags: u8 {
        /// `;` separated list.
        const LIST = 1 << 0;
        /// `,` separated list.
        const COMMA_LIST = 1 << 1;
        /// Expressions are not evaluated; the value is plain text.
        const LITERAL = 1 << 2;
    }
}

/// Why a literal value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidValue {
    #[error("Invalid GUID value '{0}'")]
    Guid(String),
    #[error("Invalid integer value '{0}'")]
    Int(String),
    #[error("Invalid number value '{0}'")]
    Float(String),
    #[error("Invalid character value '{0}'")]
    Char(String),
    #[error("Invalid boolean value '{0}'")]
    Bool(String),
    #[error("Invalid URL value '{0}'")]
    Url(String),
    #[error("Invalid version value '{0}'")]
    Version(String),
    #[error("Invalid locale ID value '{0}'")]
    Lcid(String),
    #[error("Invalid culture value '{0}'")]
    Culture(String),
    #[error("Invalid target framework value '{0}'")]
    TargetFramework(String),
    #[error("Value should be empty")]
    NotEmpty,
    #[error("Unknown value '{value}'")]
    Unknown { value: String },
}

const BOOL_VALUES: &[&str] = &["true", "false"];
const IMPORTANCE_VALUES: &[&str] = &["high", "normal", "low"];
const CONTINUE_ON_ERROR_VALUES: &[&str] = &[
    "WarnAndContinue",
    "true",
    "ErrorAndStop",
    "false",
    "ErrorAndContinue",
];
const CONFIGURATION_VALUES: &[&str] = &["Debug", "Release"];
const PLATFORM_VALUES: &[&str] = &["AnyCPU", "x86", "x64", "ARM", "ARM64"];
const TARGET_FRAMEWORK_IDENTIFIER_VALUES: &[&str] =
    &[".NETFramework", ".NETCoreApp", ".NETStandard", ".NETPortable"];
const TARGET_FRAMEWORK_VALUES: &[&str] = &[
    "net10.0",
    "net9.0",
    "net8.0",
    "net7.0",
    "net6.0",
    "netstandard2.1",
    "netstandard2.0",
    "netcoreapp3.1",
    "net48",
    "net472",
    "net462",
];
const TOOLS_VERSION_VALUES: &[&str] = &["2.0", "3.5", "4.0", "12.0", "14.0", "15.0", "Current"];
const XMLNS_VALUES: &[&str] = &["http://schemas.microsoft.com/developer/msbuild/2003"];
const TASK_PARAMETER_TYPE_VALUES: &[&str] = &[
    "System.String",
    "System.String[]",
    "System.Boolean",
    "System.Boolean[]",
    "System.Int32",
    "System.Int32[]",
    "System.Int64",
    "System.Double",
    "System.DateTime",
    "System.Char",
    "Microsoft.Build.Framework.ITaskItem",
    "Microsoft.Build.Framework.ITaskItem[]",
];

impl ValueKind {
    /// Values offered for completion. Empty when the kind is open-ended.
    pub fn known_values(self) -> &'static [&'static str] {
        match self {
            Self::Bool => BOOL_VALUES,
            Self::Importance => IMPORTANCE_VALUES,
            Self::ContinueOnError => CONTINUE_ON_ERROR_VALUES,
            Self::Configuration => CONFIGURATION_VALUES,
            Self::Platform => PLATFORM_VALUES,
            Self::TargetFrameworkIdentifier => TARGET_FRAMEWORK_IDENTIFIER_VALUES,
            Self::TargetFramework | Self::TargetFrameworks => TARGET_FRAMEWORK_VALUES,
            Self::ToolsVersion => TOOLS_VERSION_VALUES,
            Self::Xmlns => XMLNS_VALUES,
            Self::TaskParameterType => TASK_PARAMETER_TYPE_VALUES,
            _ => &[],
        }
    }

    /// Whether [`known_values`](Self::known_values) lists every legal value.
    pub fn is_closed_set(self) -> bool {
        matches!(
            self,
            Self::Importance | Self::ContinueOnError | Self::Xmlns | Self::TaskParameterType
        )
    }

    pub fn is_path(self) -> bool {
        matches!(
            self,
            Self::File | Self::Folder | Self::FolderWithSlash | Self::FileOrFolder | Self::ProjectFile
        )
    }

    /// Kinds whose literal text names a symbol declared by that text.
    pub fn is_symbol_name(self) -> bool {
        matches!(self, Self::TargetName | Self::ItemName | Self::PropertyName | Self::TaskName)
    }

    /// Check a literal (expression-free) value.
    pub fn validate(self, value: &str) -> Result<(), InvalidValue> {
        let value = value.trim();
        let ok = match self {
            Self::Nothing => return if value.is_empty() { Ok(()) } else { Err(InvalidValue::NotEmpty) },
            Self::Bool => is_bool(value),
            Self::Int => value.parse::<i64>().is_ok(),
            Self::Float => value.parse::<f64>().is_ok(),
            Self::Char => value.chars().count() == 1,
            Self::Guid => is_guid(value),
            Self::Url => is_url(value),
            Self::Version | Self::SdkVersion => is_version(value),
            Self::SuffixedVersion => is_suffixed_version(value),
            Self::Lcid => is_lcid(value),
            Self::Culture => is_culture(value),
            Self::TargetFramework => is_target_framework(value),
            _ if self.is_closed_set() => self
                .known_values()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(value)),
            _ => true,
        };
        if ok {
            return Ok(());
        }

        let value = value.to_string();
        Err(match self {
            Self::Bool => InvalidValue::Bool(value),
            Self::Int => InvalidValue::Int(value),
            Self::Float => InvalidValue::Float(value),
            Self::Char => InvalidValue::Char(value),
            Self::Guid => InvalidValue::Guid(value),
            Self::Url => InvalidValue::Url(value),
            Self::Version | Self::SdkVersion | Self::SuffixedVersion => InvalidValue::Version(value),
            Self::Lcid => InvalidValue::Lcid(value),
            Self::Culture => InvalidValue::Culture(value),
            Self::TargetFramework => InvalidValue::TargetFramework(value),
            _ => InvalidValue::Unknown { value },
        })
    }
}

fn is_bool(value: &str) -> bool {
    let value = value.strip_prefix('!').unwrap_or(value);
    ["true", "false", "on", "off", "yes", "no"]
        .iter()
        .any(|known| known.eq_ignore_ascii_case(value))
}

fn is_guid(value: &str) -> bool {
    let inner = value
        .strip_prefix('{')
        .and_then(|v| v.strip_suffix('}'))
        .unwrap_or(value);
    let groups: Vec<&str> = inner.split('-').collect();
    groups.len() == 5
        && groups
            .iter()
            .zip([8, 4, 4, 4, 12])
            .all(|(group, len)| group.len() == len && group.bytes().all(|b| b.is_ascii_hexdigit()))
}

fn is_url(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && !rest.is_empty()
        && !value.contains(char::is_whitespace)
}

fn is_version(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    (1..=4).contains(&parts.len())
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

fn is_suffixed_version(value: &str) -> bool {
    match value.split_once('-') {
        Some((version, suffix)) => {
            is_version(version)
                && !suffix.is_empty()
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
        }
        None => is_version(value),
    }
}

fn is_lcid(value: &str) -> bool {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).is_ok(),
        None => value.parse::<u32>().is_ok(),
    }
}

fn is_culture(value: &str) -> bool {
    let mut parts = value.split('-');
    let Some(language) = parts.next() else {
        return false;
    };
    (2..=3).contains(&language.len())
        && language.bytes().all(|b| b.is_ascii_alphabetic())
        && parts.all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// Short framework names such as `net8.0`, `netstandard2.0`, `net48`,
/// or `net8.0-windows`.
fn is_target_framework(value: &str) -> bool {
    let (framework, _platform) = value.split_once('-').unwrap_or((value, ""));
    let digits = framework.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let identifier_len = framework.len() - digits.len();
    identifier_len > 0
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ValueKind::Guid, "{6F0C2A1B-1234-4D6A-9F3B-0123456789AB}", true)]
    #[case(ValueKind::Guid, "6f0c2a1b-1234-4d6a-9f3b-0123456789ab", true)]
    #[case(ValueKind::Guid, "not-a-guid", false)]
    #[case(ValueKind::Int, "42", true)]
    #[case(ValueKind::Int, "4.2", false)]
    #[case(ValueKind::Bool, "True", true)]
    #[case(ValueKind::Bool, "!false", true)]
    #[case(ValueKind::Bool, "maybe", false)]
    #[case(ValueKind::Url, "https://example.com/x", true)]
    #[case(ValueKind::Url, "example dot com", false)]
    #[case(ValueKind::Version, "1.2.3.4", true)]
    #[case(ValueKind::Version, "1.2.3.4.5", false)]
    #[case(ValueKind::SuffixedVersion, "1.0.0-beta.1", true)]
    #[case(ValueKind::Lcid, "1033", true)]
    #[case(ValueKind::Lcid, "0x409", true)]
    #[case(ValueKind::Culture, "en-US", true)]
    #[case(ValueKind::TargetFramework, "net8.0", true)]
    #[case(ValueKind::TargetFramework, "net8.0-windows", true)]
    #[case(ValueKind::TargetFramework, "eight", false)]
    #[case(ValueKind::Importance, "HIGH", true)]
    #[case(ValueKind::Importance, "urgent", false)]
    #[case(ValueKind::Nothing, "", true)]
    #[case(ValueKind::String, "anything at all", true)]
    fn test_validate(#[case] kind: ValueKind, #[case] value: &str, #[case] valid: bool) {
        assert_eq!(kind.validate(value).is_ok(), valid, "{kind:?} {value:?}");
    }

    #[test]
    fn test_invalid_value_messages() {
        let err = ValueKind::Int.validate("x").unwrap_err();
        assert_eq!(err.to_string(), "Invalid integer value 'x'");
    }
}
