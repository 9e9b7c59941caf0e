//! Conversion settings.

/// What to do when a flag or property value cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Abort the conversion on the first decode error.
    #[default]
    FailFast,
    /// Log the error, skip the rest of the offending line and carry on.
    SkipAndWarn,
}

/// Settings shared by the parser, the flag decoders and the writer.
///
/// # Example
/// ```
/// use dsp2vcxproj::ConvertOptions;
///
/// let options = ConvertOptions::new()
///     .default_platform("x64")
///     .default_culture(0x0407);
/// assert_eq!(options.platform(), "x64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    default_platform: String,
    default_culture: u32,
    tools_version: String,
    policy: DecodePolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            default_platform: "Win32".to_string(),
            default_culture: 0x0409,
            tools_version: "4.0".to_string(),
            policy: DecodePolicy::FailFast,
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The platform whose toolset defaults need no explicit override
    /// (`/MACHINE:IX86`, `/Oy-`).
    pub fn default_platform(mut self, platform: impl Into<String>) -> Self {
        self.default_platform = platform.into();
        self
    }

    /// Resource culture assumed by the build host.  `/l` values equal to it
    /// are not written.
    pub fn default_culture(mut self, culture: u32) -> Self {
        self.default_culture = culture;
        self
    }

    /// `ToolsVersion` attribute of both generated documents.
    pub fn tools_version(mut self, version: impl Into<String>) -> Self {
        self.tools_version = version.into();
        self
    }

    pub fn policy(mut self, policy: DecodePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn platform(&self) -> &str {
        &self.default_platform
    }

    pub fn culture(&self) -> u32 {
        self.default_culture
    }

    pub fn version(&self) -> &str {
        &self.tools_version
    }

    pub fn decode_policy(&self) -> DecodePolicy {
        self.policy
    }
}
