use std::path::PathBuf;

use bignum_core::DEFAULT_DUMP_FILENAME;

/// Driver settings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Abort the run after this many retired instructions.
    pub max_steps: Option<u64>,
    /// File written by `dump` when no file name is given.
    pub dump_filename: PathBuf,
    /// Stop at breaks and read debugger commands. When unset every break
    /// resumes as if `c` had been entered.
    pub interactive: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            dump_filename: PathBuf::from(DEFAULT_DUMP_FILENAME),
            interactive: true,
        }
    }
}

impl RunnerConfig {
    /// Settings for unattended batch runs.
    #[must_use]
    pub fn batch() -> Self {
        Self {
            interactive: false,
            ..Self::default()
        }
    }

    /// Sets the step limit.
    #[must_use]
    pub const fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Sets the default dump file.
    #[must_use]
    pub fn with_dump_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_filename = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::RunnerConfig;

    #[test]
    fn defaults_are_interactive_and_unbounded() {
        let config = RunnerConfig::default();
        assert!(config.interactive);
        assert_eq!(config.max_steps, None);
        assert_eq!(config.dump_filename, Path::new("dmem_dump.hex"));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: RunnerConfig =
            serde_json::from_str(r#"{"max_steps": 100}"#).expect("valid config");
        assert_eq!(config, RunnerConfig::default().with_max_steps(100));
        assert!(!RunnerConfig::batch().interactive);
    }
}
