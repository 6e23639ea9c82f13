use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::backends::Toolchain;

fn default_output_root() -> String {
    "output".to_string()
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

fn default_true() -> bool {
    true
}

/// Serializable configuration for an analysis run.
///
/// Typically loaded from a JSON or YAML file and then overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Toolchain prefix (`riscv64-unknown-elf-`) or full objdump name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Registers whose use should be reported.
    #[serde(default)]
    pub registers: Vec<String>,
    /// Root for timestamped run directories.
    #[serde(default = "default_output_root")]
    pub output_root: String,
    /// Directory that receives one log file per run.
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    /// Copy the analysed binary into the run directory.
    #[serde(default = "default_true")]
    pub copy_input: bool,
    /// Capture the binutils `size` report.
    #[serde(default = "default_true")]
    pub size_report: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            arch: None,
            registers: Vec::new(),
            output_root: default_output_root(),
            logs_dir: default_logs_dir(),
            copy_input: true,
            size_report: true,
        }
    }
}

impl AnalyzerConfig {
    /// Load a config file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let config = if matches!(ext, "yaml" | "yml") {
            serde_yaml::from_str(&body)
                .with_context(|| format!("Failed to parse YAML config {}", path.display()))?
        } else {
            serde_json::from_str(&body)
                .with_context(|| format!("Failed to parse JSON config {}", path.display()))?
        };
        Ok(config)
    }

    /// Apply command-line values. An empty register list keeps the file's list.
    pub fn with_overrides(mut self, arch: Option<String>, registers: Vec<String>) -> Self {
        if arch.is_some() {
            self.arch = arch;
        }
        if !registers.is_empty() {
            self.registers = registers;
        }
        self
    }

    pub fn toolchain(&self) -> Toolchain {
        Toolchain::from_arch(self.arch.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.output_root, "output");
        assert!(config.copy_input);
    }

    #[test]
    fn cli_values_override_file_values() {
        let config = AnalyzerConfig {
            arch: Some("riscv64-unknown-elf-".into()),
            registers: vec!["a0".into()],
            ..Default::default()
        };
        let kept = config.clone().with_overrides(None, vec![]);
        assert_eq!(kept, config);

        let replaced = config.with_overrides(Some("arm-none-eabi-".into()), vec!["sp".into()]);
        assert_eq!(replaced.arch.as_deref(), Some("arm-none-eabi-"));
        assert_eq!(replaced.registers, ["sp"]);
        assert_eq!(replaced.toolchain().program("objdump"), "arm-none-eabi-objdump");
    }
}
