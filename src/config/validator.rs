use anyhow::Result;
use colored::Colorize;
use std::collections::HashSet;
use std::path::Path;

/// Knows which configuration fields rserv reads
pub struct ConfigValidator {
    /// Set of valid configuration fields that are recognized by rserv
    known_fields: HashSet<&'static str>,
    /// Fields from older releases that are still accepted but ignored
    deprecated_fields: HashSet<&'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let known_fields = HashSet::from([
            "core.content_path",
            "core.cache_path",
            "scan.update_interval",
            "scan.command_timeout",
            "names.assume",
        ]);

        // The YAML cache and the server linker settings of earlier releases
        let deprecated_fields = HashSet::from(["core.cache_file", "core.server_path"]);

        Self {
            known_fields,
            deprecated_fields,
        }
    }

    /// Unknown and deprecated fields of a parsed config, in document order
    #[must_use]
    pub fn collect_warnings(&self, parsed: &toml::Value) -> Vec<String> {
        let mut unknown = Vec::new();
        let mut deprecated = Vec::new();
        self.check_table(parsed, "", &mut unknown, &mut deprecated);

        let mut warnings: Vec<String> = unknown
            .iter()
            .map(|field| format!("Unknown configuration field: {}", field.yellow()))
            .collect();

        for field in &deprecated {
            let suggestion = match field.as_str() {
                "core.cache_file" => "The cache location is now set with core.cache_path.",
                "core.server_path" => "Server linking is no longer handled by rserv.",
                _ => "This field is deprecated and will be removed in a future version.",
            };
            warnings.push(format!(
                "Deprecated field '{}': {}",
                field.yellow(),
                suggestion.dimmed()
            ));
        }

        warnings
    }

    /// Validate a configuration file on disk and print warnings about issues
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path)?;
        let parsed: toml::Value = toml::from_str(&content)?;
        let warnings = self.collect_warnings(&parsed);

        if !warnings.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for warning in warnings {
                eprintln!("  {warning}");
            }
            eprintln!();
        }

        Ok(())
    }

    /// Recursively checks a TOML table for unknown and deprecated fields
    fn check_table(
        &self,
        table: &toml::Value,
        prefix: &str,
        unknown: &mut Vec<String>,
        deprecated: &mut Vec<String>,
    ) {
        let toml::Value::Table(map) = table else {
            return;
        };

        for (key, value) in map {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };

            if self.deprecated_fields.contains(full_key.as_str()) {
                deprecated.push(full_key);
            } else if matches!(value, toml::Value::Table(_)) {
                self.check_table(value, &full_key, unknown, deprecated);
            } else if !self.known_fields.contains(full_key.as_str()) {
                unknown.push(full_key);
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
