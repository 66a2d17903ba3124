//! Execution variables and secret obfuscation

use std::collections::HashMap;

use regex::bytes::{Regex, RegexBuilder};
use tracing::warn;

use crate::execution::Variable;

/// Placeholder written over secret values in output
pub const SECRET_PLACEHOLDER: &str = "*****";

/// Turns execution variables into an environment map and hides secret
/// values in captured output.
#[derive(Debug, Clone)]
pub struct EnvManager {
    env: HashMap<String, String>,
    secrets: Secrets,
}

#[derive(Debug, Clone)]
enum Secrets {
    None,
    Pattern(Regex),
    /// The secrets could not be compiled into a pattern; hide everything.
    Unmatchable,
}

impl EnvManager {
    pub fn new(variables: &HashMap<String, Variable>) -> Self {
        let env = variables
            .iter()
            .map(|(key, variable)| {
                let name = if variable.name.is_empty() {
                    key.clone()
                } else {
                    variable.name.clone()
                };
                (name, variable.value.clone())
            })
            .collect();

        let mut values: Vec<&str> = variables
            .values()
            .filter(|v| v.is_secret() && !v.value.is_empty())
            .map(|v| v.value.as_str())
            .collect();
        // Longest first so a secret containing another is replaced whole.
        values.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        values.dedup();

        let secrets = if values.is_empty() {
            Secrets::None
        } else {
            let pattern = values
                .iter()
                .map(|v| regex::escape(v))
                .collect::<Vec<_>>()
                .join("|");
            match RegexBuilder::new(&pattern).size_limit(1 << 26).build() {
                Ok(regex) => Secrets::Pattern(regex),
                Err(e) => {
                    warn!(error = %e, "Cannot build secret pattern, output will be hidden");
                    Secrets::Unmatchable
                }
            }
        };

        Self { env, secrets }
    }

    /// Variables as environment entries for the test process
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Replace every secret value in `output` with the placeholder
    pub fn obfuscate(&self, output: &[u8]) -> Vec<u8> {
        match &self.secrets {
            Secrets::None => output.to_vec(),
            Secrets::Pattern(secrets) => secrets
                .replace_all(output, SECRET_PLACEHOLDER.as_bytes())
                .into_owned(),
            Secrets::Unmatchable => SECRET_PLACEHOLDER.as_bytes().to_vec(),
        }
    }
}
