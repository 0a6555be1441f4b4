use anyhow::{Context, Result};
use regex::Regex;
use std::env;
use tracing::{debug, warn};

const ENV_VAR_PATTERN: &str = r"\$\{(\w+)\}|\$(\w+)";

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
///
/// Unset variables are left in place; the validator reports them.
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(ENV_VAR_PATTERN).context("Invalid environment variable pattern")?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let placeholder = &caps[0];
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                missing_vars.push(var_name.to_string());
                placeholder.to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!(
            "Environment variables not set (will fail validation): {:?}",
            missing_vars
        );
    }

    Ok(result.into_owned())
}

/// Names of placeholders still present in `content`
pub fn unresolved_env_vars(content: &str) -> Vec<String> {
    match Regex::new(ENV_VAR_PATTERN) {
        Ok(re) => re
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_both_forms() {
        env::set_var("OPTX_TEST_NAME", "sandbox");
        env::set_var("OPTX_TEST_FORMAT", "json");
        let out = substitute_env_vars("name: ${OPTX_TEST_NAME}\nlog_format: $OPTX_TEST_FORMAT").unwrap();
        assert_eq!(out, "name: sandbox\nlog_format: json");
    }

    #[test]
    fn test_missing_vars_are_kept() {
        env::remove_var("OPTX_TEST_MISSING");
        let out = substitute_env_vars("name: ${OPTX_TEST_MISSING}").unwrap();
        assert_eq!(out, "name: ${OPTX_TEST_MISSING}");
        assert_eq!(unresolved_env_vars(&out), vec!["OPTX_TEST_MISSING".to_string()]);
    }
}
