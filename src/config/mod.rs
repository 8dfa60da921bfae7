// src/config/mod.rs
// Triage configuration: department enumeration, keyword table, retry policy,
// model settings. Loaded once at startup and passed explicitly into the
// classifier components; nothing here is mutated after load.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// Upper bound on a single backoff wait, applied to the exponential schedule.
const MAX_BACKOFF_MS: u64 = 10_000;

/// One department a ticket can be routed to.
///
/// `hint` is the one-line routing description embedded in the model prompt;
/// `keywords` are the lowercase trigger words the fallback classifier counts.
/// The catch-all department may have an empty keyword list.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentConfig {
    pub name: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl DepartmentConfig {
    fn new(name: &str, hint: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            hint: hint.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Backoff schedule between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    Fixed,
    Exponential,
}

impl FromStr for Backoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(Backoff::Fixed),
            "exponential" => Ok(Backoff::Exponential),
            other => Err(format!("unknown backoff schedule: {other}")),
        }
    }
}

/// Retry policy for the AI categorization path.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2_000,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following `attempt` (1-based). The exponential
    /// schedule doubles per attempt and is capped at [`MAX_BACKOFF_MS`].
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ms = match self.backoff {
            Backoff::Fixed => self.initial_delay_ms,
            Backoff::Exponential => {
                let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
                self.initial_delay_ms
                    .saturating_mul(factor)
                    .min(MAX_BACKOFF_MS)
            }
        };
        Duration::from_millis(ms)
    }
}

/// Model service settings. The API key itself stays in the environment
/// (`ANTHROPIC_API_KEY`) and is read by the client, not stored here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub api_base: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 256,
            timeout_secs: 30,
            api_base: "https://api.anthropic.com".to_string(),
        }
    }
}

/// Built-in department table. Declaration order is the tie-break priority
/// order for the keyword classifier.
static DEFAULT_DEPARTMENTS: Lazy<Vec<DepartmentConfig>> = Lazy::new(|| {
    vec![
        DepartmentConfig::new(
            "IT Support",
            "Technical issues, software, hardware, network, passwords, computers, internet, email, applications",
            &[
                "computer", "laptop", "software", "hardware", "network", "internet", "email",
                "password", "login", "system", "application", "printer", "wifi", "server",
                "database", "access", "account",
            ],
        ),
        DepartmentConfig::new(
            "HR",
            "Employee relations, benefits, payroll, hiring, leave, training, performance reviews, workplace issues",
            &[
                "payroll", "salary", "benefits", "leave", "vacation", "sick", "employee",
                "hiring", "training", "performance", "hr", "human resources",
            ],
        ),
        DepartmentConfig::new(
            "Facilities",
            "Building maintenance, office space, equipment, cleaning, parking, security, temperature",
            &[
                "building", "office", "room", "maintenance", "cleaning", "parking", "security",
                "temperature", "hvac", "desk", "chair", "facility", "repair",
            ],
        ),
        DepartmentConfig::new(
            "Finance",
            "Budgets, expenses, invoicing, purchasing, reimbursements, accounting, financial reports",
            &[
                "budget", "expense", "invoice", "payment", "reimbursement", "purchase",
                "accounting", "financial", "cost", "money",
            ],
        ),
        DepartmentConfig::new("General", "Everything else that doesn't fit above categories", &[]),
    ]
});

fn default_departments() -> Vec<DepartmentConfig> {
    DEFAULT_DEPARTMENTS.clone()
}

fn default_department_name() -> String {
    "General".to_string()
}

/// Process-wide triage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub departments: Vec<DepartmentConfig>,
    pub default_department: String,
    pub retry: RetryPolicy,
    pub model: ModelConfig,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            departments: default_departments(),
            default_department: default_department_name(),
            retry: RetryPolicy::default(),
            model: ModelConfig::default(),
        }
    }
}

impl TriageConfig {
    /// Load configuration: built-in defaults, then the optional TOML file,
    /// then environment overrides. Fails on unreadable/unparseable files and
    /// on any structural validation issue.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?
            }
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.retry.max_attempts = env_var_or("TRIAGE_MAX_ATTEMPTS", self.retry.max_attempts);
        self.retry.initial_delay_ms =
            env_var_or("TRIAGE_RETRY_DELAY_MS", self.retry.initial_delay_ms);
        self.retry.backoff = env_var_or("TRIAGE_BACKOFF", self.retry.backoff);
        self.model.name = env_var_or("TRIAGE_MODEL", self.model.name.clone());
        self.model.max_tokens = env_var_or("TRIAGE_MAX_TOKENS", self.model.max_tokens);
        self.model.timeout_secs = env_var_or("TRIAGE_TIMEOUT_SECS", self.model.timeout_secs);
        self.model.api_base = env_var_or("TRIAGE_API_BASE", self.model.api_base.clone());
    }

    /// Structural checks over the department enumeration. Any issue is fatal:
    /// the process must not start with a malformed department set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();

        if self.departments.is_empty() {
            issues.push("no departments defined".to_string());
        }

        for dept in &self.departments {
            if dept.name.trim().is_empty() {
                issues.push("department with blank name".to_string());
            }
        }

        let mut seen: Vec<String> = Vec::new();
        for dept in &self.departments {
            let lowered = dept.name.to_lowercase();
            if seen.contains(&lowered) {
                issues.push(format!("duplicate department: {}", dept.name));
            } else {
                seen.push(lowered);
            }
        }

        if !self.departments.is_empty() && self.find_department(&self.default_department).is_none()
        {
            issues.push(format!(
                "default department {:?} is not in the configured set",
                self.default_department
            ));
        }

        if self.retry.max_attempts == 0 {
            issues.push("retry policy must allow at least one attempt".to_string());
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { issues })
        }
    }

    /// Case-insensitive lookup returning the configured department.
    pub fn find_department(&self, name: &str) -> Option<&DepartmentConfig> {
        self.departments
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Department names in priority order.
    pub fn department_names(&self) -> Vec<&str> {
        self.departments.iter().map(|d| d.name.as_str()).collect()
    }
}

/// Parse an environment variable, falling back to `default` when unset or
/// unparseable. Values may carry trailing `#` comments from .env files.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean = val.split('#').next().unwrap_or("").trim();
            match clean.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!("Config: {} = {:?} failed to parse, using default", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TriageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.departments.len(), 5);
        assert_eq!(config.departments[0].name, "IT Support");
        assert_eq!(config.departments[4].name, "General");
    }

    #[test]
    fn test_empty_department_set_is_fatal() {
        let config = TriageConfig {
            departments: vec![],
            ..TriageConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no departments defined"));
    }

    #[test]
    fn test_duplicate_departments_are_fatal() {
        let mut config = TriageConfig::default();
        config
            .departments
            .push(DepartmentConfig::new("it support", "", &[]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate department"));
    }

    #[test]
    fn test_unknown_default_department_is_fatal() {
        let config = TriageConfig {
            default_department: "Shipping".to_string(),
            ..TriageConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Shipping"));
    }

    #[test]
    fn test_zero_attempts_is_fatal() {
        let mut config = TriageConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_find_department_is_case_insensitive() {
        let config = TriageConfig::default();
        assert_eq!(
            config
                .find_department(" it support ")
                .map(|d| d.name.as_str()),
            Some("IT Support")
        );
        assert!(config.find_department("Shipping").is_none());
    }

    #[test]
    fn test_fixed_backoff_delay_is_constant() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2_000));
    }

    #[test]
    fn test_exponential_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 6,
            initial_delay_ms: 2_000,
            backoff: Backoff::Exponential,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(8_000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(10_000));
    }

    #[test]
    fn test_load_partial_toml_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("triage.toml");
        std::fs::write(
            &path,
            r#"
[retry]
max_attempts = 5
initial_delay_ms = 100
backoff = "exponential"
"#,
        )
        .expect("write config");

        let config = TriageConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff, Backoff::Exponential);
        // Department table falls back to the built-in defaults.
        assert_eq!(config.departments.len(), 5);
        assert_eq!(config.default_department, "General");
    }

    #[test]
    fn test_load_custom_departments_from_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("triage.toml");
        std::fs::write(
            &path,
            r#"
default_department = "Helpdesk"

[[departments]]
name = "Helpdesk"
hint = "Everything"
keywords = ["help"]
"#,
        )
        .expect("write config");

        let config = TriageConfig::load(Some(&path)).expect("load config");
        assert_eq!(config.departments.len(), 1);
        assert_eq!(config.departments[0].name, "Helpdesk");
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("triage.toml");
        std::fs::write(&path, "default_department = \"Nowhere\"").expect("write config");
        assert!(TriageConfig::load(Some(&path)).is_err());
    }
}
