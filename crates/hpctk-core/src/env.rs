//! Applying prepared variables to an environment.
//!
//! Every variable is written twice: under its own name and under a
//! `SOFTVAR`-prefixed mirror. Makefiles reference the mirror
//! (`CFLAGS = $(SOFTVARCFLAGS)`) to avoid recursive definitions, so the
//! mirror is written even when the primary name is excluded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::vars::Vars;

/// Prefix of the mirrored variable names.
pub const MIRROR_PREFIX: &str = "SOFTVAR";

/// Destination for environment variables.
pub trait EnvSink {
    fn set_var(&mut self, key: &str, value: &str);
}

/// The environment of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn set_var(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

impl EnvSink for BTreeMap<String, String> {
    fn set_var(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

/// Records assignments in order; used to print them.
impl EnvSink for Vec<(String, String)> {
    fn set_var(&mut self, key: &str, value: &str) {
        self.push((key.to_string(), value.to_string()));
    }
}

/// Variable names that must not be set directly.
///
/// Written either as a comma-separated string or as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExclusionSpec", into = "Vec<String>")]
pub struct Exclusions(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ExclusionSpec {
    Joined(String),
    List(Vec<String>),
}

impl From<ExclusionSpec> for Exclusions {
    fn from(spec: ExclusionSpec) -> Self {
        match spec {
            ExclusionSpec::Joined(s) => Exclusions::parse(&s),
            ExclusionSpec::List(list) => Exclusions::new(list),
        }
    }
}

impl From<Exclusions> for Vec<String> {
    fn from(exclusions: Exclusions) -> Self {
        exclusions.0
    }
}

impl Exclusions {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }

    /// Parse a comma-separated list, ignoring blanks around names.
    pub fn parse(joined: &str) -> Self {
        Self::new(
            joined
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add the names of another exclusion list.
    pub fn extend(&mut self, other: &Exclusions) {
        for key in &other.0 {
            if !self.contains(key) {
                self.0.push(key.clone());
            }
        }
    }
}

/// Write `vars` into `sink`, skipping excluded names (their mirrors are
/// still written).
pub fn apply_vars(vars: &Vars, exclude: &Exclusions, sink: &mut dyn EnvSink) {
    for (key, value) in vars.iter() {
        if exclude.contains(key) {
            debug!(key, value, "not setting excluded environment variable");
        } else {
            debug!(key, value, "setting environment variable");
            sink.set_var(key, value);
        }
        sink.set_var(&format!("{MIRROR_PREFIX}{key}"), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cflags() -> Vars {
        let mut vars = Vars::new();
        vars.set("CFLAGS", "-O2");
        vars
    }

    #[test]
    fn sets_primary_and_mirror() {
        let mut env: BTreeMap<String, String> = BTreeMap::new();
        apply_vars(&cflags(), &Exclusions::default(), &mut env);
        assert_eq!(env.get("CFLAGS").map(String::as_str), Some("-O2"));
        assert_eq!(env.get("SOFTVARCFLAGS").map(String::as_str), Some("-O2"));
    }

    #[test]
    fn excluded_key_keeps_mirror() {
        let mut env: BTreeMap<String, String> = BTreeMap::new();
        apply_vars(&cflags(), &Exclusions::parse("CFLAGS"), &mut env);
        assert!(!env.contains_key("CFLAGS"));
        assert_eq!(env.get("SOFTVARCFLAGS").map(String::as_str), Some("-O2"));
    }

    #[test]
    fn assignments_keep_variable_order() {
        let mut vars = cflags();
        vars.set("CC", "gcc");
        let mut out: Vec<(String, String)> = Vec::new();
        apply_vars(&vars, &Exclusions::default(), &mut out);
        let keys: Vec<&str> = out.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["CFLAGS", "SOFTVARCFLAGS", "CC", "SOFTVARCC"]);
    }

    #[test]
    fn process_env_sets_variables() {
        let mut vars = Vars::new();
        vars.set("HPCTK_ENV_TEST_FLAGS", "-O1");
        apply_vars(&vars, &Exclusions::default(), &mut ProcessEnv);
        assert_eq!(std::env::var("HPCTK_ENV_TEST_FLAGS").unwrap(), "-O1");
        assert_eq!(std::env::var("SOFTVARHPCTK_ENV_TEST_FLAGS").unwrap(), "-O1");
    }

    #[test]
    fn parse_comma_list() {
        let ex = Exclusions::parse("CFLAGS, CXXFLAGS,,");
        assert!(ex.contains("CFLAGS"));
        assert!(ex.contains("CXXFLAGS"));
        assert!(!ex.contains(""));
    }

    #[derive(Deserialize)]
    struct Holder {
        exclude: Exclusions,
    }

    #[test]
    fn deserialize_string_or_list() {
        let joined: Holder = toml::from_str(r#"exclude = "CFLAGS,LDFLAGS""#).unwrap();
        let list: Holder = toml::from_str(r#"exclude = ["CFLAGS", "LDFLAGS"]"#).unwrap();
        assert_eq!(joined.exclude, list.exclude);
        assert!(list.exclude.contains("LDFLAGS"));
    }

    #[test]
    fn extend_skips_duplicates() {
        let mut ex = Exclusions::parse("CFLAGS");
        ex.extend(&Exclusions::new(["CFLAGS", "LIBS"]));
        assert_eq!(ex, Exclusions::new(["CFLAGS", "LIBS"]));
    }
}
