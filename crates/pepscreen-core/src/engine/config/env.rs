use std::collections::HashMap;

/// Read-only view of environment variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// Blank values count as unset.
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The process environment. Variables that are not valid Unicode are treated as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().and_then(|v| non_blank(&v))
    }
}

/// A fixed set of variables, for embedding and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapEnv(HashMap<String, String>);

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.0.get(name).and_then(|v| non_blank(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_read_as_unset() {
        let env = MapEnv::new()
            .with("PEPSCREEN_SEED", "   ")
            .with("PEPSCREEN_TARGET_COUNT", " 12 ");
        assert_eq!(env.var("PEPSCREEN_SEED"), None);
        assert_eq!(env.var("PEPSCREEN_TARGET_COUNT").as_deref(), Some("12"));
        assert_eq!(env.var("PEPSCREEN_MAX_RATIO"), None);
    }
}
