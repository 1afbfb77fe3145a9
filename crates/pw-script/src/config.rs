/// Limits applied to a Rhai engine. A limit of 0 means unlimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptConfig {
    /// Maximum number of operations a single evaluation may perform.
    pub max_operations: u64,
    /// Maximum depth of nested function calls.
    pub max_call_levels: usize,
    /// Maximum nesting depth of expressions.
    pub max_expr_depth: usize,
    /// Maximum length of a string value, in bytes.
    pub max_string_size: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_operations: 0,
            max_call_levels: 64,
            max_expr_depth: 64,
            max_string_size: 0,
        }
    }
}

impl ScriptConfig {
    /// Set the operation budget per evaluation (0 = unlimited).
    pub fn with_max_operations(mut self, max: u64) -> Self {
        self.max_operations = max;
        self
    }

    /// Set the maximum call depth.
    pub fn with_max_call_levels(mut self, max: usize) -> Self {
        self.max_call_levels = max;
        self
    }

    /// Set the maximum expression depth (0 = unlimited).
    pub fn with_max_expr_depth(mut self, max: usize) -> Self {
        self.max_expr_depth = max;
        self
    }

    /// Set the maximum string length (0 = unlimited).
    pub fn with_max_string_size(mut self, max: usize) -> Self {
        self.max_string_size = max;
        self
    }

    /// Apply these limits to an engine.
    pub fn apply(&self, engine: &mut rhai::Engine) {
        engine.set_max_operations(self.max_operations);
        engine.set_max_call_levels(self.max_call_levels);
        engine.set_max_expr_depths(self.max_expr_depth, self.max_expr_depth);
        engine.set_max_string_size(self.max_string_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = ScriptConfig::default();
        assert_eq!(config.max_operations, 0);
        assert_eq!(config.max_call_levels, 64);
        assert_eq!(config.max_expr_depth, 64);
        assert_eq!(config.max_string_size, 0);
    }

    #[test]
    fn config_builder_chain() {
        let config = ScriptConfig::default()
            .with_max_operations(10_000)
            .with_max_call_levels(8)
            .with_max_expr_depth(16)
            .with_max_string_size(256);
        assert_eq!(config.max_operations, 10_000);
        assert_eq!(config.max_call_levels, 8);
        assert_eq!(config.max_expr_depth, 16);
        assert_eq!(config.max_string_size, 256);
    }

    #[test]
    fn apply_sets_engine_limits() {
        let mut engine = rhai::Engine::new();
        ScriptConfig::default()
            .with_max_operations(500)
            .with_max_string_size(32)
            .apply(&mut engine);
        assert_eq!(engine.max_operations(), 500);
        assert_eq!(engine.max_string_size(), 32);
    }
}
