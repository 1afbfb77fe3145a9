use std::fmt;

use rhai::{Dynamic, Engine, Scope};

use crate::config::ScriptConfig;
use crate::container::{ScriptContainer, check_identifier};
use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

/// A [`ScriptContainer`] backed by a Rhai engine and a persistent scope.
///
/// `print` and `debug` calls in scripts go to `tracing` under the
/// `pathway::script` target.
pub struct RhaiContainer {
    engine: Engine,
    scope: Scope<'static>,
}

impl RhaiContainer {
    /// A container with default limits.
    pub fn new() -> Self {
        Self::with_config(&ScriptConfig::default())
    }

    /// A container with the given limits.
    pub fn with_config(config: &ScriptConfig) -> Self {
        let mut engine = Engine::new();
        config.apply(&mut engine);
        engine.on_print(|text| tracing::info!(target: "pathway::script", "{text}"));
        engine.on_debug(|text, source, pos| {
            tracing::debug!(target: "pathway::script", source = source.unwrap_or(""), %pos, "{text}");
        });
        Self {
            engine,
            scope: Scope::new(),
        }
    }

    /// The engine, for registering native functions and types.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    /// Bind a raw interpreter value, such as a registered custom type.
    pub fn inject_dynamic(&mut self, name: &str, value: Dynamic) -> ScriptResult<()> {
        check_identifier(name)?;
        self.unbind(name);
        self.scope.push_dynamic(name.to_string(), value);
        Ok(())
    }

    /// Number of variables currently in scope.
    pub fn bound(&self) -> usize {
        self.scope.len()
    }

    fn unbind(&mut self, name: &str) {
        if !self.scope.contains(name) {
            return;
        }
        let mut rebuilt = Scope::new();
        for (var, is_constant, value) in self.scope.iter() {
            if var == name {
                continue;
            }
            if is_constant {
                rebuilt.push_constant_dynamic(var.to_string(), value);
            } else {
                rebuilt.push_dynamic(var.to_string(), value);
            }
        }
        self.scope = rebuilt;
    }
}

impl Default for RhaiContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RhaiContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RhaiContainer")
            .field("bound", &self.scope.len())
            .finish_non_exhaustive()
    }
}

impl ScriptContainer for RhaiContainer {
    fn eval(&mut self, script: Option<&str>) -> ScriptResult<Option<Value>> {
        let script = script.ok_or(ScriptError::InvalidScript)?;
        if script.trim().is_empty() {
            return Ok(None);
        }
        let result = self
            .engine
            .eval_with_scope::<Dynamic>(&mut self.scope, script)?;
        Ok(Value::from_dynamic(result))
    }

    fn inject_object(&mut self, name: &str, value: Value) -> ScriptResult<()> {
        self.inject_dynamic(name, value.into())
    }

    fn remove_object(&mut self, name: &str) -> ScriptResult<()> {
        check_identifier(name)?;
        self.unbind(name);
        Ok(())
    }

    fn access(&self, name: &str) -> ScriptResult<Option<Value>> {
        check_identifier(name)?;
        Ok(self
            .scope
            .get_value::<Dynamic>(name)
            .and_then(Value::from_dynamic))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pw_io::{ResourceManager, ResourceRoot};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn eval_arithmetic() {
        let mut container = RhaiContainer::new();
        assert_eq!(container.eval(Some("40 + 2")).unwrap(), Some(Value::from(42)));
    }

    #[test]
    fn absent_script_is_invalid() {
        let mut container = RhaiContainer::new();
        assert!(matches!(container.eval(None), Err(ScriptError::InvalidScript)));
    }

    #[test]
    fn blank_script_yields_nothing() {
        let mut container = RhaiContainer::new();
        assert_eq!(container.eval(Some("")).unwrap(), None);
        assert_eq!(container.eval(Some("  \n")).unwrap(), None);
    }

    #[test]
    fn statements_yield_nothing() {
        let mut container = RhaiContainer::new();
        assert_eq!(container.eval(Some("let x = 1;")).unwrap(), None);
    }

    #[test]
    fn declared_variables_persist() {
        let mut container = RhaiContainer::new();
        container.eval(Some("let counter = 10;")).unwrap();
        container.eval(Some("counter += 5;")).unwrap();
        assert_eq!(container.access("counter").unwrap(), Some(Value::from(15)));
    }

    #[test]
    fn syntax_errors_are_eval_errors() {
        let mut container = RhaiContainer::new();
        assert!(matches!(
            container.eval(Some("let = ;")),
            Err(ScriptError::Eval(_))
        ));
    }

    #[test]
    fn inject_access_remove() {
        let mut container = RhaiContainer::new();
        container.inject_object("speed", Value::from(3)).unwrap();
        assert_eq!(container.eval(Some("speed * 2")).unwrap(), Some(Value::from(6)));

        container.inject_object("speed", Value::from(4)).unwrap();
        assert_eq!(container.bound(), 1);
        assert_eq!(container.access("speed").unwrap(), Some(Value::from(4)));

        container.remove_object("speed").unwrap();
        assert_eq!(container.access("speed").unwrap(), None);
        assert!(container.eval(Some("speed")).is_err());
        container.remove_object("speed").unwrap();
    }

    #[test]
    fn injected_lists_are_script_arrays() {
        let mut container = RhaiContainer::new();
        let xs = Value::List(vec![Value::from(1), Value::from(2)]);
        container.inject_object("xs", xs.clone()).unwrap();
        assert_eq!(container.eval(Some("xs[0] + 1")).unwrap(), Some(Value::from(2)));
        assert_eq!(container.eval(Some("xs.len()")).unwrap(), Some(Value::from(2)));
        assert_eq!(container.access("xs").unwrap(), Some(xs));
    }

    #[test]
    fn removal_keeps_other_bindings() {
        let mut container = RhaiContainer::new();
        container.inject_object("a", Value::from(1)).unwrap();
        container.inject_object("b", Value::from(2)).unwrap();
        container.eval(Some("const C = 3;")).unwrap();
        container.remove_object("a").unwrap();
        assert_eq!(container.eval(Some("b + C")).unwrap(), Some(Value::from(5)));
    }

    #[test]
    fn bad_names_are_rejected() {
        let mut container = RhaiContainer::new();
        assert!(matches!(
            container.inject_object("test binding", Value::from(5)),
            Err(ScriptError::Binding(_))
        ));
        assert!(matches!(container.access("let"), Err(ScriptError::Binding(_))));
    }

    #[test]
    fn operation_limit_stops_runaway_scripts() {
        let mut container =
            RhaiContainer::with_config(&ScriptConfig::default().with_max_operations(1_000));
        assert!(matches!(
            container.eval(Some("loop { }")),
            Err(ScriptError::Eval(_))
        ));
    }

    #[test]
    fn eval_file_reads_through_the_handle() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("answer.rhai"), "let answer = 6 * 7; answer").unwrap();
        let manager = ResourceManager::builder()
            .with_root(ResourceRoot::directory(dir.path()))
            .build();

        let mut container = RhaiContainer::new();
        let file = manager.handle("/answer.rhai").unwrap();
        assert_eq!(container.eval_file(&file).unwrap(), Some(Value::from(42)));
        assert_eq!(container.access("answer").unwrap(), Some(Value::from(42)));
    }

    #[test]
    fn eval_file_on_directory_is_a_file_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("scripts")).unwrap();
        let manager = ResourceManager::builder()
            .with_root(ResourceRoot::directory(dir.path()))
            .build();

        let mut container = RhaiContainer::new();
        let file = manager.handle("/scripts").unwrap();
        assert!(matches!(container.eval_file(&file), Err(ScriptError::File(_))));
    }
}
