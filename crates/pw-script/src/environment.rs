use std::collections::BTreeMap;
use std::rc::Rc;

use crate::container::{SharedContainer, check_identifier};
use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

/// A set of named bindings that can be linked into several containers.
///
/// Linking replays every binding into the container; bindings added later
/// are pushed into every linked container. Unlinking removes them again.
#[derive(Default)]
pub struct ScriptEnvironment {
    bindings: BTreeMap<String, Value>,
    on_link: Option<String>,
    linked: Vec<SharedContainer>,
}

impl ScriptEnvironment {
    /// An environment with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with the given bindings.
    pub fn with_bindings(mut self, bindings: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.bindings.extend(bindings);
        self
    }

    /// A script evaluated in each container when it is first linked.
    pub fn with_on_link(mut self, script: impl Into<String>) -> Self {
        self.on_link = Some(script.into());
        self
    }

    /// The current bindings.
    pub fn bindings(&self) -> &BTreeMap<String, Value> {
        &self.bindings
    }

    /// Number of linked containers.
    pub fn linked(&self) -> usize {
        self.linked.len()
    }

    /// Return `true` if `container` is linked.
    pub fn is_linked(&self, container: &SharedContainer) -> bool {
        self.linked.iter().any(|c| Rc::ptr_eq(c, container))
    }

    /// Add or replace one binding and push it into every linked container.
    pub fn add_binding(&mut self, name: &str, value: Value) -> ScriptResult<()> {
        check_identifier(name)?;
        for container in &self.linked {
            container
                .try_borrow_mut()
                .map_err(|_| ScriptError::Busy)?
                .inject_object(name, value.clone())?;
        }
        self.bindings.insert(name.to_string(), value);
        Ok(())
    }

    /// Add or replace several bindings.
    pub fn add_bindings(
        &mut self,
        bindings: impl IntoIterator<Item = (String, Value)>,
    ) -> ScriptResult<()> {
        for (name, value) in bindings {
            self.add_binding(&name, value)?;
        }
        Ok(())
    }

    /// Link a container: inject every binding, then run the on-link script.
    ///
    /// Linking an already-linked container does nothing.
    pub fn link(&mut self, container: &SharedContainer) -> ScriptResult<()> {
        if self.is_linked(container) {
            return Ok(());
        }
        {
            let mut target = container.try_borrow_mut().map_err(|_| ScriptError::Busy)?;
            for (name, value) in &self.bindings {
                target.inject_object(name, value.clone())?;
            }
            if let Some(script) = &self.on_link {
                target.eval(Some(script))?;
            }
        }
        self.linked.push(Rc::clone(container));
        tracing::debug!(bindings = self.bindings.len(), "linked script environment");
        Ok(())
    }

    /// Unlink a container and remove this environment's bindings from it.
    ///
    /// Unlinking a container that is not linked does nothing.
    pub fn unlink(&mut self, container: &SharedContainer) -> ScriptResult<()> {
        let Some(pos) = self.linked.iter().position(|c| Rc::ptr_eq(c, container)) else {
            return Ok(());
        };
        {
            let mut target = container.try_borrow_mut().map_err(|_| ScriptError::Busy)?;
            for name in self.bindings.keys() {
                target.remove_object(name)?;
            }
        }
        self.linked.remove(pos);
        Ok(())
    }
}

impl std::fmt::Debug for ScriptEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEnvironment")
            .field("bindings", &self.bindings)
            .field("on_link", &self.on_link)
            .field("linked", &self.linked.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::{RhaiContainer, ScriptContainer, shared};

    /// Records every call instead of evaluating anything.
    #[derive(Default)]
    struct Recording {
        calls: Vec<String>,
    }

    impl ScriptContainer for Recording {
        fn eval(&mut self, script: Option<&str>) -> ScriptResult<Option<Value>> {
            self.calls.push(format!("eval {}", script.unwrap_or("<none>")));
            Ok(None)
        }

        fn inject_object(&mut self, name: &str, value: Value) -> ScriptResult<()> {
            self.calls.push(format!("inject {name}={value}"));
            Ok(())
        }

        fn remove_object(&mut self, name: &str) -> ScriptResult<()> {
            self.calls.push(format!("remove {name}"));
            Ok(())
        }

        fn access(&self, _name: &str) -> ScriptResult<Option<Value>> {
            Ok(None)
        }
    }

    fn sample() -> Vec<(String, Value)> {
        vec![
            ("one".to_string(), Value::from(1)),
            ("two".to_string(), Value::from("two")),
            ("three".to_string(), Value::from(3.0)),
        ]
    }

    #[test]
    fn new_environment_is_empty() {
        let env = ScriptEnvironment::new();
        assert!(env.bindings().is_empty());
        assert_eq!(env.linked(), 0);
    }

    #[test]
    fn initial_bindings() {
        let env = ScriptEnvironment::new().with_bindings(sample());
        assert_eq!(env.bindings().len(), 3);
        assert_eq!(env.bindings()["two"], Value::from("two"));
    }

    #[test]
    fn link_replays_bindings_then_runs_on_link() {
        let recording = Rc::new(RefCell::new(Recording::default()));
        let container: SharedContainer = recording.clone();
        let mut env = ScriptEnvironment::new()
            .with_bindings(sample())
            .with_on_link("booted = true");

        env.link(&container).unwrap();
        env.link(&container).unwrap();

        assert_eq!(
            recording.borrow().calls,
            vec![
                "inject one=1",
                "inject three=3",
                "inject two=two",
                "eval booted = true",
            ]
        );
        assert_eq!(env.linked(), 1);
    }

    #[test]
    fn add_binding_reaches_every_linked_container() {
        let first = Rc::new(RefCell::new(Recording::default()));
        let second = Rc::new(RefCell::new(Recording::default()));
        let (a, b): (SharedContainer, SharedContainer) = (first.clone(), second.clone());
        let mut env = ScriptEnvironment::new();
        env.link(&a).unwrap();
        env.link(&b).unwrap();

        env.add_binding("speed", Value::from(5)).unwrap();

        assert_eq!(first.borrow().calls, vec!["inject speed=5"]);
        assert_eq!(second.borrow().calls, vec!["inject speed=5"]);
        assert_eq!(env.bindings()["speed"], Value::from(5));
    }

    #[test]
    fn add_bindings_injects_each_one() {
        let recording = Rc::new(RefCell::new(Recording::default()));
        let container: SharedContainer = recording.clone();
        let mut env = ScriptEnvironment::new();
        env.link(&container).unwrap();

        env.add_bindings(vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2.34)),
        ])
        .unwrap();

        assert_eq!(recording.borrow().calls, vec!["inject a=1", "inject b=2.34"]);
    }

    #[test]
    fn unlink_removes_bindings() {
        let recording = Rc::new(RefCell::new(Recording::default()));
        let container: SharedContainer = recording.clone();
        let mut env = ScriptEnvironment::new().with_bindings(vec![("x".to_string(), Value::from(1))]);
        env.link(&container).unwrap();
        env.unlink(&container).unwrap();
        env.unlink(&container).unwrap();

        assert_eq!(recording.borrow().calls, vec!["inject x=1", "remove x"]);
        assert!(!env.is_linked(&container));
    }

    #[test]
    fn invalid_binding_name_is_rejected() {
        let mut env = ScriptEnvironment::new();
        assert!(matches!(
            env.add_binding("test binding", Value::from(5)),
            Err(ScriptError::Binding(_))
        ));
        assert!(env.bindings().is_empty());
    }

    #[test]
    fn bindings_are_visible_to_rhai() {
        let container = shared(RhaiContainer::new());
        let mut env = ScriptEnvironment::new()
            .with_bindings(vec![("base".to_string(), Value::from(40))])
            .with_on_link("let ready = true;");
        env.link(&container).unwrap();
        env.add_binding("bonus", Value::from(2)).unwrap();

        let mut c = container.borrow_mut();
        assert_eq!(c.eval(Some("base + bonus")).unwrap(), Some(Value::from(42)));
        assert_eq!(c.access("ready").unwrap(), Some(Value::from(true)));
    }

    #[test]
    fn busy_container_is_reported() {
        let container = shared(RhaiContainer::new());
        let mut env = ScriptEnvironment::new();
        let _guard = container.borrow_mut();
        assert!(matches!(env.link(&container), Err(ScriptError::Busy)));
    }
}
