use std::cell::RefCell;
use std::rc::Rc;

use pw_io::FileHandle;

use crate::error::{ScriptError, ScriptResult};
use crate::value::Value;

/// A container shared between a Context and any linked environments.
pub type SharedContainer = Rc<RefCell<dyn ScriptContainer>>;

/// Wrap a container for sharing.
pub fn shared(container: impl ScriptContainer + 'static) -> SharedContainer {
    Rc::new(RefCell::new(container))
}

/// A stateful script interpreter.
///
/// Variables bound by [`inject_object`](Self::inject_object) and top-level
/// variables declared by evaluated scripts stay visible to later
/// evaluations in the same container.
pub trait ScriptContainer {
    /// Evaluate script text.
    ///
    /// `None` fails with [`ScriptError::InvalidScript`]. Blank text succeeds
    /// and yields `None`, as does a script whose last expression has no
    /// value.
    fn eval(&mut self, script: Option<&str>) -> ScriptResult<Option<Value>>;

    /// Read a file and evaluate its contents. Read failures propagate as
    /// [`ScriptError::File`].
    fn eval_file(&mut self, file: &FileHandle) -> ScriptResult<Option<Value>> {
        let text = file.read_string()?;
        tracing::debug!(file = %file, "evaluating script file");
        self.eval(Some(&text))
    }

    /// Bind `value` under `name`, replacing any previous binding.
    fn inject_object(&mut self, name: &str, value: Value) -> ScriptResult<()>;

    /// Remove the binding `name`. Removing an unbound name is a no-op.
    fn remove_object(&mut self, name: &str) -> ScriptResult<()>;

    /// Read the binding `name`, or `None` if it is unbound.
    fn access(&self, name: &str) -> ScriptResult<Option<Value>>;
}

const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "call", "case", "catch", "const", "continue", "curry",
    "debug", "default", "do", "else", "eval", "exit", "export", "false", "fn", "for", "Fn",
    "global", "go", "goto", "if", "import", "in", "is_def_fn", "is_def_var", "is_shared", "let",
    "loop", "match", "module", "new", "nil", "null", "package", "print", "private", "protected",
    "public", "return", "shared", "spawn", "static", "super", "switch", "sync", "this",
    "thread", "throw", "true", "try", "type_of", "until", "use", "var", "void", "while", "with",
    "yield",
];

/// Return `true` if `name` can be bound as a script variable.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "_"
        && !RESERVED.contains(&name)
}

/// Fail with [`ScriptError::Binding`] unless `name` is an identifier.
pub(crate) fn check_identifier(name: &str) -> ScriptResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ScriptError::Binding(name.to_string()))
    }
}
