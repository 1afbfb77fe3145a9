use std::path::PathBuf;

use colored::Colorize;
use pw_core::Context;
use pw_io::{ResourceManager, ResourceRoot};
use pw_script::{Value, is_identifier};

pub fn run(path: &str, roots: &[PathBuf], set: &[String], archives: bool) -> Result<(), String> {
    let manager = ResourceManager::builder()
        .with_roots(roots.iter().map(ResourceRoot::directory))
        .with_archive_discovery(archives)
        .build();
    tracing::debug!(mounts = ?manager.mount_labels(), "resource roots mounted");

    let file = manager.handle(path).map_err(|e| e.to_string())?;
    if file.is_directory() {
        return Err(format!("{path} is a directory"));
    }

    let context = Context::builder("Eval")
        .with_logger(pw_log::tracing_logger())
        .build();
    for assignment in set {
        let (name, value) = parse_assignment(assignment)?;
        context
            .inject_object(name, value)
            .map_err(|e| format!("--set {assignment}: {e}"))?;
    }

    let result = context
        .eval_file(&file)
        .map_err(|e| format!("{}: {e}", file.path()))?;
    match result {
        Some(value) => println!("{value}"),
        None => println!("{}", "(no value)".dimmed()),
    }
    Ok(())
}

/// Split `NAME=VALUE` and read the value as the narrowest type it parses as.
fn parse_assignment(assignment: &str) -> Result<(&str, Value), String> {
    let (name, raw) = assignment
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{assignment}'"))?;
    let name = name.trim();
    if !is_identifier(name) {
        return Err(format!("'{name}' is not a valid binding name"));
    }
    Ok((name, parse_value(raw)))
}

fn parse_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        Value::from(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::from(f)
    } else if let Ok(b) = raw.parse::<bool>() {
        Value::from(b)
    } else {
        Value::from(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_values_are_typed() {
        assert_eq!(parse_assignment("n=5").unwrap(), ("n", Value::from(5)));
        assert_eq!(parse_assignment("f=2.5").unwrap(), ("f", Value::from(2.5)));
        assert_eq!(parse_assignment("b=true").unwrap(), ("b", Value::from(true)));
        assert_eq!(
            parse_assignment("s=hello world").unwrap(),
            ("s", Value::from("hello world"))
        );
        assert_eq!(parse_assignment("e=").unwrap(), ("e", Value::from("")));
    }

    #[test]
    fn malformed_assignments_are_rejected() {
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("two words=1").is_err());
        assert!(parse_assignment("let=1").is_err());
    }
}
