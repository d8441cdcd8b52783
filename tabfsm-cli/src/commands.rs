//! Command execution.

use crate::Commands;
use colored::Colorize;
use serde_json::Value;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use tabfsm_core::{
    CompileOptions, CompiledTable, Machine, Notification, TableFormat, TransitionTable,
};

/// Notifications captured from a machine, drained after each input.
pub type Captured = Rc<RefCell<Vec<Notification>>>;

/// Executes a one-shot command and returns the formatted output.
pub fn execute(cmd: Commands, options: CompileOptions) -> Result<String, Box<dyn std::error::Error>> {
    match cmd {
        Commands::Repl { .. } => unreachable!(),

        Commands::Check { table } => {
            let compiled = load_table(&table, options)?;
            let rules: usize = compiled.states().iter().map(|s| s.rules().len()).sum();
            let terminal = compiled.states().iter().filter(|s| s.is_terminal()).count();

            Ok(format!(
                "{} {} ({} states, {} rules, {} terminal, initial {}, checksum: {})",
                "OK".green(),
                table.display().to_string().cyan(),
                compiled.states().len(),
                rules,
                terminal,
                compiled.initial_state().cyan(),
                compiled.checksum()
            ))
        }

        Commands::Render { table, json } => {
            let compiled = load_table(&table, options)?;
            if json {
                Ok(format_json(&serde_json::to_value(compiled.describe())?))
            } else {
                Ok(compiled.render().trim_end().to_string())
            }
        }

        Commands::Run {
            table,
            inputs,
            initial,
            json,
        } => {
            let compiled = load_table(&table, options)?;
            let mut machine = new_machine(&compiled, initial);
            let captured = capture(&mut machine);

            let mut lines = Vec::new();
            for input in &inputs {
                let from = machine.state().to_string();
                let to = machine.transition(input).to_string();
                let notifications: Vec<Notification> = captured.borrow_mut().drain(..).collect();

                if json {
                    for n in &notifications {
                        lines.push(serde_json::to_string(n)?);
                    }
                } else {
                    lines.push(format_step(input, &from, &to, &notifications));
                }
            }

            if !json {
                lines.push(format!("{} {}", "state:".bold(), machine.state().cyan()));
            }
            Ok(lines.join("\n"))
        }
    }
}

/// Reads a table file and compiles it. The format follows the extension.
pub fn load_table(
    path: &Path,
    options: CompileOptions,
) -> Result<Arc<CompiledTable>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;
    let table = TransitionTable::parse(&content, TableFormat::from_path(path))?;
    let compiled = CompiledTable::compile(&table, options)?;
    tracing::debug!(
        path = %path.display(),
        states = compiled.states().len(),
        checksum = compiled.checksum(),
        "Loaded table"
    );
    Ok(compiled)
}

/// Creates a machine in `initial`, or the table's first state.
pub fn new_machine(table: &Arc<CompiledTable>, initial: Option<String>) -> Machine {
    match initial {
        Some(state) => {
            if !table.has_state(&state) {
                tracing::warn!(state = %state, "Initial state is not declared in the table");
            }
            table.machine_in(state)
        }
        None => table.machine(),
    }
}

/// Registers a catch-all handler that buffers every notification.
pub fn capture(machine: &mut Machine) -> Captured {
    let captured: Captured = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&captured);
    machine.on_any(move |n| sink.borrow_mut().push(n.clone()));
    captured
}

/// Formats one applied input and the notifications it produced.
pub fn format_step(input: &str, from: &str, to: &str, notifications: &[Notification]) -> String {
    let mut out = if notifications.is_empty() {
        format!(
            "{} {:?} {}",
            from.cyan(),
            input,
            "(ignored)".dimmed()
        )
    } else {
        format!("{} --{:?}--> {}", from.cyan(), input, to.cyan())
    };

    for n in notifications {
        out.push_str(&format!("\n  {}", format_notification(n)));
    }
    out
}

/// Formats a notification as a handler call, e.g. `leavingA("b")`.
pub fn format_notification(n: &Notification) -> String {
    let args: Vec<String> = n.args().iter().map(|a| format!("{:?}", a)).collect();
    format!("{}({})", n.name.yellow(), args.join(", "))
}

pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn table_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const TURNSTILE: &str = r#"{"locked": {"coin": "unlocked", "push": "locked"},
                               "unlocked": {"coin": "unlocked", "push": "locked"}}"#;

    #[test]
    fn test_check() {
        colored::control::set_override(false);
        let file = table_file(".json", TURNSTILE);
        let out = execute(
            Commands::Check {
                table: file.path().to_path_buf(),
            },
            CompileOptions::default(),
        )
        .unwrap();
        assert!(out.starts_with("OK"));
        assert!(out.contains("2 states, 4 rules, 0 terminal, initial locked"));
    }

    #[test]
    fn test_check_rejects_invalid_table() {
        let file = table_file(".json", r#"{"a": {"x": 1}}"#);
        let result = execute(
            Commands::Check {
                table: file.path().to_path_buf(),
            },
            CompileOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = load_table(&PathBuf::from("/nonexistent/table.json"), CompileOptions::default());
        assert!(result.unwrap_err().to_string().contains("failed to read"));
    }

    #[test]
    fn test_render_yaml_table() {
        colored::control::set_override(false);
        let file = table_file(".yml", "locked:\n  coin: unlocked\nunlocked:\n  _: locked\n");
        let out = execute(
            Commands::Render {
                table: file.path().to_path_buf(),
                json: false,
            },
            CompileOptions::default(),
        )
        .unwrap();
        assert!(out.contains("if input == \"coin\" -> \"unlocked\""));
        assert!(out.contains("always -> \"locked\""));

        let out = execute(
            Commands::Render {
                table: file.path().to_path_buf(),
                json: true,
            },
            CompileOptions::default(),
        )
        .unwrap();
        let desc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(desc["initial"], "locked");
        assert_eq!(desc["states"][1]["rules"][0]["kind"], "wildcard");
    }

    #[test]
    fn test_run_json_lines() {
        let file = table_file(".json", TURNSTILE);
        let out = execute(
            Commands::Run {
                table: file.path().to_path_buf(),
                inputs: vec!["coin".into(), "kick".into(), "push".into()],
                initial: None,
                json: true,
            },
            CompileOptions::default(),
        )
        .unwrap();

        let names: Vec<String> = out
            .lines()
            .map(|l| serde_json::from_str::<Value>(l).unwrap()["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "update",
                "leavingLocked",
                "enteringUnlocked",
                "goingFromLockedToUnlocked",
                "update",
                "leavingUnlocked",
                "enteringLocked",
                "goingFromUnlockedToLocked",
            ]
        );
    }

    #[test]
    fn test_run_text_from_initial() {
        colored::control::set_override(false);
        let file = table_file(".json", TURNSTILE);
        let out = execute(
            Commands::Run {
                table: file.path().to_path_buf(),
                inputs: vec!["coin".into(), "kick".into()],
                initial: Some("unlocked".into()),
                json: false,
            },
            CompileOptions::default(),
        )
        .unwrap();

        assert!(out.contains("unlocked --\"coin\"--> unlocked"));
        assert!(out.contains("  stayingInUnlocked()"));
        assert!(out.contains("unlocked \"kick\" (ignored)"));
        assert!(out.ends_with("state: unlocked"));
    }

    #[test]
    fn test_format_notification() {
        colored::control::set_override(false);
        let table = CompiledTable::from_json(
            &serde_json::json!({"a": {"go": "b"}, "b": {}}),
            CompileOptions::default(),
        )
        .unwrap();
        let rule = &table.states()[0].rules()[0];
        let formatted: Vec<String> = rule.notifications().iter().map(format_notification).collect();
        assert_eq!(
            formatted,
            vec![
                "update(\"a\", \"b\")",
                "leavingA(\"b\")",
                "enteringB(\"a\")",
                "goingFromAToB(\"a\", \"b\")",
            ]
        );
    }
}
