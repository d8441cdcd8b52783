//! Interactive REPL mode.

use crate::commands::{capture, format_step, new_machine, Captured};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::sync::Arc;
use tabfsm_core::{CompiledTable, Machine};

const HELP: &str = r#"
Any line that does not start with ':' is fed to the machine as an input
token, exactly as typed.

Commands:
  :state        Show the current state
  :reset        Return to the initial state
  :render       Print the compiled dispatch logic
  :names        List every notification name the table can emit
  :help         Show this help
  :quit         Exit the REPL
"#;

/// What the session should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Print(String),
    Quit,
}

struct Session {
    table: Arc<CompiledTable>,
    initial: Option<String>,
    machine: Machine,
    captured: Captured,
}

impl Session {
    fn new(table: Arc<CompiledTable>, initial: Option<String>) -> Self {
        let mut machine = new_machine(&table, initial.clone());
        let captured = capture(&mut machine);
        Self {
            table,
            initial,
            machine,
            captured,
        }
    }

    fn handle(&mut self, line: &str) -> Outcome {
        let Some(cmd) = line.strip_prefix(':') else {
            return Outcome::Print(self.feed(line));
        };

        match cmd.trim() {
            "q" | "quit" | "exit" => Outcome::Quit,
            "h" | "help" => Outcome::Print(HELP.trim().to_string()),
            "state" => Outcome::Print(self.describe_state()),
            "reset" => {
                *self = Session::new(Arc::clone(&self.table), self.initial.take());
                Outcome::Print(format!("{} {}", "Reset to".green(), self.machine.state().cyan()))
            }
            "render" => Outcome::Print(self.table.render().trim_end().to_string()),
            "names" => Outcome::Print(
                self.table
                    .notification_names()
                    .into_iter()
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            other => Outcome::Print(format!(
                "Unknown command: :{}. Type ':help' for help.",
                other
            )),
        }
    }

    fn feed(&mut self, input: &str) -> String {
        let from = self.machine.state().to_string();
        let to = self.machine.transition(input).to_string();
        let notifications: Vec<_> = self.captured.borrow_mut().drain(..).collect();
        format_step(input, &from, &to, &notifications)
    }

    fn describe_state(&self) -> String {
        let state = self.machine.state();
        let tag = if !self.table.has_state(state) {
            " (undeclared)".yellow().to_string()
        } else if self.machine.is_terminal() {
            " (terminal)".dimmed().to_string()
        } else {
            String::new()
        };
        format!("{}{}", state.cyan(), tag)
    }
}

pub fn run(
    table: Arc<CompiledTable>,
    initial: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "tabfsm REPL".bold().cyan());
    println!(
        "{} states, checksum {}",
        table.states().len(),
        table.checksum()
    );

    let mut session = Session::new(table, initial);
    println!("Starting in {}", session.machine.state().cyan());

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    let history_path = std::env::var("HOME")
        .map(|h| std::path::PathBuf::from(h).join(".tabfsm_history"))
        .unwrap_or_else(|_| ".tabfsm_history".into());
    let _ = rl.load_history(&history_path);

    println!("Type ':help' for available commands.\n");

    loop {
        let prompt = format!("{} ", format!("{}>", session.machine.state()).cyan());
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.is_empty() {
                    continue;
                }
                match session.handle(&line) {
                    Outcome::Print(output) => println!("{}\n", output),
                    Outcome::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    let _ = rl.save_history(&history_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tabfsm_core::CompileOptions;

    fn session(initial: Option<&str>) -> Session {
        colored::control::set_override(false);
        let table = CompiledTable::from_json(
            &json!({
                "locked": {"coin": "unlocked", "push": "locked"},
                "unlocked": {"coin": "unlocked", "push": "locked", "jam": "broken"},
                "broken": {}
            }),
            CompileOptions::default(),
        )
        .unwrap();
        Session::new(table, initial.map(str::to_string))
    }

    fn printed(outcome: Outcome) -> String {
        match outcome {
            Outcome::Print(s) => s,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_input_lines_drive_the_machine() {
        let mut s = session(None);
        let out = printed(s.handle("coin"));
        assert!(out.contains("locked --\"coin\"--> unlocked"));
        assert!(out.contains("enteringUnlocked(\"locked\")"));
        assert_eq!(s.machine.state(), "unlocked");
    }

    #[test]
    fn test_inputs_are_verbatim() {
        let mut s = session(None);
        let out = printed(s.handle(" coin"));
        assert!(out.contains("(ignored)"));
        assert_eq!(s.machine.state(), "locked");
    }

    #[test]
    fn test_state_and_reset() {
        let mut s = session(Some("unlocked"));
        assert_eq!(printed(s.handle(":state")), "unlocked");

        s.handle("jam");
        assert_eq!(printed(s.handle(":state")), "broken (terminal)");

        printed(s.handle(":reset"));
        assert_eq!(s.machine.state(), "unlocked");

        // The capture handler survives a reset.
        let out = printed(s.handle("push"));
        assert!(out.contains("leavingUnlocked(\"locked\")"));
    }

    #[test]
    fn test_undeclared_state() {
        let mut s = session(Some("nowhere"));
        assert_eq!(printed(s.handle(":state")), "nowhere (undeclared)");
        assert!(printed(s.handle("coin")).contains("(ignored)"));
    }

    #[test]
    fn test_meta_commands() {
        let mut s = session(None);
        assert!(printed(s.handle(":render")).contains("state \"broken\":"));
        assert!(printed(s.handle(":names")).contains("goingFromUnlockedToBroken"));
        assert!(printed(s.handle(":help")).contains(":reset"));
        assert!(printed(s.handle(":bogus")).starts_with("Unknown command"));
        assert_eq!(s.handle(":quit"), Outcome::Quit);
    }
}
