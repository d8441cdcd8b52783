//! Line-oriented runner: one input token per line in, one JSON notification
//! per line out.

use serde::Serialize;
use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;
use tabfsm_core::{Machine, Notification};

/// Totals of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub inputs: u64,
    /// Lines dropped because they were not valid UTF-8.
    pub skipped: u64,
    pub notifications: u64,
    pub final_state: String,
}

#[derive(Serialize)]
struct StateLine<'a> {
    input: &'a str,
    state: &'a str,
}

/// Feeds every line of `reader` to the machine and writes the emitted
/// notifications to `writer`.
///
/// Lines are used verbatim apart from a trailing `\r`; an empty line is the
/// empty input token. A line that is not valid UTF-8 is skipped with a
/// warning and the run continues.
pub fn run<R: BufRead, W: Write>(
    machine: &mut Machine,
    mut reader: R,
    mut writer: W,
    echo_state: bool,
) -> std::io::Result<RunSummary> {
    let pending: Rc<RefCell<Vec<Notification>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&pending);
    let listener = machine.on_any(move |n| sink.borrow_mut().push(n.clone()));

    let mut inputs = 0u64;
    let mut skipped = 0u64;
    let mut notifications = 0u64;
    let mut line_no = 0u64;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let input = match std::str::from_utf8(line) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("Skipping line {}: not valid UTF-8 ({})", line_no, e);
                skipped += 1;
                continue;
            }
        };
        inputs += 1;

        let state = machine.transition(input);

        for notification in pending.borrow_mut().drain(..) {
            notifications += 1;
            serde_json::to_writer(&mut writer, &notification)?;
            writer.write_all(b"\n")?;
        }
        if echo_state {
            serde_json::to_writer(&mut writer, &StateLine { input, state })?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    machine.off(listener);

    Ok(RunSummary {
        inputs,
        skipped,
        notifications,
        final_state: machine.state().to_string(),
    })
}
