// SPDX-License-Identifier: Apache-2.0

use std::io::{self, BufRead, Write};

use pulse_query::{run_view, QueryError, Selection, View};
use rusqlite::Connection;

use crate::render::render_view;

const PROMPT: &str = "pulse> ";
const HELP: &str = "\
commands:
  views                 list views
  view <name>           switch view
  year <yyyy>           select year
  quarter <1-4>         select quarter
  range <from> <to>     select year range for trends
  state <name>          select state for market expansion
  show                  re-render the current view
  help                  this text
  quit                  leave";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Line-driven dashboard: every command that changes the view or the
/// selection re-runs the current view against the store.
pub struct Session<'c> {
    conn: &'c Connection,
    view: View,
    selection: Selection,
}

impl<'c> Session<'c> {
    #[must_use]
    pub fn new(conn: &'c Connection, selection: Selection) -> Self {
        Self {
            conn,
            view: View::Home,
            selection,
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        self.show(out)?;
        write!(out, "{PROMPT}")?;
        out.flush()?;
        for line in input.lines() {
            let line = line?;
            if self.handle(line.trim(), out)? == Flow::Quit {
                return Ok(());
            }
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
        writeln!(out)
    }

    fn show<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let result = run_view(self.conn, self.view, &self.selection);
        render_view(out, &result)?;
        writeln!(out)
    }

    fn apply<W: Write>(
        &mut self,
        out: &mut W,
        change: Result<Selection, QueryError>,
    ) -> io::Result<Flow> {
        match change {
            Ok(selection) => {
                self.selection = selection;
                self.show(out)?;
            }
            Err(err) => writeln!(out, "error: {}", err.message)?,
        }
        Ok(Flow::Continue)
    }

    fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let (cmd, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(c, r)| (c, r.trim()));
        let args: Vec<&str> = rest.split_whitespace().collect();
        let sel = self.selection.clone();
        match (cmd, args.as_slice()) {
            ("", _) => Ok(Flow::Continue),
            ("quit" | "exit", _) => Ok(Flow::Quit),
            ("help", _) => {
                writeln!(out, "{HELP}")?;
                Ok(Flow::Continue)
            }
            ("views", _) => {
                for view in View::ALL {
                    let marker = if view == self.view { "*" } else { " " };
                    writeln!(out, "{marker} {:<22} {}", view.slug(), view.title())?;
                }
                Ok(Flow::Continue)
            }
            ("show", _) => {
                self.show(out)?;
                Ok(Flow::Continue)
            }
            ("view", _) if !rest.is_empty() => match rest.parse::<View>() {
                Ok(view) => {
                    self.view = view;
                    self.show(out)?;
                    Ok(Flow::Continue)
                }
                Err(err) => {
                    writeln!(out, "error: {}", err.message)?;
                    Ok(Flow::Continue)
                }
            },
            ("year", [year]) => self.apply(out, sel.with_year(year)),
            ("quarter", [quarter]) => self.apply(out, sel.with_quarter(quarter)),
            ("range", [from, to]) => self.apply(out, sel.with_range(from, to)),
            ("state", _) if !rest.is_empty() => self.apply(out, sel.with_state(rest)),
            _ => {
                writeln!(out, "unrecognised command `{line}`; type `help`")?;
                Ok(Flow::Continue)
            }
        }
    }
}
