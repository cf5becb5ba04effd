//! Plain-text rendering of entities for the terminal.

use fleet_core::{Entity, View};
use log::warn;
use std::fmt::Arguments;
use std::io::{self, Stderr, Stdout, Write};

/// Writes lists, details and messages to `out` and errors to `err`.
pub struct ConsoleView<O: Write, R: Write> {
    out: O,
    err: R,
}

impl ConsoleView<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, R: Write> ConsoleView<O, R> {
    pub fn new(out: O, err: R) -> Self {
        Self { out, err }
    }

    pub fn into_parts(self) -> (O, R) {
        (self.out, self.err)
    }
}

fn emit(target: &mut impl Write, line: Arguments<'_>) {
    if let Err(err) = target.write_fmt(line).and_then(|()| target.write_all(b"\n")) {
        warn!("event=console_write module=cli status=error error={err}");
    }
}

impl<E, O, R> View<E> for ConsoleView<O, R>
where
    E: Entity,
    O: Write,
    R: Write,
{
    fn show_list(&mut self, entities: &[E]) {
        if entities.is_empty() {
            emit(&mut self.out, format_args!("(no {} records)", E::KIND));
            return;
        }
        for entity in entities {
            emit(&mut self.out, format_args!("{}", entity.summary()));
        }
    }

    fn show_details(&mut self, entity: &E) {
        for (name, value) in entity.details() {
            emit(&mut self.out, format_args!("{name:<18}{value}"));
        }
    }

    fn show_message(&mut self, message: &str) {
        emit(&mut self.out, format_args!("{message}"));
    }

    fn show_error(&mut self, message: &str) {
        emit(&mut self.err, format_args!("error: {message}"));
    }
}
