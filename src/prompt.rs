use std::io::{self, BufRead, IsTerminal, Write};

use camino::Utf8Path;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use miette::IntoDiagnostic;

/// Asks whether an existing output directory may be replaced.
///
/// On a terminal a single `y`/`n` key press answers; piped input is read
/// line by line until it holds `y` or `n`.
pub fn confirm_overwrite(dir: &Utf8Path) -> miette::Result<bool> {
    let mut stderr = io::stderr();
    writeln!(
        stderr,
        "The output directory {dir} already exists. Overwrite? (y/n)"
    )
    .into_diagnostic()?;
    stderr.flush().into_diagnostic()?;

    if io::stdin().is_terminal() {
        confirm_key()
    } else {
        confirm_line(io::stdin().lock(), &mut stderr)
    }
}

fn confirm_key() -> miette::Result<bool> {
    enable_raw_mode().into_diagnostic()?;
    let answer = loop {
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(err) => {
                disable_raw_mode().into_diagnostic()?;
                return Err(err).into_diagnostic();
            }
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => break true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => break false,
            _ => {}
        }
    };
    disable_raw_mode().into_diagnostic()?;
    Ok(answer)
}

/// End of input counts as a refusal.
pub fn confirm_line<R: BufRead, W: Write>(input: R, out: &mut W) -> miette::Result<bool> {
    for line in input.lines() {
        match line.into_diagnostic()?.trim() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => {
                write!(out, "please input y (yes) or n (no)\n> ").into_diagnostic()?;
                out.flush().into_diagnostic()?;
            }
        }
    }
    Ok(false)
}
