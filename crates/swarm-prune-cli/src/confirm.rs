//! Interactive confirmation before destructive commands.

use std::io::{self, BufRead, Write};

pub(crate) const PROMPT: &str = "Are you sure, you want to do this? [y/N]: ";

/// Ask the operator to confirm. `force` skips the prompt entirely.
///
/// `y`/`yes` confirm and `n`/`no`/empty decline, case-insensitively. End of
/// input declines. Anything else asks again.
pub(crate) fn confirm(force: bool, input: &mut impl BufRead, out: &mut impl Write) -> io::Result<bool> {
    if force {
        return Ok(true);
    }

    let mut line = String::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(false);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "" | "n" | "no" => return Ok(false),
            _ => {}
        }
    }
}
