//! Interactive confirmation for fuzzy matches.
//!
//! The engine never talks to a terminal directly; every question goes
//! through a `Confirmer`. The terminal implementation prompts on stderr so
//! that report output on stdout stays clean for redirection.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Reply to one confirmation prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    /// Accept the offered candidate.
    Yes,
    /// Decline it.
    No,
    /// Decline it, but point at a local path instead.
    Path(PathBuf),
    /// Stop the whole run.
    Exit,
}

/// A blocking question with a yes/no/path/exit reply.
pub trait Confirmer {
    fn confirm(&mut self, prompt: &str) -> Answer;
}

/// Prompts on stderr, reads replies from stdin.
///
/// EOF and read errors count as `Exit`: with stdin gone there is no way to
/// answer anything else this run.
#[derive(Debug, Default)]
pub struct TerminalConfirmer;

impl TerminalConfirmer {
    pub fn new() -> Self {
        TerminalConfirmer
    }

    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line),
        }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, prompt: &str) -> Answer {
        loop {
            eprint!("{} [y]es / [n]o / [p]ath / e[x]it: ", prompt);
            let _ = io::stderr().flush();

            let line = match self.read_line() {
                Some(line) => line,
                None => return Answer::Exit,
            };

            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Answer::Yes,
                "n" | "no" => return Answer::No,
                "x" | "exit" => return Answer::Exit,
                "p" | "path" => {
                    eprint!("path: ");
                    let _ = io::stderr().flush();
                    let reply = match self.read_line() {
                        Some(reply) => reply,
                        None => return Answer::Exit,
                    };
                    let trimmed = reply.trim();
                    if trimmed.is_empty() {
                        return Answer::No;
                    }
                    return Answer::Path(PathBuf::from(trimmed));
                }
                _ => {}
            }
        }
    }
}

/// Declines every prompt. Used for unattended runs, where a guess that
/// needs a human stays unmatched instead of blocking.
#[derive(Debug, Default)]
pub struct DeclineAll;

impl Confirmer for DeclineAll {
    fn confirm(&mut self, _prompt: &str) -> Answer {
        Answer::No
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decline_all_always_says_no() {
        let mut confirmer = DeclineAll;
        assert_eq!(confirmer.confirm("Correct artist for X: Y?"), Answer::No);
        assert_eq!(confirmer.confirm("Confirm the track: /a/b.mp3?"), Answer::No);
    }
}
