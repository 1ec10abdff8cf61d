//! Terminal answer source: prompts on stdout, answers from stdin.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;
use powerplan::{AnswerSource, PowerError, Prompt, SweepResult};

/// Reads one line per prompt from a buffered reader.
pub struct ConsoleAnswers<R> {
    reader: R,
    verbose: bool,
}

impl ConsoleAnswers<io::StdinLock<'static>> {
    pub fn stdin(verbose: bool) -> Self {
        Self::new(io::stdin().lock(), verbose)
    }
}

impl<R: BufRead> ConsoleAnswers<R> {
    pub fn new(reader: R, verbose: bool) -> Self {
        Self { reader, verbose }
    }
}

impl<R: BufRead> AnswerSource for ConsoleAnswers<R> {
    fn answer(&mut self, prompt: &Prompt) -> powerplan::Result<Option<String>> {
        print!("{}", prompt.question.cyan());
        if let Some(hint) = &prompt.hint {
            print!(" {}", format!("({})", hint).dimmed());
        }
        if let Some(default) = prompt.default {
            print!(" {}", format!("[{}]", default).dimmed());
        }
        print!(": ");
        io::stdout().flush().map_err(stdio_error)?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).map_err(stdio_error)?;
        if read == 0 {
            // Keep the next message off the prompt line.
            println!();
            return Ok(None);
        }

        Ok(Some(line.trim().to_string()))
    }

    fn present_sweep(&mut self, sweep: &SweepResult) {
        println!();
        println!(
            "{} {} ({} points)",
            "Sweep complete:".green().bold(),
            sweep.leaf.title(),
            sweep.series.len()
        );
        for path in sweep.artifacts.paths() {
            println!("  wrote {}", path.display().to_string().white());
        }

        if self.verbose || sweep.artifacts.graph.is_none() {
            println!(
                "  {:>14}  {}",
                sweep.axis.label().yellow(),
                sweep.axis.value_label().yellow()
            );
            for point in &sweep.series {
                println!("  {:>14.3}  {:.2}", point.axis_value, point.value);
            }
        }

        println!();
        println!("Inspect the curve and choose the value where it flattens.");
    }
}

fn stdio_error(source: io::Error) -> PowerError {
    PowerError::Io {
        path: PathBuf::from("<stdio>"),
        source,
    }
}
