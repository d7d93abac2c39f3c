//! Interactive answers for title conflicts and missing metadata.

use std::cell::RefCell;
use std::io::{self, BufRead, Stderr, StdinLock, Write};

use voltex_core::{MetadataFallback, TitleConflict, TitleResolver};

/// Asks the user on the terminal. Prompts go to `output`, answers come from
/// `input`; an empty answer or end of input declines.
pub struct CliPrompter<R = StdinLock<'static>, W = Stderr> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl CliPrompter {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> CliPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    fn say(&self, text: &str) {
        let mut output = self.output.borrow_mut();
        let _ = write!(output, "{}", text);
        let _ = output.flush();
    }

    /// Next trimmed input line, `None` at end of input
    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match self.input.borrow_mut().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn ask(&self, question: &str) -> Option<String> {
        self.say(question);
        self.read_line().filter(|answer| !answer.is_empty())
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output.into_inner()
    }
}

impl<R: BufRead, W: Write> TitleResolver for CliPrompter<R, W> {
    fn choose_title(&self, conflict: &TitleConflict) -> Option<String> {
        let candidates = conflict.candidate_list();
        let mut listing = format!("\nConflicting titles in {:?}:\n", conflict.dirname);
        for (i, title) in candidates.iter().enumerate() {
            listing.push_str(&format!("  {}: {}\n", i + 1, title));
        }
        self.say(&listing);

        loop {
            let answer = self.ask(&format!(
                "Select the correct title [1-{}] (empty to skip): ",
                candidates.len()
            ))?;
            match answer.parse::<usize>() {
                Ok(choice) if (1..=candidates.len()).contains(&choice) => {
                    return Some(candidates[choice - 1].to_string());
                }
                _ => self.say(&format!("Invalid selection: {}\n", answer)),
            }
        }
    }
}

impl<R: BufRead, W: Write> MetadataFallback for CliPrompter<R, W> {
    fn romanization(&self, title: &str) -> Option<String> {
        self.ask(&format!(
            "Romanization for {} was not found, please specify one (empty to skip): ",
            title
        ))
    }

    fn game(&self, title: &str) -> Option<String> {
        self.ask(&format!(
            "Could not get base game for {}, please specify one (empty to skip): ",
            title
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::io::Cursor;
    use std::path::PathBuf;

    use super::*;

    fn conflict() -> TitleConflict {
        TitleConflict {
            dirname: PathBuf::from("/songs/a"),
            candidates: BTreeSet::from(["Alpha".to_string(), "alpha".to_string()]),
        }
    }

    fn prompter(input: &str) -> CliPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        CliPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_choose_by_number() {
        let p = prompter("2\n");
        assert_eq!(p.choose_title(&conflict()).as_deref(), Some("alpha"));

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("  1: Alpha"));
        assert!(output.contains("[1-2]"));
    }

    #[test]
    fn test_invalid_choice_reprompts() {
        let p = prompter("0\nthree\n1\n");
        assert_eq!(p.choose_title(&conflict()).as_deref(), Some("Alpha"));
        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("Invalid selection").count(), 2);
    }

    #[test]
    fn test_empty_or_eof_declines() {
        assert!(prompter("\n").choose_title(&conflict()).is_none());
        assert!(prompter("").choose_title(&conflict()).is_none());
        assert!(prompter("5\n").choose_title(&conflict()).is_none());
    }

    #[test]
    fn test_metadata_answers() {
        let p = prompter("  Kyokuken \n\n");
        assert_eq!(p.romanization("極圏").as_deref(), Some("Kyokuken"));
        assert!(p.game("極圏").is_none());
        assert!(p.game("極圏").is_none());
    }
}
