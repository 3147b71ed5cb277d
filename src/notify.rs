//! User-facing notifications
//!
//! Blocking message boxes in a GUI host, plain prompts on a terminal. The
//! fill logic only ever calls [`Notifier::notify`]. The prompts pick the page
//! a spreadsheet is populated from ([`Project::select_page`]) and guard files
//! against being overwritten ([`output_path`]).
//!
//! [`Project::select_page`]: crate::project::Project::select_page

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Dialog layer used to talk to the user
pub trait Notifier {
    /// Show a message and wait until it is acknowledged
    fn notify(&mut self, message: &str, title: &str);

    /// Ask a yes/no question. The default answer is "no".
    fn confirm(&mut self, message: &str, title: &str) -> bool;

    /// Ask for a single line of text. `None` means the user cancelled.
    fn input(&mut self, message: &str, title: &str, default: &str) -> Option<String>;

    /// Ask the user to pick one of `items`. `None` means the user cancelled.
    fn choose(&mut self, message: &str, title: &str, items: &[String]) -> Option<String>;
}

/// Terminal notifier: messages to stderr, answers from stdin
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }

    fn prompt(&self, text: &str) -> Option<String> {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "{}", text);
        let _ = stderr.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

fn heading(message: &str, title: &str) -> String {
    if title.is_empty() {
        message.to_string()
    } else {
        format!("{}: {}", title, message)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str, title: &str) {
        eprintln!("{}", heading(message, title));
    }

    fn confirm(&mut self, message: &str, title: &str) -> bool {
        self.prompt(&format!("{} [y/N] ", heading(message, title)))
            .map_or(false, |answer| answer.trim().to_lowercase().starts_with('y'))
    }

    fn input(&mut self, message: &str, title: &str, default: &str) -> Option<String> {
        let answer = self.prompt(&format!("{} [{}] ", heading(message, title), default))?;
        if answer.trim().is_empty() {
            Some(default.to_string())
        } else {
            Some(answer)
        }
    }

    fn choose(&mut self, message: &str, title: &str, items: &[String]) -> Option<String> {
        eprintln!("{}", heading(message, title));
        for (i, item) in items.iter().enumerate() {
            eprintln!("  {}) {}", i + 1, item);
        }
        let answer = self.prompt("> ")?;
        let answer = answer.trim();
        if let Ok(n) = answer.parse::<usize>() {
            return items.get(n.checked_sub(1)?).cloned();
        }
        items.iter().find(|item| item.as_str() == answer).cloned()
    }
}

/// Where to write a file, asking before an existing `path` is overwritten
///
/// Declining the overwrite asks for another name; `None` means the user
/// cancelled.
pub fn output_path(notifier: &mut dyn Notifier, path: &Path) -> Option<PathBuf> {
    if !path.exists() {
        return Some(path.to_path_buf());
    }
    let question = format!("{} already exists. Overwrite?", path.display());
    if notifier.confirm(&question, "Save") {
        return Some(path.to_path_buf());
    }
    let answer = notifier.input("Save as", "Save", &path.to_string_lossy())?;
    let answer = answer.trim();
    if answer.is_empty() {
        None
    } else {
        Some(PathBuf::from(answer))
    }
}

/// A notification that was shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

/// Notifier that records every message and replays scripted answers
///
/// With no scripted answers, prompts behave as if the user cancelled.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub notices: Vec<Notice>,
    answers: VecDeque<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next prompt
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answers.push_back(answer.into());
        self
    }

    /// Messages shown so far, without titles
    pub fn messages(&self) -> Vec<&str> {
        self.notices.iter().map(|n| n.message.as_str()).collect()
    }

    fn record(&mut self, message: &str, title: &str) {
        self.notices.push(Notice {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str, title: &str) {
        self.record(message, title);
    }

    fn confirm(&mut self, message: &str, title: &str) -> bool {
        self.record(message, title);
        self.answers
            .pop_front()
            .map_or(false, |a| a.to_lowercase().starts_with('y'))
    }

    fn input(&mut self, message: &str, title: &str, _default: &str) -> Option<String> {
        self.record(message, title);
        self.answers.pop_front()
    }

    fn choose(&mut self, message: &str, title: &str, items: &[String]) -> Option<String> {
        self.record(message, title);
        let answer = self.answers.pop_front()?;
        items.iter().find(|item| **item == answer).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading() {
        assert_eq!(heading("No page present!!!", ""), "No page present!!!");
        assert_eq!(heading("Saved", "Export"), "Export: Saved");
    }

    #[test]
    fn test_recording_notifier_records() {
        let mut notifier = RecordingNotifier::new();
        notifier.notify("hello", "title");
        assert_eq!(
            notifier.notices,
            vec![Notice {
                title: "title".into(),
                message: "hello".into()
            }]
        );
    }

    #[test]
    fn test_recording_notifier_defaults_to_cancel() {
        let mut notifier = RecordingNotifier::new();
        assert!(!notifier.confirm("Overwrite?", ""));
        assert_eq!(notifier.input("Name", "", "x"), None);
        assert_eq!(notifier.choose("Pick", "", &["a".into()]), None);
        assert_eq!(notifier.messages(), vec!["Overwrite?", "Name", "Pick"]);
    }

    #[test]
    fn test_recording_notifier_scripted_answers() {
        let mut notifier = RecordingNotifier::new()
            .with_answer("Yes")
            .with_answer("Page002")
            .with_answer("b");
        assert!(notifier.confirm("Overwrite?", ""));
        assert_eq!(notifier.input("Name", "", ""), Some("Page002".to_string()));
        assert_eq!(
            notifier.choose("Pick", "", &["a".into(), "b".into()]),
            Some("b".to_string())
        );
    }

    #[test]
    fn test_output_path_for_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titleblock.csv");
        let mut notifier = RecordingNotifier::new();
        assert_eq!(output_path(&mut notifier, &path), Some(path));
        assert!(notifier.notices.is_empty());
    }

    #[test]
    fn test_output_path_overwrite_confirmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titleblock.csv");
        std::fs::write(&path, "").unwrap();
        let mut notifier = RecordingNotifier::new().with_answer("y");
        assert_eq!(output_path(&mut notifier, &path), Some(path));
    }

    #[test]
    fn test_output_path_renamed_or_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titleblock.csv");
        std::fs::write(&path, "").unwrap();

        let mut notifier = RecordingNotifier::new()
            .with_answer("no")
            .with_answer("other.csv");
        assert_eq!(
            output_path(&mut notifier, &path),
            Some(PathBuf::from("other.csv"))
        );
        assert_eq!(notifier.messages().last(), Some(&"Save as"));

        let mut notifier = RecordingNotifier::new().with_answer("no");
        assert_eq!(output_path(&mut notifier, &path), None);
    }
}
