//! Interactive parameter prompts over the REPL's line editor

use colored::Colorize;
use cloudq_core::Prompter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::warn;

/// Asks questions on the terminal. Ctrl-C or Ctrl-D means no answer.
pub struct LinePrompter<'a> {
    editor: &'a mut DefaultEditor,
}

impl<'a> LinePrompter<'a> {
    pub fn new(editor: &'a mut DefaultEditor) -> Self {
        Self { editor }
    }
}

impl Prompter for LinePrompter<'_> {
    fn ask(&mut self, question: &str) -> Option<String> {
        match self.editor.readline(&format!("{} ", question.yellow())) {
            Ok(line) => Some(line),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
            Err(e) => {
                warn!("Failed to read answer: {}", e);
                None
            }
        }
    }

    fn tell(&mut self, message: &str) {
        println!("{}", message.dimmed());
    }
}
