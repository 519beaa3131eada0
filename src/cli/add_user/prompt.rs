//! Interactive questions for values missing from the command line

use dialoguer::{Input, Password};

/// Source of answers for missing `add-user` values
pub trait Prompter {
    /// Ask a question with a visible answer
    fn ask(&self, question: &str) -> anyhow::Result<String>;

    /// Ask a question without echoing the answer
    fn ask_hidden(&self, question: &str) -> anyhow::Result<String>;
}

/// Terminal prompter backed by dialoguer
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn ask(&self, question: &str) -> anyhow::Result<String> {
        let answer = Input::<String>::new()
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()?;

        Ok(answer)
    }

    fn ask_hidden(&self, question: &str) -> anyhow::Result<String> {
        let answer = Password::new()
            .with_prompt(question)
            .allow_empty_password(true)
            .interact()?;

        Ok(answer)
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::Prompter;

    /// Prompter replaying canned answers and recording the questions asked
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: RefCell<VecDeque<String>>,
        pub asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
                asked: RefCell::default(),
            }
        }

        fn next(&self, question: &str) -> anyhow::Result<String> {
            self.asked.borrow_mut().push(question.to_string());
            self.answers
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted answer for '{}'", question))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&self, question: &str) -> anyhow::Result<String> {
            self.next(question)
        }

        fn ask_hidden(&self, question: &str) -> anyhow::Result<String> {
            self.next(question)
        }
    }
}
