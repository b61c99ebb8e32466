// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Confirmation prompting.

use inquire::InquireError;

/// Ask user a yes or no question.
pub trait Confirm {
    /// Ask `question`, returning true for yes.
    ///
    /// # Errors
    ///
    /// - Return [`InquireError`] if the question cannot be asked at all.
    fn confirm(&mut self, question: &str) -> Result<bool, InquireError>;
}

/// Prompt on the terminal through [`inquire`].
///
/// Defaults to no. Cancelling or interrupting the prompt also counts as no.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompter;

impl InquirePrompter {
    /// Construct new terminal prompter.
    pub fn new() -> Self {
        Self
    }
}

impl Confirm for InquirePrompter {
    fn confirm(&mut self, question: &str) -> Result<bool, InquireError> {
        match inquire::Confirm::new(question).with_default(false).prompt() {
            Ok(answer) => Ok(answer),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Answer every question the same way without asking anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _question: &str) -> Result<bool, InquireError> {
        Ok(self.0)
    }
}
