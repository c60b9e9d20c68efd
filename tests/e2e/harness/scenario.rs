use super::assertions::{Assertion, ErrorMatch};
use super::runner::ScenarioRunner;
use super::steps::{FileEdit, ScenarioStep};
use solace_core::{FailureKind, RetryPolicy, Speaker};
use std::time::Duration;

/// Fluent DSL for building test scenarios
pub struct Scenario {
    name: String,
    retry: RetryPolicy,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Create a new scenario with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            retry: RetryPolicy::default(),
            steps: Vec::new(),
        }
    }

    // ===== Initial setup =====

    /// Use a custom retry budget and backoff base
    pub fn with_retry(mut self, max_retries: u32, backoff_base: f64) -> Self {
        self.retry = RetryPolicy::new(max_retries, backoff_base).expect("valid retry policy");
        self
    }

    // ===== Account actions =====

    /// Register a user
    pub fn register(mut self, name: &str, email: &str, secret: &str, passcode: &str) -> Self {
        self.steps.push(ScenarioStep::Register {
            name: name.to_string(),
            email: email.to_string(),
            secret: secret.to_string(),
            passcode: passcode.to_string(),
        });
        self
    }

    pub fn rename(mut self, email: &str, name: &str) -> Self {
        self.steps.push(ScenarioStep::Rename {
            email: email.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn change_email(mut self, email: &str, new_email: &str) -> Self {
        self.steps.push(ScenarioStep::ChangeEmail {
            email: email.to_string(),
            new_email: new_email.to_string(),
        });
        self
    }

    pub fn change_credentials(mut self, email: &str, secret: &str, passcode: &str) -> Self {
        self.steps.push(ScenarioStep::ChangeCredentials {
            email: email.to_string(),
            secret: secret.to_string(),
            passcode: passcode.to_string(),
        });
        self
    }

    pub fn delete(mut self, email: &str) -> Self {
        self.steps.push(ScenarioStep::Delete {
            email: email.to_string(),
        });
        self
    }

    // ===== Chat actions =====

    /// Authenticate and begin a chat session
    pub fn login(mut self, email: &str, secret: &str, passcode: &str) -> Self {
        self.steps.push(ScenarioStep::Login {
            email: email.to_string(),
            secret: secret.to_string(),
            passcode: passcode.to_string(),
        });
        self
    }

    /// Send a message in the active session
    pub fn say(mut self, text: &str) -> Self {
        self.steps.push(ScenarioStep::Say {
            text: text.to_string(),
            instructions: None,
        });
        self
    }

    /// Send a message with session-specific instructions
    pub fn say_with_instructions(mut self, text: &str, instructions: &str) -> Self {
        self.steps.push(ScenarioStep::Say {
            text: text.to_string(),
            instructions: Some(instructions.to_string()),
        });
        self
    }

    /// End the active session, saving its transcript
    pub fn end_chat(mut self) -> Self {
        self.steps.push(ScenarioStep::EndChat);
        self
    }

    // ===== Completion service script =====

    /// Queue a reply from the completion service
    pub fn service_replies(mut self, text: &str) -> Self {
        self.steps.push(ScenarioStep::Reply {
            text: text.to_string(),
        });
        self
    }

    /// Queue an answer without text
    pub fn service_replies_empty(mut self) -> Self {
        self.steps.push(ScenarioStep::ReplyEmpty);
        self
    }

    /// Queue a failure from the completion service
    pub fn service_fails(mut self, kind: FailureKind) -> Self {
        self.steps.push(ScenarioStep::Fail { kind });
        self
    }

    /// Queue the same failure `times` times
    pub fn service_fails_times(mut self, kind: FailureKind, times: usize) -> Self {
        for _ in 0..times {
            self.steps.push(ScenarioStep::Fail { kind });
        }
        self
    }

    // ===== Failure simulation =====

    /// Drop in-memory state and reload from disk
    pub fn restart(mut self) -> Self {
        self.steps.push(ScenarioStep::Restart);
        self
    }

    /// Replace the user data file, then restart
    pub fn write_users_file(mut self, content: &str) -> Self {
        self.steps.push(ScenarioStep::WriteUsersFile {
            content: content.to_string(),
        });
        self
    }

    /// Rewrite the user data file, then restart
    pub fn edit_users_file(mut self, edit: impl Fn(&str) -> String + 'static) -> Self {
        self.steps.push(ScenarioStep::EditUsersFile {
            edit: FileEdit(Box::new(edit)),
        });
        self
    }

    /// The previous step must fail with `error`
    pub fn fails_with(mut self, error: ErrorMatch) -> Self {
        let step = self
            .steps
            .pop()
            .expect("fails_with() must follow a step");
        self.steps.push(ScenarioStep::ExpectFailure {
            step: Box::new(step),
            error,
        });
        self
    }

    // ===== Assertions =====

    /// Add a custom assertion
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.steps.push(ScenarioStep::Assert { assertion });
        self
    }

    pub fn assert_user_count(self, count: usize) -> Self {
        self.assert(Assertion::UserCount(count))
    }

    pub fn assert_can_login(self, email: &str, secret: &str, passcode: &str) -> Self {
        self.assert(Assertion::CanLogin {
            email: email.into(),
            secret: secret.into(),
            passcode: passcode.into(),
        })
    }

    pub fn assert_cannot_login(self, email: &str, secret: &str, passcode: &str) -> Self {
        self.assert(Assertion::CannotLogin {
            email: email.into(),
            secret: secret.into(),
            passcode: passcode.into(),
        })
    }

    pub fn assert_transcript_len(self, email: &str, len: usize) -> Self {
        self.assert(Assertion::TranscriptLen {
            email: email.into(),
            len,
        })
    }

    pub fn assert_last_turn(self, email: &str, speaker: Speaker, text: &str) -> Self {
        self.assert(Assertion::TranscriptEndsWith {
            email: email.into(),
            speaker,
            text: text.into(),
        })
    }

    pub fn assert_reply(self, text: &str) -> Self {
        self.assert(Assertion::LastReply(text.into()))
    }

    pub fn assert_requests(self, count: usize) -> Self {
        self.assert(Assertion::RequestCount(count))
    }

    pub fn assert_slept(self, sleeps: Vec<Duration>) -> Self {
        self.assert(Assertion::Slept(sleeps))
    }

    // ===== Execution =====

    /// Run the scenario
    pub fn run(self) -> ScenarioResult {
        let mut runner = match ScenarioRunner::new(self.retry) {
            Ok(r) => r,
            Err(e) => {
                return ScenarioResult {
                    name: self.name.clone(),
                    success: false,
                    steps_executed: 0,
                    failure_step: Some(0),
                    error: Some(format!("Failed to create runner: {}", e)),
                }
            }
        };

        match runner.execute(&self.steps) {
            Ok(()) => ScenarioResult {
                name: self.name,
                success: true,
                steps_executed: self.steps.len(),
                failure_step: None,
                error: None,
            },
            Err(e) => {
                let failure_step = runner.current_step();
                ScenarioResult {
                    name: self.name,
                    success: false,
                    steps_executed: failure_step,
                    failure_step: Some(failure_step),
                    error: Some(format!("{:?}", e)),
                }
            }
        }
    }
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub steps_executed: usize,
    pub failure_step: Option<usize>,
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Unwrap the result, panicking if it failed
    pub fn unwrap(self) {
        if !self.success {
            panic!(
                "Scenario '{}' failed at step {}: {}",
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }

    /// Expect the result to be successful
    pub fn expect(self, msg: &str) {
        if !self.success {
            panic!(
                "{}: Scenario '{}' failed at step {}: {}",
                msg,
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
}
