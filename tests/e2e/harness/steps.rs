use solace_core::FailureKind;

use super::assertions::{Assertion, ErrorMatch};

/// Rewrites the raw user data file
pub struct FileEdit(pub Box<dyn Fn(&str) -> String>);

impl std::fmt::Debug for FileEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FileEdit(<fn>)")
    }
}

/// All possible actions in a test scenario
#[derive(Debug)]
pub enum ScenarioStep {
    // Account actions
    Register {
        name: String,
        email: String,
        secret: String,
        passcode: String,
    },
    Rename {
        email: String,
        name: String,
    },
    ChangeEmail {
        email: String,
        new_email: String,
    },
    ChangeCredentials {
        email: String,
        secret: String,
        passcode: String,
    },
    Delete {
        email: String,
    },

    // Chat actions
    Login {
        email: String,
        secret: String,
        passcode: String,
    },
    Say {
        text: String,
        instructions: Option<String>,
    },
    EndChat,

    // Completion service script
    Reply {
        text: String,
    },
    ReplyEmpty,
    Fail {
        kind: FailureKind,
    },

    // Failure simulation
    Restart,
    WriteUsersFile {
        content: String,
    },
    EditUsersFile {
        edit: FileEdit,
    },

    // The wrapped step must fail with a matching error
    ExpectFailure {
        step: Box<ScenarioStep>,
        error: ErrorMatch,
    },

    // Assertions (can be interspersed)
    Assert {
        assertion: Assertion,
    },
}
