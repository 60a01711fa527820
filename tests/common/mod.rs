//! Scripted in-memory transport for exercising modules and the runner.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use anvil::transport::{CommandOutput, ConnectError, Connector, CopyError, ExecError, Session};

/// Shared record of everything a session was asked to do.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub commands: Vec<String>,
    pub copies: Vec<(String, String)>,
    pub closes: usize,
}

impl SessionLog {
    pub fn command_count_containing(&self, fragment: &str) -> usize {
        self.commands
            .iter()
            .filter(|cmd| cmd.contains(fragment))
            .count()
    }
}

/// A session that replays a fixed script of command responses.
///
/// Each queued expectation is a (fragment, response) pair; the next command
/// must contain the fragment or the test panics. Running out of script also
/// panics, which is what catches modules issuing commands they should not.
pub struct ScriptedSession {
    host: String,
    expectations: VecDeque<(String, CommandOutput)>,
    fail_next_copy: bool,
    log: Arc<Mutex<SessionLog>>,
}

impl ScriptedSession {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            expectations: VecDeque::new(),
            fail_next_copy: false,
            log: Arc::new(Mutex::new(SessionLog::default())),
        }
    }

    /// Queue the response for the next command, which must contain `fragment`.
    pub fn expect(mut self, fragment: &str, output: CommandOutput) -> Self {
        self.expectations
            .push_back((fragment.to_string(), output));
        self
    }

    pub fn fail_next_copy(mut self) -> Self {
        self.fail_next_copy = true;
        self
    }

    pub fn log_handle(&self) -> Arc<Mutex<SessionLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Session for ScriptedSession {
    fn host(&self) -> &str {
        &self.host
    }

    async fn execute(&mut self, command: &str) -> Result<CommandOutput, ExecError> {
        self.log
            .lock()
            .unwrap()
            .commands
            .push(command.to_string());

        let (fragment, output) = self
            .expectations
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected command on {}: {}", self.host, command));

        assert!(
            command.contains(&fragment),
            "expected command containing `{fragment}`, got `{command}`"
        );

        Ok(output)
    }

    async fn copy_file(&mut self, local: &Path, remote: &str) -> Result<(), CopyError> {
        self.log
            .lock()
            .unwrap()
            .copies
            .push((local.display().to_string(), remote.to_string()));

        if self.fail_next_copy {
            self.fail_next_copy = false;
            return Err(CopyError::Failed {
                host: self.host.clone(),
                remote_path: remote.to_string(),
                reason: "scripted copy failure".to_string(),
            });
        }

        Ok(())
    }

    async fn close(&mut self) {
        self.log.lock().unwrap().closes += 1;
    }
}

enum HostScript {
    Session(ScriptedSession),
    Unreachable(String),
}

/// Hands out scripted sessions per host, in queue order.
#[derive(Default)]
pub struct ScriptedConnector {
    scripts: Mutex<HashMap<String, VecDeque<HostScript>>>,
    connect_attempts: Mutex<Vec<String>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(&self, host: &str, session: ScriptedSession) {
        self.scripts
            .lock()
            .unwrap()
            .entry(host.to_string())
            .or_default()
            .push_back(HostScript::Session(session));
    }

    pub fn refuse(&self, host: &str, reason: &str) {
        self.scripts
            .lock()
            .unwrap()
            .entry(host.to_string())
            .or_default()
            .push_back(HostScript::Unreachable(reason.to_string()));
    }

    pub fn connect_attempts(&self) -> Vec<String> {
        self.connect_attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, host: &str) -> Result<Box<dyn Session>, ConnectError> {
        self.connect_attempts
            .lock()
            .unwrap()
            .push(host.to_string());

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(host)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| panic!("unexpected connect to {host}"));

        match script {
            HostScript::Session(session) => Ok(Box::new(session)),
            HostScript::Unreachable(reason) => Err(ConnectError::Unreachable {
                host: host.to_string(),
                reason,
            }),
        }
    }
}

/// Successful command output with the given stdout lines.
pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: stdout.lines().map(|l| l.to_string()).collect(),
        stderr: Vec::new(),
    }
}

/// Failed command output with the given stderr lines.
pub fn fail(stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 1,
        stdout: Vec::new(),
        stderr: stderr.lines().map(|l| l.to_string()).collect(),
    }
}
