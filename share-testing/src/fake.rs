// SPDX-License-Identifier: GPL-3.0-only

use std::sync::Mutex;

use async_trait::async_trait;

use share_contracts::{CommandOutput, RemoteCommand, RemoteExecutor, Result, ShareError};
use share_types::RemoteHost;

enum Scripted {
    Stdout(String),
    Fail(String),
}

type Responder = Box<dyn Fn(&RemoteCommand) -> Option<Scripted> + Send + Sync>;

/// Scripted stand-in for the remote transport.
///
/// Responders are consulted in registration order; the first match wins and
/// unmatched commands succeed with empty output. Every issued command is
/// recorded so tests can assert exact sequences.
#[derive(Default)]
pub struct FakeRemoteExecutor {
    responders: Vec<Responder>,
    issued: Mutex<Vec<RemoteCommand>>,
}

impl FakeRemoteExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script stdout for commands the closure matches.
    pub fn respond<F>(mut self, responder: F) -> Self
    where
        F: Fn(&RemoteCommand) -> Option<String> + Send + Sync + 'static,
    {
        self.responders
            .push(Box::new(move |command| responder(command).map(Scripted::Stdout)));
        self
    }

    /// Script a transport failure for commands the predicate matches.
    ///
    /// Commands that tolerate failure observe empty output instead, per the
    /// executor contract.
    pub fn fail_when<F>(mut self, predicate: F, detail: &str) -> Self
    where
        F: Fn(&RemoteCommand) -> bool + Send + Sync + 'static,
    {
        let detail = detail.to_string();
        self.responders.push(Box::new(move |command| {
            predicate(command).then(|| Scripted::Fail(detail.clone()))
        }));
        self
    }

    /// Every command issued so far, in order.
    pub fn issued(&self) -> Vec<RemoteCommand> {
        self.issued.lock().expect("issued lock").clone()
    }
}

#[async_trait]
impl RemoteExecutor for FakeRemoteExecutor {
    async fn execute(&self, host: &RemoteHost, command: &RemoteCommand) -> Result<CommandOutput> {
        self.issued
            .lock()
            .expect("issued lock")
            .push(command.clone());

        for responder in &self.responders {
            match responder(command) {
                Some(Scripted::Stdout(stdout)) => return Ok(CommandOutput::new(stdout, "")),
                Some(Scripted::Fail(detail)) => {
                    if command.tolerates_failure() {
                        return Ok(CommandOutput::empty());
                    }
                    return Err(ShareError::transport(&host.instance_id, detail));
                }
                None => continue,
            }
        }

        Ok(CommandOutput::empty())
    }
}
