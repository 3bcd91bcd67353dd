//! Recording command runner
//!
//! Lets the update run be driven without spawning git or a package manager:
//! replies are scripted per command line and every call is recorded.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::command::CommandRunner;
use crate::error::CommandError;

enum Reply {
    Stdout(String),
    Fail(String),
}

type Hook = Box<dyn Fn()>;

/// Records every command line and replays scripted replies
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<String>>,
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
    hooks: HashMap<String, Hook>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue stdout for the next call of `command`
    pub fn reply(self, command: &str, stdout: &str) -> Self {
        self.push(command, Reply::Stdout(stdout.to_string()));
        self
    }

    /// Make the next call of `command` exit non-zero with `stderr`
    pub fn fail(self, command: &str, stderr: &str) -> Self {
        self.push(command, Reply::Fail(stderr.to_string()));
        self
    }

    /// Run `hook` whenever `command` is issued, before replying
    pub fn on(mut self, command: &str, hook: impl Fn() + 'static) -> Self {
        self.hooks.insert(command.to_string(), Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn push(&self, command: &str, reply: Reply) {
        self.replies
            .borrow_mut()
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, args: &[&str], ignore_exit_code: bool) -> Result<String, CommandError> {
        let line = args.join(" ");
        self.calls.borrow_mut().push(line.clone());

        if let Some(hook) = self.hooks.get(&line) {
            hook();
        }

        let reply = self
            .replies
            .borrow_mut()
            .get_mut(&line)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Stdout(stdout)) => Ok(stdout),
            Some(Reply::Fail(_)) if ignore_exit_code => Ok(String::new()),
            Some(Reply::Fail(stderr)) => Err(CommandError::failed(line, &stderr, Some(1))),
            None => Ok(String::new()),
        }
    }
}
