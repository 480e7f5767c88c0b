//! Lifecycle record for one observed process
//!
//! Created by the process enumerator when a process first appears and
//! discarded by it, usually after the record reaches `Exited`. Mutation goes
//! through `&mut self`, so each record has a single writer at a time.

use std::path::{Path, PathBuf};
use std::time::Instant;

use super::path::{PathResolver, ProcessIdentity};
use super::state::ProcessHandlingState;
use super::timer::RecordTimer;
use crate::error::GovernorResult;

#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pid: i32,
    name: String,
    path: Option<PathBuf>,
    state: ProcessHandlingState,
    modified_at: Option<Instant>,
    handled: bool,
    exited: bool,
    /// Waiting for a power plan condition before acting
    power_wait: bool,
    /// Waiting for the process to leave the foreground
    active_wait: bool,
    timer: RecordTimer,
}

impl ProcessRecord {
    pub fn new(pid: i32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            path: None,
            state: ProcessHandlingState::Invalid,
            modified_at: None,
            handled: false,
            exited: false,
            power_wait: false,
            active_wait: false,
            timer: RecordTimer::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` means the path is unknown and path-based rules do not apply
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> ProcessHandlingState {
        self.state
    }

    pub fn modified_at(&self) -> Option<Instant> {
        self.modified_at
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn is_power_wait(&self) -> bool {
        self.power_wait
    }

    pub fn is_active_wait(&self) -> bool {
        self.active_wait
    }

    pub fn set_power_wait(&mut self, waiting: bool) {
        self.power_wait = waiting;
    }

    pub fn set_active_wait(&mut self, waiting: bool) {
        self.active_wait = waiting;
    }

    pub fn timer(&self) -> &RecordTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut RecordTimer {
        &mut self.timer
    }

    /// Identity used for path resolution and cache validation
    pub fn identity(&self) -> ProcessIdentity {
        ProcessIdentity::new(self.pid, self.name.clone())
    }

    pub fn set_state(&mut self, state: ProcessHandlingState) {
        self.set_state_at(state, Instant::now());
    }

    /// Transition to `state`, applying its side effects
    ///
    /// `Exited` marks the record exited, `Modified` stamps `modified_at`, and
    /// every other state marks it handled and stops the timer.
    pub fn set_state_at(&mut self, state: ProcessHandlingState, now: Instant) {
        log::trace!("{} ({}): {} -> {}", self.name, self.pid, self.state, state);
        self.state = state;

        match state {
            ProcessHandlingState::Exited => self.exited = true,
            ProcessHandlingState::Modified => self.modified_at = Some(now),
            _ => {
                self.handled = true;
                self.timer.stop();
            }
        }
    }

    /// Fill `path` through the resolver unless it is already known
    ///
    /// Unresolvable paths leave the record with an unknown path; only fatal
    /// errors are returned.
    pub fn resolve_path(&mut self, resolver: &PathResolver) -> GovernorResult<Option<&Path>> {
        if self.path.is_none() {
            self.path = resolver.resolve(&self.identity())?;
        }
        Ok(self.path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_record_is_invalid_and_unhandled() {
        let record = ProcessRecord::new(100, "notepad.exe");
        assert_eq!(record.state(), ProcessHandlingState::Invalid);
        assert!(!record.is_handled());
        assert!(!record.has_exited());
        assert!(record.path().is_none());
    }

    #[test]
    fn test_finished_marks_handled_and_stops_timer() {
        let mut record = ProcessRecord::new(100, "game.exe");
        record.timer_mut().start(Duration::from_secs(30));

        record.set_state(ProcessHandlingState::Finished);
        assert!(record.is_handled());
        assert!(!record.timer().is_running());
        assert!(!record.has_exited());
    }

    #[test]
    fn test_modified_stamps_time_without_handling() {
        let mut record = ProcessRecord::new(7, "encoder");
        record.timer_mut().start(Duration::from_secs(30));
        let now = Instant::now();

        record.set_state_at(ProcessHandlingState::Modified, now);
        assert_eq!(record.modified_at(), Some(now));
        assert!(!record.is_handled());
        assert!(record.timer().is_running());
    }

    #[test]
    fn test_exited_is_sticky() {
        let mut record = ProcessRecord::new(7, "encoder");
        record.set_state(ProcessHandlingState::Exited);
        assert!(record.has_exited());
        assert!(!record.is_handled());

        // No guards: later transitions are accepted, the exit flag remains.
        record.set_state(ProcessHandlingState::Unmodified);
        assert!(record.has_exited());
        assert!(record.is_handled());
    }

    #[test]
    fn test_settling_states() {
        for state in [
            ProcessHandlingState::Invalid,
            ProcessHandlingState::Unmodified,
            ProcessHandlingState::AccessDenied,
            ProcessHandlingState::Finished,
            ProcessHandlingState::Abandoned,
        ] {
            let mut record = ProcessRecord::new(1, "x");
            record.set_state(state);
            assert!(record.is_handled(), "{} should settle", state);
            assert!(state.settles_record());
        }
        assert!(!ProcessHandlingState::Modified.settles_record());
        assert!(!ProcessHandlingState::Exited.settles_record());
    }

    #[test]
    fn test_wait_flags() {
        let mut record = ProcessRecord::new(1, "x");
        record.set_power_wait(true);
        record.set_active_wait(true);
        assert!(record.is_power_wait() && record.is_active_wait());
    }
}
