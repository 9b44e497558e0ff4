//! In-memory port doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use reqwest::Url;

use crate::ports::measures::{Measure, MeasureSink};
use crate::ports::tracker::{
    RemoteFault, RemoteFilter, RemoteIssue, RemotePriority, RemoteResult, TrackerService,
};

struct Script {
    calls: Vec<String>,
    passwords: Vec<String>,
    login: Option<RemoteFault>,
    logout: Option<RemoteFault>,
    create: Option<RemoteFault>,
    created: Vec<RemoteIssue>,
    favourites: RemoteResult<Vec<RemoteFilter>>,
    saved: RemoteResult<Vec<RemoteFilter>>,
    priorities: RemoteResult<Vec<RemotePriority>>,
    issues: HashMap<String, Vec<RemoteIssue>>,
}

/// A tracker whose answers are set up front and whose calls are logged.
pub(crate) struct ScriptedTracker {
    script: Mutex<Script>,
}

impl ScriptedTracker {
    pub(crate) fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                calls: Vec::new(),
                passwords: Vec::new(),
                login: None,
                logout: None,
                create: None,
                created: Vec::new(),
                favourites: Ok(Vec::new()),
                saved: Ok(Vec::new()),
                priorities: Ok(Vec::new()),
                issues: HashMap::new(),
            }),
        }
    }

    pub(crate) fn fail_login(&self, fault: RemoteFault) {
        self.script.lock().unwrap().login = Some(fault);
    }

    pub(crate) fn fail_logout(&self, fault: RemoteFault) {
        self.script.lock().unwrap().logout = Some(fault);
    }

    pub(crate) fn fail_create(&self, fault: RemoteFault) {
        self.script.lock().unwrap().create = Some(fault);
    }

    pub(crate) fn favourites(&self, result: RemoteResult<Vec<RemoteFilter>>) {
        self.script.lock().unwrap().favourites = result;
    }

    pub(crate) fn saved(&self, result: RemoteResult<Vec<RemoteFilter>>) {
        self.script.lock().unwrap().saved = result;
    }

    pub(crate) fn priorities(&self, result: RemoteResult<Vec<RemotePriority>>) {
        self.script.lock().unwrap().priorities = result;
    }

    pub(crate) fn issues(&self, filter_id: &str, issues: Vec<RemoteIssue>) {
        self.script.lock().unwrap().issues.insert(filter_id.to_string(), issues);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    /// Passwords received by `login`, in call order.
    pub(crate) fn login_passwords(&self) -> Vec<String> {
        self.script.lock().unwrap().passwords.clone()
    }

    pub(crate) fn created(&self) -> Vec<RemoteIssue> {
        self.script.lock().unwrap().created.clone()
    }

    fn log(&self, call: String) -> std::sync::MutexGuard<'_, Script> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call);
        script
    }
}

impl TrackerService for ScriptedTracker {
    fn login(&self, _endpoint: &Url, username: &str, password: &str) -> RemoteResult<String> {
        let mut script = self.log(format!("login:{username}"));
        script.passwords.push(password.to_string());
        match &script.login {
            Some(fault) => Err(fault.clone()),
            None => Ok("token".to_string()),
        }
    }

    fn logout(&self, _endpoint: &Url, token: &str) -> RemoteResult<()> {
        let script = self.log(format!("logout:{token}"));
        script.logout.clone().map_or(Ok(()), Err)
    }

    fn create_issue(
        &self,
        _endpoint: &Url,
        _token: &str,
        issue: &RemoteIssue,
    ) -> RemoteResult<RemoteIssue> {
        let mut script = self.log("create_issue".to_string());
        if let Some(fault) = &script.create {
            return Err(fault.clone());
        }
        script.created.push(issue.clone());
        let key = format!("{}-{}", issue.project, script.created.len());
        Ok(RemoteIssue { key: Some(key), ..issue.clone() })
    }

    fn favourite_filters(&self, _endpoint: &Url, _token: &str) -> RemoteResult<Vec<RemoteFilter>> {
        self.log("favourite_filters".to_string()).favourites.clone()
    }

    fn saved_filters(&self, _endpoint: &Url, _token: &str) -> RemoteResult<Vec<RemoteFilter>> {
        self.log("saved_filters".to_string()).saved.clone()
    }

    fn priorities(&self, _endpoint: &Url, _token: &str) -> RemoteResult<Vec<RemotePriority>> {
        self.log("priorities".to_string()).priorities.clone()
    }

    fn issues_from_filter(
        &self,
        _endpoint: &Url,
        _token: &str,
        filter_id: &str,
    ) -> RemoteResult<Vec<RemoteIssue>> {
        let script = self.log(format!("issues_from_filter:{filter_id}"));
        Ok(script.issues.get(filter_id).cloned().unwrap_or_default())
    }
}

/// Collects saved measures in memory.
#[derive(Default)]
pub(crate) struct MemorySink {
    saved: Mutex<Vec<Measure>>,
    refuse: bool,
}

impl MemorySink {
    pub(crate) fn refusing() -> Self {
        Self { saved: Mutex::new(Vec::new()), refuse: true }
    }

    pub(crate) fn saved(&self) -> Vec<Measure> {
        self.saved.lock().unwrap().clone()
    }
}

impl MeasureSink for MemorySink {
    fn save_measure(
        &self,
        measure: &Measure,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.refuse {
            return Err("store is read-only".into());
        }
        self.saved.lock().unwrap().push(measure.clone());
        Ok(())
    }
}

pub(crate) fn filter(id: &str, name: &str) -> RemoteFilter {
    RemoteFilter { id: id.to_string(), name: name.to_string() }
}

pub(crate) fn priority(id: &str, name: &str) -> RemotePriority {
    RemotePriority { id: id.to_string(), name: name.to_string() }
}

pub(crate) fn issue_with_priority(priority: &str) -> RemoteIssue {
    RemoteIssue { priority: Some(priority.to_string()), ..RemoteIssue::default() }
}
