#![allow(dead_code)]

use repostats::error::BoxError;
use repostats::{RawResponse, RepoId, Transport};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Default)]
struct Script {
    routes: Vec<(String, VecDeque<RawResponse>)>,
    requests: Vec<String>,
}

/// Serves queued responses to requests whose path starts with a registered prefix,
/// and records every request it sees.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path_prefix: &str, response: RawResponse) -> &Self {
        let mut script = self.script.borrow_mut();
        match script.routes.iter().position(|(prefix, _)| prefix == path_prefix) {
            Some(i) => script.routes[i].1.push_back(response),
            None => script
                .routes
                .push((path_prefix.to_string(), VecDeque::from([response]))),
        }
        drop(script);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.script.borrow().requests.clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, path_and_query: &str) -> Result<RawResponse, BoxError> {
        let mut script = self.script.borrow_mut();
        script.requests.push(path_and_query.to_string());

        script
            .routes
            .iter_mut()
            .filter(|(prefix, _)| path_and_query.starts_with(prefix.as_str()))
            .find_map(|(_, queue)| queue.pop_front())
            .ok_or_else(|| format!("unexpected request {path_and_query}").into())
    }
}

pub fn repo() -> RepoId {
    RepoId {
        owner: "octo".to_string(),
        repo: "widgets".to_string(),
    }
}

pub fn ok(body: Value) -> RawResponse {
    RawResponse {
        status: 200,
        body: body.to_string(),
        link: None,
    }
}

pub fn status(status: u16) -> RawResponse {
    RawResponse {
        status,
        body: String::new(),
        link: None,
    }
}

/// A page of a list endpoint; `next` controls whether the `Link` header has a next relation.
pub fn page(items: Vec<Value>, next: bool) -> RawResponse {
    let link = if next {
        r#"<https://api.github.com/repositories/1/x?page=2>; rel="next", <https://api.github.com/repositories/1/x?page=9>; rel="last""#
    } else {
        r#"<https://api.github.com/repositories/1/x?page=1>; rel="first", <https://api.github.com/repositories/1/x?page=8>; rel="prev""#
    };
    RawResponse {
        status: 200,
        body: Value::Array(items).to_string(),
        link: Some(link.to_string()),
    }
}

pub fn branch_json(name: &str, protected: bool) -> Value {
    json!({
        "name": name,
        "commit": { "sha": format!("sha-{name}"), "url": "https://api.github.com/x" },
        "protected": protected
    })
}

pub fn commit_json(sha: &str, login: Option<&str>, date: &str) -> Value {
    json!({
        "sha": sha,
        "author": login.map(|login| json!({ "login": login, "type": "User" })),
        "commit": {
            "message": "change",
            "author": { "name": "dev", "date": date },
            "committer": { "name": "dev", "date": date }
        }
    })
}
