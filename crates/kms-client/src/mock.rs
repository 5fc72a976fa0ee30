//! In-memory transports for tests

use crate::transport::{HttpReply, KmsTransport};
use async_trait::async_trait;
use kms_core::{DecryptionResponse, DecryptionSubmission, KmsError, KmsResult};
use reqwest::Url;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

/// Request observed by a mock transport
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub at: Instant,
}

/// JSON reply with the given status
pub fn json_reply<T: Serialize>(status: u16, value: &T) -> HttpReply {
    HttpReply::new(status, serde_json::to_vec(value).unwrap())
}

/// Replays scripted replies in order, then repeats `fallback` forever
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<KmsResult<HttpReply>>>,
    fallback: Option<HttpReply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: HttpReply) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    pub fn fail(self, err: KmsError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn then_forever(mut self, reply: HttpReply) -> Self {
        self.fallback = Some(reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn polls(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.url.contains("/threshold/result/"))
            .collect()
    }

    fn next(&self, method: &'static str, url: Url, body: Option<serde_json::Value>) -> KmsResult<HttpReply> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body,
            at: Instant::now(),
        });

        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| KmsError::Connectivity("no scripted reply".to_string())),
        }
    }
}

#[async_trait]
impl KmsTransport for ScriptedTransport {
    async fn get(&self, url: Url) -> KmsResult<HttpReply> {
        self.next("GET", url, None)
    }

    async fn post_json(&self, url: Url, body: serde_json::Value) -> KmsResult<HttpReply> {
        self.next("POST", url, Some(body))
    }
}

struct Job {
    ciphertext: String,
    polls_left: u32,
}

/// Stateful stand-in for a KMS: one job per request id, completed after a
/// fixed number of polls with the ciphertext length as plaintext
pub struct FakeKms {
    polls_until_done: u32,
    jobs: Mutex<HashMap<String, Job>>,
    submissions: Mutex<usize>,
}

impl FakeKms {
    pub fn new(polls_until_done: u32) -> Self {
        FakeKms {
            polls_until_done,
            jobs: Mutex::new(HashMap::new()),
            submissions: Mutex::new(0),
        }
    }

    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn submission_count(&self) -> usize {
        *self.submissions.lock().unwrap()
    }
}

#[async_trait]
impl KmsTransport for FakeKms {
    async fn get(&self, url: Url) -> KmsResult<HttpReply> {
        let request_id = match url.path().strip_prefix("/threshold/result/") {
            Some(id) => id.to_string(),
            None => return Ok(HttpReply::new(404, "not found")),
        };

        let mut jobs = self.jobs.lock().unwrap();
        let job = match jobs.get_mut(&request_id) {
            Some(job) => job,
            None => return Ok(HttpReply::new(404, format!("unknown request {}", request_id))),
        };

        let response = if job.polls_left == 0 {
            DecryptionResponse::completed(request_id, job.ciphertext.len() as u64)
        } else {
            job.polls_left -= 1;
            DecryptionResponse::pending(request_id)
        };
        Ok(json_reply(200, &response))
    }

    async fn post_json(&self, url: Url, body: serde_json::Value) -> KmsResult<HttpReply> {
        if url.path() != "/threshold/decrypt" {
            return Ok(HttpReply::new(404, "not found"));
        }

        let submission: DecryptionSubmission = match serde_json::from_value(body) {
            Ok(submission) => submission,
            Err(e) => return Ok(HttpReply::new(400, e.to_string())),
        };

        *self.submissions.lock().unwrap() += 1;
        self.jobs
            .lock()
            .unwrap()
            .entry(submission.request_id.clone())
            .or_insert(Job {
                ciphertext: submission.ciphertext,
                polls_left: self.polls_until_done,
            });

        Ok(json_reply(200, &DecryptionResponse::pending(submission.request_id)))
    }
}
