//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::Configuration;
use crate::error::BoxError;
use crate::http::{HttpRequest, HttpResponse};
use crate::sender::HttpSender;
use crate::transport::Transport;

pub const BASE_URL: &str = "https://api.example.com/v1";

/// Records every request and answers from a queue of canned replies. The
/// last reply is repeated once the queue is down to one entry.
pub struct StubSender {
    replies: Mutex<VecDeque<Result<HttpResponse, String>>>,
    pub seen: Mutex<Vec<HttpRequest>>,
}

impl StubSender {
    pub fn replying(status: u16, body: &str) -> Arc<Self> {
        Self::sequence(vec![(status, body)])
    }

    pub fn sequence(replies: Vec<(u16, &str)>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|(status, body)| Ok(HttpResponse::new(status, body)))
                    .collect(),
            ),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Err(message.to_string())])),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn last(&self) -> HttpRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl HttpSender for StubSender {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, BoxError> {
        self.seen.lock().unwrap().push(request.clone());
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap()
        };
        reply.map_err(|message| std::io::Error::new(std::io::ErrorKind::ConnectionRefused, message).into())
    }
}

pub fn transport(sender: Arc<StubSender>) -> Transport {
    Transport::with_sender(Configuration::new("test-token").with_base_url(BASE_URL), sender)
}
