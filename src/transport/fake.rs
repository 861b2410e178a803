use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::transport::{Request, Transport, TransportError};

/// Records every request and answers from a queue of canned replies.
/// An empty queue answers with [`TransportError::Closed`].
#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<Request>>,
    replies: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(body: &str) -> Self {
        let transport = Self::new();
        transport.reply_with(Ok(body.as_bytes().to_vec()));
        transport
    }

    pub fn failing() -> Self {
        let transport = Self::new();
        transport.reply_with(Err(TransportError::Closed));
        transport
    }

    pub fn reply_with(&self, reply: Result<Vec<u8>, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> Request {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: Request) -> Result<Vec<u8>, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Closed))
    }
}
