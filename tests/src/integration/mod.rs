//! Shared harness for the integration flows.

mod dispatch_flows;
mod identity_concurrency;
mod recovery_flows;

use daemon_runtime::container::{Backends, Container, MemoryBackends};
use daemon_runtime::dispatch::Dispatcher;
use shared_types::{fields, CommandTag, Envelope, ErrorKind, ErrorReply, Guid, Pid, Response, GUID_LEN};
use std::sync::Arc;

pub const SYSTEM_POOL: &str = "zones";
pub const CLIENT_PID: Pid = 4242;

/// A wired daemon over in-memory backends.
pub struct Harness {
    pub container: Arc<Container>,
    pub dispatcher: Arc<Dispatcher>,
    pub memory: MemoryBackends,
}

impl Harness {
    pub fn new() -> Self {
        let (backends, memory) = Backends::memory();
        memory.storage.add_pool(SYSTEM_POOL);
        let container = Arc::new(Container::new(backends));
        let dispatcher = container.dispatcher();
        Self {
            container,
            dispatcher,
            memory,
        }
    }

    pub fn send(&self, request: Envelope) -> Response {
        self.dispatcher.dispatch(request, CLIENT_PID)
    }

    pub fn send_as(&self, pid: Pid, request: Envelope) -> Response {
        self.dispatcher.dispatch(request, pid)
    }

    pub fn designate_system_pool(&self) {
        let reply = self.send(request(CommandTag::SetSystemPool).with(fields::POOL, SYSTEM_POOL));
        assert!(reply.is_success(), "{reply:?}");
    }
}

pub fn guid(byte: u8) -> Guid {
    Guid::new([byte; GUID_LEN])
}

pub fn request(tag: CommandTag) -> Envelope {
    Envelope::new().with(fields::COMMAND, tag.as_i32())
}

/// A one-part primary template naming `part`.
pub fn template(part: u8) -> Vec<u8> {
    format!(
        r#"{{"configs":[{{"kind":"primary","threshold":1,"parts":[{{"name":"p{part}","guid":"{}"}}]}}]}}"#,
        guid(part)
    )
    .into_bytes()
}

#[track_caller]
pub fn expect_error(response: Response, kind: ErrorKind) -> ErrorReply {
    match response {
        Response::Error(reply) if reply.kind == kind => reply,
        other => panic!("expected {kind}, got {other:?}"),
    }
}

#[track_caller]
pub fn expect_success(response: Response) -> Envelope {
    match response {
        Response::Success(payload) => payload,
        other => panic!("expected success, got {other:?}"),
    }
}
