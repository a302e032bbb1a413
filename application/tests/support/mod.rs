//! Scripted collaborators for engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use roundtable_application::ports::memory_store::{recent_window, relevant_entries};
use roundtable_application::{
    ConversationRegistry, ConversationServices, ConversationSettings, EventBroadcaster, GatewayError,
    GenerationGateway, GenerationRequest, MemoryError, MemoryStore, StreamHandle,
};
use roundtable_domain::{MemoryEntry, Participant, ParticipantRegistry, StreamEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// One scripted backend answer.
pub enum Reply {
    Text(String),
    Chunks(Vec<String>),
    Fail(String),
    Hang,
}

pub fn text(s: &str) -> Reply {
    Reply::Text(s.to_string())
}

pub fn chunks(parts: &[&str]) -> Reply {
    Reply::Chunks(parts.iter().map(|p| p.to_string()).collect())
}

/// Pops scripted replies; answers `reply <n>` once the script runs dry.
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn next_reply(&self, request: &GenerationRequest) -> Reply {
        self.requests.lock().unwrap().push(request.clone());
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Reply::Text(format!("reply {}", n)))
    }
}

#[async_trait]
impl GenerationGateway for ScriptedGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        match self.next_reply(request).await {
            Reply::Text(text) => Ok(text),
            Reply::Chunks(parts) => Ok(parts.concat()),
            Reply::Fail(reason) => Err(GatewayError::RequestFailed(reason)),
            Reply::Hang => {
                std::future::pending::<()>().await;
                Err(GatewayError::Timeout)
            }
        }
    }

    async fn generate_streaming(
        &self,
        request: &GenerationRequest,
    ) -> Result<StreamHandle, GatewayError> {
        match self.next_reply(request).await {
            Reply::Chunks(parts) => {
                let (tx, rx) = mpsc::channel(parts.len() + 1);
                for part in parts {
                    tx.try_send(StreamEvent::Delta(part)).unwrap();
                }
                tx.try_send(StreamEvent::Completed(String::new())).unwrap();
                Ok(StreamHandle::new(rx))
            }
            Reply::Text(text) => Ok(StreamHandle::completed(text)),
            Reply::Fail(reason) => {
                let (tx, rx) = mpsc::channel(2);
                tx.try_send(StreamEvent::Delta("partial".to_string())).unwrap();
                tx.try_send(StreamEvent::Error(reason)).unwrap();
                Ok(StreamHandle::new(rx))
            }
            Reply::Hang => {
                std::future::pending::<()>().await;
                Err(GatewayError::Timeout)
            }
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// In-process memory store whose reads and writes can be made to fail.
#[derive(Default)]
pub struct TestMemory {
    entries: Mutex<HashMap<String, Vec<MemoryEntry>>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl TestMemory {
    pub fn count(&self, conversation_id: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .get(conversation_id)
            .map_or(0, Vec::len)
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), MemoryError> {
        if flag.load(Ordering::SeqCst) {
            return Err(MemoryError::Unavailable("disk on fire".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for TestMemory {
    async fn store(&self, entry: MemoryEntry) -> Result<(), MemoryError> {
        self.check(&self.fail_writes)?;
        self.entries
            .lock()
            .unwrap()
            .entry(entry.conversation_id.clone())
            .or_default()
            .push(entry);
        Ok(())
    }

    async fn history(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        self.check(&self.fail_reads)?;
        let all = self
            .entries
            .lock()
            .unwrap()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        Ok(recent_window(all, limit))
    }

    async fn participant_history(
        &self,
        conversation_id: &str,
        participant_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let all = self.history(conversation_id, None).await?;
        let own = all
            .into_iter()
            .filter(|e| e.participant_id.as_deref() == Some(participant_id))
            .collect();
        Ok(recent_window(own, limit))
    }

    async fn relevant(
        &self,
        conversation_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let all = self.history(conversation_id, None).await?;
        Ok(relevant_entries(all.iter(), query, limit))
    }

    async fn clear(&self, conversation_id: &str) -> Result<(), MemoryError> {
        self.check(&self.fail_writes)?;
        self.entries.lock().unwrap().remove(conversation_id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "test"
    }
}

pub fn participants() -> ParticipantRegistry {
    ParticipantRegistry::new(vec![
        Participant::new("ada", "Ada", "You are Ada, a careful mathematician.").unwrap(),
        Participant::new("bob", "Bob", "You are Bob, a cheerful builder.").unwrap(),
        Participant::new("cy", "Cy", "You are Cy, a sceptic.").unwrap(),
        Participant::new("zed", "Zed", "Retired.").unwrap().inactive(),
    ])
    .unwrap()
}

pub fn fast_settings() -> ConversationSettings {
    ConversationSettings::default()
        .with_turn_interval(Duration::from_millis(1))
        .with_streaming(false)
        .with_generation_timeout(Duration::from_secs(5))
}

pub struct Harness {
    pub registry: ConversationRegistry,
    pub gateway: Arc<ScriptedGateway>,
    pub memory: Arc<TestMemory>,
}

pub fn harness(gateway: ScriptedGateway, settings: ConversationSettings) -> Harness {
    harness_with_broadcaster(gateway, settings, EventBroadcaster::default())
}

pub fn harness_with_broadcaster(
    gateway: ScriptedGateway,
    settings: ConversationSettings,
    broadcaster: EventBroadcaster,
) -> Harness {
    let gateway = Arc::new(gateway);
    let memory = Arc::new(TestMemory::default());
    let services = ConversationServices::new(
        Arc::new(participants()),
        memory.clone(),
        gateway.clone(),
    )
    .with_settings(settings)
    .with_broadcaster(Arc::new(broadcaster));
    Harness {
        registry: ConversationRegistry::new(services),
        gateway,
        memory,
    }
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
