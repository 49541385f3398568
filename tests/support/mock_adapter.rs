//! Scripted in-process adapters for facade tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use unillm::stream::{ProviderStream, StreamItem};
use unillm::{
    FinishReason, GenerationRequest, GenerationResponse, ProviderAdapter, ProviderError,
    ProviderErrorKind, ProviderRegistry, UnifiedLlm, Usage,
};

/// What a mock provider does when called.
#[derive(Debug, Clone)]
pub enum Script {
    /// Answer with this text; streamed word by word.
    Succeed(&'static str),
    /// Fail the call (and the stream opening) with this kind.
    Fail(ProviderErrorKind),
    /// Open the stream, then fail on the very first frame.
    FailFirstFrame(ProviderErrorKind),
    /// Stream these fragments, then fail.
    FailAfter(Vec<&'static str>, ProviderErrorKind),
    /// Open a stream that ends without any item.
    Empty,
}

/// Ordered record of which providers were called.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub struct MockAdapter {
    id: String,
    script: Script,
    log: CallLog,
}

impl MockAdapter {
    pub fn new(id: &str, script: Script, log: &CallLog) -> Arc<dyn ProviderAdapter> {
        Arc::new(Self {
            id: id.to_string(),
            script,
            log: log.clone(),
        })
    }

    fn error(&self, kind: ProviderErrorKind) -> ProviderError {
        ProviderError::new(self.id.clone(), kind, format!("{} scripted {kind}", self.id))
    }

    fn usage(text: &str) -> Usage {
        Usage::new(3, text.split_whitespace().count() as u32)
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn provider_id(&self) -> &str {
        &self.id
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        self.log.lock().unwrap().push(self.id.clone());
        match &self.script {
            Script::Succeed(text) => Ok(GenerationResponse::new(
                *text,
                self.id.clone(),
                "mock-model",
                Self::usage(text),
                FinishReason::Stop,
            )),
            Script::Empty => Ok(GenerationResponse::new(
                "",
                self.id.clone(),
                "mock-model",
                Usage::unknown(),
                FinishReason::Unknown,
            )),
            Script::Fail(kind) | Script::FailFirstFrame(kind) | Script::FailAfter(_, kind) => {
                Err(self.error(*kind))
            }
        }
    }

    async fn generate_streaming(
        &self,
        _request: &GenerationRequest,
    ) -> Result<ProviderStream, ProviderError> {
        self.log.lock().unwrap().push(self.id.clone());
        let items: Vec<Result<StreamItem, ProviderError>> = match &self.script {
            Script::Succeed(text) => text
                .split_inclusive(' ')
                .map(|w| Ok(StreamItem::text(w)))
                .chain(std::iter::once(Ok(StreamItem::summary(
                    Self::usage(text),
                    FinishReason::Stop,
                ))))
                .collect(),
            Script::Fail(kind) => return Err(self.error(*kind)),
            Script::FailFirstFrame(kind) => vec![Err(self.error(*kind))],
            Script::FailAfter(fragments, kind) => fragments
                .iter()
                .map(|f| Ok(StreamItem::text(*f)))
                .chain(std::iter::once(Err(self.error(*kind))))
                .collect(),
            Script::Empty => Vec::new(),
        };
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

/// Facade over mock providers in the given order, plus the shared call log.
pub fn facade(scripts: Vec<(&str, Script)>) -> (UnifiedLlm, CallLog) {
    let log = CallLog::default();
    let adapters = scripts
        .into_iter()
        .map(|(id, script)| MockAdapter::new(id, script, &log))
        .collect();
    (UnifiedLlm::new(ProviderRegistry::from_adapters(adapters)), log)
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn say_hi() -> GenerationRequest {
    GenerationRequest::builder()
        .user("Say hi")
        .temperature(0.7)
        .build()
        .unwrap()
}
