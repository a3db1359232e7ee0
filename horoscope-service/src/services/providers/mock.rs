//! Scriptable generator for tests.

use super::{ProviderError, TextGenerator};
use crate::services::credentials::Credential;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One scripted provider outcome.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Succeed(String),
    Fail,
}

/// Mock text generator.
///
/// Pops one scripted outcome per call; once the script is exhausted,
/// every further call succeeds with a canned response. Records the call
/// count and the credential used for each call so tests can assert on
/// rotation.
#[derive(Default)]
pub struct MockGenerator {
    script: Mutex<VecDeque<MockOutcome>>,
    calls: AtomicUsize,
    credentials_used: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// A generator that always succeeds with a canned response.
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator that plays `outcomes` in order, then always succeeds.
    pub fn with_script(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Credentials used so far, in call order.
    pub fn credentials_used(&self) -> Vec<String> {
        self.credentials_used.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.credentials_used
            .lock()
            .unwrap()
            .push(credential.as_str().to_string());

        let outcome = self.script.lock().unwrap().pop_front();
        match outcome {
            Some(MockOutcome::Succeed(text)) => Ok(text),
            Some(MockOutcome::Fail) => Err(ProviderError::Api("mock failure".to_string())),
            None => Ok(format!("Mock prediction for: {}", prompt)),
        }
    }
}
