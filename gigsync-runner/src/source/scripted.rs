//! Source adapter that replays scripted outcomes, for tests

use anyhow::Result;
use async_trait::async_trait;
use gigsync_core::domain::Listing;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::SourceAdapter;

/// One scripted scrape outcome
pub enum Step {
    Listings(Vec<Listing>),
    Fail(&'static str),
}

/// Plays back `steps` in order, repeating the last one once exhausted
pub struct ScriptedSource {
    name: String,
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(name: &str, steps: Vec<Step>) -> Self {
        Self {
            name: name.to_string(),
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(name: &str, step: Step) -> Self {
        Self::new(name, vec![step])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Clone for Step {
    fn clone(&self) -> Self {
        match self {
            Step::Listings(listings) => Step::Listings(listings.clone()),
            Step::Fail(msg) => Step::Fail(*msg),
        }
    }
}

#[async_trait]
impl SourceAdapter for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scrape(&self) -> Result<Vec<Listing>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.steps.lock().unwrap().pop_front() {
                *last = Some(next.clone());
            }
            last.clone()
        };

        match step {
            Some(Step::Listings(listings)) => Ok(listings),
            Some(Step::Fail(msg)) => anyhow::bail!("{}", msg),
            None => Ok(Vec::new()),
        }
    }
}

/// A listing that passes validation
pub fn valid_listing(source: &str, id: &str) -> Listing {
    Listing {
        title: format!("Role {}", id),
        company: "Acme".to_string(),
        description: "A perfectly ordinary job description.".to_string(),
        apply_url: format!("https://jobs.example.com/{}/{}", source, id),
        ..Listing::new(source, id)
    }
}
