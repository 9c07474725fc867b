//! Process-wide session state and the request/response command surface.
//!
//! One [`SessionController`] owns everything that outlives a single
//! request: the extracted thread, the playback queue and the expansion
//! cancel flag. Every operation resolves to a structured response with a
//! `success` field; no failure crosses this boundary as a panic or a bare
//! error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{build_queue, CommentRecord, PlaybackState};
use crate::expansion::{
    ExpansionBudget, ExpansionController, ExpansionTuning, RunProgress, RunResult,
};
use crate::extract::{ExtractedThread, Extractor};
use crate::playback::Sequencer;
use crate::probe::{DocumentProbe, Highlighter};
use crate::speech::{SpeechEngine, SpeechEvent};

/// Parameters of one extraction request.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub budget: ExpansionBudget,
    pub voice_locale: Option<String>,
    pub selected_voices: Vec<String>,
}

impl Default for ExtractRequest {
    fn default() -> Self {
        Self {
            budget: ExpansionBudget::default(),
            voice_locale: None,
            selected_voices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub count: usize,
    pub total_items: usize,
    pub has_title: bool,
    pub has_body: bool,
    pub title: Option<String>,
    pub comments: Vec<CommentRecord>,
    pub expansion: Option<RunResult>,
    pub error: Option<String>,
}

impl ExtractResponse {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            count: 0,
            total_items: 0,
            has_title: false,
            has_body: false,
            title: None,
            comments: Vec::new(),
            expansion: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StopResponse {
    pub success: bool,
    pub stopped: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgressResponse {
    pub is_extracting: bool,
    pub progress: f32,
    pub can_stop: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransportResponse {
    pub success: bool,
    pub state: PlaybackState,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateResponse {
    pub playback: PlaybackState,
    pub is_extracting: bool,
    pub count: usize,
    pub title: Option<String>,
    pub comments: Vec<CommentRecord>,
}

pub struct SessionController {
    probe: Arc<dyn DocumentProbe>,
    engine: Arc<dyn SpeechEngine>,
    sequencer: tokio::sync::Mutex<Sequencer>,
    thread: Mutex<Option<ExtractedThread>>,
    extractor: Extractor,
    extracting: AtomicBool,
    cancel: Arc<AtomicBool>,
    progress: Arc<RunProgress>,
    tuning: ExpansionTuning,
}

impl SessionController {
    pub fn new(
        probe: Arc<dyn DocumentProbe>,
        highlighter: Arc<dyn Highlighter>,
        engine: Arc<dyn SpeechEngine>,
    ) -> Self {
        let sequencer = Sequencer::new(engine.clone(), highlighter);
        Self {
            probe,
            engine,
            sequencer: tokio::sync::Mutex::new(sequencer),
            thread: Mutex::new(None),
            extractor: Extractor::new(),
            extracting: AtomicBool::new(false),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: Arc::new(RunProgress::default()),
            tuning: ExpansionTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: ExpansionTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Expand the thread under the requested budget, extract it and load
    /// the playback queue. Never returns an error: failures come back as
    /// `success: false`, and a document without comments is a zero-count
    /// success.
    pub async fn extract_comments(&self, request: ExtractRequest) -> ExtractResponse {
        if self.extracting.swap(true, Ordering::SeqCst) {
            return ExtractResponse::failure("extraction already running".to_string());
        }
        self.cancel.store(false, Ordering::SeqCst);

        let response = match self.run_extraction(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Extraction failed: {}", e);
                ExtractResponse::failure(e.to_string())
            }
        };

        self.extracting.store(false, Ordering::SeqCst);
        response
    }

    async fn run_extraction(&self, request: &ExtractRequest) -> crate::app::Result<ExtractResponse> {
        let run = ExpansionController::new(self.probe.clone())
            .with_tuning(self.tuning.clone())
            .with_cancel_flag(self.cancel.clone())
            .with_progress(self.progress.clone())
            .expand(&request.budget)
            .await?;

        let snapshot = self.probe.snapshot().await?;
        let thread = self.extractor.extract(&snapshot);
        let queue = build_queue(
            thread.title.as_deref(),
            thread.body.as_deref(),
            &thread.comments,
        );
        let total_items = queue.len();

        info!(
            comments = thread.comments.len(),
            filtered = thread.filtered,
            items = total_items,
            "Thread extracted"
        );

        let locale = request.voice_locale.clone();
        let pool = match self.engine.available_voices(locale.as_deref()).await {
            Ok(pool) => pool,
            Err(e) => {
                // Engine default voice still works without a pool.
                warn!("Could not list voices: {}", e);
                Vec::new()
            }
        };

        {
            let mut sequencer = self.sequencer.lock().await;
            if let Some(ref locale) = locale {
                sequencer.set_locale(locale);
            }
            sequencer.set_allowlist(request.selected_voices.clone());
            sequencer.set_voice_pool(pool);
            sequencer.load(queue).await?;
        }

        let response = ExtractResponse {
            success: true,
            count: thread.comments.len(),
            total_items,
            has_title: thread.title.is_some(),
            has_body: thread.body.is_some(),
            title: thread.title.clone(),
            comments: thread.comments.clone(),
            expansion: Some(run),
            error: None,
        };

        *self.thread.lock().unwrap_or_else(|e| e.into_inner()) = Some(thread);

        Ok(response)
    }

    /// Request cooperative cancellation of a running extraction.
    pub fn stop_extraction(&self) -> StopResponse {
        let stopped = self.extracting.load(Ordering::SeqCst);
        self.cancel.store(true, Ordering::SeqCst);
        StopResponse {
            success: true,
            stopped,
        }
    }

    pub fn get_extraction_progress(&self) -> ProgressResponse {
        let is_extracting = self.extracting.load(Ordering::SeqCst);
        ProgressResponse {
            is_extracting,
            progress: self.progress.fraction(),
            can_stop: is_extracting,
        }
    }

    pub async fn play(&self) -> TransportResponse {
        let mut sequencer = self.sequencer.lock().await;
        let success = log_transport("play", sequencer.play().await);
        TransportResponse {
            success,
            state: sequencer.snapshot(),
        }
    }

    pub async fn pause(&self) -> TransportResponse {
        let mut sequencer = self.sequencer.lock().await;
        let success = log_transport("pause", sequencer.pause().await);
        TransportResponse {
            success,
            state: sequencer.snapshot(),
        }
    }

    pub async fn stop(&self) -> TransportResponse {
        let mut sequencer = self.sequencer.lock().await;
        let success = log_transport("stop", sequencer.stop().await);
        TransportResponse {
            success,
            state: sequencer.snapshot(),
        }
    }

    pub async fn next(&self) -> TransportResponse {
        let mut sequencer = self.sequencer.lock().await;
        let success = log_transport("next", sequencer.next().await);
        TransportResponse {
            success,
            state: sequencer.snapshot(),
        }
    }

    pub async fn previous(&self) -> TransportResponse {
        let mut sequencer = self.sequencer.lock().await;
        let success = log_transport("previous", sequencer.previous().await);
        TransportResponse {
            success,
            state: sequencer.snapshot(),
        }
    }

    pub async fn set_speed(&self, speed: f32) -> TransportResponse {
        let mut sequencer = self.sequencer.lock().await;
        sequencer.set_speed(speed);
        TransportResponse {
            success: true,
            state: sequencer.snapshot(),
        }
    }

    pub async fn toggle_unique_voices(&self, enabled: bool) -> TransportResponse {
        let mut sequencer = self.sequencer.lock().await;
        sequencer.set_rotate(enabled);
        TransportResponse {
            success: true,
            state: sequencer.snapshot(),
        }
    }

    pub async fn set_voice_locale(&self, locale: &str) -> TransportResponse {
        let pool = match self.engine.available_voices(Some(locale)).await {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Could not list voices for {}: {}", locale, e);
                Vec::new()
            }
        };

        let mut sequencer = self.sequencer.lock().await;
        sequencer.set_locale(locale);
        sequencer.set_voice_pool(pool);
        TransportResponse {
            success: true,
            state: sequencer.snapshot(),
        }
    }

    /// Clone of the current playback queue, for hosts that render it.
    pub async fn queue_items(&self) -> Vec<crate::domain::ContentItem> {
        self.sequencer.lock().await.items().to_vec()
    }

    pub async fn get_state(&self) -> StateResponse {
        let playback = self.sequencer.lock().await.snapshot();
        let (count, title, comments) = {
            let thread = self.thread.lock().unwrap_or_else(|e| e.into_inner());
            match thread.as_ref() {
                Some(t) => (t.comments.len(), t.title.clone(), t.comments.clone()),
                None => (0, None, Vec::new()),
            }
        };

        StateResponse {
            playback,
            is_extracting: self.extracting.load(Ordering::SeqCst),
            count,
            title,
            comments,
        }
    }

    /// Forward an engine event into the sequencer.
    pub async fn handle_speech_event(&self, event: SpeechEvent) {
        let mut sequencer = self.sequencer.lock().await;
        if let Err(e) = sequencer.handle_event(event).await {
            warn!("Speech event handling failed: {}", e);
        }
    }

    /// Release everything: speech, highlight, queue, records.
    ///
    /// Invoked by the host on navigation or teardown.
    pub async fn cleanup(&self) -> TransportResponse {
        self.cancel.store(true, Ordering::SeqCst);

        let mut sequencer = self.sequencer.lock().await;
        let stopped = log_transport("cleanup", sequencer.stop().await);
        let cleared = log_transport("cleanup", sequencer.load(Vec::new()).await);
        *self.thread.lock().unwrap_or_else(|e| e.into_inner()) = None;

        TransportResponse {
            success: stopped && cleared,
            state: sequencer.snapshot(),
        }
    }
}

fn log_transport(op: &str, result: crate::app::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Transport {} failed: {}", op, e);
            false
        }
    }
}
