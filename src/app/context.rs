use std::sync::Arc;

use tokio::sync::mpsc;

use crate::app::Result;
use crate::config::Config;
use crate::probe::{ChromeProbe, ProbeConfig};
use crate::session::SessionController;
use crate::speech::{EspeakEngine, SpeechEvent};

/// Wires a session together from configuration.
pub struct AppContext {
    pub config: Config,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn probe_config(&self, headful: bool) -> ProbeConfig {
        let mut probe = self.config.probe.clone();
        if headful {
            probe.headless = false;
        }
        probe
    }

    /// Open the thread page and build a session around it.
    ///
    /// Returns the controller plus the channel the speech engine reports
    /// completions on; the host must pump those into the session.
    pub async fn open_session(
        &self,
        url: &str,
        headful: bool,
    ) -> Result<(Arc<SessionController>, mpsc::Receiver<SpeechEvent>)> {
        let probe = Arc::new(ChromeProbe::open(url, self.probe_config(headful)).await?);
        let (engine, events) = EspeakEngine::new(&self.config.speech.program);

        let session = Arc::new(SessionController::new(
            probe.clone(),
            probe,
            Arc::new(engine),
        ));

        session.set_speed(self.config.speech.speed).await;
        session
            .toggle_unique_voices(self.config.speech.rotate_voices)
            .await;

        Ok((session, events))
    }

    /// A speech engine on its own, for commands that never open a page.
    pub fn speech_engine(&self) -> (EspeakEngine, mpsc::Receiver<SpeechEvent>) {
        EspeakEngine::new(&self.config.speech.program)
    }
}
