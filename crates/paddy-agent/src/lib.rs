// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation dispatcher for the Paddy survey bot.
//!
//! [`SurveyBot`] is the central coordinator that:
//! - Receives events from a channel adapter
//! - Keeps one survey [`Session`] per conversation
//! - Resolves the region for shared locations
//! - Delivers the prompts each transition produces
//! - Hands photos to the upload queue and completed surveys to the log sink
//! - Drains background work on shutdown

pub mod shutdown;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use paddy_core::PaddyError;
use paddy_core::traits::ChannelAdapter;
use paddy_core::types::{ConversationId, EventKind, InboundEvent};
use paddy_geo::LazyRegionResolver;
use paddy_survey::{
    Effect, EventContext, Outcome, Session, SurveyMachine, SurveyRecord, SurveyState,
};
use paddy_upload::{SurveyLogSink, UploadQueue};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Everything the dispatcher talks to, built once at startup.
pub struct Services {
    pub channel: Arc<dyn ChannelAdapter>,
    pub machine: SurveyMachine,
    pub regions: Arc<LazyRegionResolver>,
    pub uploads: Arc<UploadQueue>,
    pub survey_log: Arc<SurveyLogSink>,
}

/// Routes channel events through the survey machine.
///
/// Events are handled one at a time in arrival order. Photo transfers and
/// survey log writes run in the background so a slow drive never holds up
/// the conversation.
pub struct SurveyBot {
    services: Services,
    sessions: HashMap<ConversationId, Session>,
    jobs: TaskTracker,
    drain_timeout: Duration,
}

impl SurveyBot {
    pub fn new(services: Services, drain_timeout: Duration) -> Self {
        Self {
            services,
            sessions: HashMap::new(),
            jobs: TaskTracker::new(),
            drain_timeout,
        }
    }

    /// Number of conversations with survey state.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn session(&self, conversation: ConversationId) -> Option<&Session> {
        self.sessions.get(&conversation)
    }

    /// Runs until `cancel` fires or the channel closes, then drains.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), PaddyError> {
        info!("survey bot running");

        loop {
            tokio::select! {
                event = self.services.channel.receive() => {
                    match event {
                        Ok(event) => self.handle_event(event).await,
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            break;
                        }
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping survey bot");
                    break;
                }
            }
        }

        shutdown::drain(&self.services.uploads, &self.jobs, self.drain_timeout).await;
        info!("survey bot stopped");
        Ok(())
    }

    /// Handles one inbound event end to end.
    pub async fn handle_event(&mut self, event: InboundEvent) {
        if let EventKind::Callback { callback_id, .. } = &event.kind
            && let Err(e) = self.services.channel.acknowledge(callback_id).await
        {
            debug!(error = %e, "failed to acknowledge button press");
        }

        let conversation = event.conversation;
        let session = self
            .sessions
            .entry(conversation)
            .or_insert_with(|| Session::new(conversation));

        let mut ctx = EventContext::now();
        if let EventKind::Location {
            latitude,
            longitude,
        } = event.kind
            && session.awaiting_location()
        {
            ctx = ctx.with_region(resolve_region(&self.services.regions, latitude, longitude).await);
        }

        let transition = self.services.machine.handle(session, &event, &ctx);
        if transition.outcome == Outcome::Ended || session.state == SurveyState::Idle {
            self.sessions.remove(&conversation);
        }

        for prompt in transition.prompts {
            if let Err(e) = self.services.channel.send(prompt).await {
                error!(conversation = %conversation, error = %e, "failed to deliver prompt");
            }
        }

        for effect in transition.effects {
            self.run_effect(effect).await;
        }
    }

    async fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::EnqueueUpload(upload) => {
                let file_name = upload.file_name.clone();
                if let Err(e) = self.services.uploads.enqueue(upload).await {
                    error!(photo = %file_name, error = %e, "failed to queue photo");
                }
            }
            Effect::PersistSurvey(record) => {
                let sink = self.services.survey_log.clone();
                self.jobs.spawn(persist_survey(sink, record));
            }
        }
    }
}

async fn resolve_region(regions: &LazyRegionResolver, latitude: f64, longitude: f64) -> Option<String> {
    match regions.resolve(latitude, longitude).await {
        Ok(Some(region)) => Some(region),
        Ok(None) => {
            debug!(latitude, longitude, "location outside known regions");
            None
        }
        Err(e) => {
            warn!(error = %e, "region lookup unavailable");
            None
        }
    }
}

async fn persist_survey(sink: Arc<SurveyLogSink>, record: SurveyRecord) {
    match sink.record(&record).await {
        Ok(remote) => debug!(file_id = %remote.id, "survey log synced"),
        Err(e) => error!(
            user_id = record.user_id.0,
            farm_number = record.answers.farm_number,
            error = %e,
            "failed to record survey"
        ),
    }
}
