//! Run orchestration: one invocation walks
//! `Fetching → Normalizing → Building → (NoActivity | Generating) → Publishing → Done`,
//! and any component failure lands in `Failed(kind)` without posting anything.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use super::deliver::Publisher;
use super::summarize::SummaryGenerator;
use crate::ai::build_context;
use crate::core::capabilities::{ChannelHistory, MessagePoster, SummaryModel};
use crate::core::config::AppConfig;
use crate::core::models::{SummaryResult, TimeWindow};
use crate::errors::{ErrorKind, PipelineError};
use crate::slack::ChannelHistoryFetcher;
use crate::utils::filters::normalize_all;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Fetching,
    Normalizing,
    Building,
    NoActivity,
    Generating,
    Publishing,
    Done,
    Failed(ErrorKind),
}

/// Ephemeral record of a single invocation.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub window: TimeWindow,
    transitions: Vec<PipelineState>,
}

impl PipelineRun {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            window: TimeWindow::trailing_day(now),
            transitions: vec![PipelineState::Fetching],
        }
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(PipelineState::Fetching)
    }

    /// Every state visited, in order.
    #[must_use]
    pub fn transitions(&self) -> &[PipelineState] {
        &self.transitions
    }

    fn enter(&mut self, state: PipelineState) {
        info!("Pipeline state {:?} -> {:?}", self.state(), state);
        self.transitions.push(state);
    }
}

/// Terminal record handed back to the invoking environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state")]
pub enum RunOutcome {
    Done { published: bool, no_activity: bool },
    Failed { kind: ErrorKind, message: String },
}

impl RunOutcome {
    #[must_use]
    pub fn failed(error: &PipelineError) -> Self {
        RunOutcome::Failed {
            kind: error.kind(),
            message: error.message().to_string(),
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

pub struct Pipeline<'a> {
    config: &'a AppConfig,
    history: &'a dyn ChannelHistory,
    model: &'a dyn SummaryModel,
    poster: &'a dyn MessagePoster,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(
        config: &'a AppConfig,
        history: &'a dyn ChannelHistory,
        model: &'a dyn SummaryModel,
        poster: &'a dyn MessagePoster,
    ) -> Self {
        Self {
            config,
            history,
            model,
            poster,
        }
    }

    /// Execute one run covering the 24 hours before `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> (PipelineRun, RunOutcome) {
        let mut run = PipelineRun::new(now);
        let span = info_span!(
            "standup_run",
            run_id = %run.run_id,
            channel = %self.config.channel_id
        );

        let result = self.execute(&mut run, now).instrument(span).await;
        let outcome = match result {
            Ok(result) => {
                run.enter(PipelineState::Done);
                let no_activity = matches!(result, SummaryResult::NoActivity);
                info!(
                    "Stand-up run {} finished (no_activity: {})",
                    run.run_id, no_activity
                );
                RunOutcome::Done {
                    published: true,
                    no_activity,
                }
            }
            Err(e) => {
                run.enter(PipelineState::Failed(e.kind()));
                error!("Stand-up run {} failed: {}", run.run_id, e);
                RunOutcome::failed(&e)
            }
        };

        (run, outcome)
    }

    async fn execute(
        &self,
        run: &mut PipelineRun,
        now: DateTime<Utc>,
    ) -> Result<SummaryResult, PipelineError> {
        let channel_id = self.config.channel_id.as_str();
        let date = now.with_timezone(&self.config.timezone).date_naive();

        let fetcher = ChannelHistoryFetcher::new(self.history);
        let raw = fetcher.fetch_chronological(channel_id, run.window).await?;

        run.enter(PipelineState::Normalizing);
        let units = normalize_all(&raw);
        info!("Normalized {} of {} messages", units.len(), raw.len());

        run.enter(PipelineState::Building);
        let context = build_context(units, self.config.summary_budget);

        let result = if context.is_empty() {
            run.enter(PipelineState::NoActivity);
            SummaryResult::NoActivity
        } else {
            run.enter(PipelineState::Generating);
            SummaryGenerator::new(
                self.model,
                self.config.model_timeout,
                self.config.generation_retries,
            )
            .generate(&context, channel_id, date, self.config.timezone)
            .await?
        };

        run.enter(PipelineState::Publishing);
        Publisher::new(self.poster)
            .publish(channel_id, date, &result)
            .await?;

        Ok(result)
    }
}
