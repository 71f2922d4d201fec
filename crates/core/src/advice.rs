//! Questionnaire in, plan and ticker picks out.
//!
//! The plan is pure and always produced for valid input. Recommendations depend on the
//! market data feed; when the feed misbehaves they are reported as unavailable and the
//! plan is still returned.

use crate::config::Settings;
use crate::domain::allocation::{AllocationBand, AllocationPlan};
use crate::domain::mortality::Horizon;
use crate::domain::questionnaire::{InputError, Questionnaire, Submission};
use crate::domain::recommendation::Recommendations;
use crate::market::{HttpChartGateway, MarketDataGateway};
use crate::recommend::{Ranker, RecommendationOutcome, RecommendationTask};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub submission: Submission,
    pub horizon: Horizon,
    pub band: AllocationBand,
    pub plan: AllocationPlan,
}

pub fn assess(questionnaire: Questionnaire) -> Result<Assessment, InputError> {
    let submission = questionnaire.validate()?;
    let horizon = Horizon::for_person(submission.person);
    let band = AllocationBand::for_years_left(horizon.years_left);

    tracing::debug!(
        age = submission.person.age,
        gender = %submission.person.gender,
        age_bracket = horizon.age_bracket,
        years_left = horizon.years_left,
        ?band,
        "assessed questionnaire"
    );

    Ok(Assessment {
        submission,
        horizon,
        band,
        plan: band.plan(),
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationStatus {
    Available(Recommendations),
    Unavailable { reason: String },
    NotRequested,
}

impl From<RecommendationOutcome> for RecommendationStatus {
    fn from(outcome: RecommendationOutcome) -> Self {
        match outcome {
            RecommendationOutcome::Ready(recs) if !recs.is_empty() => Self::Available(recs),
            other => Self::Unavailable {
                reason: other.unavailable_reason().unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Advice {
    pub assessment: Assessment,
    pub recommendations: RecommendationStatus,
}

impl Advice {
    pub fn without_recommendations(assessment: Assessment) -> Self {
        Self {
            assessment,
            recommendations: RecommendationStatus::NotRequested,
        }
    }
}

#[derive(Clone)]
pub struct Advisor {
    ranker: Arc<Ranker>,
    timeout: Duration,
    provider_name: &'static str,
}

impl Advisor {
    pub fn new(gateway: Arc<dyn MarketDataGateway>, timeout: Duration) -> Self {
        let provider_name = gateway.provider_name();
        Self {
            ranker: Arc::new(Ranker::new(gateway)),
            timeout,
            provider_name,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let gateway = HttpChartGateway::from_settings(settings)?;
        Ok(Self::new(Arc::new(gateway), settings.recommendation_timeout))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }

    /// Starts ranking in the background; the caller decides when to await or cancel.
    pub fn start_recommendations(&self) -> RecommendationTask {
        RecommendationTask::spawn(Arc::clone(&self.ranker), self.timeout)
    }

    /// Input is validated before any market data is requested.
    pub async fn advise(&self, questionnaire: Questionnaire) -> Result<Advice, InputError> {
        let assessment = assess(questionnaire)?;
        let outcome = self.start_recommendations().outcome().await;
        let recommendations = RecommendationStatus::from(outcome);

        if let RecommendationStatus::Unavailable { reason } = &recommendations {
            tracing::warn!(provider = self.provider_name, %reason, "recommendations unavailable");
        }

        Ok(Advice {
            assessment,
            recommendations,
        })
    }
}
