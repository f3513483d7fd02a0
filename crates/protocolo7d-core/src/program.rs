//! Application root: owns the session, the progress cache and the backend
//! client, and runs the flows the screens trigger.
//!
//! Every flow validates input before the first request, issues its requests
//! one after another, and only touches local state once the backend agreed.

use serde::Serialize;
use thiserror::Error;

use crate::api::{ApiClient, UserProfile};
use crate::auth::AuthState;
use crate::clean_time;
use crate::error::{NetworkError, StoreError, ValidationError};
use crate::progress::{ProgressPatch, ProgressSnapshot, ProgressState, ToolAnswers};
use crate::steps::{self, StepDefinition, LOCKED_STEP_NOTICE, STEPS};
use crate::storage::KeyValueStore;

/// Minimum length of the onboarding target, after trimming.
pub const MIN_TARGET_LEN: usize = 3;
/// Maximum length of the onboarding target, after trimming.
pub const MAX_TARGET_LEN: usize = 200;

/// Which screen the user belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Onboarding,
    Dashboard,
}

/// What the user was doing when a request failed; picks the dialog text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Onboarding,
    LoadDashboard,
    LoadStep,
    CompleteStep,
}

#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{source}")]
    Network {
        action: Action,
        #[source]
        source: NetworkError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("not signed in")]
    NotSignedIn,

    #[error("no such step: {0}")]
    UnknownStep(u32),

    #[error("step {0} is locked")]
    StepLocked(u32),
}

/// Title and body of the dialog shown for an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogMessage {
    pub title: &'static str,
    pub body: String,
}

impl FlowError {
    fn network(action: Action) -> impl FnOnce(NetworkError) -> FlowError {
        move |source| FlowError::Network { action, source }
    }

    pub fn user_message(&self) -> DialogMessage {
        let (title, body) = match self {
            FlowError::Validation(ValidationError::InvalidEmail(_)) => {
                ("Erro", "Por favor, insira um e-mail válido")
            }
            FlowError::Validation(ValidationError::TargetTooShort { .. }) => {
                ("Atenção", "Por favor, descreva o vício que você vai destruir.")
            }
            FlowError::Validation(ValidationError::TargetTooLong { .. }) => (
                "Atenção",
                "Descreva o vício em no máximo 200 caracteres.",
            ),
            FlowError::Validation(ValidationError::MissingAnswers { .. }) => {
                ("Atenção", "Preencha todos os campos para completar este dia.")
            }
            FlowError::Network { action, .. } => match action {
                Action::Login => (
                    "Erro de Conexão",
                    "Não foi possível conectar ao servidor. Verifique sua conexão.",
                ),
                Action::Onboarding => (
                    "Erro",
                    "Não foi possível salvar seus dados. Tente novamente.",
                ),
                Action::LoadDashboard | Action::LoadStep => {
                    ("Erro", "Não foi possível carregar seus dados.")
                }
                Action::CompleteStep => ("Erro", "Não foi possível salvar seu progresso."),
            },
            FlowError::Store(_) => (
                "Erro",
                "Não foi possível salvar a sessão neste dispositivo.",
            ),
            FlowError::NotSignedIn => ("Erro", "Sessão expirada. Faça login novamente."),
            FlowError::UnknownStep(_) => ("Erro", "Dia não encontrado."),
            FlowError::StepLocked(_) => ("🔒 Conteúdo Bloqueado", LOCKED_STEP_NOTICE),
        };
        DialogMessage {
            title,
            body: body.to_string(),
        }
    }
}

/// One row of the dashboard's step grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepCard {
    pub index: u32,
    pub title: &'static str,
    pub icon: &'static str,
    pub points: u32,
    pub locked: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub profile: UserProfile,
    pub progress: ProgressSnapshot,
    pub steps: Vec<StepCard>,
    /// Formatted clean time, when the streak has started.
    pub clean_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub definition: &'static StepDefinition,
    pub completed: bool,
    /// Answers saved earlier, used to prefill the tool.
    pub answers: ToolAnswers,
}

/// Outcome of a successful step completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepCompletion {
    pub step: u32,
    pub points: u32,
    pub new_badges: Vec<String>,
    pub already_completed: bool,
    /// The free part of the program is over; show the paywall next.
    pub shows_paywall: bool,
}

pub struct Program<S: KeyValueStore> {
    auth: AuthState<S>,
    progress: ProgressState,
    api: ApiClient,
}

impl<S: KeyValueStore> Program<S> {
    pub fn new(store: S, api: ApiClient) -> Self {
        Self {
            auth: AuthState::new(store),
            progress: ProgressState::new(),
            api,
        }
    }

    pub fn auth(&self) -> &AuthState<S> {
        &self.auth
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Pick up a stored session and decide where to go.
    pub fn start(&mut self) -> Route {
        self.auth.restore();
        self.route()
    }

    pub fn route(&self) -> Route {
        match self.auth.email() {
            None => Route::Login,
            Some(_) if !self.auth.is_onboarded() => Route::Onboarding,
            Some(_) => Route::Dashboard,
        }
    }

    fn require_email(&self) -> Result<String, FlowError> {
        self.auth
            .email()
            .map(str::to_string)
            .ok_or(FlowError::NotSignedIn)
    }

    /// Sign in with whatever the user typed.
    ///
    /// # Errors
    /// Validation errors make no request; network and store errors are
    /// reported as-is.
    pub async fn login(&mut self, input: &str) -> Result<Route, FlowError> {
        let email = input.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ValidationError::InvalidEmail(input.to_string()).into());
        }

        let resp = self
            .api
            .login(&email)
            .await
            .map_err(FlowError::network(Action::Login))?;

        self.auth.sign_in(&email, resp.has_onboarding)?;
        tracing::info!(%email, new_account = resp.is_new, "signed in");
        Ok(self.route())
    }

    /// Record the habit the user wants to break.
    ///
    /// # Errors
    /// Fails without a request when the target is too short or nobody is
    /// signed in.
    pub async fn complete_onboarding(&mut self, target: &str) -> Result<(), FlowError> {
        let target = target.trim();
        let len = target.chars().count();
        if len < MIN_TARGET_LEN {
            return Err(ValidationError::TargetTooShort {
                min_len: MIN_TARGET_LEN,
            }
            .into());
        }
        if len > MAX_TARGET_LEN {
            return Err(ValidationError::TargetTooLong {
                max_len: MAX_TARGET_LEN,
            }
            .into());
        }
        let email = self.require_email()?;

        self.api
            .complete_onboarding(&email, target)
            .await
            .map_err(FlowError::network(Action::Onboarding))?;

        self.auth.set_onboarding_complete(true)?;
        tracing::info!(%email, "onboarding complete");
        Ok(())
    }

    /// Fetch profile and progress together and refresh the cache.
    ///
    /// # Errors
    /// Fails if nobody is signed in or either request fails; the cache is
    /// left alone in that case.
    pub async fn load_dashboard(&mut self) -> Result<Dashboard, FlowError> {
        let email = self.require_email()?;

        let (profile, progress) =
            tokio::join!(self.api.get_user(&email), self.api.get_progress(&email));
        let profile = profile.map_err(FlowError::network(Action::LoadDashboard))?;
        let progress = progress.map_err(FlowError::network(Action::LoadDashboard))?;

        self.progress.replace_all(progress);
        Ok(self.dashboard(profile))
    }

    fn dashboard(&self, profile: UserProfile) -> Dashboard {
        let snapshot = self.progress.snapshot().clone();
        let clean_time = snapshot
            .clean_streak_start
            .as_deref()
            .and_then(|raw| clean_time::describe(raw, chrono::Utc::now()));
        let steps = STEPS
            .iter()
            .map(|s| StepCard {
                index: s.index,
                title: s.title,
                icon: s.icon,
                points: s.points,
                locked: s.locked,
                completed: self.progress.is_step_complete(s.index),
            })
            .collect();
        Dashboard {
            profile,
            progress: snapshot,
            steps,
            clean_time,
        }
    }

    fn playable_step(step: u32) -> Result<&'static StepDefinition, FlowError> {
        let definition = steps::step(step).ok_or(FlowError::UnknownStep(step))?;
        if definition.locked {
            return Err(FlowError::StepLocked(step));
        }
        Ok(definition)
    }

    /// Load a step's detail view with any previously saved answers.
    ///
    /// # Errors
    /// Locked and unknown steps fail without a request.
    pub async fn open_step(&mut self, step: u32) -> Result<StepView, FlowError> {
        let definition = Self::playable_step(step)?;
        let email = self.require_email()?;

        let progress = self
            .api
            .get_progress(&email)
            .await
            .map_err(FlowError::network(Action::LoadStep))?;
        self.progress.replace_all(progress);

        Ok(StepView {
            definition,
            completed: self.progress.is_step_complete(step),
            answers: self.progress.answers_for(step).cloned().unwrap_or_default(),
        })
    }

    /// Save the tool answers, then complete the step.
    ///
    /// The two requests are not atomic: if saving succeeds and completing
    /// fails, the answers are stored but the step stays open. Retrying sends
    /// both again.
    ///
    /// # Errors
    /// Validation failures make no request. A failed request leaves the
    /// cache untouched.
    pub async fn complete_step(
        &mut self,
        step: u32,
        answers: ToolAnswers,
    ) -> Result<StepCompletion, FlowError> {
        let definition = Self::playable_step(step)?;
        definition.validate_answers(&answers)?;
        let email = self.require_email()?;

        self.api
            .save_tool_answers(&email, step, &answers)
            .await
            .map_err(FlowError::network(Action::CompleteStep))?;
        let resp = self
            .api
            .complete_step(&email, step, definition.points)
            .await
            .map_err(FlowError::network(Action::CompleteStep))?;

        self.progress.mark_step_complete(step);
        if !resp.newly_earned_badges.is_empty() {
            let mut badges = self.progress.snapshot().badges.clone();
            badges.extend(resp.newly_earned_badges.iter().cloned());
            self.progress.replace_all(ProgressPatch {
                badges: Some(badges),
                ..Default::default()
            });
        }
        tracing::info!(
            %email,
            step,
            badges = ?resp.newly_earned_badges,
            already_completed = resp.already_completed,
            "step complete"
        );

        Ok(StepCompletion {
            step,
            points: definition.points,
            new_badges: resp.newly_earned_badges,
            already_completed: resp.already_completed,
            shows_paywall: definition.content.is_some_and(|c| c.ends_free_tier),
        })
    }

    /// Forget the session and drop cached progress.
    ///
    /// # Errors
    /// Returns an error if the stored session cannot be removed.
    pub fn logout(&mut self) -> Result<(), FlowError> {
        self.auth.clear()?;
        self.progress.reset_all();
        Ok(())
    }
}
