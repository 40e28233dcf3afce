//! Interview Orchestrator
//!
//! Drives a single interview session through its question, follow-up and
//! feedback loop and closes it with a summary. Each operation renders one
//! prompt from the profile store's templates and the session context, sends it
//! to the generator, and interprets the reply. The generator call is the only
//! suspension point; callers must not run two operations on the same
//! orchestrator concurrently.

use crate::error::{GenerationError, InterviewError, NotFoundError};
use crate::feedback::{FeedbackRecord, ParsedFeedback};
use crate::generator::{GenerationParams, Generator};
use crate::profile::{ProfileStore, normalize_id};
use crate::session::{InterviewState, SessionContext};
use crate::template::TemplateKind;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct InterviewOrchestrator {
    profiles: Arc<ProfileStore>,
    generator: Arc<dyn Generator>,
    state: InterviewState,
    context: SessionContext,
}

impl InterviewOrchestrator {
    /// Creates an orchestrator in the `Init` state with an empty context.
    pub fn new(profiles: Arc<ProfileStore>, generator: Arc<dyn Generator>) -> Self {
        Self {
            profiles,
            generator,
            state: InterviewState::Init,
            context: SessionContext::default(),
        }
    }

    pub fn state(&self) -> InterviewState {
        self.state
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Starts a new session, discarding any previous answers and feedback.
    ///
    /// All ids are normalized. A domain that is not valid for the role is
    /// replaced by the role's first domain. The persona is not checked here;
    /// an unknown persona surfaces when a prompt needs its style.
    pub fn set_profile(
        &mut self,
        role: &str,
        seniority: &str,
        domain: &str,
        persona: &str,
    ) -> Result<(), NotFoundError> {
        let role = normalize_id(role);
        let seniority = normalize_id(seniority);
        let requested_domain = normalize_id(domain);
        let persona = normalize_id(persona);

        let domains = self.profiles.role_domains(&role)?;
        let domain = if domains.contains(&requested_domain) {
            requested_domain
        } else {
            // Non-empty: the store rejects roles without domains at load.
            let fallback = domains[0].clone();
            info!(
                role = %role,
                requested = %requested_domain,
                fallback = %fallback,
                "Domain is not valid for role; using the role's first domain"
            );
            fallback
        };

        info!(%role, %seniority, %domain, %persona, "Interview profile set");
        self.context = SessionContext::new(role, seniority, domain, persona);
        self.state = InterviewState::Question;
        Ok(())
    }

    /// Asks the generator for the next interview question.
    pub async fn next_question(&mut self) -> Result<String, InterviewError> {
        let prompt = self.interviewer_prompt()?;
        let question = self.generate(TemplateKind::Interviewer, &prompt).await?;
        self.state = InterviewState::Followup;
        Ok(question)
    }

    /// Records `last_answer` and asks the generator for a follow-up.
    ///
    /// The answer is recorded before the prompt is built, so it is kept even
    /// when the follow-up cannot be produced.
    pub async fn followup(&mut self, last_answer: &str) -> Result<String, InterviewError> {
        self.context.answers.push(last_answer.to_string());
        let prompt = self.render(TemplateKind::Followup, Some(last_answer))?;
        let reply = self.generate(TemplateKind::Followup, &prompt).await?;
        self.state = InterviewState::Feedback;
        Ok(reply)
    }

    /// Scores `last_answer`.
    ///
    /// A reply that is not a JSON feedback object is kept as raw text on the
    /// record; strengths and improvements then come from the rubric.
    pub async fn feedback(&mut self, last_answer: &str) -> Result<FeedbackRecord, InterviewError> {
        let prompt = self.render(TemplateKind::Feedback, Some(last_answer))?;
        let response = self.generate(TemplateKind::Feedback, &prompt).await?;

        let parsed = ParsedFeedback::parse(&response);
        if let ParsedFeedback::Raw(text) = &parsed {
            warn!(response_len = text.len(), "Feedback response was not structured; keeping it raw");
        }
        let record = parsed.into_record(
            self.profiles.strength_defaults(),
            self.profiles.improvement_defaults(),
        );

        self.context.feedback.push(record.clone());
        self.state = InterviewState::Question;
        Ok(record)
    }

    /// Asks the generator for a closing summary of the session.
    ///
    /// The prompt is a pure function of the context, so repeated calls send
    /// identical prompts.
    pub async fn summary(&mut self) -> Result<String, InterviewError> {
        let prompt = self.render(TemplateKind::Summary, None)?;
        let summary = self.generate(TemplateKind::Summary, &prompt).await?;
        self.state = InterviewState::End;
        Ok(summary)
    }

    /// The prompt `next_question` would send for the current context.
    pub fn interviewer_prompt(&self) -> Result<String, NotFoundError> {
        self.render(TemplateKind::Interviewer, None)
    }

    fn params(&self) -> GenerationParams {
        GenerationParams::for_persona(&self.context.persona)
    }

    async fn generate(&self, kind: TemplateKind, prompt: &str) -> Result<String, GenerationError> {
        debug!(template = %kind, state = %self.state, prompt_len = prompt.len(), "Calling generator");
        self.generator.generate(prompt, &self.params()).await
    }

    /// Renders `kind`, looking up only the catalog entries its template uses.
    fn render(&self, kind: TemplateKind, answer: Option<&str>) -> Result<String, NotFoundError> {
        let template = self.profiles.template(kind);
        let ctx = &self.context;

        let mut values: HashMap<&'static str, String> = HashMap::from([
            ("role", ctx.role.clone()),
            ("seniority", ctx.seniority.clone()),
            ("domain", ctx.domain.clone()),
            ("persona", ctx.persona.clone()),
        ]);
        if let Some(answer) = answer {
            values.insert("answer", answer.to_string());
        }

        for key in template.placeholders() {
            match key {
                "persona_style" if !values.contains_key(key) => {
                    let style = self.profiles.persona_style(&ctx.persona)?;
                    values.insert("persona_style", style.to_string());
                }
                "technical_axes" if !values.contains_key(key) => {
                    let axes = self.profiles.role_axes(&ctx.role)?;
                    values.insert("technical_axes", axes.join(", "));
                }
                "question_seeds" if !values.contains_key(key) => {
                    let seeds = self.profiles.question_seeds(&ctx.role)?;
                    values.insert("question_seeds", seeds.join("; "));
                }
                "answer_count" => {
                    values.insert("answer_count", ctx.answers.len().to_string());
                }
                "answers" => {
                    values.insert("answers", numbered(&ctx.answers));
                }
                "feedback" => {
                    let rendered: Vec<String> = ctx.feedback.iter().map(FeedbackRecord::render).collect();
                    values.insert("feedback", numbered(&rendered));
                }
                "average_scores" => {
                    values.insert("average_scores", format_scores(&ctx.average_scores()));
                }
                _ => {}
            }
        }

        Ok(template.render(&values))
    }
}

fn numbered(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_scores(scores: &std::collections::BTreeMap<String, f64>) -> String {
    if scores.is_empty() {
        return "(no scores)".to_string();
    }
    scores
        .iter()
        .map(|(axis, score)| format!("{axis}: {score:.1}"))
        .collect::<Vec<_>>()
        .join(", ")
}
