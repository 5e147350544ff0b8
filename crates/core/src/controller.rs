//! The interview session controller.
//!
//! One inbound user message produces at most one state transition and
//! exactly one outbound [`Directive`]. The controller owns the session for
//! its lifetime; question sourcing and grading are delegated to the
//! collaborator traits, each retried once on failure and degraded
//! gracefully after that.

use crate::Directive;
use crate::bank::{QuestionBank, QuestionQuery};
use crate::classify::{self, UserIntent};
use crate::cv::{self, CvUpload};
use crate::domain::Domain;
use crate::grading::{Grade, Grader};
use crate::question::Question;
use crate::report::{FeedbackReport, ScoringPolicy};
use crate::safety;
use crate::session::{InterviewMode, Session, SessionPhase};
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

const MODE_PROMPT: &str = "Welcome to your MBA mock interview. Would you like a CV-based interview or a domain-based interview? At any time you can stop and receive your consolidated feedback by typing END INTERVIEW.";
const CV_PROMPT: &str = "Please upload your CV as a PDF or image file (JPG, PNG) up to 10 MB to begin the CV-based interview.";
const DOMAIN_REPROMPT: &str = "Please choose one of the listed domains: Marketing, Finance, Operations & General Management, or Consulting.";
const TOPIC_REPROMPT: &str = "Please choose one of the offered topics, or Generic for questions across the whole domain.";
const NO_MORE_QUESTIONS: &str = "There are no more questions available for this selection. You can change your domain or topic, or type END INTERVIEW to receive your feedback.";
const SESSION_OVER: &str = "This interview has ended. Please start a new session to continue practising.";

fn plain(text: impl Into<String>) -> Directive {
    Directive::Plain { text: text.into() }
}

fn ask_directive(question: &Question) -> Directive {
    // Multiple choice only when the corpus stores the question that way;
    // open-ended questions are never reshaped.
    if question.is_multiple_choice() {
        Directive::AskMcq {
            question_id: question.id.clone(),
            text: question.text.clone(),
            options: question.options.clone(),
        }
    } else {
        Directive::AskQuestion {
            text: question.text.clone(),
            citation: question.citation.clone(),
        }
    }
}

fn parse_mode_choice(choice: &str) -> Option<InterviewMode> {
    let normalized = choice.to_lowercase();
    if normalized.contains("cv") || normalized.contains("resume") {
        Some(InterviewMode::CvBased)
    } else if normalized.contains("domain") {
        Some(InterviewMode::DomainBased)
    } else {
        None
    }
}

fn build_query(session: &Session) -> Option<QuestionQuery> {
    match session.mode? {
        InterviewMode::CvBased => session.cv.clone().map(QuestionQuery::Cv),
        InterviewMode::DomainBased => {
            let domain = session.selected_domain?;
            let topic = session
                .selected_topic
                .clone()
                .filter(|t| !t.eq_ignore_ascii_case("generic"));
            Some(QuestionQuery::DomainTopic { domain, topic })
        }
    }
}

pub struct SessionController {
    bank: Arc<dyn QuestionBank>,
    grader: Arc<dyn Grader>,
    policy: ScoringPolicy,
}

impl SessionController {
    pub fn new(bank: Arc<dyn QuestionBank>, grader: Arc<dyn Grader>, policy: ScoringPolicy) -> Self {
        Self {
            bank,
            grader,
            policy,
        }
    }

    /// Opening directive for a freshly created session.
    pub fn begin(&self, session: &Session) -> Directive {
        match session.phase {
            SessionPhase::DomainSelect => self.domain_selector(),
            SessionPhase::ModeSelect if session.mode == Some(InterviewMode::CvBased) => {
                plain(CV_PROMPT)
            }
            _ => plain(MODE_PROMPT),
        }
    }

    /// Classifies one inbound message and applies the resulting transition.
    #[instrument(skip_all, fields(session_id = %session.id, phase = ?session.phase))]
    pub async fn handle_message(&self, session: &mut Session, text: &str) -> Result<Directive> {
        match session.phase {
            SessionPhase::Terminated => return Ok(plain(SESSION_OVER)),
            SessionPhase::SafetyStopped => return Ok(plain(safety::HELPLINE_MESSAGE)),
            _ => {}
        }

        match classify::classify(text, session) {
            UserIntent::SafetyStop => {
                warn!("danger content detected; stopping the interview");
                session.discard_pending();
                session.phase = SessionPhase::SafetyStopped;
                Ok(plain(safety::HELPLINE_MESSAGE))
            }
            UserIntent::Terminate => {
                if session.discard_pending().is_some() {
                    info!("pending question discarded unscored at termination");
                }
                session.phase = SessionPhase::Terminated;
                let report = FeedbackReport::from_session(session, &self.policy);
                info!(
                    total_questions = report.total_questions,
                    accuracy = report.accuracy,
                    "interview terminated"
                );
                Ok(Directive::Report { report })
            }
            UserIntent::ChangeDomain(target) => self.change_domain(session, target).await,
            UserIntent::ChangeTopic(target) => self.change_topic(session, target).await,
            UserIntent::SwitchMode(mode) => self.switch_mode(session, mode).await,
            UserIntent::Answer(answer) => self.record_and_advance(session, &answer).await,
            UserIntent::Selection(choice) => self.apply_selection(session, &choice).await,
            UserIntent::Other => Ok(self.reprompt(session)),
        }
    }

    /// Validates a CV artifact and, when accepted, enters questioning.
    ///
    /// A rejected upload is a protocol outcome, not an error: the session is
    /// left where it was and the user is told why.
    #[instrument(skip_all, fields(session_id = %session.id))]
    pub async fn handle_cv_upload(
        &self,
        session: &mut Session,
        upload: &CvUpload,
    ) -> Result<Directive> {
        match session.phase {
            SessionPhase::Terminated => return Ok(plain(SESSION_OVER)),
            SessionPhase::SafetyStopped => return Ok(plain(safety::HELPLINE_MESSAGE)),
            _ => {}
        }
        if session.cv.is_some() {
            return Ok(plain(
                cv::CvValidationError::AlreadyUploaded.to_string(),
            ));
        }
        match cv::validate(upload) {
            Ok(profile) => {
                info!(
                    filename = %profile.filename,
                    size_bytes = profile.size_bytes,
                    "cv accepted"
                );
                session.discard_pending();
                session.cv = Some(profile);
                session.mode = Some(InterviewMode::CvBased);
                self.enter_questioning(session).await
            }
            Err(err) => {
                warn!(error = %err, filename = %upload.filename, "cv rejected");
                Ok(plain(err.to_string()))
            }
        }
    }

    async fn change_domain(
        &self,
        session: &mut Session,
        target: Option<String>,
    ) -> Result<Directive> {
        session.discard_pending();
        session.mode = Some(InterviewMode::DomainBased);
        session.clear_domain();
        session.phase = SessionPhase::DomainSelect;
        match target {
            Some(input) => self.select_domain(session, &input).await,
            None => Ok(self.domain_selector()),
        }
    }

    async fn change_topic(
        &self,
        session: &mut Session,
        target: Option<String>,
    ) -> Result<Directive> {
        session.discard_pending();
        let Some(domain) = session.selected_domain else {
            // No topic without a domain; restart from domain selection.
            session.mode = Some(InterviewMode::DomainBased);
            session.phase = SessionPhase::DomainSelect;
            return Ok(self.domain_selector());
        };
        session.selected_topic = None;
        session.phase = SessionPhase::TopicSelect;
        match target {
            Some(input) => self.select_topic(session, domain, &input).await,
            None => Ok(self.topic_selector(domain).await),
        }
    }

    async fn switch_mode(&self, session: &mut Session, mode: InterviewMode) -> Result<Directive> {
        session.discard_pending();
        session.mode = Some(mode);
        match mode {
            InterviewMode::CvBased => {
                if session.cv.is_some() {
                    self.enter_questioning(session).await
                } else {
                    session.phase = SessionPhase::ModeSelect;
                    Ok(plain(CV_PROMPT))
                }
            }
            InterviewMode::DomainBased => {
                match (session.selected_domain, session.selected_topic.is_some()) {
                    (Some(_), true) => self.enter_questioning(session).await,
                    (Some(domain), false) => {
                        session.phase = SessionPhase::TopicSelect;
                        Ok(self.topic_selector(domain).await)
                    }
                    (None, _) => {
                        session.phase = SessionPhase::DomainSelect;
                        Ok(self.domain_selector())
                    }
                }
            }
        }
    }

    async fn apply_selection(&self, session: &mut Session, choice: &str) -> Result<Directive> {
        match session.phase {
            SessionPhase::ModeSelect => match parse_mode_choice(choice) {
                Some(InterviewMode::CvBased) => {
                    session.mode = Some(InterviewMode::CvBased);
                    if session.cv.is_some() {
                        self.enter_questioning(session).await
                    } else {
                        Ok(plain(CV_PROMPT))
                    }
                }
                Some(InterviewMode::DomainBased) => {
                    session.mode = Some(InterviewMode::DomainBased);
                    session.phase = SessionPhase::DomainSelect;
                    Ok(self.domain_selector())
                }
                None => Ok(plain(MODE_PROMPT)),
            },
            SessionPhase::DomainSelect => self.select_domain(session, choice).await,
            SessionPhase::TopicSelect => match session.selected_domain {
                Some(domain) => self.select_topic(session, domain, choice).await,
                None => {
                    session.phase = SessionPhase::DomainSelect;
                    Ok(self.domain_selector())
                }
            },
            _ => Ok(self.reprompt(session)),
        }
    }

    async fn select_domain(&self, session: &mut Session, input: &str) -> Result<Directive> {
        let labels = Domain::labels();
        match classify::resolve_choice(input, &labels) {
            Some(idx) => {
                let domain = Domain::ALL[idx];
                info!(%domain, "domain selected");
                session.set_domain(domain);
                session.phase = SessionPhase::TopicSelect;
                Ok(self.topic_selector(domain).await)
            }
            None => Ok(plain(DOMAIN_REPROMPT)),
        }
    }

    async fn select_topic(
        &self,
        session: &mut Session,
        domain: Domain,
        input: &str,
    ) -> Result<Directive> {
        let topics = self.topics_for(domain).await;
        match classify::resolve_choice(input, &topics) {
            Some(idx) => {
                let topic = topics[idx].clone();
                info!(%domain, %topic, "topic selected");
                session.selected_topic = Some(topic);
                self.enter_questioning(session).await
            }
            None => Ok(plain(TOPIC_REPROMPT)),
        }
    }

    async fn enter_questioning(&self, session: &mut Session) -> Result<Directive> {
        session.phase = SessionPhase::Questioning;
        self.issue_next(session).await
    }

    async fn record_and_advance(&self, session: &mut Session, answer: &str) -> Result<Directive> {
        let Some(question) = session.discard_pending() else {
            return Ok(self.reprompt(session));
        };
        let grade = match self.grade_with_retry(&question, answer).await {
            Ok(grade) => grade.normalized(),
            Err(err) => {
                error!(
                    error = ?err,
                    question_id = %question.id,
                    "grading failed after retry; recording score 0"
                );
                Grade::ungraded()
            }
        };
        info!(
            question_id = %question.id,
            score = grade.score,
            is_correct = grade.is_correct,
            "answer recorded"
        );
        session.record_answer(question, answer.to_string(), grade);
        self.issue_next(session).await
    }

    async fn issue_next(&self, session: &mut Session) -> Result<Directive> {
        let query = match build_query(session) {
            Some(query) => query,
            None => return Ok(self.reprompt(session)),
        };
        match self.next_with_retry(&query, session).await {
            Some(question) => {
                info!(
                    question_id = %question.id,
                    multiple_choice = question.is_multiple_choice(),
                    "question issued"
                );
                let directive = ask_directive(&question);
                session.issue(question);
                Ok(directive)
            }
            None => Ok(plain(NO_MORE_QUESTIONS)),
        }
    }

    async fn grade_with_retry(&self, question: &Question, answer: &str) -> Result<Grade> {
        match self.grader.grade(question, answer).await {
            Ok(grade) => Ok(grade),
            Err(err) => {
                warn!(error = ?err, question_id = %question.id, "grading failed, retrying once");
                self.grader.grade(question, answer).await
            }
        }
    }

    async fn next_with_retry(&self, query: &QuestionQuery, session: &Session) -> Option<Question> {
        match self.bank.next_question(query, &session.asked).await {
            Ok(question) => question,
            Err(err) => {
                warn!(error = ?err, "question retrieval failed, retrying once");
                match self.bank.next_question(query, &session.asked).await {
                    Ok(question) => question,
                    Err(err) => {
                        error!(error = ?err, "question retrieval failed after retry");
                        None
                    }
                }
            }
        }
    }

    async fn topics_for(&self, domain: Domain) -> Vec<String> {
        let listed = match self.bank.list_topics(domain).await {
            Ok(topics) => topics,
            Err(err) => {
                warn!(error = ?err, %domain, "topic listing failed, retrying once");
                match self.bank.list_topics(domain).await {
                    Ok(topics) => topics,
                    Err(err) => {
                        error!(error = ?err, %domain, "topic listing failed after retry");
                        Vec::new()
                    }
                }
            }
        };
        // "Generic" always leads; the rest comes from the repository.
        let mut topics = vec!["Generic".to_string()];
        topics.extend(
            listed
                .into_iter()
                .filter(|t| !t.eq_ignore_ascii_case("generic")),
        );
        topics
    }

    fn domain_selector(&self) -> Directive {
        Directive::ShowDomainTopicSelector {
            domains: Domain::labels(),
            topics: Vec::new(),
        }
    }

    async fn topic_selector(&self, domain: Domain) -> Directive {
        Directive::ShowDomainTopicSelector {
            domains: Domain::labels(),
            topics: self.topics_for(domain).await,
        }
    }

    fn reprompt(&self, session: &Session) -> Directive {
        match session.phase {
            SessionPhase::ModeSelect => {
                if session.mode == Some(InterviewMode::CvBased) {
                    plain(CV_PROMPT)
                } else {
                    plain(MODE_PROMPT)
                }
            }
            SessionPhase::DomainSelect => plain(DOMAIN_REPROMPT),
            SessionPhase::TopicSelect => plain(TOPIC_REPROMPT),
            _ => plain(NO_MORE_QUESTIONS),
        }
    }
}
