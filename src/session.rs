//! The review session: history, generation lifecycle and confirmation.
//!
//! A generation is split in two. Issuing it ([`ReviewSession::start`],
//! [`ReviewSession::revise`]) mutates the history and returns a [`Ticket`]
//! naming the conversation to populate. Resolving the ticket applies the
//! backend's answer to that conversation, or removes it if the request
//! failed. Navigation in between does not change where the answer lands.

use non_empty_string::NonEmptyString;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    backend::{BackendError, ConfirmPayload, Workflow, mapper},
    domain::{
        Config, Conversation, Direction, EditError, History, PlanningBoard, Review, Threshold,
        Tools,
    },
};

/// Errors raised by session commands.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The prompt is empty or only whitespace.
    #[error("the prompt is empty")]
    EmptyPrompt,

    /// A generation is still in flight.
    #[error("a generation is already in progress")]
    GenerationPending,

    /// There is no conversation to revise yet.
    #[error("nothing to revise: start a conversation first")]
    NothingToRevise,

    /// The current conversation cannot be confirmed yet.
    #[error("the current conversation has no generated material to confirm")]
    NotReady,

    /// The ticket does not belong to the pending generation.
    #[error("the ticket does not match the pending generation")]
    StaleTicket,

    /// The history is empty.
    #[error("there is no current conversation")]
    NoConversation,

    /// The backend request failed; the conversation it targeted was removed.
    #[error("generation failed: {0}")]
    Backend(#[from] BackendError),

    /// An edit addressed something that does not exist.
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// What issued a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    /// A fresh start that reset the history.
    Start,
    /// A revision appended to the history.
    Revision,
}

/// An outstanding generation.
///
/// Consumed by [`ReviewSession::resolve`]; there is at most one per session.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a generation stays pending until its ticket is resolved"]
pub struct Ticket {
    id: u64,
    target: usize,
    kind: GenerationKind,
    prompt: String,
}

impl Ticket {
    /// History position of the conversation being generated.
    #[must_use]
    pub const fn target(&self) -> usize {
        self.target
    }

    /// What issued the generation.
    #[must_use]
    pub const fn kind(&self) -> GenerationKind {
        self.kind
    }

    /// The prompt sent to the backend.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pending {
    id: u64,
    target: usize,
}

/// State of one planning session.
#[derive(Debug, Clone, Default)]
pub struct ReviewSession {
    history: History,
    /// Options sent with every generation.
    pub tools: Tools,
    threshold: Threshold,
    pending: Option<Pending>,
    issued: u64,
}

impl ReviewSession {
    /// Creates an empty session using the defaults in `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            tools: config.tools,
            threshold: config.threshold,
            ..Self::default()
        }
    }

    /// The conversation history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// The current conversation.
    #[must_use]
    pub fn current(&self) -> Option<&Conversation> {
        self.history.current()
    }

    /// Whether a generation is in flight.
    #[must_use]
    pub const fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the current conversation is the one being generated.
    #[must_use]
    pub fn is_current_pending(&self) -> bool {
        self.pending
            .is_some_and(|pending| pending.target == self.history.current_index())
    }

    fn issue(&mut self, target: usize, kind: GenerationKind, prompt: String) -> Ticket {
        self.issued += 1;
        self.pending = Some(Pending {
            id: self.issued,
            target,
        });
        debug!(index = target, ?kind, "generation issued");
        Ticket {
            id: self.issued,
            target,
            kind,
            prompt,
        }
    }

    fn prompt(&self, text: &str) -> Result<NonEmptyString, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::GenerationPending);
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        NonEmptyString::new(text.to_string()).map_err(|_| SessionError::EmptyPrompt)
    }

    /// Resets the history to a single conversation for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt is blank or a generation is pending.
    pub fn start(&mut self, prompt: &str) -> Result<Ticket, SessionError> {
        let prompt = self.prompt(prompt)?;
        let text = prompt.as_str().to_owned();
        let target = self.history.reset(Conversation::new(prompt));
        Ok(self.issue(target, GenerationKind::Start, text))
    }

    /// Appends a conversation for the revised prompt `text` and makes it current.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank, a generation is pending, or the
    /// history is empty.
    pub fn revise(&mut self, text: &str) -> Result<Ticket, SessionError> {
        let prompt = self.prompt(text)?;
        if self.history.is_empty() {
            return Err(SessionError::NothingToRevise);
        }
        let text = prompt.as_str().to_owned();
        let target = self.history.push(Conversation::new(prompt));
        Ok(self.issue(target, GenerationKind::Revision, text))
    }

    /// The current prompt, as the starting text of a revision.
    #[must_use]
    pub fn revision_draft(&self) -> Option<&str> {
        self.current().map(Conversation::prompt)
    }

    /// Moves the cursor; returns whether it moved.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        self.history.navigate(direction)
    }

    /// Applies the outcome of the generation behind `ticket`.
    ///
    /// On success the target conversation is populated. On failure it is
    /// removed and the backend error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::StaleTicket`] if `ticket` is not the pending
    /// generation, or [`SessionError::Backend`] if `outcome` is an error.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        outcome: Result<Review, BackendError>,
    ) -> Result<(), SessionError> {
        let expected = Pending {
            id: ticket.id,
            target: ticket.target,
        };
        if self.pending != Some(expected) {
            return Err(SessionError::StaleTicket);
        }
        self.pending = None;

        match outcome {
            Ok(review) => {
                let conversation = self
                    .history
                    .get_mut(ticket.target)
                    .ok_or(SessionError::StaleTicket)?;
                conversation.populate(review);
                info!(
                    index = ticket.target,
                    groups = conversation.group_count(),
                    "generation applied"
                );
                Ok(())
            }
            Err(error) => {
                warn!(index = ticket.target, %error, "generation failed, rolling back");
                self.history.remove(ticket.target);
                Err(error.into())
            }
        }
    }

    /// Sends the generation behind `ticket` to `workflow` and resolves it.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve`].
    #[instrument(level = "debug", skip_all, fields(index = ticket.target()))]
    pub async fn generate<W>(&mut self, workflow: &W, ticket: Ticket) -> Result<(), SessionError>
    where
        W: Workflow + ?Sized,
    {
        let outcome = workflow.decompose(ticket.prompt(), self.tools).await;
        self.resolve(ticket, outcome)
    }

    /// Applies `edit` to the current conversation.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no current conversation, if it is still
    /// being generated, or if the edit itself fails.
    pub fn edit<T>(
        &mut self,
        edit: impl FnOnce(&mut Conversation) -> Result<T, EditError>,
    ) -> Result<T, SessionError> {
        if self.is_current_pending() {
            return Err(SessionError::GenerationPending);
        }
        let conversation = self
            .history
            .current_mut()
            .ok_or(SessionError::NoConversation)?;
        Ok(edit(conversation)?)
    }

    /// The confirm payload of the current conversation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotReady`] unless the current conversation has
    /// been populated and no generation is pending.
    pub fn confirm_payload(&self) -> Result<ConfirmPayload, SessionError> {
        if self.pending.is_some() {
            return Err(SessionError::NotReady);
        }
        match self.current() {
            Some(conversation) if conversation.is_populated() => {
                Ok(mapper::confirm_payload(conversation))
            }
            _ => Err(SessionError::NotReady),
        }
    }

    /// Confirms the current conversation and builds the planning board.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversation is not ready or the request fails.
    #[instrument(level = "debug", skip_all)]
    pub async fn confirm<W>(&self, workflow: &W) -> Result<PlanningBoard, SessionError>
    where
        W: Workflow + ?Sized,
    {
        let payload = self.confirm_payload()?;
        let results = workflow.plan(&payload).await?;
        info!(sections = results.len(), "planning received");
        Ok(PlanningBoard::with_threshold(results, self.threshold))
    }
}
