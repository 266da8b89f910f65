//! Revision history of a planning session.
//!
//! Each revision of the prompt appends a [`Conversation`]; the only removal is
//! the rollback of a generation that failed. A cursor selects the current
//! conversation, which is the one edits apply to.

use super::conversation::Conversation;

/// Direction of a move through the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards older conversations.
    Previous,
    /// Towards newer conversations.
    Next,
}

/// An ordered list of conversations with a cursor on the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    conversations: Vec<Conversation>,
    current: usize,
}

impl History {
    /// Number of conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Whether the history holds no conversation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Position of the current conversation.
    ///
    /// Always `< len()` unless the history is empty, in which case it is 0.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// The current conversation.
    #[must_use]
    pub fn current(&self) -> Option<&Conversation> {
        self.conversations.get(self.current)
    }

    /// Mutable access to the current conversation.
    pub fn current_mut(&mut self) -> Option<&mut Conversation> {
        self.conversations.get_mut(self.current)
    }

    /// The conversation at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Conversation> {
        self.conversations.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Conversation> {
        self.conversations.get_mut(index)
    }

    /// Every conversation, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Conversation> + '_ {
        self.conversations.iter()
    }

    /// Replaces the whole history with a single conversation.
    pub(crate) fn reset(&mut self, conversation: Conversation) -> usize {
        self.conversations = vec![conversation];
        self.current = 0;
        0
    }

    /// Appends a conversation and makes it current. Returns its position.
    pub(crate) fn push(&mut self, conversation: Conversation) -> usize {
        self.conversations.push(conversation);
        self.current = self.conversations.len() - 1;
        self.current
    }

    /// Removes the conversation at `index`, keeping the cursor in range.
    pub(crate) fn remove(&mut self, index: usize) -> Option<Conversation> {
        if index >= self.conversations.len() {
            return None;
        }
        let removed = self.conversations.remove(index);
        self.current = self.current.min(self.conversations.len().saturating_sub(1));
        Some(removed)
    }

    /// Moves the cursor one step, clamped to the ends of the history.
    ///
    /// Returns `true` if the cursor moved.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let last = self.conversations.len().saturating_sub(1);
        let target = match direction {
            Direction::Previous => self.current.saturating_sub(1),
            Direction::Next => (self.current + 1).min(last),
        };
        let moved = target != self.current;
        self.current = target;
        moved
    }
}
