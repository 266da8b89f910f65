use std::sync::Arc;

use non_empty_string::NonEmptyString;
use thiserror::Error;

use super::indicator::{Indicator, IndicatorField, IndicatorGroup, MANUAL_GROUP_TITLE};

/// One phrase of the course introduction returned with a decomposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntroductionPhrase {
    /// Position assigned by the backend.
    pub order: i64,
    /// The phrase itself.
    pub phrase: String,
    /// Id of the indicator the phrase refers to, for cross-referencing.
    pub related_indicator: Option<String>,
}

/// The material a decomposition produces for a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Review {
    /// Introduction phrases, in order.
    pub introduction: Vec<IntroductionPhrase>,
    /// Indicator groups, in order.
    pub groups: Vec<IndicatorGroup>,
}

/// Errors raised when editing a [`Conversation`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// No group at this position.
    #[error("group {0} does not exist")]
    GroupNotFound(usize),
    /// No visible indicator with this id.
    #[error("indicator {0} does not exist")]
    IndicatorNotFound(String),
}

/// One prompt and the review material generated for it.
///
/// Groups are held behind [`Arc`]: a clone of the conversation shares every
/// group and indicator, and an edit copies only the group and indicator on the
/// path to the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    prompt: NonEmptyString,
    introduction: Vec<IntroductionPhrase>,
    groups: Vec<Arc<IndicatorGroup>>,
    populated: bool,
}

impl Conversation {
    /// Creates a conversation waiting for its review material.
    #[must_use]
    pub fn new(prompt: NonEmptyString) -> Self {
        Self {
            prompt,
            introduction: Vec::new(),
            groups: Vec::new(),
            populated: false,
        }
    }

    /// The prompt that produced this conversation.
    #[must_use]
    pub fn prompt(&self) -> &str {
        self.prompt.as_str()
    }

    /// Introduction phrases, in order.
    #[must_use]
    pub fn introduction(&self) -> &[IntroductionPhrase] {
        &self.introduction
    }

    /// Indicator groups, in order.
    pub fn groups(&self) -> impl Iterator<Item = &IndicatorGroup> + '_ {
        self.groups.iter().map(|group| &**group)
    }

    /// The group at `index`.
    #[must_use]
    pub fn group(&self, index: usize) -> Option<&IndicatorGroup> {
        self.groups.get(index).map(|group| &**group)
    }

    /// Shared handle on the group at `index`.
    #[must_use]
    pub fn shared_group(&self, index: usize) -> Option<&Arc<IndicatorGroup>> {
        self.groups.get(index)
    }

    /// Number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Whether the review material has arrived.
    #[must_use]
    pub const fn is_populated(&self) -> bool {
        self.populated
    }

    /// The first visible indicator with the given id.
    #[must_use]
    pub fn indicator(&self, id: &str) -> Option<&Indicator> {
        self.groups()
            .flat_map(|group| group.visible())
            .find(|indicator| indicator.id == id)
    }

    /// Every visible indicator, group by group.
    pub fn visible_indicators(&self) -> impl Iterator<Item = &Indicator> + '_ {
        self.groups().flat_map(|group| group.visible())
    }

    pub(crate) fn populate(&mut self, review: Review) {
        self.introduction = review.introduction;
        self.groups = review.groups.into_iter().map(Arc::new).collect();
        self.populated = true;
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut IndicatorGroup, EditError> {
        self.groups
            .get_mut(index)
            .map(Arc::make_mut)
            .ok_or(EditError::GroupNotFound(index))
    }

    fn indicator_mut(&mut self, id: &str) -> Result<&mut Indicator, EditError> {
        self.groups
            .iter_mut()
            .find(|group| group.contains_visible(id))
            .and_then(|group| Arc::make_mut(group).visible_mut(id))
            .ok_or_else(|| EditError::IndicatorNotFound(id.to_string()))
    }

    /// Renames the group at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such group.
    pub fn rename_group(&mut self, index: usize, title: String) -> Result<(), EditError> {
        self.group_mut(index)?.title = title;
        Ok(())
    }

    /// Appends an empty group and returns its position.
    pub fn add_group(&mut self) -> usize {
        self.groups
            .push(Arc::new(IndicatorGroup::new(MANUAL_GROUP_TITLE, Vec::new())));
        self.groups.len() - 1
    }

    /// Removes the group at `index` together with its indicators.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such group.
    pub fn remove_group(&mut self, index: usize) -> Result<(), EditError> {
        if index >= self.groups.len() {
            return Err(EditError::GroupNotFound(index));
        }
        self.groups.remove(index);
        Ok(())
    }

    /// Appends a hand-made indicator to the group at `index`.
    ///
    /// Its id is `"{group}.{n}"` (both 1-based), where `n` starts one past
    /// the number of indicators already in the group, deleted ones included,
    /// and is bumped until no indicator of the conversation uses the id.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no such group.
    pub fn add_indicator(&mut self, index: usize) -> Result<&Indicator, EditError> {
        let start = self.group(index).ok_or(EditError::GroupNotFound(index))?.len() + 1;
        let id = (start..)
            .map(|n| format!("{}.{n}", index + 1))
            .find(|id| !self.contains_id(id))
            .unwrap_or_default();
        Ok(self.group_mut(index)?.push(Indicator::manual(id)))
    }

    /// Whether any indicator, deleted or not, has this id.
    fn contains_id(&self, id: &str) -> bool {
        self.groups()
            .flat_map(|group| group.indicators())
            .any(|indicator| indicator.id == id)
    }

    /// Sets a text field of the indicator with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if no visible indicator has this id.
    pub fn edit_indicator(
        &mut self,
        id: &str,
        field: IndicatorField,
        value: String,
    ) -> Result<(), EditError> {
        self.indicator_mut(id)?.set_field(field, value);
        Ok(())
    }

    /// Soft-deletes the indicator with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if no visible indicator has this id.
    pub fn delete_indicator(&mut self, id: &str) -> Result<(), EditError> {
        self.indicator_mut(id)?.delete();
        Ok(())
    }
}
