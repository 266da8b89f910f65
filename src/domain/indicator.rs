use std::{fmt, sync::Arc};

/// Title given to indicators added by hand.
pub const MANUAL_INDICATOR_TITLE: &str = "New learning indicator";

/// Content given to indicators added by hand.
pub const MANUAL_INDICATOR_CONTENT: &str = "New syllabus content";

/// Title given to groups added by hand.
pub const MANUAL_GROUP_TITLE: &str = "New learning outcome";

/// Review status of an [`Indicator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IndicatorStatus {
    /// As produced by the backend (or as created by hand).
    #[default]
    Original,
    /// Edited by the user at least once.
    Modified,
    /// Removed by the user. Kept in memory, hidden everywhere else.
    Deleted,
}

impl fmt::Display for IndicatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Original => "original",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        })
    }
}

/// Skill, method and context an indicator is made of.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndicatorBreakdown {
    /// What the learner does.
    pub skill: String,
    /// How they do it.
    pub method: String,
    /// In which context.
    pub context: String,
}

/// The editable text fields of an [`Indicator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorField {
    /// [`Indicator::title`].
    Title,
    /// [`Indicator::description`].
    Description,
    /// [`Indicator::module`].
    Module,
    /// [`Indicator::content`].
    Content,
}

impl fmt::Display for IndicatorField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Module => "module",
            Self::Content => "content",
        })
    }
}

/// One editable unit of the decomposed instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    /// Hierarchical identifier such as `"1.2"`.
    pub id: String,
    /// The indicator statement.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Module the indicator belongs to.
    pub module: Option<String>,
    /// Syllabus content the indicator relies on.
    pub content: Option<String>,
    /// Why the indicator was proposed.
    pub justification: Option<String>,
    /// Skill/method/context decomposition.
    pub breakdown: Option<IndicatorBreakdown>,
    status: IndicatorStatus,
    manual: bool,
}

impl Indicator {
    /// Creates an indicator as received from the backend.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            module: None,
            content: None,
            justification: None,
            breakdown: None,
            status: IndicatorStatus::Original,
            manual: false,
        }
    }

    /// Creates an indicator added by the user.
    #[must_use]
    pub fn manual(id: impl Into<String>) -> Self {
        Self {
            content: Some(MANUAL_INDICATOR_CONTENT.to_string()),
            manual: true,
            ..Self::new(id, MANUAL_INDICATOR_TITLE)
        }
    }

    /// Current review status.
    #[must_use]
    pub const fn status(&self) -> IndicatorStatus {
        self.status
    }

    /// Whether the user created this indicator.
    #[must_use]
    pub const fn is_manual(&self) -> bool {
        self.manual
    }

    /// Whether the indicator has been deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status == IndicatorStatus::Deleted
    }

    /// The current value of a text field.
    #[must_use]
    pub fn field(&self, field: IndicatorField) -> &str {
        match field {
            IndicatorField::Title => &self.title,
            IndicatorField::Description => &self.description,
            IndicatorField::Module => self.module.as_deref().unwrap_or_default(),
            IndicatorField::Content => self.content.as_deref().unwrap_or_default(),
        }
    }

    /// Sets a text field.
    ///
    /// An original indicator becomes modified; a modified one stays modified.
    pub fn set_field(&mut self, field: IndicatorField, value: String) {
        match field {
            IndicatorField::Title => self.title = value,
            IndicatorField::Description => self.description = value,
            IndicatorField::Module => self.module = Some(value),
            IndicatorField::Content => self.content = Some(value),
        }
        if self.status == IndicatorStatus::Original {
            self.status = IndicatorStatus::Modified;
        }
    }

    /// Marks the indicator as deleted.
    pub const fn delete(&mut self) {
        self.status = IndicatorStatus::Deleted;
    }
}

/// Indicators belonging to one learning outcome.
///
/// Indicators are held behind [`Arc`] so that cloning a group is cheap and an
/// edit only copies the indicator it touches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndicatorGroup {
    /// The learning outcome.
    pub title: String,
    indicators: Vec<Arc<Indicator>>,
}

impl IndicatorGroup {
    /// Creates a group.
    #[must_use]
    pub fn new(title: impl Into<String>, indicators: Vec<Indicator>) -> Self {
        Self {
            title: title.into(),
            indicators: indicators.into_iter().map(Arc::new).collect(),
        }
    }

    /// Every indicator, deleted ones included, in order.
    pub fn indicators(&self) -> impl Iterator<Item = &Indicator> + '_ {
        self.indicators.iter().map(|indicator| &**indicator)
    }

    /// Indicators that have not been deleted, in order.
    pub fn visible(&self) -> impl Iterator<Item = &Indicator> + '_ {
        self.indicators().filter(|indicator| !indicator.is_deleted())
    }

    /// Number of indicators, deleted ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    /// Whether the group holds no indicator at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub(crate) fn push(&mut self, indicator: Indicator) -> &Indicator {
        let index = self.indicators.len();
        self.indicators.push(Arc::new(indicator));
        &self.indicators[index]
    }

    /// Shared handle on the indicator at `index`.
    #[must_use]
    pub fn shared(&self, index: usize) -> Option<&Arc<Indicator>> {
        self.indicators.get(index)
    }

    /// Mutable access to the first visible indicator with the given id,
    /// copying it first if it is shared.
    pub(crate) fn visible_mut(&mut self, id: &str) -> Option<&mut Indicator> {
        self.indicators
            .iter_mut()
            .find(|indicator| indicator.id == id && !indicator.is_deleted())
            .map(Arc::make_mut)
    }

    pub(crate) fn contains_visible(&self, id: &str) -> bool {
        self.visible().any(|indicator| indicator.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_flip_original_to_modified() {
        let mut indicator = Indicator::new("1.1", "Reads complex texts");
        assert_eq!(indicator.status(), IndicatorStatus::Original);

        indicator.set_field(IndicatorField::Description, "with support".to_string());
        assert_eq!(indicator.status(), IndicatorStatus::Modified);
        assert_eq!(indicator.field(IndicatorField::Description), "with support");
    }

    #[test]
    fn modified_never_reverts() {
        let mut indicator = Indicator::new("1.1", "Reads");
        indicator.set_field(IndicatorField::Title, "Writes".to_string());
        indicator.set_field(IndicatorField::Title, "Reads".to_string());
        assert_eq!(indicator.status(), IndicatorStatus::Modified);
    }

    #[test]
    fn manual_indicators_start_original() {
        let indicator = Indicator::manual("2.3");
        assert!(indicator.is_manual());
        assert_eq!(indicator.status(), IndicatorStatus::Original);
        assert_eq!(indicator.title, MANUAL_INDICATOR_TITLE);
        assert_eq!(indicator.field(IndicatorField::Content), MANUAL_INDICATOR_CONTENT);
        assert_eq!(indicator.field(IndicatorField::Module), "");
    }

    #[test]
    fn deleted_indicators_are_hidden_but_kept() {
        let mut group = IndicatorGroup::new(
            "Comprehension",
            vec![Indicator::new("1.1", "a"), Indicator::new("1.2", "b")],
        );
        group.visible_mut("1.1").unwrap().delete();

        assert_eq!(group.len(), 2);
        let visible: Vec<_> = group.visible().map(|i| i.id.as_str()).collect();
        assert_eq!(visible, ["1.2"]);
        assert!(group.visible_mut("1.1").is_none());
    }
}
