use std::fmt;

use dialoguer::{Confirm, Input, Select};
use planner::{
    Config, Conversation, HttpWorkflow, PlanningBoard, ReviewSession, SessionError, Ticket,
    domain::{
        Difficulty, Direction, EditError, IndicatorField, IndicatorSize, StatusFilter, Threshold,
        clean_section_name,
    },
    session::GenerationKind,
};
use tracing::instrument;

use super::{ToolArgs, render, terminal, terminal::Colorize};

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    #[command(flatten)]
    tools: ToolArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewAction {
    Revise,
    Previous,
    Next,
    EditIndicator,
    DeleteIndicator,
    AddIndicator,
    RenameGroup,
    AddGroup,
    RemoveGroup,
    Options,
    StartOver,
    Confirm,
    Quit,
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Revise => "Revise the prompt",
            Self::Previous => "Previous conversation",
            Self::Next => "Next conversation",
            Self::EditIndicator => "Edit an indicator",
            Self::DeleteIndicator => "Delete an indicator",
            Self::AddIndicator => "Add an indicator",
            Self::RenameGroup => "Rename a learning outcome",
            Self::AddGroup => "Add a learning outcome",
            Self::RemoveGroup => "Remove a learning outcome",
            Self::Options => "Generation options",
            Self::StartOver => "Start over",
            Self::Confirm => "Confirm and plan",
            Self::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoardAction {
    Inspect,
    Choose,
    Unassign,
    Threshold,
    Filter,
    Back,
    Quit,
}

impl fmt::Display for BoardAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Inspect => "Inspect a section",
            Self::Choose => "Choose a suggestion",
            Self::Unassign => "Unassign a section",
            Self::Threshold => "Set the similarity threshold",
            Self::Filter => "Filter sections",
            Self::Back => "Back to the review",
            Self::Quit => "Quit",
        })
    }
}

enum Flow {
    Continue,
    Quit,
}

fn select<T: Copy + fmt::Display>(prompt: &str, options: &[T]) -> anyhow::Result<T> {
    select_at(prompt, options, 0)
}

/// Position of `current` among `options`, or the first one.
fn position_of<T: PartialEq>(options: &[T], current: &T) -> usize {
    options
        .iter()
        .position(|option| option == current)
        .unwrap_or(0)
}

/// Like [`select`], with `current` preselected.
fn select_current<T: Copy + PartialEq + fmt::Display>(
    prompt: &str,
    options: &[T],
    current: T,
) -> anyhow::Result<T> {
    select_at(prompt, options, position_of(options, &current))
}

fn select_at<T: Copy + fmt::Display>(
    prompt: &str,
    options: &[T],
    default: usize,
) -> anyhow::Result<T> {
    let labels: Vec<String> = options.iter().map(ToString::to_string).collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(options[index])
}

/// The opening prompt, or `None` when it was left blank to quit.
fn opening_prompt(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(text)
}

const DIFFICULTIES: [Difficulty; 2] = [Difficulty::Standard, Difficulty::School];

const INDICATOR_SIZES: [IndicatorSize; 3] = [
    IndicatorSize::Standard,
    IndicatorSize::Atomic,
    IndicatorSize::Integrative,
];

const FILTERS: [StatusFilter; 3] = [
    StatusFilter::All,
    StatusFilter::Covered,
    StatusFilter::Pending,
];

fn select_label(prompt: &str, labels: &[String]) -> anyhow::Result<usize> {
    Ok(Select::new()
        .with_prompt(prompt)
        .items(labels)
        .default(0)
        .interact()?)
}

fn input(prompt: &str, initial: &str) -> anyhow::Result<String> {
    Ok(Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?)
}

fn report(error: &SessionError) {
    eprintln!("{}", format!("⚠️  {error}").warning());
}

struct Interactive {
    session: ReviewSession,
    workflow: HttpWorkflow,
}

impl Command {
    #[instrument(skip(config))]
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let mut session = ReviewSession::new(config);
        session.tools = self.tools.apply(session.tools);

        let mut interactive = Interactive {
            session,
            workflow: HttpWorkflow::new(config)?,
        };
        interactive.run().await
    }
}

impl Interactive {
    async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            if self.session.history().is_empty() {
                let text = input("Describe the course to plan (leave empty to quit)", "")?;
                let Some(prompt) = opening_prompt(&text) else {
                    return Ok(());
                };
                match self.session.start(prompt) {
                    Ok(ticket) => self.generate(ticket).await,
                    Err(error) => report(&error),
                }
                continue;
            }

            self.show();
            if let Flow::Quit = self.review().await? {
                return Ok(());
            }
        }
    }

    fn show(&self) {
        let history = self.session.history();
        if let Some(conversation) = history.current() {
            println!();
            render::conversation(conversation, history.current_index(), history.len());
            println!();
        }
    }

    async fn generate(&mut self, ticket: Ticket) {
        let message = match ticket.kind() {
            GenerationKind::Start => "Decomposing prompt",
            GenerationKind::Revision => "Decomposing revised prompt",
        };
        let outcome = terminal::spinner(message, self.session.generate(&self.workflow, ticket)).await;
        if let Err(error) = outcome {
            report(&error);
        }
    }

    fn actions(&self) -> Vec<ReviewAction> {
        let history = self.session.history();
        let mut actions = vec![ReviewAction::Revise];
        if history.current_index() > 0 {
            actions.push(ReviewAction::Previous);
        }
        if history.current_index() + 1 < history.len() {
            actions.push(ReviewAction::Next);
        }
        let populated = self
            .session
            .current()
            .is_some_and(|conversation| conversation.is_populated());
        if populated {
            actions.extend([
                ReviewAction::EditIndicator,
                ReviewAction::DeleteIndicator,
                ReviewAction::AddIndicator,
                ReviewAction::RenameGroup,
                ReviewAction::AddGroup,
                ReviewAction::RemoveGroup,
            ]);
        }
        actions.extend([ReviewAction::Options, ReviewAction::StartOver]);
        if populated {
            actions.push(ReviewAction::Confirm);
        }
        actions.push(ReviewAction::Quit);
        actions
    }

    /// Applies an edit to the current conversation, reporting rejected edits.
    fn edit<T>(
        &mut self,
        edit: impl FnOnce(&mut Conversation) -> Result<T, EditError>,
    ) -> Option<T> {
        self.session
            .edit(edit)
            .inspect_err(|error| report(error))
            .ok()
    }

    async fn review(&mut self) -> anyhow::Result<Flow> {
        match select("What next?", &self.actions())? {
            ReviewAction::Revise => {
                let draft = self.session.revision_draft().unwrap_or_default().to_string();
                let text = input("Revised prompt", &draft)?;
                match self.session.revise(&text) {
                    Ok(ticket) => self.generate(ticket).await,
                    Err(error) => report(&error),
                }
            }
            ReviewAction::Previous => {
                self.session.navigate(Direction::Previous);
            }
            ReviewAction::Next => {
                self.session.navigate(Direction::Next);
            }
            ReviewAction::EditIndicator => self.edit_indicator()?,
            ReviewAction::DeleteIndicator => self.delete_indicator()?,
            ReviewAction::AddIndicator => self.add_indicator()?,
            ReviewAction::RenameGroup => self.rename_group()?,
            ReviewAction::AddGroup => {
                self.edit(|conversation| Ok(conversation.add_group()));
            }
            ReviewAction::RemoveGroup => self.remove_group()?,
            ReviewAction::Options => self.options()?,
            ReviewAction::StartOver => {
                let prompt = input("Describe the course to plan", "")?;
                match self.session.start(&prompt) {
                    Ok(ticket) => self.generate(ticket).await,
                    Err(error) => report(&error),
                }
            }
            ReviewAction::Confirm => {
                let outcome = terminal::spinner(
                    "Searching the curriculum",
                    self.session.confirm(&self.workflow),
                )
                .await;
                match outcome {
                    Ok(board) => return Self::plan(board),
                    Err(error) => report(&error),
                }
            }
            ReviewAction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn pick_indicator(&self, prompt: &str) -> anyhow::Result<Option<String>> {
        let Some(conversation) = self.session.current() else {
            return Ok(None);
        };
        let (ids, labels): (Vec<String>, Vec<String>) = conversation
            .visible_indicators()
            .map(|indicator| {
                (
                    indicator.id.clone(),
                    format!("{} {}", indicator.id, terminal::fit(&indicator.title, 12)),
                )
            })
            .unzip();
        if ids.is_empty() {
            println!("{}", "There are no indicators.".dim());
            return Ok(None);
        }
        let index = select_label(prompt, &labels)?;
        Ok(Some(ids[index].clone()))
    }

    fn pick_group(&self, prompt: &str) -> anyhow::Result<Option<usize>> {
        let Some(conversation) = self.session.current() else {
            return Ok(None);
        };
        let labels: Vec<String> = conversation
            .groups()
            .enumerate()
            .map(|(index, group)| format!("{}. {}", index + 1, group.title))
            .collect();
        if labels.is_empty() {
            println!("{}", "There are no learning outcomes.".dim());
            return Ok(None);
        }
        select_label(prompt, &labels).map(Some)
    }

    fn edit_indicator(&mut self) -> anyhow::Result<()> {
        let Some(id) = self.pick_indicator("Indicator to edit")? else {
            return Ok(());
        };
        let field = select(
            "Field",
            &[
                IndicatorField::Title,
                IndicatorField::Description,
                IndicatorField::Module,
                IndicatorField::Content,
            ],
        )?;
        let current = self
            .session
            .current()
            .and_then(|conversation| conversation.indicator(&id))
            .map(|indicator| indicator.field(field).to_string())
            .unwrap_or_default();
        let value = input(&field.to_string(), &current)?;
        self.edit(|conversation| conversation.edit_indicator(&id, field, value));
        Ok(())
    }

    fn delete_indicator(&mut self) -> anyhow::Result<()> {
        let Some(id) = self.pick_indicator("Indicator to delete")? else {
            return Ok(());
        };
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete indicator {id}?"))
            .default(false)
            .interact()?;
        if confirmed {
            self.edit(|conversation| conversation.delete_indicator(&id));
        }
        Ok(())
    }

    fn add_indicator(&mut self) -> anyhow::Result<()> {
        let Some(group) = self.pick_group("Add to which learning outcome?")? else {
            return Ok(());
        };
        let added = self.edit(|conversation| {
            conversation
                .add_indicator(group)
                .map(|indicator| indicator.id.clone())
        });
        if let Some(id) = added {
            println!("{}", format!("Added indicator {id}").success());
        }
        Ok(())
    }

    fn rename_group(&mut self) -> anyhow::Result<()> {
        let Some(group) = self.pick_group("Learning outcome to rename")? else {
            return Ok(());
        };
        let current = self
            .session
            .current()
            .and_then(|conversation| conversation.group(group))
            .map(|group| group.title.clone())
            .unwrap_or_default();
        let title = input("Title", &current)?;
        self.edit(|conversation| conversation.rename_group(group, title));
        Ok(())
    }

    fn remove_group(&mut self) -> anyhow::Result<()> {
        let Some(group) = self.pick_group("Learning outcome to remove")? else {
            return Ok(());
        };
        let confirmed = Confirm::new()
            .with_prompt("Remove this learning outcome and all its indicators?")
            .default(false)
            .interact()?;
        if confirmed {
            self.edit(|conversation| conversation.remove_group(group));
        }
        Ok(())
    }

    fn options(&mut self) -> anyhow::Result<()> {
        let tools = &mut self.session.tools;
        tools.research = Confirm::new()
            .with_prompt("Enrich with external research?")
            .default(tools.research)
            .interact()?;
        tools.leveling = Confirm::new()
            .with_prompt("Level indicators against the audience?")
            .default(tools.leveling)
            .interact()?;
        tools.difficulty = select_current("Difficulty", &DIFFICULTIES, tools.difficulty)?;
        tools.indicator_size =
            select_current("Indicator size", &INDICATOR_SIZES, tools.indicator_size)?;
        Ok(())
    }

    fn plan(mut board: PlanningBoard) -> anyhow::Result<Flow> {
        loop {
            println!();
            render::board(&board);
            println!();

            let action = select(
                "Planning",
                &[
                    BoardAction::Inspect,
                    BoardAction::Choose,
                    BoardAction::Unassign,
                    BoardAction::Threshold,
                    BoardAction::Filter,
                    BoardAction::Back,
                    BoardAction::Quit,
                ],
            )?;

            match action {
                BoardAction::Inspect => {
                    if let Some(section) = pick_section(&board, "Section to inspect")? {
                        inspect(&board, section);
                    }
                }
                BoardAction::Choose => {
                    if let Some(section) = pick_section(&board, "Section")? {
                        choose(&mut board, section)?;
                    }
                }
                BoardAction::Unassign => {
                    if let Some(section) = pick_section(&board, "Section to unassign")? {
                        if let Err(error) = board.unassign(section) {
                            eprintln!("{}", format!("⚠️  {error}").warning());
                        }
                    }
                }
                BoardAction::Threshold => {
                    let percent: u8 = Input::new()
                        .with_prompt("Threshold (%)")
                        .with_initial_text(board.threshold().percent().to_string())
                        .validate_with(|value: &u8| {
                            if *value <= 100 {
                                Ok(())
                            } else {
                                Err("enter a value between 0 and 100")
                            }
                        })
                        .interact_text()?;
                    board.apply_threshold(Threshold::from_percent(percent)?);
                }
                BoardAction::Filter => {
                    board.filter = select_current("Show", &FILTERS, board.filter)?;
                }
                BoardAction::Back => return Ok(Flow::Continue),
                BoardAction::Quit => return Ok(Flow::Quit),
            }
        }
    }
}

fn pick_section(board: &PlanningBoard, prompt: &str) -> anyhow::Result<Option<usize>> {
    let (positions, labels): (Vec<usize>, Vec<String>) = board
        .filtered()
        .map(|(index, result)| {
            let state = if result.is_pending() { "pending" } else { "assigned" };
            (
                index,
                format!(
                    "[{}] {} ({state})",
                    index + 1,
                    clean_section_name(&result.required().name)
                ),
            )
        })
        .unzip();
    if positions.is_empty() {
        println!("{}", "No sections match the filter.".dim());
        return Ok(None);
    }
    let index = select_label(prompt, &labels)?;
    Ok(Some(positions[index]))
}

fn inspect(board: &PlanningBoard, section: usize) {
    let Some(result) = board.result(section) else {
        return;
    };
    let required = result.required();
    println!();
    println!("{}", required.name.info());
    if !required.description.is_empty() {
        println!("  {}", terminal::fit(&required.description, 2));
    }
    if !required.expected_indicator.is_empty() {
        println!("  {} {}", "indicator:".dim(), required.expected_indicator);
    }
    if let Some(justification) = &required.justification {
        println!("  {} {}", "why:".dim(), terminal::fit(justification, 7));
    }
    for (index, suggestion) in result.suggestions().iter().enumerate() {
        let marker = if result.assigned_index() == Some(index) {
            "→"
        } else {
            " "
        };
        let label = suggestion.coverage().label();
        println!(
            "  {marker} {}. {}",
            index + 1,
            render::suggestion(suggestion).coverage(label)
        );
        let reasons = suggestion.coverage().uncovered_reasons();
        if !reasons.is_empty() {
            println!("       {}", terminal::fit(reasons, 7).dim());
        }
        for module in &suggestion.modules {
            println!("       {} {} {}", module.kind.dim(), module.name, module.url.dim());
        }
    }
}

fn choose(board: &mut PlanningBoard, section: usize) -> anyhow::Result<()> {
    let Some(result) = board.result(section) else {
        return Ok(());
    };
    let labels: Vec<String> = result
        .suggestions()
        .iter()
        .map(render::suggestion)
        .collect();
    if labels.is_empty() {
        println!("{}", "This section has no suggestions.".dim());
        return Ok(());
    }
    let suggestion = select_label("Suggestion", &labels)?;
    board.choose(section, suggestion)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(Difficulty::Standard, 0; "standard")]
    #[test_case(Difficulty::School, 1; "school")]
    fn difficulty_picker_starts_at_the_current_value(current: Difficulty, expected: usize) {
        assert_eq!(position_of(&DIFFICULTIES, &current), expected);
    }

    #[test]
    fn indicator_size_picker_starts_at_the_current_value() {
        assert_eq!(position_of(&INDICATOR_SIZES, &IndicatorSize::Atomic), 1);
        assert_eq!(position_of(&INDICATOR_SIZES, &IndicatorSize::Integrative), 2);
    }

    #[test]
    fn filter_picker_starts_at_the_current_filter() {
        assert_eq!(position_of(&FILTERS, &StatusFilter::Pending), 2);
    }

    #[test]
    fn unknown_value_falls_back_to_the_first_option() {
        assert_eq!(position_of(&[1, 2, 3], &7), 0);
    }

    #[test_case("", None; "empty")]
    #[test_case("  \n", None; "whitespace")]
    #[test_case("Essay writing", Some("Essay writing"); "prompt")]
    fn blank_opening_prompt_quits(text: &str, expected: Option<&str>) {
        assert_eq!(opening_prompt(text), expected);
    }
}
