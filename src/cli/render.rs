//! Plain-text views of conversations and planning boards.

use planner::{
    Conversation, PlanningBoard, PlanningResult,
    domain::{IndicatorStatus, SuggestedSection, clean_section_name},
};
use serde_json::{Value, json};

use super::terminal::{self, Colorize};

/// Prints the conversation at `position` (zero-based) out of `total`.
pub fn conversation(conversation: &Conversation, position: usize, total: usize) {
    println!(
        "{}",
        format!("Conversation {}/{}", position + 1, total).info()
    );
    println!("  {}", terminal::fit(conversation.prompt(), 2).dim());
    println!();

    if !conversation.is_populated() {
        println!("{}", "Waiting for the backend…".warning());
        return;
    }

    if !conversation.introduction().is_empty() {
        let introduction: Vec<String> = conversation
            .introduction()
            .iter()
            .map(|phrase| match &phrase.related_indicator {
                Some(id) => format!("{} {}", phrase.phrase, format!("[{id}]").dim()),
                None => phrase.phrase.clone(),
            })
            .collect();
        println!("{}", introduction.join(" "));
        println!();
    }

    if conversation.group_count() == 0 {
        println!("{}", "No indicators were generated.".warning());
        return;
    }

    let detailed = !terminal::is_narrow();
    for (index, group) in conversation.groups().enumerate() {
        println!("{}", format!("{}. {}", index + 1, group.title).info());
        for indicator in group.visible() {
            let marker = if indicator.is_manual() {
                " (added)".success()
            } else if indicator.status() == IndicatorStatus::Modified {
                " (edited)".warning()
            } else {
                String::new()
            };
            println!("  {} {}{marker}", indicator.id, indicator.title);
            if detailed {
                if !indicator.description.is_empty() {
                    println!("      {}", terminal::fit(&indicator.description, 6).dim());
                }
                if let Some(module) = &indicator.module {
                    println!("      {} {}", "module:".dim(), module);
                }
                if let Some(content) = &indicator.content {
                    println!("      {} {}", "content:".dim(), terminal::fit(content, 15));
                }
            }
        }
    }
}

/// One-line summary of a suggestion.
pub fn suggestion(suggestion: &SuggestedSection) -> String {
    let coverage = suggestion.coverage();
    format!(
        "{} ({:.0}% similar, {}% {})",
        clean_section_name(&suggestion.name),
        suggestion.score * 100.0,
        coverage.rate(),
        coverage.label()
    )
}

fn result(index: usize, result: &PlanningResult) {
    let required = result.required();
    println!("  [{}] {}", index + 1, clean_section_name(&required.name));
    match result.assigned() {
        Some(assigned) => {
            let label = assigned.coverage().label();
            println!("      → {}", suggestion(assigned).coverage(label));
        }
        None => println!("      {}", "pending".warning()),
    }

    let others = result.other_suggestions().count();
    if others > 0 && !terminal::is_narrow() {
        println!(
            "      {}",
            format!("{others} other suggestion(s)").dim()
        );
    }
}

/// Prints the board, grouped by topic.
pub fn board(board: &PlanningBoard) {
    let progress = board.progress();
    println!(
        "{}",
        format!(
            "Threshold {} · {}/{} sections covered ({}%) · showing {}",
            board.threshold(),
            progress.covered,
            progress.total,
            progress.percentage(),
            board.filter
        )
        .info()
    );

    let topics = board.by_topic();
    if topics.is_empty() {
        println!("{}", "No sections match the filter.".dim());
        return;
    }

    for topic in topics {
        println!();
        println!("{}", topic.topic.info());
        for (index, planning) in topic.results {
            result(index, planning);
        }
    }
}

fn suggestion_json(suggestion: &SuggestedSection) -> Value {
    let coverage = suggestion.coverage();
    json!({
        "name": clean_section_name(&suggestion.name),
        "course": suggestion.course_name,
        "score": suggestion.score,
        "coverage_rate": coverage.rate(),
        "coverage_label": coverage.label().as_str(),
        "uncovered": coverage.uncovered_reasons(),
        "modules": suggestion
            .modules
            .iter()
            .map(|module| json!({"type": module.kind, "name": module.name, "url": module.url}))
            .collect::<Vec<_>>(),
    })
}

/// The filtered board as JSON.
pub fn board_json(board: &PlanningBoard) -> Value {
    let progress = board.progress();
    let sections: Vec<Value> = board
        .filtered()
        .map(|(_, result)| {
            let required = result.required();
            json!({
                "section": clean_section_name(&required.name),
                "topic": required.topic,
                "assigned": result.assigned().map(suggestion_json),
                "suggestions": result.suggestions().iter().map(suggestion_json).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "threshold": board.threshold().value(),
        "covered": progress.covered,
        "total": progress.total,
        "sections": sections,
    })
}
