use std::collections::BTreeSet;

use super::super::domain::{
    AnalysisRoute, AssessmentDefinition, AssessmentId, Dimension, Item, ItemBody, ItemId,
    LocalScoring,
};

fn choice(
    id: &str,
    prompt: &'static str,
    options: [&'static str; 4],
    dimension_tags: &[Dimension],
) -> Item {
    Item {
        id: ItemId::new(id),
        body: ItemBody::Choice {
            prompt,
            options: options.to_vec(),
            dimension_tags: dimension_tags.to_vec(),
        },
    }
}

fn tags_of(items: &[Item]) -> BTreeSet<Dimension> {
    items
        .iter()
        .flat_map(|item| item.dimension_tags().iter().copied())
        .collect()
}

pub(super) fn cognitive_style() -> AssessmentDefinition {
    use Dimension::*;

    let items = vec![
        choice(
            "cs-01",
            "When you receive a new project brief, what do you do first?",
            [
                "Skim everything to get the big picture",
                "Read the details line by line",
                "Sketch a plan or diagram",
                "Talk it through with someone",
            ],
            &[ProblemSolving, VerbalComprehension],
        ),
        choice(
            "cs-02",
            "Which instructions are easiest for you to follow?",
            [
                "Written step-by-step lists",
                "Diagrams or screenshots",
                "A short video walkthrough",
                "Someone showing me in person",
            ],
            &[VerbalComprehension, PatternRecognition],
        ),
        choice(
            "cs-03",
            "How do you keep track of several tasks at once?",
            [
                "A single running list",
                "A calendar with time blocks",
                "I keep it in my head",
                "I work on one thing until it is done",
            ],
            &[WorkingMemory, ExecutiveFunction],
        ),
        choice(
            "cs-04",
            "A spreadsheet has a value that looks wrong. What is your instinct?",
            [
                "Trace where the number came from",
                "Compare it with similar rows",
                "Flag it and move on",
                "Ask the person who made it",
            ],
            &[Attention, PatternRecognition],
        ),
        choice(
            "cs-05",
            "When a plan changes at the last minute, you usually...",
            [
                "Adjust quickly and keep going",
                "Need a moment to re-plan",
                "Prefer to finish the original plan first",
                "Ask for the reason before switching",
            ],
            &[ExecutiveFunction],
        ),
        choice(
            "cs-06",
            "Which pace of work suits you best?",
            [
                "Fast, with many short tasks",
                "Steady, with predictable milestones",
                "Bursts of deep focus with breaks",
                "Slow and thorough",
            ],
            &[ProcessingSpeed, Attention],
        ),
        choice(
            "cs-07",
            "How do you prefer to solve an unfamiliar problem?",
            [
                "Try things and learn from mistakes",
                "Research how others solved it",
                "Break it into smaller parts",
                "Brainstorm with a group",
            ],
            &[ProblemSolving],
        ),
        choice(
            "cs-08",
            "After a long meeting, what do you remember best?",
            [
                "The decisions that were made",
                "Who said what",
                "The visuals that were shown",
                "Only what I wrote down",
            ],
            &[WorkingMemory, VerbalComprehension],
        ),
        choice(
            "cs-09",
            "How do you react to a sequence like 2, 4, 8, 16?",
            [
                "I spot the rule right away",
                "I check a few steps to be sure",
                "I prefer words to numbers",
                "I would use a tool to check",
            ],
            &[PatternRecognition, ProcessingSpeed],
        ),
        choice(
            "cs-10",
            "Which feedback style helps you improve most?",
            [
                "Direct and immediate",
                "Written with examples",
                "Scheduled one-on-one reviews",
                "Peer feedback from the team",
            ],
            &[VerbalComprehension, ExecutiveFunction],
        ),
    ];

    AssessmentDefinition {
        id: AssessmentId::new("cognitive-style"),
        title: "Cognitive Style Profile",
        estimated_minutes: 8,
        cognitive_dimension_tags: tags_of(&items),
        items,
        local_scoring: LocalScoring::Coverage,
        analysis_route: AnalysisRoute::Analyze,
    }
}

pub(super) fn focus_and_attention() -> AssessmentDefinition {
    use Dimension::*;

    let items = vec![
        choice(
            "fa-01",
            "How long can you usually focus before needing a break?",
            [
                "Under 20 minutes",
                "20 to 45 minutes",
                "45 to 90 minutes",
                "Longer than 90 minutes",
            ],
            &[Attention],
        ),
        choice(
            "fa-02",
            "What pulls your attention away most often?",
            [
                "Chat and email notifications",
                "Conversations nearby",
                "My own thoughts",
                "Rarely anything",
            ],
            &[Attention, SensoryProcessing],
        ),
        choice(
            "fa-03",
            "When you are interrupted, how quickly do you get back on track?",
            [
                "Almost immediately",
                "Within a few minutes",
                "It takes a while",
                "I often lose the thread",
            ],
            &[Attention, WorkingMemory],
        ),
        choice(
            "fa-04",
            "Which tasks do you find hardest to start?",
            [
                "Long open-ended tasks",
                "Repetitive tasks",
                "Tasks with unclear instructions",
                "None in particular",
            ],
            &[ExecutiveFunction],
        ),
        choice(
            "fa-05",
            "How do you handle detailed proofreading?",
            [
                "I enjoy catching small errors",
                "I can do it with a checklist",
                "I prefer someone else does it",
                "I use tools to help",
            ],
            &[Attention, ProcessingSpeed],
        ),
        choice(
            "fa-06",
            "What helps you stay focused the most?",
            [
                "Headphones or quiet",
                "A clear deadline",
                "Working alongside others",
                "Breaking work into timed sprints",
            ],
            &[ExecutiveFunction, SensoryProcessing],
        ),
    ];

    AssessmentDefinition {
        id: AssessmentId::new("focus-attention"),
        title: "Focus & Attention Check",
        estimated_minutes: 5,
        cognitive_dimension_tags: tags_of(&items),
        items,
        local_scoring: LocalScoring::Coverage,
        analysis_route: AnalysisRoute::Analyze,
    }
}
