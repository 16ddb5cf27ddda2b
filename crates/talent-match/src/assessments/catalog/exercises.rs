use std::collections::BTreeSet;

use super::super::domain::{
    AnalysisRoute, AssessmentDefinition, AssessmentId, Dimension, Item, ItemBody, ItemId,
    LocalScoring,
};
use super::super::scoring::ScoringRubric;

const VIDEO_COMPREHENSION_URL: &str =
    "https://media.talent-match.example/assessments/remote-team-standup.mp4";

pub(super) fn information_sorting() -> AssessmentDefinition {
    let tokens = [
        "Reply to a client escalation",
        "Update the weekly status report",
        "Book travel for next quarter",
        "Review a teammate's pull request",
        "Clean up old shared files",
        "Prepare slides for tomorrow's demo",
        "Renew an expiring software licence",
        "Read an industry newsletter",
    ];
    let buckets = ["Do now", "Schedule", "Delegate", "Drop"];

    AssessmentDefinition {
        id: AssessmentId::new("information-sorting"),
        title: "Information Sorting",
        estimated_minutes: 4,
        cognitive_dimension_tags: BTreeSet::from([
            Dimension::ExecutiveFunction,
            Dimension::ProblemSolving,
            Dimension::PatternRecognition,
        ]),
        items: vec![Item {
            id: ItemId::new("priorities"),
            body: ItemBody::Categorization {
                tokens: tokens.into_iter().collect(),
                buckets: buckets.into_iter().collect(),
            },
        }],
        local_scoring: LocalScoring::Coverage,
        analysis_route: AnalysisRoute::Analyze,
    }
}

pub(super) fn video_comprehension() -> AssessmentDefinition {
    let question = |id: &str, prompt: &'static str| Item {
        id: ItemId::new(id),
        body: ItemBody::FreeText {
            prompt,
            min_length: 20,
        },
    };

    AssessmentDefinition {
        id: AssessmentId::new("video-comprehension"),
        title: "Video Comprehension",
        estimated_minutes: 10,
        cognitive_dimension_tags: BTreeSet::from([
            Dimension::VerbalComprehension,
            Dimension::WorkingMemory,
            Dimension::Attention,
        ]),
        items: vec![
            question(
                "main-idea",
                "In your own words, what was the main goal of the meeting?",
            ),
            question(
                "blocker",
                "Which blocker did the team agree to tackle first, and why?",
            ),
            question(
                "next-step",
                "What would you do next if you joined this team tomorrow?",
            ),
        ],
        local_scoring: LocalScoring::Coverage,
        analysis_route: AnalysisRoute::GradeOpenEnded {
            video_url: VIDEO_COMPREHENSION_URL,
        },
    }
}

pub(super) fn sensory_profile() -> AssessmentDefinition {
    let slider = |id: &str, prompt: &'static str| Item {
        id: ItemId::new(id),
        body: ItemBody::Slider {
            prompt,
            min: 1.0,
            max: 7.0,
            step: 1.0,
            default: 4.0,
        },
    };

    AssessmentDefinition {
        id: AssessmentId::new("sensory-profile"),
        title: "Sensory Work Environment Profile",
        estimated_minutes: 3,
        cognitive_dimension_tags: BTreeSet::from([
            Dimension::SensoryProcessing,
            Dimension::Attention,
        ]),
        items: vec![
            slider("noise", "How much does background noise affect your focus?"),
            slider(
                "interruptions",
                "How disruptive are unplanned interruptions for you?",
            ),
            slider("lighting", "How sensitive are you to harsh or dim lighting?"),
            slider("crowding", "How draining are busy, crowded workspaces?"),
            slider(
                "schedule_changes",
                "How much do sudden schedule changes unsettle you?",
            ),
        ],
        local_scoring: LocalScoring::Rubric(ScoringRubric::sensory_profile()),
        analysis_route: AnalysisRoute::LocalOnly,
    }
}
