use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::assessments::coordinator::{
    CompletionTracker, MatchListKey, SubmissionCoordinator, SubmissionOutcome,
};
use crate::assessments::domain::AssessmentId;
use crate::assessments::submission::SubmissionRequest;

fn request() -> SubmissionRequest {
    SubmissionRequest {
        assessment_id: AssessmentId::new(SENSORY_PROFILE),
        responses: sliders(&[("noise", 5.0)]),
        completion_time_seconds: Some(42),
    }
}

fn coordinator(
    submissions: MemorySubmissions,
) -> (
    SubmissionCoordinator<MemorySubmissions, RecordingInvalidator>,
    Arc<MemorySubmissions>,
    Arc<RecordingInvalidator>,
) {
    let submissions = Arc::new(submissions);
    let invalidator = Arc::new(RecordingInvalidator::default());
    let coordinator = SubmissionCoordinator::new(submissions.clone(), invalidator.clone());
    (coordinator, submissions, invalidator)
}

#[tokio::test]
async fn missing_credential_skips_submission_quietly() {
    let (coordinator, submissions, invalidator) = coordinator(MemorySubmissions::default());

    let outcome = coordinator.persist(None, &request()).await;

    assert_eq!(outcome, SubmissionOutcome::Skipped);
    assert!(submissions.requests().is_empty());
    assert!(invalidator.keys().is_empty());
    assert_eq!(coordinator.completed_assessments(), 0);
}

#[tokio::test]
async fn successful_submission_invalidates_once_with_the_new_count() {
    let (coordinator, submissions, invalidator) = coordinator(MemorySubmissions::default());
    let token = credential();

    let first = coordinator.persist(Some(&token), &request()).await;
    let second = coordinator.persist(Some(&token), &request()).await;

    assert_eq!(
        first,
        SubmissionOutcome::Persisted {
            key: MatchListKey {
                completed_assessments: 1
            }
        }
    );
    assert_eq!(
        second,
        SubmissionOutcome::Persisted {
            key: MatchListKey {
                completed_assessments: 2
            }
        }
    );
    assert_eq!(
        invalidator.keys(),
        vec![
            MatchListKey {
                completed_assessments: 1
            },
            MatchListKey {
                completed_assessments: 2
            },
        ]
    );

    let stored = submissions.requests();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].0, "candidate-token");
    assert_eq!(stored[0].1, request());
}

#[tokio::test]
async fn failed_submission_is_reported_without_invalidation() {
    let (coordinator, submissions, invalidator) = coordinator(MemorySubmissions::unavailable());

    let outcome = coordinator.persist(Some(&credential()), &request()).await;

    match outcome {
        SubmissionOutcome::Failed { reason } => assert!(reason.contains("database offline")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(submissions.requests().len(), 1);
    assert!(invalidator.keys().is_empty());
    assert_eq!(coordinator.completed_assessments(), 0);
}

#[test]
fn concurrent_completions_invalidate_consecutive_keys() {
    let tracker = Arc::new(CompletionTracker::new(7));
    let invalidator = Arc::new(RecordingInvalidator::default());

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let tracker = tracker.clone();
            let invalidator = invalidator.clone();
            thread::spawn(move || tracker.record(invalidator.as_ref()))
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread finishes");
    }

    assert_eq!(tracker.completed(), 9);
    assert_eq!(
        invalidator.keys(),
        vec![
            MatchListKey {
                completed_assessments: 8
            },
            MatchListKey {
                completed_assessments: 9
            },
        ]
    );
}

#[test]
fn request_serializes_with_camel_case_fields() {
    let body = serde_json::to_value(request()).expect("serializes");
    assert_eq!(body["assessmentId"], SENSORY_PROFILE);
    assert_eq!(body["completionTimeSeconds"], 42);
    assert_eq!(body["responses"]["noise"], 5.0);
}
