//! Tests for JobOrderService command semantics.

use std::sync::Arc;

use crate::errors::Error;
use crate::events::{DomainEvent, MockDomainEventSink};
use crate::job_orders::{
    JobOrderError, JobOrderService, JobOrderServiceTrait, JobOrderStatus, JobOrderUpdate,
    NewJobOrder,
};
use crate::test_support::InMemoryJobOrderRepository;

fn service() -> (
    JobOrderService,
    InMemoryJobOrderRepository,
    MockDomainEventSink,
) {
    let repo = InMemoryJobOrderRepository::new();
    let sink = MockDomainEventSink::new();
    let service = JobOrderService::new(Arc::new(repo.clone()), Arc::new(sink.clone()));
    (service, repo, sink)
}

#[tokio::test]
async fn test_create_then_progress_to_completion() {
    let (service, _repo, sink) = service();

    let created = service
        .create_job_order(NewJobOrder::new("JO-100", 50))
        .await
        .unwrap();
    assert_eq!(created.current_qty, 0);
    assert_eq!(created.percent_completion, 0.0);
    assert_eq!(created.status, JobOrderStatus::Ongoing);

    let listed = service.get_job_orders().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].order_number, "JO-100");

    let half = service
        .update_job_order(
            "JO-100".to_string(),
            JobOrderUpdate::new(25, JobOrderStatus::Ongoing),
        )
        .await
        .unwrap();
    assert_eq!(half.percent_completion, 50.0);

    let done = service
        .update_job_order(
            "JO-100".to_string(),
            JobOrderUpdate::new(50, JobOrderStatus::Completed),
        )
        .await
        .unwrap();
    assert_eq!(done.percent_completion, 100.0);
    assert_eq!(done.status, JobOrderStatus::Completed);

    let events = sink.events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], DomainEvent::JobOrderCreated { .. }));
    match &events[2] {
        DomainEvent::JobOrderUpdated { before, after } => {
            assert_eq!(before.as_ref().unwrap().current_qty, 25);
            assert_eq!(after.current_qty, 50);
        }
        other => panic!("Expected JobOrderUpdated, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicate_create_leaves_store_unchanged() {
    let (service, repo, sink) = service();
    service
        .create_job_order(NewJobOrder::new("JO-1", 10))
        .await
        .unwrap();

    let err = service
        .create_job_order(NewJobOrder::new("JO-1", 99))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::JobOrder(JobOrderError::DuplicateKey(ref n)) if n == "JO-1"
    ));
    assert_eq!(repo.len(), 1);
    assert_eq!(service.get_job_order("JO-1").unwrap().desired_qty, 10);
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn test_update_unknown_order_is_not_found_and_silent() {
    let (service, _repo, sink) = service();

    let err = service
        .update_job_order(
            "JO-404".to_string(),
            JobOrderUpdate::new(1, JobOrderStatus::Ongoing),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::JobOrder(JobOrderError::NotFound(_))));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_update_beyond_desired_is_rejected() {
    let (service, _repo, sink) = service();
    service
        .create_job_order(NewJobOrder::new("JO-7", 5))
        .await
        .unwrap();
    sink.clear();

    let err = service
        .update_job_order(
            "JO-7".to_string(),
            JobOrderUpdate::new(6, JobOrderStatus::Ongoing),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::JobOrder(JobOrderError::InvalidQuantity { .. })
    ));
    assert_eq!(service.get_job_order("JO-7").unwrap().current_qty, 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_create_validation_runs_before_store() {
    let (service, repo, _sink) = service();

    assert!(matches!(
        service.create_job_order(NewJobOrder::new("", 5)).await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        service.create_job_order(NewJobOrder::new("JO-2", 0)).await,
        Err(Error::Validation(_))
    ));
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_order_number_is_trimmed() {
    let (service, _repo, _sink) = service();
    let created = service
        .create_job_order(NewJobOrder::new("  JO-9 ", 3))
        .await
        .unwrap();
    assert_eq!(created.order_number, "JO-9");
    assert!(service.get_job_order(" JO-9").is_ok());
}
