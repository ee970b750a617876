mod support;

use std::sync::Arc;

use abcd_analysis::db::repositories::LocalRepository;
use abcd_analysis::db::repository::{AnalysisResultRepository, FullRepository};
use abcd_analysis::models::UserId;
use abcd_analysis::services::{
    run_batch_job, AnalysisRunCache, BatchRequest, BatchWorker, JobStatus, JobTracker, LogLevel,
};

use support::{date, seed};

async fn seeded(days: &[&str]) -> (LocalRepository, UserId) {
    let repo = LocalRepository::new();
    let user = UserId::new("batcher");
    for (i, day) in days.iter().enumerate() {
        seed(&repo, &user, day, &[i as u32 % 4, 10]).await;
    }
    (repo, user)
}

#[tokio::test]
async fn test_batch_job_stores_runs_and_completes() {
    let (repo, user) = seeded(&[
        "2025-07-01",
        "2025-07-02",
        "2025-07-03",
        "2025-07-04",
        "2025-07-05",
        "2025-07-06",
        "2025-07-07",
    ])
    .await;
    let cache = AnalysisRunCache::new(Arc::new(repo.clone()) as Arc<dyn FullRepository>, 2);
    let tracker = JobTracker::new();
    let job_id = tracker.create_job(&user);

    let request = BatchRequest {
        user: user.clone(),
        triggers: vec![],
        hours: vec![],
        topics: vec![],
    };
    let summary = run_batch_job(
        job_id.clone(),
        tracker.clone(),
        cache,
        BatchWorker::new(2, 4).unwrap(),
        request,
    )
    .await
    .unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(
        repo.list_run_dates(&user).await.unwrap(),
        vec![
            date("2025-07-04"),
            date("2025-07-05"),
            date("2025-07-06"),
            date("2025-07-07")
        ]
    );

    let stored = repo.get_run(&user, date("2025-07-07")).await.unwrap().unwrap();
    assert_eq!(stored.hours.len(), 2);

    let job = tracker.get_job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress.unwrap().percent, 100);
    assert_eq!(job.result.unwrap()["succeeded"], 4);
}

#[tokio::test]
async fn test_batch_job_logs_item_failures() {
    let (repo, user) = seeded(&["2025-07-01", "2025-07-02", "2025-07-03", "2025-07-04"]).await;
    let cache = AnalysisRunCache::new(Arc::new(repo.clone()) as Arc<dyn FullRepository>, 1);
    let tracker = JobTracker::new();
    let job_id = tracker.create_job(&user);

    let request = BatchRequest {
        user: user.clone(),
        triggers: vec![date("2025-07-02"), date("2025-07-04")],
        hours: vec![],
        topics: vec![],
    };
    let summary = run_batch_job(
        job_id.clone(),
        tracker.clone(),
        cache,
        BatchWorker::new(5, 4).unwrap(),
        request,
    )
    .await
    .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    let warnings: Vec<String> = tracker
        .get_logs(&job_id)
        .into_iter()
        .filter(|entry| entry.level == LogLevel::Warning)
        .map(|entry| entry.message)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("2025-07-02"));
}

#[tokio::test]
async fn test_batch_job_fails_when_repository_down() {
    let (repo, user) = seeded(&["2025-07-01"]).await;
    repo.set_healthy(false);
    let cache = AnalysisRunCache::new(Arc::new(repo.clone()) as Arc<dyn FullRepository>, 1);
    let tracker = JobTracker::new();
    let job_id = tracker.create_job(&user);

    let request = BatchRequest {
        user,
        triggers: vec![],
        hours: vec![],
        topics: vec![],
    };
    let result = run_batch_job(
        job_id.clone(),
        tracker.clone(),
        cache,
        BatchWorker::new(5, 4).unwrap(),
        request,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(tracker.get_job(&job_id).unwrap().status, JobStatus::Failed);
}
