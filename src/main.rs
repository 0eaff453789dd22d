//! smartedu-sync - one reconciliation pass for the configured identity.
//!
//! Loads the local cache from the data directory, syncs it against the
//! enrollment service (when configured), waits for pending writes and
//! prints a summary.

use chrono::Local;
use std::process::ExitCode;
use std::sync::Arc;

use smartedu_core::adapters::{
    FileKeyValueStore, HttpEnrollmentStore, HttpStoreConfig, InMemoryChangeBus,
};
use smartedu_core::application::{EnrollmentReconciler, GamificationTracker, PreferenceModel};
use smartedu_core::config::AppConfig;
use smartedu_core::ports::{KeyValueStore, RemoteEnrollmentStore};
use smartedu_core::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("smartedu-sync: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("smartedu-sync: invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    telemetry::init_tracing(&config.logging);

    let identity = config.identity.identity();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.storage.data_dir));
    let remote: Option<Arc<dyn RemoteEnrollmentStore>> =
        match HttpStoreConfig::from_remote_config(&config.remote).map(HttpEnrollmentStore::new) {
            Some(Ok(client)) => Some(Arc::new(client)),
            Some(Err(e)) => {
                tracing::warn!("enrollment service client unavailable, running offline: {}", e);
                None
            }
            None => None,
        };

    tracing::info!(
        identity = %identity,
        data_dir = %config.storage.data_dir.display(),
        remote = remote.is_some(),
        "starting enrollment sync"
    );

    let reconciler = EnrollmentReconciler::new(
        store.clone(),
        Arc::new(InMemoryChangeBus::new()),
        remote,
        identity.clone(),
    );
    reconciler.load();
    let report = reconciler.sync().await;
    reconciler.flush().await;

    let enrollments = reconciler.enrollments();
    let preferences = PreferenceModel::new(store.clone(), &identity);
    let tracker = GamificationTracker::new(store, &identity);
    let summary = tracker.summary(&enrollments, Local::now().date_naive());

    println!("identity:    {}", identity);
    if report.is_skipped() {
        println!("sync:        {:?}", report.outcome);
    } else {
        println!(
            "sync:        {:?} (pushed {}, failed {})",
            report.outcome, report.pushed, report.failed_pushes
        );
    }
    for e in &enrollments {
        println!("  {:<24} {}", e.course_id.as_str(), e.progress_percent);
    }
    println!("preference:  {}", preferences.get_suggestion(&preferences.load()));
    println!(
        "progress:    {} courses, avg {}%, max {}%, streak {} days",
        summary.stats.total_courses,
        summary.stats.avg_progress,
        summary.stats.max_progress,
        summary.streak
    );
    let badges: Vec<&str> = summary.badges.iter().map(|b| b.label()).collect();
    println!("badges:      {}", badges.join(", "));

    ExitCode::SUCCESS
}
