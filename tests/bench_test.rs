//! Benchmark tests for critical operations
//!
//! Run with: cargo test --release -- --nocapture bench

use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;

use campaigner::database::{init_db, AppState};
use campaigner::handler::{campaign, contact, template};
use campaigner::model::{
    ContactItem, CreateCampaignRequest, CreateTemplateRequest, ImportRequest, Recipient,
    UserParams,
};

use axum::{
    body::to_bytes,
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::Value;

/// Benchmark helper to measure execution time
fn benchmark<F>(name: &str, iterations: usize, mut f: F)
where
    F: FnMut(),
{
    let start = Instant::now();

    for _ in 0..iterations {
        f();
    }

    let duration = start.elapsed();
    let avg_ms = duration.as_millis() as f64 / iterations as f64;
    let ops_per_sec = (iterations as f64 / duration.as_secs_f64()) as u64;

    println!("  {} ({} iterations)", name, iterations);
    println!("    Total time: {:?}", duration);
    println!("    Avg time: {:.3}ms", avg_ms);
    println!("    Throughput: {} ops/sec\n", ops_per_sec);
}

fn contact_batch(user: &str, size: usize, offset: usize) -> ImportRequest {
    ImportRequest {
        user_id: user.to_string(),
        contacts: (0..size)
            .map(|i| ContactItem {
                number: format!("55119999{:05}", offset + i),
                name: format!("Contact {}", offset + i),
                last_message_at: None,
                last_message_text: None,
            })
            .collect(),
    }
}

#[tokio::test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
async fn bench_import_contacts() {
    println!("\n=== Benchmark: Contact Import ===\n");

    let temp_db = NamedTempFile::new().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
    let state = AppState { db: Arc::new(db) };

    // Fresh batches: every entry takes the insert path
    let iterations = 100;
    let mut offset = 0;
    benchmark("Import 100 new contacts per batch", iterations, || {
        let state_clone = state.clone();
        let req = contact_batch("bench_user", 100, offset);
        offset += 100;

        tokio::runtime::Handle::current().block_on(async {
            let _ = contact::import_contacts(State(state_clone), Json(req)).await;
        });
    });

    // Re-importing the same numbers: every entry takes the update path,
    // against the full number map built per call
    benchmark("Re-import 100 existing contacts", iterations, || {
        let state_clone = state.clone();
        let req = contact_batch("bench_user", 100, 0);

        tokio::runtime::Handle::current().block_on(async {
            let _ = contact::import_contacts(State(state_clone), Json(req)).await;
        });
    });
}

#[tokio::test]
#[ignore]
async fn bench_campaign_stats() {
    println!("\n=== Benchmark: Campaign Statistics ===\n");

    let temp_db = NamedTempFile::new().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
    let state = AppState { db: Arc::new(db) };

    // One campaign with 1000 tracking rows
    println!("  Preparing: Creating campaign with 1000 recipients...");
    let response = template::create_template(
        State(state.clone()),
        Json(CreateTemplateRequest {
            user_id: "stats_bench".to_string(),
            name: "Bench template".to_string(),
            category: "utility".to_string(),
            content: "Oi {{1}}".to_string(),
            variables: vec![],
        }),
    )
    .await
    .into_response();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let template_id = serde_json::from_slice::<Value>(&bytes).unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let recipients: Vec<Recipient> = (0..1000)
        .map(|i| Recipient {
            phone: format!("55119999{:05}", i),
            variables: vec![format!("Recipient {}", i)],
        })
        .collect();
    let response = campaign::create_campaign(
        State(state.clone()),
        Json(CreateCampaignRequest {
            user_id: "stats_bench".to_string(),
            name: "Bench campaign".to_string(),
            description: None,
            template_id,
            recipient_list: recipients,
            scheduled_for: None,
        }),
    )
    .await
    .into_response();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let campaign_id = serde_json::from_slice::<Value>(&bytes).unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    println!("  Done!\n");

    // Benchmark the per-status scan over the campaign index
    let iterations = 1000;
    benchmark("Stats over 1000 tracking rows", iterations, || {
        let state_clone = state.clone();
        let id = campaign_id.clone();
        let params = UserParams {
            user_id: "stats_bench".to_string(),
        };

        tokio::runtime::Handle::current().block_on(async {
            let _ = campaign::campaign_stats(Path(id), State(state_clone), Query(params)).await;
        });
    });
}

#[tokio::test]
#[ignore]
async fn bench_concurrent_imports() {
    println!("\n=== Benchmark: Concurrent Imports ===\n");

    let temp_db = NamedTempFile::new().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
    let state = Arc::new(AppState { db: Arc::new(db) });

    let num_tasks = 50;
    let batches_per_task = 10;

    println!(
        "  Running {} concurrent tasks with {} batches each...",
        num_tasks, batches_per_task
    );

    let start = Instant::now();

    let mut handles = vec![];

    for task_id in 0..num_tasks {
        let state_clone = state.clone();

        let handle = tokio::spawn(async move {
            for batch_id in 0..batches_per_task {
                let req = contact_batch(&format!("user_{}", task_id), 20, batch_id * 20);
                let _ = contact::import_contacts(
                    State(state_clone.as_ref().clone()),
                    Json(req),
                )
                .await;
            }
        });

        handles.push(handle);
    }

    // Wait for all tasks
    for handle in handles {
        handle.await.unwrap();
    }

    let duration = start.elapsed();
    let total_contacts = num_tasks * batches_per_task * 20;
    let per_sec = total_contacts as f64 / duration.as_secs_f64();

    println!("  Total contacts written: {}", total_contacts);
    println!("  Total time: {:?}", duration);
    println!("  Throughput: {:.0} contacts/sec\n", per_sec);
}

#[test]
fn bench_summary() {
    println!("\n{}", "=".repeat(60));
    println!("Benchmark Test Suite");
    println!("{}", "=".repeat(60));
    println!("\nTo run benchmarks, use:");
    println!("  cargo test --release bench -- --ignored --nocapture");
    println!("\nAvailable benchmarks:");
    println!("  • bench_import_contacts    - Import batch insert/update paths");
    println!("  • bench_campaign_stats     - Index scan over tracking rows");
    println!("  • bench_concurrent_imports - Concurrent access patterns");
    println!("\n{}\n", "=".repeat(60));
}
