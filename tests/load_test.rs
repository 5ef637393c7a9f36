//! Concurrent generation runs against one relay.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use llm_relay::lifecycle::Shutdown;

mod common;

#[tokio::test]
async fn test_concurrent_generations() {
    let backend = common::start_mock_backend(r#"[{"generated_text":"Keep your elbow high."}]"#).await;

    let shutdown = Shutdown::new();
    let config = common::fast_config(vec![common::backend("primary", backend, 1)]);
    let relay = common::start_relay(config, &shutdown).await;

    let concurrency = 10;
    let requests_per_task = 10;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = format!("http://{}/v1/generate", relay);
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for _ in 0..requests_per_task {
                let req_start = Instant::now();
                if let Ok(res) = client.post(&url).json(&json!({ "prompt": "tips?" })).send().await {
                    if res.status().is_success() {
                        latencies.push(req_start.elapsed());
                    }
                }
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    let duration = start.elapsed();
    assert_eq!(all_latencies.len(), total_requests, "every run should succeed");

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", total_requests as f64 / duration.as_secs_f64());
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");

    shutdown.trigger();
}

#[tokio::test]
async fn test_breaker_state_is_shared_across_concurrent_runs() {
    let failing_posts = Arc::new(AtomicU32::new(0));
    let counter = failing_posts.clone();
    let failing = common::start_programmable_backend(move |request: common::MockRequest| {
        let counter = counter.clone();
        async move {
            if request.method == "HEAD" {
                return (200, String::new());
            }
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            (500, "down".to_string())
        }
    })
    .await;
    let healthy = common::start_mock_backend(r#"{"generated_text":"ok"}"#).await;

    let shutdown = Shutdown::new();
    let mut config = common::fast_config(vec![
        common::backend("failing", failing, 1),
        common::backend("healthy", healthy, 2),
    ]);
    config.resilience.max_attempts = 1;
    config.resilience.failure_threshold = 3;
    let relay = common::start_relay(config, &shutdown).await;
    let client = common::client();

    // Sequential warm-up trips the breaker.
    for _ in 0..3 {
        let res = client
            .post(format!("http://{}/v1/generate", relay))
            .json(&json!({ "prompt": "hi" }))
            .send()
            .await
            .unwrap();
        assert!(res.status().is_success());
    }
    assert_eq!(failing_posts.load(Ordering::SeqCst), 3);

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let url = format!("http://{}/v1/generate", relay);
        tasks.push(tokio::spawn(async move {
            client.post(&url).json(&json!({ "prompt": "hi" })).send().await.unwrap().status()
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().is_success());
    }
    assert_eq!(failing_posts.load(Ordering::SeqCst), 3, "tripped backend must stay skipped");

    shutdown.trigger();
}
