// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod config;
mod pipeline;

use anyhow::{anyhow, ensure, Result};
use config::SandboxConfig;
use pipeline::{IncidentCounter, IncidentListener, IncidentLog, IncidentRegistry, Monitor};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use weft_core::queue::BlockingQueue;
use weft_core::sync::Latch;

fn main() -> Result<()> {
    let config = SandboxConfig::from_args(std::env::args())?;
    weft_telemetry::init_logging(&config.log)?;
    log::info!(
        "Sandbox starting: {} producers x {} samples, alert threshold {:.2}",
        config.producers,
        config.samples_per_producer,
        config.alert_threshold
    );

    let queue = Arc::new(BlockingQueue::new());
    let listeners = Arc::new(IncidentRegistry::new());

    let counter = Arc::new(IncidentCounter::default());
    let counting: Arc<dyn IncidentListener> = counter.clone();
    let logging: Arc<dyn IncidentListener> = Arc::new(IncidentLog);
    listeners.register(&logging)?;
    listeners.register(&counting)?;

    let monitor = Monitor::new(
        Arc::clone(&queue),
        Arc::clone(&listeners),
        config.alert_threshold,
    );
    let monitor = thread::Builder::new()
        .name("monitor".to_string())
        .spawn(move || monitor.run())?;

    let start = Arc::new(Latch::new(1));
    let done = Arc::new(Latch::new(config.producers));
    let producers = (0..config.producers)
        .map(|producer| {
            let (start, done, queue) = (Arc::clone(&start), Arc::clone(&done), Arc::clone(&queue));
            let samples = config.samples_per_producer;
            thread::Builder::new()
                .name(format!("producer-{producer}"))
                .spawn(move || pipeline::produce(producer, samples, &start, &done, &queue))
        })
        .collect::<std::io::Result<Vec<_>>>()?;

    start.count_down();
    done.wait();
    while !queue.is_empty() {
        thread::sleep(Duration::from_millis(1));
    }
    queue.cancel_dequeue();

    let report = monitor
        .join()
        .map_err(|_| anyhow!("monitor thread panicked"))?;
    for producer in producers {
        producer
            .join()
            .map_err(|_| anyhow!("producer thread panicked"))?;
    }

    listeners.unregister_all()?;
    ensure!(
        counter.count() == report.incidents,
        "counter saw {} incidents, monitor raised {}",
        counter.count(),
        report.incidents
    );
    log::info!(
        "Sandbox finished: {} samples processed, {} incidents, {} failed deliveries.",
        report.processed,
        report.incidents,
        report.failed_deliveries
    );
    Ok(())
}
