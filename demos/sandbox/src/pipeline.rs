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

//! Producers, the monitoring consumer and the incident listeners.

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use weft_core::event::ListenerRegistry;
use weft_core::queue::BlockingQueue;
use weft_core::sync::Latch;

/// A reading emitted by a producer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub producer: usize,
    pub sequence: usize,
    /// Normalized reading in `[0, 1)`.
    pub value: f64,
}

impl Sample {
    /// Deterministic pseudo-reading, so runs are reproducible.
    pub fn synthetic(producer: usize, sequence: usize) -> Self {
        let raw = (producer * 31 + sequence * 17 + producer * sequence) % 100;
        Self {
            producer,
            sequence,
            value: raw as f64 / 100.0,
        }
    }
}

/// A sample that crossed the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Incident {
    pub sample: Sample,
    pub threshold: f64,
}

/// Subscriber to incidents raised by the [`Monitor`].
pub trait IncidentListener: Send + Sync {
    fn on_incident(&self, incident: &Incident) -> Result<()>;
}

pub type IncidentRegistry = ListenerRegistry<dyn IncidentListener>;

/// Reports every incident through the logger.
pub struct IncidentLog;

impl IncidentListener for IncidentLog {
    fn on_incident(&self, incident: &Incident) -> Result<()> {
        log::warn!(
            "Incident: producer {} sample #{} read {:.2} (threshold {:.2})",
            incident.sample.producer,
            incident.sample.sequence,
            incident.sample.value,
            incident.threshold
        );
        Ok(())
    }
}

/// Counts incidents.
#[derive(Debug, Default)]
pub struct IncidentCounter {
    count: AtomicUsize,
}

impl IncidentCounter {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl IncidentListener for IncidentCounter {
    fn on_incident(&self, _: &Incident) -> Result<()> {
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Emits `samples` synthetic samples once the start gate opens.
pub fn produce(
    producer: usize,
    samples: usize,
    start: &Latch,
    done: &Latch,
    queue: &BlockingQueue<Sample>,
) {
    start.wait();
    for sequence in 0..samples {
        queue.enqueue(Sample::synthetic(producer, sequence));
    }
    log::debug!("Producer {producer} emitted {samples} samples.");
    done.count_down();
}

/// What the monitor saw before it was stopped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReport {
    pub processed: usize,
    pub incidents: usize,
    pub failed_deliveries: usize,
}

/// The single consumer of the sample queue.
pub struct Monitor {
    queue: Arc<BlockingQueue<Sample>>,
    listeners: Arc<IncidentRegistry>,
    threshold: f64,
}

impl Monitor {
    pub fn new(
        queue: Arc<BlockingQueue<Sample>>,
        listeners: Arc<IncidentRegistry>,
        threshold: f64,
    ) -> Self {
        Self {
            queue,
            listeners,
            threshold,
        }
    }

    /// Consumes samples until the queue's dequeue is cancelled.
    pub fn run(&self) -> MonitorReport {
        let mut report = MonitorReport::default();
        while let Ok(sample) = self.queue.dequeue() {
            report.processed += 1;
            if sample.value < self.threshold {
                continue;
            }

            report.incidents += 1;
            let incident = Incident {
                sample,
                threshold: self.threshold,
            };
            if let Err(e) = self.listeners.notify(|l| l.on_incident(&incident)) {
                report.failed_deliveries += 1;
                log::error!("Incident delivery failed: {e:#}");
            }
        }
        log::info!("Monitor stopped after {} samples.", report.processed);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::thread;

    struct Rejecting;

    impl IncidentListener for Rejecting {
        fn on_incident(&self, _: &Incident) -> Result<()> {
            bail!("rejected")
        }
    }

    #[test]
    fn test_synthetic_values_are_normalized() {
        for producer in 0..4 {
            for sequence in 0..100 {
                let value = Sample::synthetic(producer, sequence).value;
                assert!((0.0..1.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_monitor_raises_incidents_above_threshold() {
        let queue = Arc::new(BlockingQueue::new());
        let listeners = Arc::new(IncidentRegistry::new());
        let counter = Arc::new(IncidentCounter::default());
        let rejecting: Arc<dyn IncidentListener> = Arc::new(Rejecting);
        let counting: Arc<dyn IncidentListener> = counter.clone();
        listeners.register(&rejecting).unwrap();
        listeners.register(&counting).unwrap();

        for (sequence, value) in [0.1, 0.95, 0.5, 0.9].into_iter().enumerate() {
            queue.enqueue(Sample {
                producer: 0,
                sequence,
                value,
            });
        }
        queue.enqueue(Sample::synthetic(1, 1));

        let monitor = Monitor::new(Arc::clone(&queue), listeners, 0.9);
        let worker = thread::spawn(move || monitor.run());
        while !queue.is_empty() {
            thread::yield_now();
        }
        queue.cancel_dequeue();

        let report = worker.join().expect("monitor panicked");
        let expected_incidents = 2 + usize::from(Sample::synthetic(1, 1).value >= 0.9);
        assert_eq!(report.processed, 5);
        assert_eq!(report.incidents, expected_incidents);
        // The rejecting listener fails every delivery; the counter still sees all.
        assert_eq!(report.failed_deliveries, expected_incidents);
        assert_eq!(counter.count(), expected_incidents);
    }
}
