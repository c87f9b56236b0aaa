use crate::types::Verdict;
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

pub struct Metrics {
    latency: Mutex<Histogram<u64>>, // micros
    started: Instant,
    requests: Mutex<u64>,
    verdicts: Mutex<[u64; 3]>, // safe, suspicious, dangerous
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            latency: Mutex::new(Histogram::new(3).expect("latency histogram")),
            started: Instant::now(),
            requests: Mutex::new(0),
            verdicts: Mutex::new([0; 3]),
        }
    }

    pub fn observe_request(&self, dur: Duration, verdict: Verdict) {
        let micros = dur.as_micros() as u64;
        let _ = self.latency.lock().record(micros);
        *self.requests.lock() += 1;
        let slot = match verdict {
            Verdict::Safe => 0,
            Verdict::Suspicious => 1,
            Verdict::Dangerous => 2,
        };
        self.verdicts.lock()[slot] += 1;
    }

    pub fn format(&self) -> String {
        let h = self.latency.lock();
        let p50 = h.value_at_quantile(0.50) as f64 / 1000.0;
        let p95 = h.value_at_quantile(0.95) as f64 / 1000.0;
        let p99 = h.value_at_quantile(0.99) as f64 / 1000.0;

        let requests = *self.requests.lock();
        let elapsed = self.started.elapsed().as_secs_f64().max(1.0);
        let qps = requests as f64 / elapsed;
        let verdicts = self.verdicts.lock();

        format!(
            "qps {qps:.2}\nrequests_total {requests}\np50_ms {p50:.3}\np95_ms {p95:.3}\np99_ms {p99:.3}\nverdict_safe {}\nverdict_suspicious {}\nverdict_dangerous {}\n",
            verdicts[0], verdicts[1], verdicts[2]
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_requests_per_verdict() {
        let m = Metrics::new();
        m.observe_request(Duration::from_micros(120), Verdict::Safe);
        m.observe_request(Duration::from_micros(340), Verdict::Dangerous);
        m.observe_request(Duration::from_micros(90), Verdict::Safe);

        let out = m.format();
        assert!(out.contains("requests_total 3"));
        assert!(out.contains("verdict_safe 2"));
        assert!(out.contains("verdict_suspicious 0"));
        assert!(out.contains("verdict_dangerous 1"));
    }
}
