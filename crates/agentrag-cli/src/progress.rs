//! Ingestion progress on stderr

use agentrag_core::IngestReport;
use std::io::{self, Write};

/// Single-line progress reporter; silent in JSON mode
pub struct ProgressReporter {
    total: usize,
    started: usize,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(total: usize, enabled: bool) -> Self {
        Self {
            total,
            started: 0,
            enabled,
        }
    }

    pub fn start(&mut self, label: &str) {
        self.started += 1;
        if self.enabled {
            eprint!("\r[{}/{}] {:<60.60}", self.started, self.total, label);
            io::stderr().flush().ok();
        }
    }

    pub fn finish(&self, report: &IngestReport) {
        if !self.enabled {
            return;
        }
        eprintln!(
            "\rIndexed {} chunk(s) from {}/{} source(s){:<30}",
            report.chunks.len(),
            self.total.saturating_sub(report.failures.len()),
            self.total,
            ""
        );
        for (label, reason) in &report.failures {
            eprintln!("  skipped {}: {}", label, reason);
        }
    }
}
