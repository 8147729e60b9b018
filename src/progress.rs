//! Progress bar shown while regions load

use indicatif::{ProgressBar, ProgressStyle};

/// Progress display for showing regions
pub struct ProgressDisplay {
    region_pb: ProgressBar,
}

impl ProgressDisplay {
    /// Create a new progress display with total region count
    pub fn new(total_regions: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let region_pb = ProgressBar::new(total_regions);
        region_pb.set_style(style);
        region_pb.set_message("loading fragments");
        Self { region_pb }
    }

    /// Mark a region as settled
    pub fn region_done(&self, region: &str) {
        self.region_pb.set_message(region.to_string());
        self.region_pb.inc(1);
    }

    pub fn finish(&self) {
        self.region_pb.finish_and_clear();
    }
}
