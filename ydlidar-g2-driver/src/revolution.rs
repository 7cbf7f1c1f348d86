use crate::session::ScanItem;
use log::debug;
use std::mem;
use ydlidar_g2_data::Scan;

/// Folds the packet stream into revolutions delimited by heading markers.
#[derive(Debug, Default)]
pub struct RevolutionAssembler {
    scan: Scan,
}

impl RevolutionAssembler {
    pub fn new() -> RevolutionAssembler {
        RevolutionAssembler::default()
    }

    /// Adds one stream item. Returns the finished revolution when `item` is a
    /// heading marker closing a revolution that holds samples.
    pub fn push(&mut self, item: ScanItem) -> Option<Scan> {
        let packet = match item {
            Ok(packet) => packet,
            Err(_) => {
                self.scan.dropped_frames += 1;
                return None;
            }
        };

        if packet.is_heading_marker() {
            return self.finish();
        }

        for sample in &packet.samples {
            self.scan.angles_degree.push(sample.angle_degree);
            self.scan.distances_mm.push(sample.distance_mm);
            self.scan.intensities.push(sample.intensity);
        }
        if packet.frequency_hz.is_some() {
            self.scan.frequency_hz = packet.frequency_hz;
        }
        None
    }

    /// Takes the revolution in progress, if it holds any sample.
    pub fn finish(&mut self) -> Option<Scan> {
        let scan = mem::take(&mut self.scan);
        if scan.is_empty() {
            return None;
        }
        debug!(
            "Revolution with {} samples, {} dropped frames",
            scan.len(),
            scan.dropped_frames
        );
        Some(scan)
    }
}

/// Iterator over whole revolutions of a packet stream.
///
/// Samples received before the first heading marker form a partial first
/// revolution, and the samples left when the stream ends a partial last one.
pub struct Revolutions<I> {
    items: I,
    assembler: RevolutionAssembler,
}

impl<I: Iterator<Item = ScanItem>> Revolutions<I> {
    pub fn new(items: I) -> Revolutions<I> {
        Revolutions {
            items,
            assembler: RevolutionAssembler::new(),
        }
    }
}

impl<I: Iterator<Item = ScanItem>> Iterator for Revolutions<I> {
    type Item = Scan;

    fn next(&mut self) -> Option<Scan> {
        for item in self.items.by_ref() {
            if let Some(scan) = self.assembler.push(item) {
                return Some(scan);
            }
        }
        self.assembler.finish()
    }
}
