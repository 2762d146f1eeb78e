use crate::line_classifier::{classify_line_id, LineCategory};
use live_model::VehiclePosition;

/// Dashboard figures for one snapshot. Recomputed, never stored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stats {
    /// Category counts in the order categories were first seen.
    pub counts: Vec<(LineCategory, usize)>,
    pub total: usize,
    pub on_time: usize,
    pub late: usize,
    pub early: usize,
}

impl Stats {
    pub fn count(&self, category: LineCategory) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(0, |(_, n)| *n)
    }

    fn bump(&mut self, category: LineCategory) {
        match self.counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((category, 1)),
        }
    }
}

pub fn aggregate(vehicles: &[VehiclePosition]) -> Stats {
    let mut stats = Stats::default();

    for vehicle in vehicles {
        stats.bump(classify_line_id(&vehicle.line_id).category);
        stats.total += 1;

        match vehicle.delay() {
            Some(delay) if delay.is_early() => stats.early += 1,
            Some(delay) if delay.is_late() => stats.late += 1,
            _ => stats.on_time += 1,
        }
    }

    stats
}
