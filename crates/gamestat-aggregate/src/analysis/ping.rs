//! Ping analysis.

use gamestat_store::model::Ping;

/// Mean of the samples' window averages.
#[allow(clippy::cast_precision_loss)]
pub fn average_ping(samples: &[Ping]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|p| p.avg).sum();
    Some(sum / samples.len() as f64)
}

/// Lowest ping seen in any window.
pub fn lowest_ping(samples: &[Ping]) -> Option<i32> {
    samples.iter().map(|p| p.min).min()
}

/// Highest ping seen in any window.
pub fn highest_ping(samples: &[Ping]) -> Option<i32> {
    samples.iter().map(|p| p.max).max()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn ping(min: i32, max: i32, avg: f64) -> Ping {
        Ping {
            server_uuid: Uuid::nil(),
            date: 0,
            min,
            max,
            avg,
        }
    }

    #[test]
    fn summarizes_windows() {
        let samples = [ping(10, 50, 20.0), ping(5, 80, 40.0)];
        assert_eq!(average_ping(&samples), Some(30.0));
        assert_eq!(lowest_ping(&samples), Some(5));
        assert_eq!(highest_ping(&samples), Some(80));
    }

    #[test]
    fn no_samples() {
        assert_eq!(average_ping(&[]), None);
        assert_eq!(highest_ping(&[]), None);
    }
}
