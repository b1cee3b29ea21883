//! Server performance analysis.
//!
//! Samples with a negative metric (the sampler could not read it) are left
//! out of averages.

use gamestat_store::model::TpsSample;
use serde::Serialize;

/// Most players online at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPeak {
    /// Sample time of the peak.
    pub date: i64,
    /// Players online.
    pub players: i32,
}

fn average(samples: &[TpsSample], metric: impl Fn(&TpsSample) -> f64) -> Option<f64> {
    let (sum, count) = samples
        .iter()
        .map(metric)
        .filter(|value| *value >= 0.0)
        .fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

/// Mean TPS.
pub fn average_tps(samples: &[TpsSample]) -> Option<f64> {
    average(samples, |s| s.tps)
}

/// Mean CPU usage.
pub fn average_cpu(samples: &[TpsSample]) -> Option<f64> {
    average(samples, |s| s.cpu_usage)
}

/// Times the TPS dropped below `threshold`.
///
/// A run of consecutive low samples counts once.
pub fn low_tps_spikes(samples: &[TpsSample], threshold: f64) -> usize {
    let mut spikes = 0;
    let mut below = false;
    for sample in samples {
        let low = sample.tps >= 0.0 && sample.tps < threshold;
        if low && !below {
            spikes += 1;
        }
        below = low;
    }
    spikes
}

/// The sample with the most players online; the earliest wins a tie.
pub fn peak_players(samples: &[TpsSample]) -> Option<PlayerPeak> {
    samples
        .iter()
        .map(|s| PlayerPeak {
            date: s.date,
            players: s.players_online,
        })
        .reduce(|best, next| if next.players > best.players { next } else { best })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
