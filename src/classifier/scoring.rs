//! Per-factor scores used by the rule matcher
//!
//! Each factor is a fixed-level score in (0, 1]. A rule's confidence is the
//! unweighted mean of the factors that could be evaluated.

use crate::config::NoiseTierConfig;
use crate::types::{NoiseLevel, PatternTag, SignalStatistics};

pub const RANGE_CONTAINED: f64 = 0.9;
pub const RANGE_OVERLAP: f64 = 0.6;
pub const RANGE_DISJOINT: f64 = 0.2;

pub const NOISE_MATCH: f64 = 0.8;
pub const NOISE_ONE_TIER_OFF: f64 = 0.5;
pub const NOISE_MISMATCH: f64 = 0.2;

pub const RESPONSE_IN_RANGE: f64 = 0.8;
pub const RESPONSE_OUT_OF_RANGE: f64 = 0.3;

pub const PATTERN_BASE: f64 = 0.3;
pub const PATTERN_SPAN: f64 = 0.6;

pub const KEYWORD_HIT: f64 = 0.9;
pub const KEYWORD_MISS: f64 = 0.2;
pub const TYPE_COMPATIBLE: f64 = 0.9;
pub const TYPE_INCOMPATIBLE: f64 = 0.1;
pub const VALUE_IN_RANGE: f64 = 0.8;
pub const VALUE_OUT_OF_RANGE: f64 = 0.3;

/// Observed [min, max] against an expected range.
pub fn range_match(stats: &SignalStatistics, (lo, hi): (f64, f64)) -> f64 {
    if stats.min >= lo && stats.max <= hi {
        RANGE_CONTAINED
    } else if stats.max >= lo && stats.min <= hi {
        RANGE_OVERLAP
    } else {
        RANGE_DISJOINT
    }
}

/// Qualitative tier of an SNR; higher SNR is cleaner.
pub fn noise_tier(snr: f64, tiers: &NoiseTierConfig) -> NoiseLevel {
    if snr >= tiers.very_low_snr {
        NoiseLevel::VeryLow
    } else if snr >= tiers.low_snr {
        NoiseLevel::Low
    } else if snr >= tiers.medium_snr {
        NoiseLevel::Medium
    } else {
        NoiseLevel::High
    }
}

/// Exact tier is a full match; one tier off either way is partial. A signal
/// much cleaner than the rule expects is as poor a match as a much noisier one.
pub fn noise_match(measured: NoiseLevel, expected: NoiseLevel) -> f64 {
    match measured.rank().abs_diff(expected.rank()) {
        0 => NOISE_MATCH,
        1 => NOISE_ONE_TIER_OFF,
        _ => NOISE_MISMATCH,
    }
}

pub fn response_match(response_time: f64, (lo, hi): (f64, f64)) -> f64 {
    if (lo..=hi).contains(&response_time) {
        RESPONSE_IN_RANGE
    } else {
        RESPONSE_OUT_OF_RANGE
    }
}

/// `None` when the rule lists no patterns.
pub fn pattern_match(observed: &[PatternTag], expected: &[PatternTag]) -> Option<f64> {
    if expected.is_empty() {
        return None;
    }
    let matched = expected.iter().filter(|p| observed.contains(p)).count();
    Some(PATTERN_BASE + PATTERN_SPAN * matched as f64 / expected.len() as f64)
}

/// Case-insensitive substring search over the device context text.
pub fn keyword_match(search_text: &str, keywords: &[String]) -> f64 {
    if keywords
        .iter()
        .any(|k| !k.is_empty() && search_text.contains(&k.to_lowercase()))
    {
        KEYWORD_HIT
    } else {
        KEYWORD_MISS
    }
}

pub fn value_match(mean: f64, (lo, hi): (f64, f64)) -> f64 {
    if (lo..=hi).contains(&mean) {
        VALUE_IN_RANGE
    } else {
        VALUE_OUT_OF_RANGE
    }
}

/// Mean of the evaluated factors; 0 when there are none.
pub fn average(factors: &[f64]) -> f64 {
    if factors.is_empty() {
        0.0
    } else {
        factors.iter().sum::<f64>() / factors.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(min: f64, max: f64) -> SignalStatistics {
        SignalStatistics {
            mean: (min + max) / 2.0,
            std: 0.0,
            variance: 0.0,
            min,
            max,
            range: max - min,
            rms: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
            median: 0.0,
            q25: 0.0,
            q75: 0.0,
            iqr: 0.0,
        }
    }

    #[test]
    fn test_range_containment_levels() {
        assert_eq!(range_match(&stats(5.0, 19.0), (4.0, 20.0)), RANGE_CONTAINED);
        assert_eq!(range_match(&stats(2.0, 10.0), (4.0, 20.0)), RANGE_OVERLAP);
        assert_eq!(range_match(&stats(30.0, 40.0), (4.0, 20.0)), RANGE_DISJOINT);
        // Boundaries are inclusive
        assert_eq!(range_match(&stats(4.0, 20.0), (4.0, 20.0)), RANGE_CONTAINED);
    }

    #[test]
    fn test_noise_tiers() {
        let tiers = NoiseTierConfig::default();
        assert_eq!(noise_tier(1e4, &tiers), NoiseLevel::VeryLow);
        assert_eq!(noise_tier(100.0, &tiers), NoiseLevel::VeryLow);
        assert_eq!(noise_tier(50.0, &tiers), NoiseLevel::Low);
        assert_eq!(noise_tier(5.0, &tiers), NoiseLevel::Medium);
        assert_eq!(noise_tier(0.1, &tiers), NoiseLevel::High);
    }

    #[test]
    fn test_noise_match_is_two_sided() {
        assert_eq!(noise_match(NoiseLevel::Medium, NoiseLevel::Medium), NOISE_MATCH);
        assert_eq!(noise_match(NoiseLevel::High, NoiseLevel::Medium), NOISE_ONE_TIER_OFF);
        assert_eq!(noise_match(NoiseLevel::Low, NoiseLevel::Medium), NOISE_ONE_TIER_OFF);
        assert_eq!(noise_match(NoiseLevel::High, NoiseLevel::VeryLow), NOISE_MISMATCH);
        // A clean signal does not fully match a rule that expects heavy noise
        assert_eq!(noise_match(NoiseLevel::VeryLow, NoiseLevel::High), NOISE_MISMATCH);
    }

    #[test]
    fn test_pattern_fraction() {
        let observed = [PatternTag::Stable, PatternTag::Clean];
        assert_eq!(pattern_match(&observed, &[]), None);
        let half = pattern_match(&observed, &[PatternTag::Stable, PatternTag::Noisy]).unwrap();
        assert!((half - 0.6).abs() < 1e-12);
        let full = pattern_match(&observed, &[PatternTag::Clean]).unwrap();
        assert!((full - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_keyword_match_case_insensitive() {
        let keywords = vec!["Ferment".to_string()];
        assert_eq!(keyword_match("fermentation tank 1", &keywords), KEYWORD_HIT);
        assert_eq!(keyword_match("boiler house", &keywords), KEYWORD_MISS);
        assert_eq!(keyword_match("anything", &[]), KEYWORD_MISS);
    }

    #[test]
    fn test_average_of_nothing_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert!((average(&[0.9, 0.5]) - 0.7).abs() < 1e-12);
    }
}
