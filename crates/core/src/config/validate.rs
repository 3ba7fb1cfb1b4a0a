use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Score thresholds are within 0..=100
/// - Tool timeouts and the decode window are non-zero
/// - Truncation tolerance is a non-negative number
/// - Scanner concurrency is non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let matcher = &config.matcher;
    for (name, value) in [
        ("matcher.auto_accept_threshold", matcher.auto_accept_threshold),
        (
            "matcher.single_candidate_threshold",
            matcher.single_candidate_threshold,
        ),
        ("matcher.auto_replace_threshold", matcher.auto_replace_threshold),
        ("matcher.min_score_with_artist", matcher.min_score_with_artist),
        (
            "matcher.min_score_without_artist",
            matcher.min_score_without_artist,
        ),
    ] {
        if value > 100 {
            return Err(invalid(format!("{} must be at most 100, got {}", name, value)));
        }
    }
    if matcher.weights.fuzzy_floor > 100 {
        return Err(invalid("matcher.weights.fuzzy_floor must be at most 100"));
    }

    let integrity = &config.integrity;
    if integrity.probe_timeout_secs == 0 || integrity.decode_timeout_secs == 0 {
        return Err(invalid("integrity timeouts cannot be 0"));
    }
    if integrity.decode_window_secs == 0 {
        return Err(invalid("integrity.decode_window_secs cannot be 0"));
    }
    if !integrity.truncation_tolerance_secs.is_finite()
        || integrity.truncation_tolerance_secs < 0.0
    {
        return Err(invalid(
            "integrity.truncation_tolerance_secs must be a non-negative number",
        ));
    }

    if config.scanner.max_parallel_checks == 0 {
        return Err(invalid("scanner.max_parallel_checks cannot be 0"));
    }

    if config.index.cache_ttl_hours == 0 {
        return Err(invalid("index.cache_ttl_hours cannot be 0"));
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}
