pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Checks that a two-class distribution is finite, non-negative and sums to one.
pub(crate) fn is_distribution(probabilities: &[f64; 2]) -> bool {
    probabilities.iter().all(|p| p.is_finite() && *p >= 0.0)
        && (probabilities[0] + probabilities[1] - 1.0).abs() < 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_is_symmetric() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }

    #[test]
    fn test_distribution_check() {
        assert!(is_distribution(&[0.25, 0.75]));
        assert!(!is_distribution(&[0.5, 0.6]));
        assert!(!is_distribution(&[f64::NAN, 1.0]));
    }
}
