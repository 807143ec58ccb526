//! Statistical helpers for the width-model cuts.

use std::f64::consts::PI;

// Lanczos approximation, g = 7, 9 coefficients.
const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula.
        (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut a = LANCZOS_COEFFS[0];
        for (i, &c) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        let t = x + LANCZOS_G + 0.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
    }
}

/// Log of the chi-square probability density with `k` degrees of freedom.
/// Returns negative infinity outside the support.
pub fn chi2_logpdf(x: f64, k: f64) -> f64 {
    if x <= 0.0 || !x.is_finite() {
        return f64::NEG_INFINITY;
    }
    let half_k = k / 2.0;
    (half_k - 1.0) * x.ln() - x / 2.0 - half_k * 2.0_f64.ln() - ln_gamma(half_k)
}

/// Clamp a value to `[low, high]`.
pub fn clip(value: f64, low: f64, high: f64) -> f64 {
    value.clamp(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ln_gamma_matches_known_values() {
        // Gamma(1) = Gamma(2) = 1, Gamma(5) = 24, Gamma(0.5) = sqrt(pi).
        assert!(ln_gamma(1.0).abs() < 1e-10);
        assert!(ln_gamma(2.0).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - 0.5 * PI.ln()).abs() < 1e-10);
    }

    #[test]
    fn chi2_logpdf_matches_closed_form_for_two_dof() {
        // For k = 2 the density is exp(-x/2)/2.
        for x in [0.1, 1.0, 5.0, 20.0] {
            let expected = (-x / 2.0) - 2.0_f64.ln();
            assert!((chi2_logpdf(x, 2.0) - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn chi2_logpdf_outside_support() {
        assert_eq!(chi2_logpdf(0.0, 3.0), f64::NEG_INFINITY);
        assert_eq!(chi2_logpdf(-1.0, 3.0), f64::NEG_INFINITY);
        assert_eq!(chi2_logpdf(f64::NAN, 3.0), f64::NEG_INFINITY);
    }

    #[test]
    fn clip_bounds() {
        assert_eq!(clip(7000.0, 0.0, 5000.0), 5000.0);
        assert_eq!(clip(-1.0, 0.0, 5000.0), 0.0);
        assert_eq!(clip(3.0, 0.0, 5000.0), 3.0);
    }
}
