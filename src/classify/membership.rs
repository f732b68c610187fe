//! Closed-form fuzzy membership functions

/// Gaussian membership: `exp(-(x - mean)^2 / (2 sigma^2))`
pub fn gaussian(x: f64, mean: f64, sigma: f64) -> f64 {
    let d = x - mean;
    (-(d * d) / (2.0 * sigma * sigma)).exp()
}

/// Trapezoid membership with corners `[a, b, c, d]`, `a <= b <= c <= d`
///
/// Rises linearly on `[a, b]`, is 1 on `[b, c]` and falls linearly on
/// `[c, d]`. Degenerate edges (`a == b` or `c == d`) are vertical.
pub fn trapezoid(x: f64, [a, b, c, d]: [f64; 4]) -> f64 {
    if x < a || x > d {
        0.0
    } else if x < b {
        (x - a) / (b - a)
    } else if x <= c {
        1.0
    } else if d > c {
        (d - x) / (d - c)
    } else {
        0.0
    }
}

/// Generalized bell membership: `1 / (1 + |(x - center) / width|^(2 slope))`
pub fn bell(x: f64, [width, slope, center]: [f64; 3]) -> f64 {
    1.0 / (1.0 + ((x - center) / width).abs().powf(2.0 * slope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian() {
        assert_eq!(gaussian(25.0, 25.0, 10.0), 1.0);
        assert!((gaussian(35.0, 25.0, 10.0) - (-0.5f64).exp()).abs() < 1e-12);
        // Symmetric around the mean
        assert_eq!(gaussian(90.0, 0.0, 60.0), gaussian(90.0, 180.0, 60.0));
    }

    #[test]
    fn test_trapezoid_with_vertical_left_edge() {
        let corners = [0.0, 0.0, 1.0, 2.0];
        assert_eq!(trapezoid(0.0, corners), 1.0);
        assert_eq!(trapezoid(0.7, corners), 1.0);
        assert!((trapezoid(1.5, corners) - 0.5).abs() < 1e-12);
        assert_eq!(trapezoid(2.0, corners), 0.0);
        assert_eq!(trapezoid(5.0, corners), 0.0);
        assert_eq!(trapezoid(-0.1, corners), 0.0);
    }

    #[test]
    fn test_trapezoid_rising_edge() {
        let corners = [1.0, 3.0, 4.0, 6.0];
        assert!((trapezoid(2.0, corners) - 0.5).abs() < 1e-12);
        assert_eq!(trapezoid(3.5, corners), 1.0);
    }

    #[test]
    fn test_bell() {
        let dark = [2.0, 1.0, 3.0];
        assert_eq!(bell(3.0, dark), 1.0);
        assert!((bell(5.0, dark) - 0.5).abs() < 1e-12);
        assert!((bell(1.0, dark) - 0.5).abs() < 1e-12);
        assert!(bell(11.0, dark) > 0.0);
    }
}
