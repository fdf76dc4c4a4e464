//! Random variate generation.
//!
//! Every sampler consumes exactly one uniform(0,1) draw from the stream and
//! returns it next to the sampled value, so each stochastic decision can be
//! audited from the trace.

use rand::{Rng, RngCore};
use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Variate {
    pub rnd: f64,
    pub value: f64,
}

pub fn exponential(rng: &mut dyn RngCore, mean: f64) -> Result<Variate> {
    if !mean.is_finite() || mean <= 0.0 {
        return Err(Error::InvalidDistribution {
            distribution: "exponential",
            reason: format!("mean must be > 0 (got {})", mean),
        });
    }
    let rnd = rng.gen::<f64>();
    Ok(Variate {
        rnd,
        value: -mean * (1.0 - rnd).ln(),
    })
}

pub fn uniform(rng: &mut dyn RngCore, low: f64, high: f64) -> Result<Variate> {
    if !low.is_finite() || !high.is_finite() || low > high {
        return Err(Error::InvalidDistribution {
            distribution: "uniform",
            reason: format!("expected finite low <= high (got {}..{})", low, high),
        });
    }
    let rnd = rng.gen::<f64>();
    Ok(Variate {
        rnd,
        value: low + rnd * (high - low),
    })
}

pub fn unit(rng: &mut dyn RngCore) -> Variate {
    let rnd = rng.gen::<f64>();
    Variate { rnd, value: rnd }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedRng;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn scripted_rng_replays_exact_draws() {
        let mut rng = ScriptedRng::new(&[0.5, 0.25]);
        assert_eq!(unit(&mut rng).rnd, 0.5);
        assert_eq!(unit(&mut rng).rnd, 0.25);
        assert_eq!(unit(&mut rng).rnd, 0.5);
    }

    #[test]
    fn exponential_uses_inverse_transform() {
        let mut rng = ScriptedRng::new(&[0.5]);
        let variate = exponential(&mut rng, 3.0).unwrap();
        assert_eq!(variate.rnd, 0.5);
        assert!((variate.value - 3.0 * std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn uniform_interpolates_between_bounds() {
        let mut rng = ScriptedRng::new(&[0.25]);
        let variate = uniform(&mut rng, 0.8, 2.4).unwrap();
        assert_eq!(variate.rnd, 0.25);
        assert!((variate.value - 1.2).abs() < 1e-12);
    }

    #[test]
    fn degenerate_uniform_returns_the_bound() {
        let mut rng = StdRng::seed_from_u64(3);
        let variate = uniform(&mut rng, 2.0, 2.0).unwrap();
        assert_eq!(variate.value, 2.0);
    }

    #[test]
    fn exponential_rejects_non_positive_mean() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = exponential(&mut rng, 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid exponential distribution: mean must be > 0 (got 0)"
        );
        assert!(exponential(&mut rng, -1.0).is_err());
        assert!(exponential(&mut rng, f64::NAN).is_err());
    }

    #[test]
    fn uniform_rejects_inverted_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(uniform(&mut rng, 3.0, 1.0).is_err());
        assert!(uniform(&mut rng, 1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn samples_stay_within_support() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1_000 {
            let u = uniform(&mut rng, 0.5, 1.5).unwrap();
            assert!((0.5..=1.5).contains(&u.value));
            let e = exponential(&mut rng, 3.0).unwrap();
            assert!(e.value >= 0.0);
            assert!((0.0..1.0).contains(&e.rnd));
        }
    }
}
