use rand::Rng;

use crate::error::{Error, Result};

pub trait Space<T> {
    /// 从空间中均匀采样
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T;

    fn contains(&self, value: &T) -> bool;
}

/// Continuous box with inclusive per-axis bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpace<const N: usize> {
    low: [f64; N],
    high: [f64; N],
}

impl<const N: usize> BoxSpace<N> {
    /// [-1, 1] on every axis.
    pub const UNIT: Self = Self {
        low: [-1.0; N],
        high: [1.0; N],
    };

    pub fn new(low: [f64; N], high: [f64; N]) -> Result<Self> {
        for (axis, (l, h)) in low.iter().zip(high.iter()).enumerate() {
            if !l.is_finite() || !h.is_finite() {
                return Err(Error::InvalidSpace(format!(
                    "axis {axis} has non-finite bounds [{l}, {h}]"
                )));
            }
            if l > h {
                return Err(Error::InvalidSpace(format!(
                    "axis {axis} has low {l} greater than high {h}"
                )));
            }
        }
        Ok(Self { low, high })
    }

    /// Same bounds on every axis.
    pub fn uniform(low: f64, high: f64) -> Result<Self> {
        Self::new([low; N], [high; N])
    }

    pub fn low(&self) -> &[f64; N] {
        &self.low
    }

    pub fn high(&self) -> &[f64; N] {
        &self.high
    }

    pub fn shape(&self) -> usize {
        N
    }
}

impl<const N: usize> Space<[f64; N]> for BoxSpace<N> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; N] {
        std::array::from_fn(|i| rng.random_range(self.low[i]..=self.high[i]))
    }

    fn contains(&self, value: &[f64; N]) -> bool {
        value
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .all(|(v, (l, h))| (*l..=*h).contains(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn samples_stay_inside_bounds() {
        let space = BoxSpace::<2>::new([-1.0, 0.0], [1.0, 5.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = space.sample(&mut rng);
            assert!(space.contains(&x), "{x:?} escaped the box");
        }
    }

    #[test]
    fn degenerate_axis_is_allowed() {
        let space = BoxSpace::<1>::uniform(3.0, 3.0).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(space.sample(&mut rng), [3.0]);
    }

    #[test]
    fn inverted_or_nan_bounds_are_rejected() {
        assert!(BoxSpace::<2>::new([0.0, 1.0], [1.0, 0.0]).is_err());
        assert!(BoxSpace::<1>::uniform(f64::NAN, 1.0).is_err());
        assert!(!BoxSpace::<1>::uniform(-1.0, 1.0).unwrap().contains(&[f64::NAN]));
    }
}
