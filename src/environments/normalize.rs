/// Fixed affine standardization using the moments of a uniform distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformNormalizer {
    pub mean: f64,
    pub std: f64,
}

impl UniformNormalizer {
    /// Mean `(low + high) / 2`, std `sqrt((high - low)^2 / 12)`.
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            mean: (high + low) / 2.0,
            std: ((high - low).powi(2) / 12.0).sqrt(),
        }
    }

    pub fn apply(&self, v: [f64; 2]) -> [f64; 2] {
        v.map(|x| (x - self.mean) / self.std)
    }
}
