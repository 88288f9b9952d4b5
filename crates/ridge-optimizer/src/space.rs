//! Search space definitions and candidate sampling.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use ridge_types::{ConfigError, Position};
use serde::{Deserialize, Serialize};

/// A single dimension of the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Human-readable name (e.g. "x0", "learning_rate").
    pub name: String,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Grid spacing anchored at `min`. `None` means continuous.
    pub step: Option<f64>,
}

impl Dimension {
    pub fn continuous(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            step: None,
        }
    }

    pub fn stepped(name: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            step: Some(step),
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        // Finite bounds can still be too far apart for `max - min` to be finite.
        if !self.min.is_finite() || !self.max.is_finite() || !self.width().is_finite() {
            return Err(ConfigError::NonFiniteBounds {
                dimension: index,
                name: self.name.clone(),
                min: self.min,
                max: self.max,
            });
        }
        if self.min > self.max {
            return Err(ConfigError::InvalidBounds {
                dimension: index,
                name: self.name.clone(),
                min: self.min,
                max: self.max,
            });
        }
        if let Some(step) = self.step {
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigError::InvalidStep {
                    dimension: index,
                    name: self.name.clone(),
                    step,
                });
            }
        }
        Ok(())
    }

    /// Highest grid index reachable without leaving `[min, max]`.
    fn top_index(&self, step: f64) -> u64 {
        // Tolerance keeps e.g. [0, 1] with step 0.1 from losing its last point.
        ((self.width() / step) + 1e-9).floor() as u64
    }

    /// Clamp into bounds, then snap onto the grid if the dimension has one.
    fn snap(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        match self.step {
            None => clamped,
            Some(step) => {
                let top = self.top_index(step) as f64;
                let k = ((clamped - self.min) / step).round().clamp(0.0, top);
                self.grid_point(k, step)
            }
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.width() == 0.0 {
            return self.min;
        }
        match self.step {
            None => rng.random_range(self.min..=self.max),
            Some(step) => {
                let k = rng.random_range(0..=self.top_index(step));
                self.grid_point(k as f64, step)
            }
        }
    }

    /// The `k`-th grid value. Rounding in `min + k * step` may land just past
    /// `max` on the top point, so the result is capped there.
    fn grid_point(&self, k: f64, step: f64) -> f64 {
        (self.min + k * step).min(self.max)
    }

    fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// How neighbor offsets are drawn around the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborDistribution {
    /// Offset uniform in `[-r, r]`.
    #[default]
    Uniform,
    /// Offset Gaussian with standard deviation `r`.
    Normal,
}

impl NeighborDistribution {
    fn offset<R: Rng + ?Sized>(self, radius: f64, rng: &mut R) -> f64 {
        match self {
            Self::Uniform => rng.random_range(-radius..=radius),
            Self::Normal => match Normal::new(0.0, radius) {
                Ok(normal) => normal.sample(rng),
                Err(_) => 0.0,
            },
        }
    }
}

/// The full search space: an ordered list of validated dimensions.
///
/// A `SearchSpace` holds no random state. Callers lend it the random source
/// for each draw, so the space itself stays immutable and can be shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Dimension>", into = "Vec<Dimension>")]
pub struct SearchSpace {
    dimensions: Vec<Dimension>,
}

impl TryFrom<Vec<Dimension>> for SearchSpace {
    type Error = ConfigError;

    fn try_from(dimensions: Vec<Dimension>) -> Result<Self, Self::Error> {
        Self::new(dimensions)
    }
}

impl From<SearchSpace> for Vec<Dimension> {
    fn from(space: SearchSpace) -> Self {
        space.dimensions
    }
}

impl SearchSpace {
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self, ConfigError> {
        if dimensions.is_empty() {
            return Err(ConfigError::EmptySearchSpace);
        }
        for (index, dim) in dimensions.iter().enumerate() {
            dim.validate(index)?;
        }
        Ok(Self { dimensions })
    }

    /// Continuous space from `(min, max)` pairs; dimensions are named `x0`, `x1`, ...
    pub fn from_bounds(bounds: &[(f64, f64)]) -> Result<Self, ConfigError> {
        Self::new(
            bounds
                .iter()
                .enumerate()
                .map(|(i, &(min, max))| Dimension::continuous(format!("x{i}"), min, max))
                .collect(),
        )
    }

    pub fn builder() -> SearchSpaceBuilder {
        SearchSpaceBuilder::default()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions.len()
    }

    pub fn dimension(&self, index: usize) -> Option<&Dimension> {
        self.dimensions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.dimensions.iter()
    }

    /// True if `position` has the right length and every value is in bounds.
    pub fn contains(&self, position: &Position) -> bool {
        position.dimensions() == self.dimensions.len()
            && self
                .dimensions
                .iter()
                .zip(position.iter())
                .all(|(dim, &v)| dim.contains(v))
    }

    /// Check a caller-supplied initial position against this space.
    pub(crate) fn check_initial(&self, index: usize, position: &Position) -> Result<(), ConfigError> {
        if position.dimensions() != self.dimensions.len() {
            return Err(ConfigError::InitialPositionDimension {
                index,
                expected: self.dimensions.len(),
                actual: position.dimensions(),
            });
        }
        for (dimension, (dim, &value)) in self.dimensions.iter().zip(position.iter()).enumerate() {
            if !dim.contains(value) {
                return Err(ConfigError::InitialPositionOutOfBounds {
                    index,
                    dimension,
                    value,
                    min: dim.min,
                    max: dim.max,
                });
            }
        }
        Ok(())
    }

    /// Uniformly random position, respecting bounds and grids.
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position::new(self.dimensions.iter().map(|dim| dim.sample(rng)).collect())
    }

    /// Random neighbor of `position`.
    ///
    /// Each coordinate moves by an offset scaled to `step_scale * (max - min)`
    /// of its dimension (at least one grid step for stepped dimensions), then
    /// is clamped and snapped. A non-positive `step_scale` returns the input
    /// unchanged without drawing from `rng`.
    pub fn neighbor<R: Rng + ?Sized>(
        &self,
        position: &Position,
        step_scale: f64,
        distribution: NeighborDistribution,
        rng: &mut R,
    ) -> Position {
        if step_scale <= 0.0 || step_scale.is_nan() {
            return position.clone();
        }

        let values = self
            .dimensions
            .iter()
            .zip(position.iter())
            .map(|(dim, &value)| {
                let mut radius = step_scale * dim.width();
                if let Some(step) = dim.step {
                    if dim.width() > 0.0 {
                        radius = radius.max(step);
                    }
                }
                if radius == 0.0 {
                    return value;
                }
                dim.snap(value + distribution.offset(radius, rng))
            })
            .collect();

        Position::new(values)
    }
}

/// Builder chain for [`SearchSpace`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct SearchSpaceBuilder {
    dimensions: Vec<Dimension>,
}

impl SearchSpaceBuilder {
    pub fn add_float(mut self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.dimensions.push(Dimension::continuous(name, min, max));
        self
    }

    pub fn add_int(mut self, name: impl Into<String>, min: i64, max: i64) -> Self {
        self.dimensions
            .push(Dimension::stepped(name, min as f64, max as f64, 1.0));
        self
    }

    pub fn add_stepped(mut self, name: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        self.dimensions.push(Dimension::stepped(name, min, max, step));
        self
    }

    pub fn build(self) -> Result<SearchSpace, ConfigError> {
        SearchSpace::new(self.dimensions)
    }
}
