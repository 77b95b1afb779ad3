//! Construction-time configuration for cloth meshes

/// A coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis in a position vector
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Spatial rule selecting which particles are anchored after construction
///
/// A particle is pinned when its initial coordinate on `axis` is strictly
/// greater than `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinRule {
    pub axis: Axis,
    pub threshold: f32,
}

impl Default for PinRule {
    fn default() -> Self {
        Self {
            axis: Axis::X,
            threshold: 1.2,
        }
    }
}

impl PinRule {
    pub fn new(axis: Axis, threshold: f32) -> Self {
        Self { axis, threshold }
    }

    pub fn pins(&self, position: [f32; 4]) -> bool {
        position[self.axis.index()] > self.threshold
    }
}

/// How shared edges between faces are discovered
///
/// Both strategies emit the same constraints in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdjacencyStrategy {
    /// Test every unordered pair of faces; quadratic in face count
    #[default]
    AllPairs,
    /// Bucket faces by sorted edge first, then test only faces in a shared bucket
    EdgeMap,
}

/// Configuration applied when a cloth mesh is turned into particles and constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ClothConfig {
    /// `None` leaves every particle free
    pub pin_rule: Option<PinRule>,
    pub adjacency: AdjacencyStrategy,
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self {
            pin_rule: Some(PinRule::default()),
            adjacency: AdjacencyStrategy::default(),
        }
    }
}

impl ClothConfig {
    pub fn with_pin_rule(mut self, rule: PinRule) -> Self {
        self.pin_rule = Some(rule);
        self
    }

    pub fn without_pinning(mut self) -> Self {
        self.pin_rule = None;
        self
    }

    pub fn with_adjacency(mut self, adjacency: AdjacencyStrategy) -> Self {
        self.adjacency = adjacency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rule_pins_beyond_x_threshold() {
        let rule = PinRule::default();
        assert!(rule.pins([1.25, 0.0, 0.0, 1.0]));
        assert!(!rule.pins([1.2, 0.0, 0.0, 1.0]));
        assert!(!rule.pins([0.0, 5.0, 5.0, 1.0]));
    }

    #[test]
    fn rule_reads_configured_axis() {
        let rule = PinRule::new(Axis::Y, 0.5);
        assert!(rule.pins([0.0, 0.75, 0.0, 1.0]));
        assert!(!rule.pins([0.75, 0.0, 0.0, 1.0]));
    }
}
