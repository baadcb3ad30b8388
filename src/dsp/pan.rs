use std::f32::consts::FRAC_PI_2;

/// Entries in each pan lookup table.
pub const PAN_STEPS: usize = 128;

/// Equal-power pan law as a pair of lookup tables.
///
/// Index 0 is hard left, `PAN_STEPS - 1` hard right. For every index
/// `left² + right² == 1`, so a source keeps its power as it moves.
#[derive(Debug, Clone)]
pub struct PanTable {
    left: [f32; PAN_STEPS],
    right: [f32; PAN_STEPS],
}

impl PanTable {
    pub fn new() -> Self {
        let mut left = [0.0; PAN_STEPS];
        let mut right = [0.0; PAN_STEPS];
        for p in 0..PAN_STEPS {
            let angle = p as f32 / (PAN_STEPS - 1) as f32 * FRAC_PI_2;
            left[p] = angle.cos();
            right[p] = angle.sin();
        }
        Self { left, right }
    }

    /// Table index for a pan position in -1.0 (left) ..= 1.0 (right).
    #[inline]
    pub fn index(pan: f32) -> usize {
        let unit = (pan.clamp(-1.0, 1.0) + 1.0) * 0.5;
        ((unit * (PAN_STEPS - 1) as f32).round() as usize).min(PAN_STEPS - 1)
    }

    /// Left and right gains for a pan position.
    #[inline]
    pub fn gains(&self, pan: f32) -> (f32, f32) {
        let p = Self::index(pan);
        (self.left[p], self.right[p])
    }

    pub fn left(&self) -> &[f32; PAN_STEPS] {
        &self.left
    }

    pub fn right(&self) -> &[f32; PAN_STEPS] {
        &self.right
    }
}

impl Default for PanTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_preserves_power() {
        let table = PanTable::new();
        for p in 0..PAN_STEPS {
            let power = table.left()[p].powi(2) + table.right()[p].powi(2);
            assert!((power - 1.0).abs() < 0.01, "index {p} power {power}");
        }
    }

    #[test]
    fn extremes_are_hard_panned() {
        let table = PanTable::new();
        let (l, r) = table.gains(-1.0);
        assert!((l - 1.0).abs() < 1e-6 && r.abs() < 1e-6);
        let (l, r) = table.gains(1.0);
        assert!(l.abs() < 1e-6 && (r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_positions_clamp() {
        assert_eq!(PanTable::index(-3.0), 0);
        assert_eq!(PanTable::index(7.5), PAN_STEPS - 1);
        let center = PanTable::index(0.0);
        assert!(center == 63 || center == 64);
    }
}
