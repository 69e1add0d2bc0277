use glam::DVec2;

/// Number of control points per panel needed for a homography.
pub const MAX_CONTROL_POINTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ControlPointError {
    #[error("Maximum of {} control points already selected", MAX_CONTROL_POINTS)]
    MaxControlPoints,
    #[error("Control point index {0} out of range")]
    InvalidIndex(usize),
    #[error("Control point ({x}, {y}) is not finite")]
    NonFinite { x: f64, y: f64 },
}

/// Fixed four-slot control-point store in image space.
///
/// Slot order is click order; slot `i` in one panel corresponds to slot `i`
/// in the other. Slots may be empty after a removal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlPoints {
    slots: [Option<DVec2>; MAX_CONTROL_POINTS],
}

impl ControlPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from up to four points. Extra points are rejected.
    pub fn from_points(points: &[DVec2]) -> Result<Self, ControlPointError> {
        let mut out = Self::new();
        for &p in points {
            out.push(p)?;
        }
        Ok(out)
    }

    /// Fill the first empty slot. A fifth point is rejected, never replaces.
    pub fn push(&mut self, p: DVec2) -> Result<usize, ControlPointError> {
        check_finite(p)?;
        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(ControlPointError::MaxControlPoints)?;
        self.slots[index] = Some(p);
        Ok(index)
    }

    pub fn set(&mut self, index: usize, p: DVec2) -> Result<(), ControlPointError> {
        check_finite(p)?;
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(ControlPointError::InvalidIndex(index))?;
        *slot = Some(p);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Option<DVec2> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<DVec2> {
        self.slots.get(index).copied().flatten()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == MAX_CONTROL_POINTS
    }

    #[inline]
    pub fn slots(&self) -> &[Option<DVec2>; MAX_CONTROL_POINTS] {
        &self.slots
    }

    /// Set points in slot order as `(index, point)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, DVec2)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|p| (i, p)))
    }

    /// All four points, or `None` while any slot is empty.
    pub fn complete(&self) -> Option<[DVec2; MAX_CONTROL_POINTS]> {
        let [a, b, c, d] = self.slots;
        Some([a?, b?, c?, d?])
    }

    /// Apply `f` to every set point, dropping points for which it returns `None`.
    pub fn map(&self, mut f: impl FnMut(DVec2) -> Option<DVec2>) -> ControlPoints {
        ControlPoints {
            slots: self.slots.map(|slot| slot.and_then(&mut f)),
        }
    }
}

fn check_finite(p: DVec2) -> Result<(), ControlPointError> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(ControlPointError::NonFinite { x: p.x, y: p.y })
    }
}
