use crate::dims::Dims;

/// Inclusive rectangle, `end` is the last cell inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub start: Dims,
    pub end: Dims,
}

impl Rect {
    pub fn new(start: Dims, end: Dims) -> Self {
        Self { start, end }
    }

    pub fn sized_at(start: Dims, size: Dims) -> Self {
        Self::new(start, Dims(start.0 + size.0, start.1 + size.1) - Dims(1, 1))
    }

    pub fn sized(size: Dims) -> Self {
        Self::sized_at(Dims(0, 0), size)
    }

    pub fn size(&self) -> Dims {
        Dims(self.end.0 - self.start.0, self.end.1 - self.start.1) + Dims(1, 1)
    }

    pub fn is_empty(&self) -> bool {
        let size = self.size();
        size.0 <= 0 || size.1 <= 0
    }

    pub fn contains(&self, pos: Dims) -> bool {
        (self.start.0..=self.end.0).contains(&pos.0) && (self.start.1..=self.end.1).contains(&pos.1)
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::new(
            Dims(self.start.0.max(other.start.0), self.start.1.max(other.start.1)),
            Dims(self.end.0.min(other.end.0), self.end.1.min(other.end.1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Dims, Rect};

    #[test]
    fn sized_rect_is_inclusive() {
        let rect = Rect::sized_at(Dims(2, 1), Dims(3, 2));
        assert_eq!(rect.end, Dims(4, 2));
        assert_eq!(rect.size(), Dims(3, 2));
        assert!(rect.contains(Dims(4, 2)));
        assert!(!rect.contains(Dims(5, 2)));
        assert!(!rect.contains(Dims(1, 1)));
    }

    #[test]
    fn intersection_can_be_empty() {
        let a = Rect::sized(Dims(4, 4));
        let b = Rect::sized_at(Dims(2, 2), Dims(4, 4));
        assert_eq!(a.intersect(&b), Rect::new(Dims(2, 2), Dims(3, 3)));

        let far = Rect::sized_at(Dims(10, 10), Dims(1, 1));
        assert!(a.intersect(&far).is_empty());
    }
}
