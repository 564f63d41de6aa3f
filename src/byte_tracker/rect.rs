use nalgebra::Matrix1x4;
use num::Float;
use std::fmt::Debug;

/* ------------------------------------------------------------------------------
 * Type aliases
 * ------------------------------------------------------------------------------ */
pub type Xyah<T> = Matrix1x4<T>;

/* ------------------------------------------------------------------------------
 * Rect struct
 * ------------------------------------------------------------------------------ */
#[derive(Debug, Clone, PartialEq)]
pub struct Rect<T>
where
    T: Debug + Float,
{
    tlwh: Matrix1x4<T>,
}

impl<T> Rect<T>
where
    T: Clone + Debug + Float,
{
    pub fn new(x: T, y: T, width: T, height: T) -> Self {
        let tlwh = Matrix1x4::new(x, y, width, height);
        Self { tlwh }
    }

    #[inline(always)]
    pub fn x(&self) -> T {
        self.tlwh[(0, 0)]
    }

    #[inline(always)]
    pub fn set_x(&mut self, x: T) {
        self.tlwh[(0, 0)] = x;
    }

    #[inline(always)]
    pub fn y(&self) -> T {
        self.tlwh[(0, 1)]
    }

    #[inline(always)]
    pub fn set_y(&mut self, y: T) {
        self.tlwh[(0, 1)] = y;
    }

    #[inline(always)]
    pub fn width(&self) -> T {
        self.tlwh[(0, 2)]
    }

    #[inline(always)]
    pub fn set_width(&mut self, width: T) {
        self.tlwh[(0, 2)] = width;
    }

    #[inline(always)]
    pub fn height(&self) -> T {
        self.tlwh[(0, 3)]
    }

    #[inline(always)]
    pub fn set_height(&mut self, height: T) {
        self.tlwh[(0, 3)] = height;
    }

    pub fn area(&self) -> T {
        self.tlwh[(0, 2)] * self.tlwh[(0, 3)]
    }

    /// Intersection over union with `other`. Degenerate boxes overlap
    /// nothing, and two degenerate boxes yield zero rather than 0/0.
    pub fn calc_iou(&self, other: &Rect<T>) -> T {
        let zero = T::from(0).unwrap();

        let iw = (self.tlwh[(0, 0)] + self.tlwh[(0, 2)])
            .min(other.tlwh[(0, 0)] + other.tlwh[(0, 2)])
            - (self.tlwh[(0, 0)]).max(other.tlwh[(0, 0)]);
        if iw <= zero {
            return zero;
        }

        let ih = (self.tlwh[(0, 1)] + self.tlwh[(0, 3)])
            .min(other.tlwh[(0, 1)] + other.tlwh[(0, 3)])
            - (self.tlwh[(0, 1)]).max(other.tlwh[(0, 1)]);
        if ih <= zero {
            return zero;
        }

        let union = self.area() + other.area() - iw * ih;
        if union > zero {
            iw * ih / union
        } else {
            zero
        }
    }

    pub fn get_xyah(&self) -> Xyah<T> {
        Matrix1x4::new(
            self.tlwh[(0, 0)] + self.tlwh[(0, 2)] / T::from(2).unwrap(),
            self.tlwh[(0, 1)] + self.tlwh[(0, 3)] / T::from(2).unwrap(),
            self.tlwh[(0, 2)] / self.tlwh[(0, 3)],
            self.tlwh[(0, 3)],
        )
    }

    /// Get bounding box as [x1, y1, x2, y2] format
    pub fn get_xyxy(&self) -> [T; 4] {
        [
            self.tlwh[(0, 0)],
            self.tlwh[(0, 1)],
            self.tlwh[(0, 0)] + self.tlwh[(0, 2)],
            self.tlwh[(0, 1)] + self.tlwh[(0, 3)],
        ]
    }

    /// Create Rect from [x1, y1, x2, y2] format
    pub fn from_xyxy(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Get bounding box as [x, y, w, h] format
    pub fn get_tlwh(&self) -> [T; 4] {
        [
            self.tlwh[(0, 0)],
            self.tlwh[(0, 1)],
            self.tlwh[(0, 2)],
            self.tlwh[(0, 3)],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nearly_eq::assert_nearly_eq;

    #[test]
    fn test_xyxy_roundtrip() {
        let rect = Rect::new(10.0f32, 20.0, 30.0, 40.0);
        let [x1, y1, x2, y2] = rect.get_xyxy();
        assert_eq!(Rect::from_xyxy(x1, y1, x2, y2), rect);

        let other = Rect::from_xyxy(5.0f32, 6.0, 7.0, 8.0);
        let [x1, y1, x2, y2] = other.get_xyxy();
        assert_eq!([x1, y1, x2, y2], [5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_xyah() {
        let rect = Rect::new(100.0f32, 100.0, 100.0, 200.0);
        let xyah = rect.get_xyah();
        assert_nearly_eq!(xyah[(0, 0)], 150.0);
        assert_nearly_eq!(xyah[(0, 1)], 200.0);
        assert_nearly_eq!(xyah[(0, 2)], 0.5);
        assert_nearly_eq!(xyah[(0, 3)], 200.0);
    }

    #[test]
    fn test_iou_identical() {
        let rect = Rect::new(0.0f32, 0.0, 10.0, 10.0);
        assert_nearly_eq!(rect.calc_iou(&rect), 1.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = Rect::from_xyxy(0.0f32, 0.0, 10.0, 10.0);
        let b = Rect::from_xyxy(5.0f32, 5.0, 15.0, 15.0);
        // 5x5 intersection over 100 + 100 - 25
        assert_nearly_eq!(a.calc_iou(&b), 25.0 / 175.0, 1e-6);
        assert_nearly_eq!(b.calc_iou(&a), 25.0 / 175.0, 1e-6);
    }

    #[test]
    fn test_iou_disjoint() {
        let a = Rect::from_xyxy(0.0f32, 0.0, 10.0, 10.0);
        let b = Rect::from_xyxy(20.0f32, 0.0, 30.0, 10.0);
        assert_eq!(a.calc_iou(&b), 0.0);
    }

    #[test]
    fn test_iou_degenerate() {
        let a = Rect::new(0.0f32, 0.0, 0.0, 0.0);
        let b = Rect::from_xyxy(0.0f32, 0.0, 10.0, 10.0);
        assert_eq!(a.calc_iou(&b), 0.0);
        assert_eq!(b.calc_iou(&a), 0.0);
        // both degenerate: 0/0 must still be zero
        assert_eq!(a.calc_iou(&a), 0.0);
    }
}
