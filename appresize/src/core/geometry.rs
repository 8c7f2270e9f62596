use std::ops::{Add, AddAssign, Sub, SubAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn magnitude(self) -> f64 {
        self.distance(Point::default())
    }
}

/// Relative pointer motion reported with a mouse event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
}

impl Delta {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point { x: 0.0, y: 0.0 },
        size: Size {
            width: 0.0,
            height: 0.0,
        },
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Half-open containment: points on the max edges belong to the
    /// neighbouring rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    pub fn is_empty(&self) -> bool {
        self.size.width <= 0.0 || self.size.height <= 0.0
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Delta> for Point {
    type Output = Point;

    fn add(self, rhs: Delta) -> Point {
        Point::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl AddAssign<Delta> for Point {
    fn add_assign(&mut self, rhs: Delta) {
        *self = *self + rhs;
    }
}

impl Add<Delta> for Size {
    type Output = Size;

    fn add(self, rhs: Delta) -> Size {
        Size::new(self.width + rhs.dx, self.height + rhs.dy)
    }
}

impl AddAssign<Delta> for Size {
    fn add_assign(&mut self, rhs: Delta) {
        *self = *self + rhs;
    }
}

impl SubAssign<Delta> for Size {
    fn sub_assign(&mut self, rhs: Delta) {
        *self = Size::new(self.width - rhs.dx, self.height - rhs.dy);
    }
}

/// The window corner that follows the pointer during a resize. Window
/// coordinates grow downward, so "top" is the minimum y edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Corner of a window of `size` nearest to `offset`, the pointer position
    /// relative to the window origin.
    pub fn nearest(offset: Point, size: Size) -> Self {
        let left = offset.x < size.width / 2.0;
        let top = offset.y < size.height / 2.0;
        match (left, top) {
            (true, true) => Corner::TopLeft,
            (false, true) => Corner::TopRight,
            (true, false) => Corner::BottomLeft,
            (false, false) => Corner::BottomRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_and_magnitude() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
        assert_eq!(Point::new(1.0, 1.0).distance(Point::new(1.0, 1.0)), 0.0);
        assert_eq!(Point::new(-6.0, 8.0).magnitude(), 10.0);
    }

    #[test]
    fn test_point_subtraction() {
        let offset = Point::new(130.0, 80.0) - Point::new(100.0, 50.0);
        assert_eq!(offset, Point::new(30.0, 30.0));
    }

    #[test]
    fn test_delta_arithmetic() {
        let mut origin = Point::new(10.0, 10.0);
        origin += Delta::new(5.0, -3.0);
        assert_eq!(origin, Point::new(15.0, 7.0));

        let mut size = Size::new(100.0, 100.0);
        size += Delta::new(10.0, 20.0);
        assert_eq!(size, Size::new(110.0, 120.0));
        size -= Delta::new(10.0, 20.0);
        assert_eq!(size, Size::new(100.0, 100.0));
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(0.0, 0.0)));
        assert!(rect.contains(Point::new(99.9, 49.9)));
        assert!(!rect.contains(Point::new(100.0, 10.0)));
        assert!(!rect.contains(Point::new(10.0, 50.0)));
        assert!(!rect.contains(Point::new(-0.1, 10.0)));
    }

    #[test]
    fn test_rect_zero_is_empty() {
        assert!(Rect::ZERO.is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
        assert_eq!(Rect::new(10.0, 20.0, 100.0, 50.0).center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_nearest_corner() {
        let size = Size::new(200.0, 100.0);
        assert_eq!(Corner::nearest(Point::new(10.0, 10.0), size), Corner::TopLeft);
        assert_eq!(Corner::nearest(Point::new(190.0, 10.0), size), Corner::TopRight);
        assert_eq!(Corner::nearest(Point::new(10.0, 90.0), size), Corner::BottomLeft);
        assert_eq!(Corner::nearest(Point::new(190.0, 90.0), size), Corner::BottomRight);
        // The exact center counts as bottom-right
        assert_eq!(Corner::nearest(Point::new(100.0, 50.0), size), Corner::BottomRight);
    }
}
