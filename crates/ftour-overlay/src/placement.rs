#![forbid(unsafe_code)]

//! Tooltip placement.
//!
//! Pure geometry: given the padded target rect (or its absence), a requested
//! [`Placement`] and an offset, produce where the tooltip anchors and which
//! corner of the tooltip sits on that anchor. The anchor corner is expressed
//! as a CSS `translate` percentage so the tooltip never needs measuring.

use core::fmt;

use ftour_core::geometry::{Point, Rect, Size};

use crate::step::Placement;

/// A CSS length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coord {
    Px(f64),
    Percent(f64),
}

impl Coord {
    /// Absolute pixels against `extent` (the viewport axis).
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => extent * pct / 100.0,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

/// Tooltip self-translation in percent of its own box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Translate {
    pub x: f64,
    pub y: f64,
}

impl Translate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Translate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({}%, {}%)", self.x, self.y)
    }
}

/// Result of [`compute_tooltip_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPosition {
    pub left: Coord,
    pub top: Coord,
    pub transform: Translate,
    /// The placement actually used; `Center` whenever there was no rect.
    pub placement: Placement,
}

impl TooltipPosition {
    /// The viewport-centred fallback.
    pub const CENTERED: Self = Self {
        left: Coord::Percent(50.0),
        top: Coord::Percent(50.0),
        transform: Translate::new(-50.0, -50.0),
        placement: Placement::Center,
    };

    /// Anchor point in viewport pixels.
    pub fn anchor(&self, viewport: Size) -> Point {
        Point::new(
            self.left.resolve(viewport.width),
            self.top.resolve(viewport.height),
        )
    }
}

/// Place the tooltip around `rect`.
///
/// With no rect the tooltip is viewport-centred regardless of `placement`.
pub fn compute_tooltip_position(
    rect: Option<Rect>,
    placement: Placement,
    offset: f64,
) -> TooltipPosition {
    let Some(rect) = rect else {
        return TooltipPosition::CENTERED;
    };
    let (left, top, transform) = match placement {
        Placement::Bottom => (
            rect.center_x(),
            rect.bottom() + offset,
            Translate::new(-50.0, 0.0),
        ),
        Placement::Top => (
            rect.center_x(),
            rect.top - offset,
            Translate::new(-50.0, -100.0),
        ),
        Placement::Left => (
            rect.left - offset,
            rect.center_y(),
            Translate::new(-100.0, -50.0),
        ),
        Placement::Right => (
            rect.right() + offset,
            rect.center_y(),
            Translate::new(0.0, -50.0),
        ),
        Placement::Center => (rect.center_x(), rect.center_y(), Translate::new(-50.0, -50.0)),
    };
    TooltipPosition {
        left: Coord::Px(left),
        top: Coord::Px(top),
        transform,
        placement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Rect {
        Rect::new(50.0, 100.0, 200.0, 40.0)
    }

    #[test]
    fn right_of_sample_rect() {
        let pos = compute_tooltip_position(Some(sample()), Placement::Right, 16.0);
        assert_eq!(pos.left, Coord::Px(266.0));
        assert_eq!(pos.top, Coord::Px(120.0));
        assert_eq!(pos.transform, Translate::new(0.0, -50.0));
    }

    #[test]
    fn bottom_and_top() {
        let below = compute_tooltip_position(Some(sample()), Placement::Bottom, 16.0);
        assert_eq!((below.left, below.top), (Coord::Px(150.0), Coord::Px(156.0)));
        let above = compute_tooltip_position(Some(sample()), Placement::Top, 16.0);
        assert_eq!((above.left, above.top), (Coord::Px(150.0), Coord::Px(84.0)));
        assert_eq!(above.transform, Translate::new(-50.0, -100.0));
    }

    #[test]
    fn left_anchors_top_right() {
        let pos = compute_tooltip_position(Some(sample()), Placement::Left, 16.0);
        assert_eq!((pos.left, pos.top), (Coord::Px(34.0), Coord::Px(120.0)));
        assert_eq!(pos.transform, Translate::new(-100.0, -50.0));
    }

    #[test]
    fn missing_rect_centres_for_every_placement() {
        for placement in [
            Placement::Top,
            Placement::Bottom,
            Placement::Left,
            Placement::Right,
            Placement::Center,
        ] {
            assert_eq!(
                compute_tooltip_position(None, placement, 16.0),
                TooltipPosition::CENTERED
            );
        }
    }

    #[test]
    fn css_rendering() {
        assert_eq!(Coord::Px(266.0).to_string(), "266px");
        assert_eq!(Coord::Percent(50.0).to_string(), "50%");
        assert_eq!(Translate::new(-50.0, 0.0).to_string(), "translate(-50%, 0%)");
    }

    #[test]
    fn anchor_resolves_percentages() {
        let anchor = TooltipPosition::CENTERED.anchor(Size::new(1280.0, 800.0));
        assert_eq!(anchor, Point::new(640.0, 400.0));
    }
}
