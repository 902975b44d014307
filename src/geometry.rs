//! Screen bounds and the virtual trackpad region carved out of them.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Bottom-center cell of a 3x3 grid.
pub const DEFAULT_PERCENTAGES: Percentages = Percentages {
    left: 33,
    top: 67,
    width: 33,
    height: 33,
};

/// Touchscreen axis ranges, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub resolution_x: i32,
    pub resolution_y: i32,
    pub pressure_min: i32,
    pub pressure_max: i32,
}

/// Active region as `left,top,width,height` percentages of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentages {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for Percentages {
    fn default() -> Self {
        DEFAULT_PERCENTAGES
    }
}

impl Percentages {
    pub fn validate(&self) -> Result<(), Error> {
        if !(0..100).contains(&self.left) || !(0..100).contains(&self.top) {
            return Err(Error::Config(format!(
                "left/top must be within 0..100, got {}",
                self
            )));
        }
        if !(1..=100).contains(&self.width) || !(1..=100).contains(&self.height) {
            return Err(Error::Config(format!(
                "width/height must be within 1..=100, got {}",
                self
            )));
        }
        if self.left + self.width > 100 || self.top + self.height > 100 {
            return Err(Error::Config(format!(
                "region {} extends past the screen edge",
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Percentages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.width, self.height)
    }
}

impl FromStr for Percentages {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid dimensions '{}': {}", s, e))?;

        match parts[..] {
            [left, top, width, height] => Ok(Percentages {
                left,
                top,
                width,
                height,
            }),
            _ => Err(format!(
                "invalid dimensions '{}': expected left,top,width,height",
                s
            )),
        }
    }
}

/// The sub-rectangle `[min_x, max_x) x [min_y, max_y)` of the touchscreen that
/// acts as the trackpad, in touchscreen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackpadRegion {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl TrackpadRegion {
    /// Resolve percentages against the screen. Fails on invalid percentages or
    /// when the result would be empty on this screen.
    pub fn resolve(screen: &ScreenGeometry, pct: Percentages) -> Result<Self, Error> {
        pct.validate()?;

        let width = i64::from(screen.max_x) - i64::from(screen.min_x);
        let height = i64::from(screen.max_y) - i64::from(screen.min_y);
        if width <= 0 || height <= 0 {
            return Err(Error::Config(format!(
                "touchscreen reports an empty surface: X [{} - {}], Y [{} - {}]",
                screen.min_x, screen.max_x, screen.min_y, screen.max_y
            )));
        }

        let min_x = i64::from(screen.min_x) + width * i64::from(pct.left) / 100;
        let max_x = min_x + width * i64::from(pct.width) / 100;
        let min_y = i64::from(screen.min_y) + height * i64::from(pct.top) / 100;
        let max_y = min_y + height * i64::from(pct.height) / 100;

        if max_x <= min_x || max_y <= min_y {
            return Err(Error::Config(format!(
                "region {} is empty on a {}x{} touchscreen",
                pct, width, height
            )));
        }

        // Bounded by the screen extents, which are i32.
        Ok(Self {
            min_x: min_x as i32,
            max_x: max_x as i32,
            min_y: min_y as i32,
            max_y: max_y as i32,
        })
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.min_x..self.max_x).contains(&x) && (self.min_y..self.max_y).contains(&y)
    }

    /// A touch level with the region but beside it, on either side.
    pub fn is_side_touch(&self, x: i32, y: i32) -> bool {
        (self.min_y..self.max_y).contains(&y) && !(self.min_x..self.max_x).contains(&x)
    }

    pub fn clamp_x(&self, x: i32) -> i32 {
        x.clamp(self.min_x, self.max_x - 1)
    }

    pub fn clamp_y(&self, y: i32) -> i32 {
        y.clamp(self.min_y, self.max_y - 1)
    }

    /// Clamp into the region and rebase to `[0, width)`.
    pub fn local_x(&self, x: i32) -> i32 {
        self.clamp_x(x) - self.min_x
    }

    /// Clamp into the region and rebase to `[0, height)`.
    pub fn local_y(&self, y: i32) -> i32 {
        self.clamp_y(y) - self.min_y
    }
}

impl fmt::Display for TrackpadRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X [{} - {}], Y [{} - {}]",
            self.min_x, self.max_x, self.min_y, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(max_x: i32, max_y: i32) -> ScreenGeometry {
        ScreenGeometry {
            min_x: 0,
            max_x,
            min_y: 0,
            max_y,
            resolution_x: 10,
            resolution_y: 10,
            pressure_min: 0,
            pressure_max: 255,
        }
    }

    fn pct(left: i32, top: i32, width: i32, height: i32) -> Percentages {
        Percentages {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn test_default_region_on_square_screen() {
        let region = TrackpadRegion::resolve(&screen(1000, 1000), DEFAULT_PERCENTAGES).unwrap();
        assert_eq!(region.min_x, 330);
        assert_eq!(region.max_x, 660);
        assert_eq!(region.min_y, 670);
        assert_eq!(region.max_y, 1000);
    }

    #[test]
    fn test_region_respects_screen_offset() {
        let mut s = screen(1100, 600);
        s.min_x = 100;
        s.min_y = 100;
        let region = TrackpadRegion::resolve(&s, pct(50, 0, 50, 100)).unwrap();
        assert_eq!((region.min_x, region.max_x), (600, 1100));
        assert_eq!((region.min_y, region.max_y), (100, 600));
    }

    #[test]
    fn test_valid_percentages_stay_inside_screen() {
        let s = screen(1919, 1079);
        for left in (0..100).step_by(7) {
            for width in (2..=100 - left).step_by(9) {
                for top in (0..100).step_by(11) {
                    for height in (2..=100 - top).step_by(13) {
                        let region = TrackpadRegion::resolve(&s, pct(left, top, width, height))
                            .unwrap_or_else(|e| panic!("{left},{top},{width},{height}: {e}"));
                        assert!(region.width() > 0 && region.height() > 0);
                        assert!(region.min_x >= s.min_x && region.max_x <= s.max_x);
                        assert!(region.min_y >= s.min_y && region.max_y <= s.max_y);
                    }
                }
            }
        }
    }

    #[test]
    fn test_invalid_percentages_rejected() {
        let s = screen(1000, 1000);
        for bad in [
            pct(-1, 0, 10, 10),
            pct(0, -1, 10, 10),
            pct(100, 0, 1, 10),
            pct(0, 100, 10, 1),
            pct(0, 0, 0, 10),
            pct(0, 0, 10, 0),
            pct(0, 0, 101, 10),
            pct(0, 0, 10, 101),
            pct(50, 0, 51, 10),
            pct(0, 60, 10, 41),
        ] {
            assert!(
                matches!(TrackpadRegion::resolve(&s, bad), Err(Error::Config(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_region_empty_on_tiny_screen() {
        let err = TrackpadRegion::resolve(&screen(50, 50), pct(0, 0, 1, 50)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_side_touch_classification() {
        let region = TrackpadRegion::resolve(&screen(1000, 1000), DEFAULT_PERCENTAGES).unwrap();
        assert!(!region.is_side_touch(500, 800));
        assert!(region.contains(500, 800));
        assert!(region.is_side_touch(100, 800));
        assert!(region.is_side_touch(660, 800));
        assert!(region.is_side_touch(999, 670));
        // Above the band is neither inside nor beside.
        assert!(!region.is_side_touch(100, 500));
        assert!(!region.contains(100, 500));
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let region = TrackpadRegion::resolve(&screen(1000, 1000), DEFAULT_PERCENTAGES).unwrap();
        for x in [-50, 0, 329, 330, 500, 659, 660, 5000] {
            let once = region.clamp_x(x);
            assert_eq!(region.clamp_x(once), once);
            assert!((0..region.width()).contains(&region.local_x(x)));
        }
        for y in [-50, 669, 670, 999, 1000] {
            let once = region.clamp_y(y);
            assert_eq!(region.clamp_y(once), once);
            assert!((0..region.height()).contains(&region.local_y(y)));
        }
        assert_eq!(region.local_x(100), 0);
        assert_eq!(region.local_x(900), 329);
        assert_eq!(region.local_y(800), 130);
    }

    #[test]
    fn test_percentages_from_str() {
        assert_eq!("33,67,33,33".parse::<Percentages>().unwrap(), DEFAULT_PERCENTAGES);
        assert_eq!(" 0, 0,100,100".parse::<Percentages>().unwrap(), pct(0, 0, 100, 100));
        assert!("33,67,33".parse::<Percentages>().is_err());
        assert!("33,67,33,33,1".parse::<Percentages>().is_err());
        assert!("a,b,c,d".parse::<Percentages>().is_err());
    }
}
