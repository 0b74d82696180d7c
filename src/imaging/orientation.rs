//! EXIF orientation decisions.
//!
//! Turns the EXIF `Orientation` tag (1–8) and the caller's explicit
//! rotate/flip/flop into one [`Orientation`]: a clockwise rotation plus an
//! optional mirror. An EXIF flip is applied before the rotation, which is what
//! makes the table below line up with the EXIF definitions of the transposed
//! cases (5 and 7). A mirror the caller asked for is applied after it.
//!
//! | EXIF | rotate | flip |
//! |------|--------|------|
//! | 1    | 0      | no   |
//! | 2    | 0      | yes  |
//! | 3    | 180    | no   |
//! | 4    | 180    | yes  |
//! | 5    | 270    | yes  |
//! | 6    | 90     | no   |
//! | 7    | 90     | yes  |
//! | 8    | 270    | no   |

use super::params::{Angle, Direction, Options};

/// Map an EXIF orientation value to `(rotation, flip)`.
///
/// Zero (tag absent) and anything outside 1–8 mean "leave as is".
pub fn resolve_orientation(exif: u32) -> (Angle, bool) {
    match exif {
        2 => (Angle::D0, true),
        3 => (Angle::D180, false),
        4 => (Angle::D180, true),
        5 => (Angle::D270, true),
        6 => (Angle::D90, false),
        7 => (Angle::D90, true),
        8 => (Angle::D270, false),
        _ => (Angle::D0, false),
    }
}

/// The mirror/rotate decision for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Orientation {
    pub angle: Angle,
    /// Left-right mirror.
    pub flip: bool,
    /// Top-bottom mirror. Never set together with `flip`.
    pub flop: bool,
    /// Mirror before rotating. Set when the flip comes from EXIF.
    pub mirror_first: bool,
}

impl Orientation {
    /// Orientation that undoes an EXIF tag, ignoring any caller intent.
    pub fn from_exif(exif: u32) -> Self {
        let (angle, flip) = resolve_orientation(exif);
        Self {
            angle,
            flip,
            flop: false,
            mirror_first: flip,
        }
    }

    /// Combine the caller's request with the image's EXIF tag.
    ///
    /// - `no_auto_rotate` keeps EXIF out of it entirely.
    /// - A non-zero `opts.rotate` overrides the EXIF rotation; an EXIF flip
    ///   still applies.
    /// - When both flip and flop end up requested, flip wins.
    /// - An EXIF flip mirrors before the rotation. A caller flip or flop on
    ///   its own mirrors after it, so `rotate=90, flip=true` turns the image
    ///   first and then mirrors the turned result left-right.
    pub fn compose(exif: u32, opts: &Options) -> Self {
        let mut angle = opts.rotate;
        let mut exif_flip = false;

        if !opts.no_auto_rotate {
            let (exif_angle, flip) = resolve_orientation(exif);
            if opts.rotate == Angle::D0 {
                angle = exif_angle;
            }
            exif_flip = flip;
        }

        let flip = opts.flip || exif_flip;
        Self {
            angle,
            flip,
            flop: opts.flop && !flip,
            mirror_first: exif_flip,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.angle == Angle::D0 && !self.flip && !self.flop
    }

    /// Mirror to apply, if any. [`mirror_first`](Self::mirror_first) says when.
    pub fn mirror(&self) -> Option<Direction> {
        if self.flip {
            Some(Direction::Horizontal)
        } else if self.flop {
            Some(Direction::Vertical)
        } else {
            None
        }
    }

    /// Size of a `width` x `height` image once this orientation is applied.
    pub fn oriented_size(&self, width: u32, height: u32) -> (u32, u32) {
        if self.angle.is_transposing() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exif_table() {
        let expected = [
            (1, Angle::D0, false),
            (2, Angle::D0, true),
            (3, Angle::D180, false),
            (4, Angle::D180, true),
            (5, Angle::D270, true),
            (6, Angle::D90, false),
            (7, Angle::D90, true),
            (8, Angle::D270, false),
        ];
        for (exif, angle, flip) in expected {
            assert_eq!(resolve_orientation(exif), (angle, flip), "exif {exif}");
        }
    }

    #[test]
    fn unknown_exif_values_do_nothing() {
        for exif in [0, 9, 42, u32::MAX] {
            assert_eq!(resolve_orientation(exif), (Angle::D0, false), "exif {exif}");
        }
    }

    #[test]
    fn compose_follows_exif_by_default() {
        let o = Orientation::compose(6, &Options::default());
        assert_eq!(o.angle, Angle::D90);
        assert!(!o.flip);
        assert!(!o.flop);
    }

    #[test]
    fn compose_ignores_exif_when_disabled() {
        let opts = Options {
            no_auto_rotate: true,
            ..Options::default()
        };
        assert!(Orientation::compose(7, &opts).is_identity());
    }

    #[test]
    fn explicit_rotation_beats_exif_rotation() {
        let opts = Options {
            rotate: Angle::D180,
            ..Options::default()
        };
        let o = Orientation::compose(6, &opts);
        assert_eq!(o.angle, Angle::D180);
        assert!(!o.flip);
    }

    #[test]
    fn explicit_rotation_keeps_exif_flip() {
        let opts = Options {
            rotate: Angle::D180,
            ..Options::default()
        };
        let o = Orientation::compose(7, &opts);
        assert_eq!(o.angle, Angle::D180);
        assert!(o.flip);
    }

    #[test]
    fn explicit_rotation_without_exif() {
        let opts = Options {
            rotate: Angle::D270,
            no_auto_rotate: true,
            ..Options::default()
        };
        assert_eq!(Orientation::compose(6, &opts).angle, Angle::D270);
    }

    #[test]
    fn flip_wins_over_flop() {
        let opts = Options {
            flip: true,
            flop: true,
            ..Options::default()
        };
        let o = Orientation::compose(1, &opts);
        assert!(o.flip);
        assert!(!o.flop);
        assert_eq!(o.mirror(), Some(Direction::Horizontal));
    }

    #[test]
    fn exif_flip_suppresses_caller_flop() {
        let opts = Options {
            flop: true,
            ..Options::default()
        };
        let o = Orientation::compose(2, &opts);
        assert!(o.flip);
        assert!(!o.flop);
    }

    #[test]
    fn flop_alone_mirrors_vertically() {
        let opts = Options {
            flop: true,
            ..Options::default()
        };
        assert_eq!(
            Orientation::compose(0, &opts).mirror(),
            Some(Direction::Vertical)
        );
    }

    #[test]
    fn from_exif_ignores_caller() {
        assert!(Orientation::from_exif(1).is_identity());
        assert!(Orientation::from_exif(0).is_identity());
        let o = Orientation::from_exif(5);
        assert_eq!(o.angle, Angle::D270);
        assert!(o.flip);
    }

    #[test]
    fn exif_flip_mirrors_before_rotation() {
        assert!(Orientation::from_exif(7).mirror_first);
        assert!(Orientation::compose(5, &Options::default()).mirror_first);
    }

    #[test]
    fn caller_flip_mirrors_after_rotation() {
        let opts = Options {
            rotate: Angle::D90,
            flip: true,
            ..Options::default()
        };
        let o = Orientation::compose(0, &opts);
        assert_eq!(o.angle, Angle::D90);
        assert_eq!(o.mirror(), Some(Direction::Horizontal));
        assert!(!o.mirror_first);
    }

    #[test]
    fn caller_flip_does_not_reorder_exif_flip() {
        let opts = Options {
            flip: true,
            ..Options::default()
        };
        assert!(Orientation::compose(7, &opts).mirror_first);
    }

    #[test]
    fn transposing_rotation_swaps_size() {
        assert_eq!(Orientation::from_exif(6).oriented_size(4000, 3000), (3000, 4000));
        assert_eq!(Orientation::from_exif(3).oriented_size(4000, 3000), (4000, 3000));
    }
}
