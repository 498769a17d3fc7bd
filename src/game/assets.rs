/// Pose images for the falling shopkeeper, served next to the page.
pub const POSE_IMAGES: [&str; 10] = [
    "images/game/pose1.png",
    "images/game/pose2.png",
    "images/game/pose3.png",
    "images/game/pose4.png",
    "images/game/pose5.png",
    "images/game/pose6.png",
    "images/game/pose7.png",
    "images/game/pose8.png",
    "images/game/pose9.png",
    "images/game/pose10.png",
];

pub const POSE_EMOJI: [&str; 10] = ["🧍", "🏃", "🤸", "💃", "🕺", "🧘", "🙆", "🙋", "🤷", "🙅"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteFace {
    Image { src: &'static str, index: usize },
    Emoji(&'static str),
}

/// Which representation new sprites get. Once an image fails to load the
/// art stays on emoji for the rest of the session.
#[derive(Clone, Copy, Debug)]
pub struct SpriteArt {
    images_ok: bool,
}

impl Default for SpriteArt {
    fn default() -> Self {
        Self { images_ok: true }
    }
}

pub fn roll_index(roll: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((roll.clamp(0.0, 1.0) * len as f64) as usize).min(len - 1)
}

impl SpriteArt {
    pub fn pick(&self, roll: f64) -> SpriteFace {
        if self.images_ok {
            let index = roll_index(roll, POSE_IMAGES.len());
            SpriteFace::Image {
                src: POSE_IMAGES[index],
                index,
            }
        } else {
            SpriteFace::Emoji(POSE_EMOJI[roll_index(roll, POSE_EMOJI.len())])
        }
    }

    /// Emoji standing in for a pose image that failed to load.
    pub fn fallback_for(index: usize) -> &'static str {
        POSE_EMOJI[index % POSE_EMOJI.len()]
    }

    pub fn degrade(&mut self) {
        self.images_ok = false;
    }

    pub fn uses_images(&self) -> bool {
        self.images_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_images_until_degraded() {
        let mut art = SpriteArt::default();
        assert_eq!(
            art.pick(0.0),
            SpriteFace::Image {
                src: "images/game/pose1.png",
                index: 0
            }
        );
        assert!(matches!(art.pick(0.99), SpriteFace::Image { index: 9, .. }));
        art.degrade();
        assert!(!art.uses_images());
        assert_eq!(art.pick(0.0), SpriteFace::Emoji("🧍"));
        // one-way
        for roll in [0.1, 0.5, 0.9] {
            assert!(matches!(art.pick(roll), SpriteFace::Emoji(_)));
        }
    }

    #[test]
    fn roll_index_is_bounded() {
        assert_eq!(roll_index(1.0, 10), 9);
        assert_eq!(roll_index(-3.0, 10), 0);
        assert_eq!(roll_index(0.5, 0), 0);
    }

    #[test]
    fn fallback_wraps_index() {
        assert_eq!(SpriteArt::fallback_for(3), "💃");
        assert_eq!(SpriteArt::fallback_for(13), "💃");
    }
}
