// THEORY:
// The `Pixel` module is the most fundamental unit of the recognition engine. It is a
// "dumb" data container for a single 8-bit RGB color plus the few single-pixel
// computations the rest of the system needs: which histogram bin each channel
// falls into, and a luminance estimate for the grayscale backdrop of the overlay.
// Anything that needs more than one pixel (histograms, distances, regions) lives
// in higher-level modules like `ColorDistribution` and `Chunk`.
//
// Key principles:
// 1) Single-pixel scope: nothing here reads neighbors or history.
// 2) Channel order is always R, G, B. Conversions from other buffers (RGBA frames,
//    BGR camera data) must reorder before building a `Pixel`.
// 3) Bin math is integer math: channel / BIN_WIDTH always lands in 0..BINS_PER_CHANNEL
//    for any 8-bit value, so no bounds check is ever needed.

pub mod pixel {
    use crate::error::RecoError;
    use image::Rgb;

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Luminance = f64;
    pub type Bin = usize;

    /// Number of quantization bins per channel.
    pub const BINS_PER_CHANNEL: usize = 8;
    /// Width of one bin on the 0..=255 channel range.
    pub const BIN_WIDTH: u32 = 256 / BINS_PER_CHANNEL as u32;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Pixel {
        pub const BLACK: Pixel = Pixel::new(0, 0, 0);
        pub const WHITE: Pixel = Pixel::new(255, 255, 255);

        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// Histogram bin of each channel, as (red, green, blue).
        #[inline]
        pub fn bins(&self) -> (Bin, Bin, Bin) {
            (
                Self::bin_of(self.red),
                Self::bin_of(self.green),
                Self::bin_of(self.blue),
            )
        }

        #[inline]
        pub fn bin_of(channel: Channel) -> Bin {
            (channel as u32 / BIN_WIDTH) as Bin
        }

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        /// The gray pixel of the same luminance.
        pub fn to_gray(&self) -> Pixel {
            let level = self.luminance().round().clamp(0.0, 255.0) as Channel;
            Pixel::new(level, level, level)
        }

        /// Per-channel linear mix: `ratio * self + (1 - ratio) * other`.
        pub fn blend(&self, other: &Pixel, ratio: f32) -> Pixel {
            let mix = |a: Channel, b: Channel| -> Channel {
                (a as f32 * ratio + b as f32 * (1.0 - ratio))
                    .round()
                    .clamp(0.0, 255.0) as Channel
            };
            Pixel::new(
                mix(self.red, other.red),
                mix(self.green, other.green),
                mix(self.blue, other.blue),
            )
        }
    }

    /// Accepts RGB (3 bytes) or RGBA (4 bytes, alpha ignored) slices.
    impl TryFrom<&[Byte]> for Pixel {
        type Error = RecoError;

        fn try_from(bytes: &[Byte]) -> Result<Self, Self::Error> {
            match *bytes {
                [red, green, blue] | [red, green, blue, _] => Ok(Pixel::new(red, green, blue)),
                _ => Err(RecoError::InvalidPixelBytes(bytes.len())),
            }
        }
    }

    impl From<Rgb<u8>> for Pixel {
        fn from(rgb: Rgb<u8>) -> Self {
            Pixel::new(rgb.0[0], rgb.0[1], rgb.0[2])
        }
    }

    impl From<&Rgb<u8>> for Pixel {
        fn from(rgb: &Rgb<u8>) -> Self {
            Pixel::new(rgb.0[0], rgb.0[1], rgb.0[2])
        }
    }

    impl From<Pixel> for Rgb<u8> {
        fn from(pixel: Pixel) -> Self {
            Rgb([pixel.red, pixel.green, pixel.blue])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::pixel::*;
    use crate::error::RecoError;

    #[test]
    fn bins_cover_the_full_channel_range() {
        assert_eq!(Pixel::bin_of(0), 0);
        assert_eq!(Pixel::bin_of(31), 0);
        assert_eq!(Pixel::bin_of(32), 1);
        assert_eq!(Pixel::bin_of(255), BINS_PER_CHANNEL - 1);
        assert_eq!(Pixel::new(255, 0, 128).bins(), (7, 0, 4));
    }

    #[test]
    fn converts_from_rgba_bytes() {
        let bytes: &[u8] = &[10, 20, 30, 255];
        assert_eq!(Pixel::try_from(bytes), Ok(Pixel::new(10, 20, 30)));
    }

    #[test]
    fn rejects_two_byte_slices() {
        let bytes: &[u8] = &[1, 2];
        assert_eq!(Pixel::try_from(bytes), Err(RecoError::InvalidPixelBytes(2)));
    }

    #[test]
    fn gray_of_white_is_white() {
        assert_eq!(Pixel::WHITE.to_gray(), Pixel::WHITE);
        assert_eq!(Pixel::BLACK.to_gray(), Pixel::BLACK);
    }

    #[test]
    fn half_blend_is_the_midpoint() {
        let mixed = Pixel::new(200, 0, 100).blend(&Pixel::new(0, 200, 100), 0.5);
        assert_eq!(mixed, Pixel::new(100, 100, 100));
    }
}
