/// Score map computation for the built-in backends
use super::types::ScoreMap;
use image::{GrayImage, Luma, RgbImage};
use imageproc::template_matching::{MatchTemplateMethod, match_template};
use std::borrow::Cow;

/// Split one color channel into a grayscale image
fn channel(image: &RgbImage, c: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([image.get_pixel(x, y).0[c]])
    })
}

fn placements(haystack: (u32, u32), needle: (u32, u32)) -> Option<(u32, u32)> {
    if needle.0 == 0 || needle.1 == 0 || needle.0 > haystack.0 || needle.1 > haystack.1 {
        return None;
    }
    Some((haystack.0 - needle.0 + 1, haystack.1 - needle.1 + 1))
}

/// Normalized cross-correlation over all channels at once when `color` is
/// set, on luma otherwise. Channels are pooled before normalizing, so a
/// channel that is zero in both images does not drag the score down.
/// Returns `None` when the needle does not fit into the haystack.
pub fn template_scores(haystack: &RgbImage, needle: &RgbImage, color: bool) -> Option<ScoreMap> {
    let (width, height) = placements(haystack.dimensions(), needle.dimensions())?;
    let mut map = ScoreMap::new(width, height);

    let pairs: Vec<(GrayImage, GrayImage)> = if color {
        (0..3)
            .map(|c| (channel(haystack, c), channel(needle, c)))
            .collect()
    } else {
        vec![(
            image::imageops::grayscale(haystack),
            image::imageops::grayscale(needle),
        )]
    };

    // Squared differences against black give each window's energy
    let black = GrayImage::new(needle.width(), needle.height());
    let mut products = vec![0.0f64; map.scores.len()];
    let mut hay_energy = vec![0.0f64; map.scores.len()];
    let mut needle_energy = 0.0f64;

    for (hay, pat) in &pairs {
        let cross = match_template(hay, pat, MatchTemplateMethod::CrossCorrelation);
        for (x, y, pixel) in cross.enumerate_pixels() {
            products[(y * width + x) as usize] += pixel[0] as f64;
        }
        let energy = match_template(hay, &black, MatchTemplateMethod::SumOfSquaredErrors);
        for (x, y, pixel) in energy.enumerate_pixels() {
            hay_energy[(y * width + x) as usize] += pixel[0] as f64;
        }
        needle_energy += pat.pixels().map(|p| (p[0] as f64).powi(2)).sum::<f64>();
    }

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let denominator = (hay_energy[idx] * needle_energy).sqrt();
            let score = if denominator > 0.0 {
                products[idx] / denominator
            } else if hay_energy[idx] == 0.0 && needle_energy == 0.0 {
                // Black on black
                1.0
            } else {
                0.0
            };
            map.set(x, y, score as f32);
        }
    }
    Some(map)
}

/// Sum of squared differences normalized to 0.0-1.0, 1.0 meaning identical.
/// Placements that can no longer reach `floor` are abandoned early and
/// scored 0.0.
pub fn ssd_scores(
    haystack: &RgbImage,
    needle: &RgbImage,
    color: bool,
    floor: f32,
) -> Option<ScoreMap> {
    let (width, height) = placements(haystack.dimensions(), needle.dimensions())?;
    let mut map = ScoreMap::new(width, height);

    let (hay, pat, channels): (Cow<'_, [u8]>, Cow<'_, [u8]>, usize) = if color {
        (
            Cow::Borrowed(haystack.as_raw().as_slice()),
            Cow::Borrowed(needle.as_raw().as_slice()),
            3,
        )
    } else {
        (
            Cow::Owned(image::imageops::grayscale(haystack).into_raw()),
            Cow::Owned(image::imageops::grayscale(needle).into_raw()),
            1,
        )
    };

    let hay_stride = haystack.width() as usize * channels;
    let row_len = needle.width() as usize * channels;
    let pixel_count = needle.width() as usize * needle.height() as usize;

    // Max possible difference: every channel of every pixel off by 255
    let max_sq_diff = pixel_count as f64 * channels as f64 * (255.0 * 255.0);
    let max_allowed_diff = max_sq_diff * (1.0 - floor.clamp(0.0, 1.0) as f64);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let mut sum_sq_diff = 0.0f64;
            let mut abandoned = false;

            for row in 0..needle.height() as usize {
                let hay_start = (y + row) * hay_stride + x * channels;
                let hay_row = &hay[hay_start..hay_start + row_len];
                let pat_row = &pat[row * row_len..(row + 1) * row_len];
                for (h, p) in hay_row.iter().zip(pat_row) {
                    let diff = *h as i32 - *p as i32;
                    sum_sq_diff += (diff * diff) as f64;
                }

                // Early exit: the threshold can no longer be met
                if sum_sq_diff > max_allowed_diff {
                    abandoned = true;
                    break;
                }
            }

            if !abandoned {
                let correlation = 1.0 - sum_sq_diff / max_sq_diff;
                map.set(x as u32, y as u32, correlation as f32);
            }
        }
    }
    Some(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checkerboard(size: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }

    fn haystack_with(needle: &RgbImage, at: (u32, u32)) -> RgbImage {
        let mut haystack = RgbImage::from_pixel(40, 30, Rgb([255, 255, 255]));
        image::imageops::replace(&mut haystack, needle, at.0 as i64, at.1 as i64);
        haystack
    }

    #[test]
    fn test_ssd_perfect_match() {
        let needle = checkerboard(6);
        let haystack = haystack_with(&needle, (12, 9));

        let map = ssd_scores(&haystack, &needle, true, 0.0).unwrap();
        assert_eq!(map.width, 35);
        assert_eq!(map.height, 25);
        let (x, y, score) = map.best().unwrap();
        assert_eq!((x, y), (12, 9));
        assert!(score >= 0.99, "Perfect match should have correlation >= 0.99");
    }

    #[test]
    fn test_ssd_early_exit_scores_zero() {
        let needle = checkerboard(6);
        let haystack = haystack_with(&needle, (12, 9));

        let map = ssd_scores(&haystack, &needle, false, 0.9).unwrap();
        // Shifted by one pixel the board is inverted
        assert_eq!(map.get(13, 9), 0.0);
        assert!(map.get(12, 9) >= 0.99);
    }

    #[test]
    fn test_template_finds_pattern() {
        let needle = checkerboard(6);
        let haystack = haystack_with(&needle, (3, 17));

        let map = template_scores(&haystack, &needle, false).unwrap();
        let (x, y, score) = map.best().unwrap();
        assert_eq!((x, y), (3, 17));
        assert!(score > 0.99);
    }

    fn bordered_icon(fill: Rgb<u8>) -> RgbImage {
        RgbImage::from_fn(16, 16, |x, y| {
            if x < 2 || y < 2 || x >= 14 || y >= 14 {
                Rgb([0, 0, 0])
            } else {
                fill
            }
        })
    }

    #[test]
    fn test_template_saturated_color_icon() {
        // Green and blue are zero everywhere in the needle
        let needle = bordered_icon(Rgb([255, 0, 0]));
        let haystack = haystack_with(&needle, (20, 6));

        let map = template_scores(&haystack, &needle, true).unwrap();
        let (x, y, score) = map.best().unwrap();
        assert_eq!((x, y), (20, 6));
        assert!(score > 0.99, "got {score}");
    }

    #[test]
    fn test_template_color_tells_hues_apart() {
        let needle = bordered_icon(Rgb([255, 0, 0]));
        let haystack = haystack_with(&bordered_icon(Rgb([0, 0, 255])), (20, 6));

        let map = template_scores(&haystack, &needle, true).unwrap();
        assert!(map.get(20, 6) < 0.8, "got {}", map.get(20, 6));
    }

    #[test]
    fn test_template_black_on_black() {
        let needle = RgbImage::new(4, 4);
        let haystack = RgbImage::new(10, 10);

        let map = template_scores(&haystack, &needle, true).unwrap();
        assert_eq!(map.get(3, 3), 1.0);
    }

    #[test]
    fn test_needle_larger_than_haystack() {
        let needle = RgbImage::new(50, 5);
        let haystack = RgbImage::new(40, 30);
        assert!(template_scores(&haystack, &needle, true).is_none());
        assert!(ssd_scores(&haystack, &needle, true, 0.5).is_none());
    }
}
