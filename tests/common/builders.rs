//! Builders for on-disk story trees and generated scene images.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Writes one `stories/<id>/` directory, file by file.
pub struct StoryBuilder {
    dir: PathBuf,
}

impl StoryBuilder {
    pub fn new(content_root: &Path, story_id: &str) -> Self {
        let dir = content_root.join("stories").join(story_id);
        std::fs::create_dir_all(&dir).expect("Failed to create story directory");
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `meta.yaml` verbatim.
    pub fn meta(self, yaml: &str) -> Self {
        self.file("meta.yaml", yaml.as_bytes())
    }

    /// Write `meta.yaml` with a title, author and language.
    pub fn titled(self, title: &str) -> Self {
        let yaml = format!("title: {title}\nauthor: Test Author\nlanguage: en\n");
        self.meta(&yaml)
    }

    /// Write `<file_stem>.yaml` verbatim.
    pub fn scene(self, file_stem: &str, yaml: &str) -> Self {
        self.file(&format!("{file_stem}.yaml"), yaml.as_bytes())
    }

    /// Scene with a body and the given choice ids.
    pub fn scene_with_choices(self, scene_id: &str, choices: &[&str]) -> Self {
        let mut yaml = format!("body: This is {scene_id}.\nchoices:\n");
        for id in choices {
            yaml.push_str(&format!("  - id: {id}\n    label: Go {id}\n"));
        }
        self.scene(scene_id, &yaml)
    }

    pub fn png_image(self, scene_id: &str, width: u32, height: u32) -> Self {
        let bytes = png_bytes(&gradient(width, height));
        self.file(&format!("images/{scene_id}.png"), &bytes)
    }

    pub fn jpeg_image(self, scene_id: &str, width: u32, height: u32) -> Self {
        let bytes = jpeg_bytes(&gradient(width, height), 95);
        self.file(&format!("images/{scene_id}.jpg"), &bytes)
    }

    /// Write arbitrary bytes relative to the story directory.
    pub fn file(self, relative: &str, contents: &[u8]) -> Self {
        let path = self.dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("Failed to write story file");
        self
    }
}

/// Smooth color gradient with a fine checker texture.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let texture = if (x / 4 + y / 4) % 2 == 0 { 0 } else { 24 };
        Rgb([
            ((x * 255 / width.max(1)) as u8).saturating_add(texture),
            ((y * 255 / height.max(1)) as u8).saturating_add(texture),
            (((x + y) % 256) as u8),
        ])
    }))
}

/// Deterministic pseudo-random noise; compresses badly in any format.
pub fn noise(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    let mut img = RgbImage::new(width, height);
    for pixel in img.pixels_mut() {
        let v = next();
        *pixel = Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8]);
    }
    DynamicImage::ImageRgb8(img)
}

pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf.into_inner()
}

pub fn jpeg_bytes(image: &DynamicImage, quality: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&image.to_rgb8())
        .expect("Failed to encode JPEG");
    buf
}
