#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const RED: [u8; 4] = [255, 0, 0, 255];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A fresh directory under the system temp dir, removed on drop.
pub struct Scratch {
    pub root: PathBuf,
}

impl Scratch {
    pub fn new(label: &str) -> Self {
        let root = std::env::temp_dir().join(format!("pixel_compare_{label}_{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&root).expect("Error creating scratch dir.");
        Self { root }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn artifacts(&self) -> PathBuf {
        self.root.join("artifacts")
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

pub fn white(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(WHITE))
}

/// White canvas with a red `side x side` square whose top-left is `at`.
pub fn with_red_square(width: u32, height: u32, at: (u32, u32), side: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let inside = x >= at.0 && x < at.0 + side && y >= at.1 && y < at.1 + side;
        Rgba(if inside { RED } else { WHITE })
    })
}

pub fn write_png(path: &Path, image: &RgbaImage) -> PathBuf {
    image.save(path).expect("Error Saving File.");
    path.to_path_buf()
}
