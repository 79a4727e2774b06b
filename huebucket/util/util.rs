#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const IMAGE_DIR: &str = "img";

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, image::RgbaImage)> {
	let mut paths = std::fs::read_dir(dir)
		.expect("read img directory")
		.collect::<Result<Vec<_>, _>>()
		.expect("read each file")
		.iter()
		.map(std::fs::DirEntry::path)
		.collect::<Vec<_>>();

	paths.sort();

	load_images(&paths)
}

pub fn load_images(images: &[PathBuf]) -> Vec<(String, image::RgbaImage)> {
	images
		.iter()
		.map(|path| {
			image::open(path).map(|image| {
				(
					path.file_name().unwrap().to_string_lossy().into_owned(),
					image.into_rgba8(),
				)
			})
		})
		.collect::<Result<Vec<_>, _>>()
		.expect("loaded each image")
}

/// The raw colors of an image, sorted by descending count
pub fn sorted_colors(image: &image::RgbaImage) -> Vec<(palette::Srgb<u8>, u32)> {
	let buffer = huebucket::PixelBuffer::from_image(image).expect("non-gigantic image");
	huebucket::scan(&buffer, false, None).colors.sorted_by_count()
}
