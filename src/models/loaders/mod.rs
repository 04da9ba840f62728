pub mod image_loader;

pub use image_loader::{is_image_file, load_all_images, load_image, MAX_IMAGE_BYTES};
