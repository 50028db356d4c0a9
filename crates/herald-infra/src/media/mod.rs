//! Media collaborators: image generation, image-to-video, meme captioning.

pub mod caption;
pub mod image;
pub mod video;

pub use caption::ImgflipClient;
pub use image::OpenAiImageClient;
pub use video::RunwayVideoClient;
