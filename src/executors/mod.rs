// One executor per media kind

mod audio;
mod tags;
mod thumbnail;
mod video;

pub use audio::AudioDownloader;
pub use tags::TagExtractor;
pub use thumbnail::ThumbnailDownloader;
pub use video::VideoDownloader;
