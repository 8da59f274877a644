pub mod http_downloader;
pub mod yt_dlp_downloader;
