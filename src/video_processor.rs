// src/video_processor.rs

use crate::frame::FrameSample;
use anyhow::Result;
use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTraitConst},
};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Anything that can hand out grayscale frames in order.
pub trait FrameSource {
    /// (width, height) as reported by the container, read once at open.
    fn dimensions(&self) -> (usize, usize);

    /// Next frame, or None at end of stream.
    fn read_frame(&mut self) -> Result<Option<FrameSample>>;
}

/// Recursively collect video files under a directory.
pub fn find_video_files(dir: &str) -> Result<Vec<PathBuf>> {
    let video_extensions = ["mp4", "avi", "mov", "mkv"];

    let mut videos = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if video_extensions
                .iter()
                .any(|v| ext.eq_ignore_ascii_case(v))
            {
                videos.push(path.to_path_buf());
            }
        }
    }
    videos.sort();

    info!("Found {} video files", videos.len());
    Ok(videos)
}

/// Frame source on an OpenCV capture. The underlying handle is released
/// when the source drops, on every exit path.
pub struct VideoFileSource {
    cap: VideoCapture,
    width: i32,
    height: i32,
    fps: f64,
    total_frames: i32,
    current_frame: i32,
}

impl VideoFileSource {
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening video: {}", path.display());

        let cap = VideoCapture::from_file(path.to_str().unwrap_or_default(), videoio::CAP_ANY)?;

        if !cap.is_opened()? {
            anyhow::bail!("Failed to open video file");
        }

        let fps = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FPS)?;
        let total_frames = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_COUNT)? as i32;
        let width = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = VideoCaptureTraitConst::get(&cap, videoio::CAP_PROP_FRAME_HEIGHT)? as i32;

        info!(
            "Video properties: {}x{} @ {:.1} FPS, {} frames",
            width, height, fps, total_frames
        );

        Ok(Self {
            cap,
            width,
            height,
            fps,
            total_frames,
            current_frame: 0,
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn total_frames(&self) -> i32 {
        self.total_frames
    }

    pub fn frames_read(&self) -> i32 {
        self.current_frame
    }
}

impl FrameSource for VideoFileSource {
    fn dimensions(&self) -> (usize, usize) {
        (self.width as usize, self.height as usize)
    }

    fn read_frame(&mut self) -> Result<Option<FrameSample>> {
        use opencv::videoio::VideoCaptureTrait;

        let mut mat = Mat::default();

        if !VideoCaptureTrait::read(&mut self.cap, &mut mat)? || mat.empty() {
            return Ok(None);
        }

        self.current_frame += 1;

        let mut gray = Mat::default();
        imgproc::cvt_color(&mat, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        let data = gray.data_bytes()?.to_vec();

        Ok(Some(FrameSample::new(
            data,
            self.width as usize,
            self.height as usize,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_find_video_files_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        for name in ["b.mp4", "a.MKV", "notes.txt", "c.avi", "frame.png"] {
            File::create(dir.path().join(name)).unwrap();
        }

        let videos = find_video_files(dir.path().to_str().unwrap()).unwrap();
        let names: Vec<_> = videos
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.MKV", "b.mp4", "c.avi"]);
    }

    #[test]
    fn test_open_missing_video_fails() {
        let dir = TempDir::new().unwrap();
        let result = VideoFileSource::open(&dir.path().join("absent.mp4"));
        assert!(result.is_err());
    }
}
