//! Landmark frame sources.
//!
//! The pose detector is an external component; the trainer only sees it
//! through [`PoseSource`]. Recordings are stored as JSON Lines, one
//! `{"landmarks":[...]}` object per frame, and read under a shared file
//! lock.

use crate::{PoseFrame, Result, TrackingOptions};
use fs2::FileExt;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Push-style source of landmark frames
pub trait PoseSource {
    /// Configure and start the detector; called once per session
    fn start(&mut self, options: &TrackingOptions) -> Result<()>;

    /// Next frame, or None when the stream has ended
    fn next_frame(&mut self) -> Result<Option<PoseFrame>>;
}

/// In-memory frames, for tests and synthetic sessions
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    frames: VecDeque<PoseFrame>,
    started_with: Option<TrackingOptions>,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = PoseFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            started_with: None,
        }
    }

    /// Options passed to the last `start` call
    pub fn started_with(&self) -> Option<&TrackingOptions> {
        self.started_with.as_ref()
    }
}

impl PoseSource for ScriptedSource {
    fn start(&mut self, options: &TrackingOptions) -> Result<()> {
        self.started_with = Some(options.clone());
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        Ok(self.frames.pop_front())
    }
}

/// Replays a JSON Lines landmark recording
///
/// Lines that fail to parse are logged and skipped.
pub struct JsonlFrameSource {
    path: PathBuf,
    file: Option<File>,
    reader: Option<BufReader<File>>,
    line_num: usize,
    skipped: usize,
}

impl JsonlFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            reader: None,
            line_num: 0,
            skipped: 0,
        }
    }

    /// Number of malformed lines skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn release(&mut self) {
        self.reader = None;
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

impl PoseSource for JsonlFrameSource {
    fn start(&mut self, options: &TrackingOptions) -> Result<()> {
        self.release();

        let file = File::open(&self.path)?;
        // Acquire shared lock for reading
        file.lock_shared()?;
        let reader = BufReader::new(file.try_clone()?);

        self.file = Some(file);
        self.reader = Some(reader);
        self.line_num = 0;
        self.skipped = 0;

        tracing::debug!(
            "Replaying {:?} at {}x{}",
            self.path,
            options.width,
            options.height
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            self.line_num += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!("Skipping frame at line {}: {}", self.line_num, e);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<PoseFrame>(line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!("Skipping frame at line {}: {}", self.line_num, e);
                }
            }
        }

        tracing::debug!(
            "Finished {:?} after {} lines ({} skipped)",
            self.path,
            self.line_num,
            self.skipped
        );
        self.release();
        Ok(None)
    }
}

impl Drop for JsonlFrameSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Write frames as a JSON Lines recording, replacing any existing file
pub fn write_frames(path: &Path, frames: &[PoseFrame]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    // Acquire exclusive lock
    file.lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(&file);
        write_frames_to(&mut writer, frames)?;
        writer.flush()?;
    }

    file.unlock()?;
    tracing::debug!("Wrote {} frames to {:?}", frames.len(), path);
    Ok(())
}

/// Write frames as JSON Lines to any writer
pub fn write_frames_to(writer: &mut impl Write, frames: &[PoseFrame]) -> Result<()> {
    for frame in frames {
        let line = serde_json::to_string(frame)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;

    fn drain(source: &mut impl PoseSource) -> Vec<PoseFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = source.next_frame().unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_scripted_source_records_options() {
        let mut source = ScriptedSource::new(vec![synthetic::standing(); 3]);
        source.start(&TrackingOptions::default()).unwrap();

        assert_eq!(source.started_with(), Some(&TrackingOptions::default()));
        assert_eq!(drain(&mut source).len(), 3);
    }

    #[test]
    fn test_write_and_replay() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("frames.jsonl");

        let frames = synthetic::rep_cycle(crate::Exercise::Squats, 0);
        write_frames(&path, &frames).unwrap();

        let mut source = JsonlFrameSource::new(&path);
        source.start(&TrackingOptions::default()).unwrap();
        let replayed = drain(&mut source);

        assert_eq!(replayed, frames);
        assert_eq!(source.skipped(), 0);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("frames.jsonl");

        let good = serde_json::to_string(&synthetic::standing()).unwrap();
        let contents = format!("{}\n{{ invalid json }}\n\n{}\n", good, good);
        std::fs::write(&path, contents).unwrap();

        let mut source = JsonlFrameSource::new(&path);
        source.start(&TrackingOptions::default()).unwrap();

        assert_eq!(drain(&mut source).len(), 2);
        assert_eq!(source.skipped(), 1);
    }

    #[test]
    fn test_invalid_utf8_line_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("frames.jsonl");

        let good = serde_json::to_string(&synthetic::standing()).unwrap();
        let mut contents = Vec::new();
        contents.extend_from_slice(good.as_bytes());
        contents.extend_from_slice(b"\n\xff\xfe garbage\n");
        contents.extend_from_slice(good.as_bytes());
        contents.push(b'\n');
        std::fs::write(&path, contents).unwrap();

        let mut source = JsonlFrameSource::new(&path);
        source.start(&TrackingOptions::default()).unwrap();

        assert_eq!(drain(&mut source).len(), 2);
        assert_eq!(source.skipped(), 1);
    }

    #[test]
    fn test_missing_recording_errors_on_start() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut source = JsonlFrameSource::new(temp_dir.path().join("missing.jsonl"));

        assert!(matches!(
            source.start(&TrackingOptions::default()),
            Err(crate::Error::Io(_))
        ));
    }

    #[test]
    fn test_next_frame_before_start_is_empty() {
        let mut source = JsonlFrameSource::new("unused.jsonl");
        assert!(source.next_frame().unwrap().is_none());
    }
}
