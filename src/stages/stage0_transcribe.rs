use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::llm::Transcriber;

/// Extensions read as an existing transcript
const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];

/// Extensions handed to the converter
const AUDIO_EXTENSIONS: [&str; 11] = [
    "mp3", "wav", "m4a", "mp4", "mpeg", "mpga", "ogg", "oga", "flac", "webm", "aac",
];

/// Configuration for Stage 0
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// External conversion utility
    pub converter: String,
    /// Largest file the speech-to-text API accepts
    pub max_upload_bytes: u64,
    /// Length of each chunk when splitting
    pub chunk_seconds: u32,
    /// Parent directory for per-run scratch files
    pub scratch_dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            converter: "ffmpeg".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
            chunk_seconds: 600,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// What kind of file the pipeline was given
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Already a transcript
    Text,
    /// MP3 small enough to upload as-is
    UploadableAudio,
    /// Needs converting and/or splitting first
    ConvertibleAudio,
}

/// Result of Stage 0
#[derive(Debug)]
pub struct Stage0Result {
    pub transcript: String,
    /// Number of audio pieces sent for transcription (0 for text input)
    pub chunks_transcribed: usize,
}

/// Decide how to handle an input file
pub fn classify_input(path: &Path, config: &AudioConfig) -> Result<InputKind> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if TEXT_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(InputKind::Text);
    }
    if !AUDIO_EXTENSIONS.contains(&extension.as_str()) {
        bail!("Unsupported input format '{}': {:?}", extension, path);
    }

    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?
        .len();

    if extension == "mp3" && size <= config.max_upload_bytes {
        Ok(InputKind::UploadableAudio)
    } else {
        Ok(InputKind::ConvertibleAudio)
    }
}

/// Execute Stage 0: produce a transcript from a recording or a text file
pub async fn execute_stage0(
    transcriber: &dyn Transcriber,
    input: &Path,
    config: &AudioConfig,
) -> Result<Stage0Result> {
    let kind = classify_input(input, config)?;
    debug!("Input {:?} classified as {:?}", input, kind);

    let (transcript, chunks_transcribed) = match kind {
        InputKind::Text => {
            let text = std::fs::read_to_string(input)
                .with_context(|| format!("Failed to read file: {:?}", input))?;
            (text.trim().to_string(), 0)
        }
        InputKind::UploadableAudio => {
            info!("Transcribing {:?}", input);
            (transcriber.transcribe(input).await?, 1)
        }
        InputKind::ConvertibleAudio => {
            let scratch = ScratchDir::create(&config.scratch_dir)?;
            let chunks = convert_to_chunks(input, scratch.path(), config).await?;
            info!("Transcribing {} chunk(s) of {:?}", chunks.len(), input);
            let transcript = transcribe_chunks(transcriber, &chunks).await?;
            (transcript, chunks.len())
        }
    };

    if transcript.is_empty() {
        bail!("Transcript of {:?} is empty", input);
    }

    Ok(Stage0Result {
        transcript,
        chunks_transcribed,
    })
}

/// Transcribe chunks in order and join them with single spaces
pub async fn transcribe_chunks(transcriber: &dyn Transcriber, chunks: &[PathBuf]) -> Result<String> {
    let mut parts = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        debug!("Chunk {}/{}: {:?}", i + 1, chunks.len(), chunk);
        let text = transcriber
            .transcribe(chunk)
            .await
            .with_context(|| format!("Failed to transcribe chunk {:?}", chunk))?;
        parts.push(text.trim().to_string());
    }
    Ok(parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Convert to MP3 and split into fixed-length chunks with the external converter
async fn convert_to_chunks(input: &Path, out_dir: &Path, config: &AudioConfig) -> Result<Vec<PathBuf>> {
    let pattern = out_dir.join("chunk_%03d.mp3");

    let output = Command::new(&config.converter)
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(input)
        .args(["-vn", "-ac", "1", "-c:a", "libmp3lame", "-b:a", "64k"])
        .args(["-f", "segment", "-segment_time"])
        .arg(config.chunk_seconds.to_string())
        .arg(&pattern)
        .output()
        .await
        .with_context(|| format!("Failed to run '{}'", config.converter))?;

    if !output.status.success() {
        bail!(
            "'{}' failed on {:?}: {}",
            config.converter,
            input,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let chunks = list_chunks(out_dir)?;
    if chunks.is_empty() {
        bail!("'{}' produced no audio for {:?}", config.converter, input);
    }
    Ok(chunks)
}

/// `chunk_*.mp3` files in name order
fn list_chunks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut chunks: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {:?}", dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("chunk_") && n.ends_with(".mp3"))
        })
        .collect();
    chunks.sort();
    Ok(chunks)
}

/// Per-run scratch directory, removed on drop
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(parent: &Path) -> Result<Self> {
        let path = parent.join(format!("prdflow-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create scratch directory {:?}", path))?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!("Failed to remove scratch directory {:?}: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct EchoTranscriber {
        seen: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl Transcriber for EchoTranscriber {
        async fn transcribe(&self, path: &Path) -> Result<String> {
            self.seen.lock().unwrap().push(path.to_path_buf());
            let name = path.file_stem().unwrap().to_string_lossy().into_owned();
            Ok(format!(" words from {name} "))
        }
    }

    fn echo() -> EchoTranscriber {
        EchoTranscriber {
            seen: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_classify_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = AudioConfig {
            max_upload_bytes: 4,
            ..Default::default()
        };

        let text = dir.path().join("notes.TXT");
        std::fs::write(&text, "hello").unwrap();
        let small = dir.path().join("a.mp3");
        std::fs::write(&small, b"abc").unwrap();
        let large = dir.path().join("b.mp3");
        std::fs::write(&large, b"abcdefgh").unwrap();
        let wav = dir.path().join("c.wav");
        std::fs::write(&wav, b"a").unwrap();
        let pdf = dir.path().join("d.pdf");
        std::fs::write(&pdf, b"a").unwrap();

        assert_eq!(classify_input(&text, &config).unwrap(), InputKind::Text);
        assert_eq!(classify_input(&small, &config).unwrap(), InputKind::UploadableAudio);
        assert_eq!(classify_input(&large, &config).unwrap(), InputKind::ConvertibleAudio);
        assert_eq!(classify_input(&wav, &config).unwrap(), InputKind::ConvertibleAudio);
        assert!(classify_input(&pdf, &config).is_err());
        assert!(classify_input(&dir.path().join("missing.mp3"), &config).is_err());
    }

    #[tokio::test]
    async fn test_text_input_skips_transcription() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meeting.txt");
        std::fs::write(&path, "\n Alice: ship it.\n").unwrap();
        let transcriber = echo();

        let result = execute_stage0(&transcriber, &path, &AudioConfig::default())
            .await
            .unwrap();

        assert_eq!(result.transcript, "Alice: ship it.");
        assert_eq!(result.chunks_transcribed, 0);
        assert!(transcriber.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_small_mp3_is_uploaded_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standup.mp3");
        std::fs::write(&path, b"ID3").unwrap();
        let transcriber = echo();

        let result = execute_stage0(&transcriber, &path, &AudioConfig::default())
            .await
            .unwrap();

        assert_eq!(result.transcript, "words from standup");
        assert_eq!(result.chunks_transcribed, 1);
    }

    #[tokio::test]
    async fn test_empty_text_transcript_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.md");
        std::fs::write(&path, "   \n").unwrap();

        let result = execute_stage0(&echo(), &path, &AudioConfig::default()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_chunks_joined_in_order() {
        let chunks = vec![PathBuf::from("chunk_000.mp3"), PathBuf::from("chunk_001.mp3")];

        let text = transcribe_chunks(&echo(), &chunks).await.unwrap();

        assert_eq!(text, "words from chunk_000 words from chunk_001");
    }

    #[tokio::test]
    async fn test_missing_converter_is_an_error_and_scratch_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("call.wav");
        std::fs::write(&path, b"RIFF").unwrap();
        let scratch_parent = dir.path().join("scratch");
        std::fs::create_dir(&scratch_parent).unwrap();
        let config = AudioConfig {
            converter: "prdflow-no-such-converter".to_string(),
            scratch_dir: scratch_parent.clone(),
            ..Default::default()
        };

        let result = execute_stage0(&echo(), &path, &config).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(&scratch_parent).unwrap().count(), 0);
    }

    #[test]
    fn test_list_chunks_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["chunk_002.mp3", "chunk_000.mp3", "other.mp3", "chunk_001.mp3"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let names: Vec<String> = list_chunks(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, ["chunk_000.mp3", "chunk_001.mp3", "chunk_002.mp3"]);
    }
}
