use crate::align::align_by_index;
use crate::compose::compose;
use crate::config::Config;
use crate::error::{PolysubError, Result};
use crate::fetch::{movie_hash, OpenSubtitlesClient, SubtitleHit};
use crate::interactive::confirm_candidate;
use crate::select::{
    select_dub_candidate, select_original_candidate, CandidateDescriptor, ScoringWeights,
};
use crate::subtitle::{ass, srt, SubtitleTrack};
use crate::transcribe::{extract_audio_track, Transcriber, WhisperClient};
use crate::translate::{DeepLTranslator, Translator};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Options for one merge run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Original language of the video (subtitle search code, e.g. "en").
    pub lang_orig: String,
    /// Language of the dubbed audio track (e.g. "hu").
    pub lang_dub: String,
    /// Translation target for the dub text (DeepL code, e.g. "EN-US").
    pub lang_native: String,
    /// Audio stream index of the dub track, for the transcription fallback.
    pub audio_track: usize,
    /// Rewrite the dub track's timing from the original track by index.
    pub borrow_timing: bool,
    /// Ask before accepting the selector's candidate picks.
    pub interactive: bool,
    /// Show progress spinners.
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            lang_orig: "en".to_string(),
            lang_dub: "hu".to_string(),
            lang_native: "EN-US".to_string(),
            audio_track: 0,
            borrow_timing: false,
            interactive: false,
            show_progress: true,
        }
    }
}

/// Where the dub track came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DubSource {
    Downloaded { release_name: String },
    Transcribed,
}

/// Result of one merge run.
#[derive(Debug)]
pub struct PipelineResult {
    pub output_path: PathBuf,
    pub events_written: usize,
    pub dub_source: DubSource,
    pub original_found: bool,
    pub total_time: Duration,
}

struct StageProgress {
    bar: Option<ProgressBar>,
}

impl StageProgress {
    fn new(enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        });
        Self { bar }
    }

    fn stage(&self, msg: &str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(msg.to_string());
        }
    }

    fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

/// The default output location: next to the video, named after it.
pub fn default_output_path(video: &Path) -> PathBuf {
    let stem = video.file_stem().unwrap_or_default();
    let mut output = video.to_path_buf();
    output.set_file_name(format!("{}.polysub.ass", stem.to_string_lossy()));
    output
}

/// Run the full merge workflow for one video.
///
/// Search and selection, download (or transcription fallback for the dub),
/// optional timing alignment, translation, composition, and the final .ass
/// write. A failure anywhere aborts only this invocation; no partial output
/// file is produced.
pub async fn run(
    video: &Path,
    output: &Path,
    config: &Config,
    options: &PipelineOptions,
) -> Result<PipelineResult> {
    let start_time = Instant::now();

    if !video.exists() {
        return Err(PolysubError::FileNotFound(video.display().to_string()));
    }

    let progress = StageProgress::new(options.show_progress);

    // 1. Hash and search
    progress.stage("Searching for subtitles...");
    let hash = movie_hash(video)?.ok_or_else(|| {
        PolysubError::Search(format!(
            "Could not hash {}: file is too small to be a video",
            video.display()
        ))
    })?;
    info!("Movie hash: {}", hash);

    let api_key = config
        .opensubtitles_api_key
        .clone()
        .ok_or_else(|| PolysubError::Config("opensubtitles_api_key is not set".to_string()))?;
    let client = OpenSubtitlesClient::new(api_key);

    let hits = client
        .search(&hash, &[options.lang_orig.as_str(), options.lang_dub.as_str()])
        .await?;

    let orig_candidates = candidates_for(&hits, &options.lang_orig);
    let dub_candidates = candidates_for(&hits, &options.lang_dub);
    info!(
        "Found {} original and {} dub candidate(s)",
        orig_candidates.len(),
        dub_candidates.len()
    );

    // 2. Selection
    let orig_choice = pick_original(&orig_candidates, options)?;
    let dub_choice = pick_dub(&dub_candidates, config, options)?;

    // 3. Retrieval
    progress.stage("Downloading subtitles...");
    let orig_track = match orig_choice {
        Some(candidate) => Some(fetch_track(&client, candidate).await?),
        None => {
            warn!(
                "No '{}' subtitles found; merging without an original track",
                options.lang_orig
            );
            None
        }
    };

    let (dub_track, dub_source) = match dub_choice {
        Some(candidate) => {
            let track = fetch_track(&client, candidate).await?;
            let source = DubSource::Downloaded {
                release_name: candidate.release_name.clone(),
            };
            (track, source)
        }
        None => {
            progress.stage("No dub subtitles online; transcribing audio...");
            let track = transcribe_dub(video, config, options).await?;
            (track, DubSource::Transcribed)
        }
    };

    // 4. Optional timing alignment
    let dub_track = match (&orig_track, options.borrow_timing) {
        (Some(orig), true) => {
            progress.stage("Aligning dub timing to the original track...");
            align_by_index(orig, &dub_track)
        }
        (None, true) => {
            warn!("--borrow-timing requested but no original track is available");
            dub_track
        }
        _ => dub_track,
    };

    // 5. Translation
    progress.stage("Translating dub lines...");
    let deepl_key = config
        .deepl_api_key
        .clone()
        .ok_or_else(|| PolysubError::Config("deepl_api_key is not set".to_string()))?;
    let translator = DeepLTranslator::new(deepl_key);
    let translated = translator
        .translate_batch(&dub_track.texts(), &options.lang_native)
        .await?;
    info!(
        "Translated {} line(s) with {}",
        translated.len(),
        translator.name()
    );

    // 6. Compose and write
    progress.stage("Composing output document...");
    let document = compose(&dub_track, &translated, orig_track.as_ref(), &config.styles);
    let rendered = ass::render(&document);
    std::fs::write(output, rendered)?;
    progress.finish();

    info!(
        "Wrote {} event(s) to {}",
        document.events().len(),
        output.display()
    );

    Ok(PipelineResult {
        output_path: output.to_path_buf(),
        events_written: document.events().len(),
        dub_source,
        original_found: orig_track.is_some(),
        total_time: start_time.elapsed(),
    })
}

fn candidates_for(hits: &[SubtitleHit], language: &str) -> Vec<CandidateDescriptor> {
    hits.iter()
        .filter(|hit| hit.language.eq_ignore_ascii_case(language))
        .map(|hit| hit.candidate.clone())
        .collect()
}

fn pick_original<'a>(
    candidates: &'a [CandidateDescriptor],
    options: &PipelineOptions,
) -> Result<Option<&'a CandidateDescriptor>> {
    let Some(chosen) = select_original_candidate(candidates) else {
        return Ok(None);
    };
    info!(
        "Selected original sub: {} ({} downloads)",
        chosen.release_name, chosen.download_count
    );

    if options.interactive {
        let suggested = index_of(candidates, chosen);
        let confirmed = confirm_candidate("original", suggested, candidates)?;
        return Ok(Some(&candidates[confirmed]));
    }

    Ok(Some(chosen))
}

fn pick_dub<'a>(
    candidates: &'a [CandidateDescriptor],
    config: &Config,
    options: &PipelineOptions,
) -> Result<Option<&'a CandidateDescriptor>> {
    let weights = ScoringWeights::default();
    let Some(chosen) = select_dub_candidate(candidates, &config.dub_keywords, &weights) else {
        return Ok(None);
    };
    info!(
        "Selected dub sub: {} ({} downloads)",
        chosen.release_name, chosen.download_count
    );

    if options.interactive {
        let suggested = index_of(candidates, chosen);
        let confirmed = confirm_candidate("dub", suggested, candidates)?;
        return Ok(Some(&candidates[confirmed]));
    }

    Ok(Some(chosen))
}

fn index_of(candidates: &[CandidateDescriptor], chosen: &CandidateDescriptor) -> usize {
    candidates
        .iter()
        .position(|c| std::ptr::eq(c, chosen))
        .unwrap_or(0)
}

async fn fetch_track(
    client: &OpenSubtitlesClient,
    candidate: &CandidateDescriptor,
) -> Result<SubtitleTrack> {
    let link = client.download_link(candidate.file_id).await?;
    let file = client.download_to_temp(&link).await?;
    let bytes = tokio::fs::read(file.path()).await?;
    // Subtitle files in the wild are not reliably valid UTF-8
    srt::parse(&String::from_utf8_lossy(&bytes))
}

async fn transcribe_dub(
    video: &Path,
    config: &Config,
    options: &PipelineOptions,
) -> Result<SubtitleTrack> {
    let api_key = config.openai_api_key.clone().ok_or_else(|| {
        PolysubError::Config(
            "OPENAI_API_KEY not set; it is required for the transcription fallback".to_string(),
        )
    })?;

    let audio = tempfile::Builder::new().suffix(".wav").tempfile()?;
    extract_audio_track(video, options.audio_track, audio.path())?;

    let transcriber = WhisperClient::new(api_key).with_language(options.lang_dub.clone());
    info!(
        "Transcribing dub audio track {} with {}",
        options.audio_track,
        transcriber.name()
    );
    transcriber.transcribe(audio.path()).await
}
