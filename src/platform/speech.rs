//! Desktop speech engine driving the system synthesiser as a child process.
//!
//! | Engine     | Platform           | Voice listing     |
//! |------------|--------------------|-------------------|
//! | `say`      | macOS              | `say -v ?`        |
//! | `espeak-ng`| Linux / Windows    | `espeak-ng --voices` |
//!
//! The utterance is written to the child's stdin so no part of the text is
//! ever interpreted as a command-line flag.  [`SystemSpeech::stop`]
//! interrupts whichever utterance is currently running.

use std::future::Future;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::futures::Notified;
use tokio::sync::Notify;

use crate::config::SpeechBackend;

use super::{PlatformError, PlatformVoice, SpeechPlatform, SpeechRequest};

/// Words per minute at rate `1.0`.
const BASE_WPM: f32 = 175.0;
const MIN_WPM: f32 = 80.0;
const MAX_WPM: f32 = 450.0;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
    Say,
    EspeakNg,
}

impl Engine {
    fn resolve(backend: SpeechBackend) -> Option<Self> {
        match backend {
            SpeechBackend::Auto if cfg!(target_os = "macos") => Some(Engine::Say),
            SpeechBackend::Auto => Some(Engine::EspeakNg),
            SpeechBackend::Say => Some(Engine::Say),
            SpeechBackend::EspeakNg => Some(Engine::EspeakNg),
            SpeechBackend::Disabled => None,
        }
    }

    fn program(&self) -> &'static str {
        match self {
            Engine::Say => "say",
            Engine::EspeakNg => "espeak-ng",
        }
    }

    fn speak_args(&self, request: &SpeechRequest) -> Vec<String> {
        match self {
            Engine::Say => say_args(request),
            Engine::EspeakNg => espeak_args(request),
        }
    }

    /// What is written to the child's stdin.
    fn stdin_text(&self, request: &SpeechRequest) -> String {
        match self {
            Engine::Say => say_text(request),
            Engine::EspeakNg => request.text.clone(),
        }
    }
}

fn words_per_minute(rate: f32) -> u32 {
    let rate = if rate.is_finite() { rate } else { 1.0 };
    (BASE_WPM * rate).clamp(MIN_WPM, MAX_WPM).round() as u32
}

/// `say` has no volume flag; volume travels inline, see [`say_text`].
fn say_args(request: &SpeechRequest) -> Vec<String> {
    let mut args = vec!["-r".to_string(), words_per_minute(request.rate).to_string()];
    if let Some(name) = request.voice.as_deref().and_then(say_voice_name) {
        args.push("-v".into());
        args.push(name);
    }
    args
}

/// Prefix the utterance with `say`'s embedded volume command, `[[volm x]]`
/// with `x` in `[0, 1]`.
fn say_text(request: &SpeechRequest) -> String {
    let volume = if request.volume.is_finite() {
        request.volume.clamp(0.0, 1.0)
    } else {
        1.0
    };
    format!("[[volm {volume:.2}]] {}", request.text)
}

/// Map a platform voice identifier to the short name `say -v` expects:
/// `com.apple.voice.compact.en-US.Samantha` → `Samantha`,
/// `com.apple.ttsbundle.Alex-compact` → `Alex`.  Bare language tags have no
/// `say` equivalent and map to `None`.
fn say_voice_name(voice: &str) -> Option<String> {
    if !voice.starts_with("com.apple.") {
        return None;
    }
    let last = voice.rsplit('.').next()?;
    let name = last
        .trim_end_matches("-compact")
        .trim_end_matches("-premium");
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn espeak_args(request: &SpeechRequest) -> Vec<String> {
    // espeak-ng amplitude: 0–200, 100 is normal.
    let amplitude = (request.volume.clamp(0.0, 1.0) * 100.0).round() as u32;
    let voice = match request.voice.as_deref() {
        Some(v) if !v.starts_with("com.apple.") => v,
        _ => request.language.as_str(),
    };
    vec![
        "-s".into(),
        words_per_minute(request.rate).to_string(),
        "-a".into(),
        amplitude.to_string(),
        "-v".into(),
        voice.to_ascii_lowercase(),
        "--stdin".into(),
    ]
}

// ---------------------------------------------------------------------------
// Voice listing parsers
// ---------------------------------------------------------------------------

/// `en_US` / `en-us` → `en-US`.
fn normalise_language(raw: &str) -> String {
    let mut parts = raw.split(['_', '-']);
    let lang = parts.next().unwrap_or_default().to_ascii_lowercase();
    let rest: Vec<String> = parts
        .map(|p| {
            if p.len() == 2 {
                p.to_ascii_uppercase()
            } else {
                p.to_string()
            }
        })
        .collect();
    if rest.is_empty() {
        lang
    } else {
        format!("{lang}-{}", rest.join("-"))
    }
}

/// Parse `say -v ?` output:
///
/// ```text
/// Alex                en_US    # Most people recognize me by my voice.
/// Bad News            en_US    # The light you see at the end of the tunnel…
/// ```
fn parse_say_voices(output: &str) -> Vec<PlatformVoice> {
    output
        .lines()
        .filter_map(|line| {
            let head = line.split('#').next()?.trim();
            let (name, locale) = head.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() || !locale.contains('_') {
                return None;
            }
            Some(PlatformVoice {
                identifier: format!("com.apple.speech.synthesis.voice.{name}"),
                name: name.to_string(),
                language: normalise_language(locale),
            })
        })
        .collect()
}

/// Parse `espeak-ng --voices` output:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 10)
/// ```
///
/// The voice identifier is the language tag, which is what `espeak-ng -v`
/// accepts.
fn parse_espeak_voices(output: &str) -> Vec<PlatformVoice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _priority = cols.next()?;
            let language = normalise_language(cols.next()?);
            let _age_gender = cols.next()?;
            let name = cols.next()?.replace('_', " ");
            Some(PlatformVoice {
                identifier: language.clone(),
                name,
                language,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// SystemSpeech
// ---------------------------------------------------------------------------

/// Run `work` unless `stopped` fires first; `None` means interrupted.
/// Dropping `work` on interruption kills a `kill_on_drop` child.
async fn until_stopped<F: Future>(stopped: Notified<'_>, work: F) -> Option<F::Output> {
    tokio::select! {
        output = work => Some(output),
        _ = stopped => None,
    }
}

/// [`SpeechPlatform`] backed by the `say` or `espeak-ng` command.
///
/// One child process per utterance.  [`stop`](SpeechPlatform::stop) wakes
/// every in-flight [`speak`](SpeechPlatform::speak), which kills its child
/// and resolves `Ok(())`.
pub struct SystemSpeech {
    engine: Option<Engine>,
    stop_signal: Notify,
}

impl SystemSpeech {
    pub fn new(backend: SpeechBackend) -> Self {
        let engine = Engine::resolve(backend);
        match engine {
            Some(e) => log::info!("speech: using {}", e.program()),
            None => log::info!("speech: disabled"),
        }
        Self {
            engine,
            stop_signal: Notify::new(),
        }
    }

    fn engine(&self) -> Result<Engine, PlatformError> {
        self.engine.ok_or(PlatformError::Unavailable("speech engine"))
    }
}

#[async_trait]
impl SpeechPlatform for SystemSpeech {
    async fn speak(&self, request: &SpeechRequest) -> Result<(), PlatformError> {
        let engine = self.engine()?;
        let program = engine.program();

        // Registered before the child starts so a stop issued while it runs
        // is never missed.
        let stopped = self.stop_signal.notified();

        let mut child = Command::new(program)
            .args(engine.speak_args(request))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlatformError::Speech(format!("failed to start {program}: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(engine.stdin_text(request).as_bytes())
                .await
                .map_err(|e| PlatformError::Speech(format!("{program} stdin: {e}")))?;
            // Dropping stdin closes the pipe and starts synthesis.
        }

        let Some(output) = until_stopped(stopped, child.wait_with_output()).await else {
            log::debug!("speech: utterance interrupted");
            return Ok(());
        };
        let output =
            output.map_err(|e| PlatformError::Speech(format!("{program} did not finish: {e}")))?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(PlatformError::Speech(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }

    async fn stop(&self) -> Result<(), PlatformError> {
        self.engine()?;
        self.stop_signal.notify_waiters();
        Ok(())
    }

    async fn available_voices(&self) -> Result<Vec<PlatformVoice>, PlatformError> {
        let engine = self.engine()?;
        let args: &[&str] = match engine {
            Engine::Say => &["-v", "?"],
            Engine::EspeakNg => &["--voices"],
        };
        let output = Command::new(engine.program())
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| PlatformError::Speech(format!("failed to list voices: {e}")))?;
        if !output.status.success() {
            return Err(PlatformError::Speech(format!(
                "voice listing exited with {}",
                output.status
            )));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(match engine {
            Engine::Say => parse_say_voices(&text),
            Engine::EspeakNg => parse_espeak_voices(&text),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request(voice: Option<&str>) -> SpeechRequest {
        SpeechRequest {
            text: "-rf hello".into(),
            language: "en-US".into(),
            volume: 0.5,
            rate: 0.8,
            voice: voice.map(String::from),
        }
    }

    #[test]
    fn rate_maps_to_clamped_wpm() {
        assert_eq!(words_per_minute(1.0), 175);
        assert_eq!(words_per_minute(0.8), 140);
        assert_eq!(words_per_minute(0.1), 80);
        assert_eq!(words_per_minute(10.0), 450);
        assert_eq!(words_per_minute(f32::NAN), 175);
    }

    #[test]
    fn say_args_map_bundle_voice_to_short_name() {
        let args = say_args(&request(Some("com.apple.voice.compact.en-US.Samantha")));
        assert_eq!(args, vec!["-r", "140", "-v", "Samantha"]);

        let args = say_args(&request(Some("com.apple.ttsbundle.Alex-compact")));
        assert_eq!(args, vec!["-r", "140", "-v", "Alex"]);
    }

    #[test]
    fn say_text_carries_volume() {
        assert_eq!(say_text(&request(None)), "[[volm 0.50]] -rf hello");

        let mut silent = request(None);
        silent.volume = 0.0;
        assert_eq!(say_text(&silent), "[[volm 0.00]] -rf hello");

        let mut loud = request(None);
        loud.volume = 4.0;
        assert!(say_text(&loud).starts_with("[[volm 1.00]]"));
    }

    #[test]
    fn espeak_stdin_is_plain_text() {
        let r = request(None);
        assert_eq!(Engine::EspeakNg.stdin_text(&r), r.text);
        assert_eq!(Engine::Say.stdin_text(&r), say_text(&r));
    }

    #[test]
    fn say_args_skip_language_tag_voice() {
        assert_eq!(say_args(&request(Some("en-US"))), vec!["-r", "140"]);
    }

    #[test]
    fn espeak_args_use_language_tag_voice() {
        let args = espeak_args(&request(Some("en-GB")));
        assert_eq!(args, vec!["-s", "140", "-a", "50", "-v", "en-gb", "--stdin"]);
    }

    #[test]
    fn espeak_args_fall_back_to_language_for_bundle_voice() {
        let args = espeak_args(&request(Some("com.apple.voice.compact.en-US.Samantha")));
        assert!(args.windows(2).any(|w| w == ["-v", "en-us"]));
    }

    #[test]
    fn text_never_appears_in_arguments() {
        let r = request(None);
        assert!(!say_args(&r).contains(&r.text));
        assert!(!espeak_args(&r).contains(&r.text));
    }

    #[test]
    fn normalise_language_forms() {
        assert_eq!(normalise_language("en_US"), "en-US");
        assert_eq!(normalise_language("en-us"), "en-US");
        assert_eq!(normalise_language("af"), "af");
        assert_eq!(normalise_language("es-419"), "es-419");
    }

    #[test]
    fn parses_say_voice_listing() {
        let out = "Alex                en_US    # Most people recognize me by my voice.\n\
                   Bad News            en_US    # The light you see.\n\
                   Amélie              fr_CA    # Bonjour\n";
        let voices = parse_say_voices(out);
        assert_eq!(voices.len(), 3);
        assert_eq!(voices[0].name, "Alex");
        assert_eq!(voices[0].identifier, "com.apple.speech.synthesis.voice.Alex");
        assert_eq!(voices[1].name, "Bad News");
        assert_eq!(voices[2].language, "fr-CA");
    }

    #[test]
    fn parses_espeak_voice_listing() {
        let out = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n \
                   5  af              --/M      Afrikaans          gmw/af\n \
                   5  en-us           --/M      English_(America)  gmw/en-US            (en 10)\n";
        let voices = parse_espeak_voices(out);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].identifier, "en-US");
        assert_eq!(voices[1].name, "English (America)");
    }

    #[tokio::test]
    async fn finished_work_is_returned() {
        let notify = Notify::new();
        let out = until_stopped(notify.notified(), async { 42 }).await;
        assert_eq!(out, Some(42));
    }

    #[tokio::test]
    async fn stop_interrupts_in_flight_work() {
        let speech = SystemSpeech::new(SpeechBackend::EspeakNg);
        let stopped = speech.stop_signal.notified();
        speech.stop().await.unwrap();

        let out = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            until_stopped(stopped, std::future::pending::<()>()),
        )
        .await
        .expect("stop did not interrupt");
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn stop_before_registration_is_not_remembered() {
        let speech = SystemSpeech::new(SpeechBackend::EspeakNg);
        speech.stop().await.unwrap();
        let stopped = speech.stop_signal.notified();

        let out = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            until_stopped(stopped, std::future::pending::<()>()),
        )
        .await;
        assert!(out.is_err());
    }

    #[tokio::test]
    async fn disabled_backend_is_unavailable() {
        let speech = SystemSpeech::new(SpeechBackend::Disabled);
        let err = speech.speak(&request(None)).await.unwrap_err();
        assert_eq!(err, PlatformError::Unavailable("speech engine"));
        assert!(speech.stop().await.is_err());
        assert!(speech.available_voices().await.is_err());
    }
}
