//! Host commands.

use std::cell::{Cell, RefCell};
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use stagehand_core::audio::{
    AudioInstanceRegistry, KiraPlaybackPort, KiraSound, PlayOptions, SoundPlaybackPort,
};
use stagehand_core::clock::{FrameClock, SystemFrameClock};
use stagehand_core::config::{JitterRange, StagehandConfig};
use stagehand_core::timer::{CountdownTimer, DisplayPort};
use tokio::time::MissedTickBehavior;

/// Settings for the `countdown` command.
#[derive(Debug, Clone)]
pub struct CountdownOptions {
    pub seconds: f64,
    pub tick_sound: Option<PathBuf>,
    pub finish_music: Option<PathBuf>,
    pub fps: f64,
    /// Seconds to keep playing after completion before fading everything out.
    pub linger: f64,
    pub muted: bool,
}

/// A countdown wired to an audio registry.
///
/// The registry is shared with the timer listeners: every milestone plays the
/// tick effect and completion starts the finish music.
pub struct Session<P: SoundPlaybackPort> {
    timer: CountdownTimer,
    registry: Rc<RefCell<AudioInstanceRegistry<P>>>,
    completed: Rc<Cell<bool>>,
}

impl<P> Session<P>
where
    P: SoundPlaybackPort + 'static,
    P::Buffer: 'static,
{
    pub fn new(
        duration: f64,
        config: &StagehandConfig,
        registry: AudioInstanceRegistry<P>,
        tick_sound: Option<P::Buffer>,
        finish_music: Option<P::Buffer>,
    ) -> stagehand_core::Result<Self> {
        let mut timer = CountdownTimer::from_config(duration, &config.timer)?;
        let registry = Rc::new(RefCell::new(registry));
        let completed = Rc::new(Cell::new(false));

        if let Some(sound) = tick_sound {
            let registry = Rc::clone(&registry);
            let options = PlayOptions::from_config(&config.audio);
            timer.on_milestone(move |milestone| {
                tracing::info!("{}...", milestone);
                if let Err(e) = registry.borrow_mut().play_effect(&sound, options) {
                    tracing::warn!("Tick sound failed: {}", e);
                }
            });
        }

        {
            let registry = Rc::clone(&registry);
            let completed = Rc::clone(&completed);
            timer.on_complete(move || {
                completed.set(true);
                tracing::info!("Countdown complete");
                if let Some(music) = &finish_music {
                    if let Err(e) = registry
                        .borrow_mut()
                        .play_music(music, false, JitterRange::NONE)
                    {
                        tracing::warn!("Finish music failed: {}", e);
                    }
                }
            });
        }

        Ok(Self {
            timer,
            registry,
            completed,
        })
    }

    pub fn set_display(&mut self, display: Box<dyn DisplayPort>) {
        self.timer.set_display(display);
    }

    pub fn start(&mut self) {
        self.completed.set(false);
        self.timer.restart();
    }

    /// Advances the timer, then the audio registry.
    pub fn frame(&mut self, dt: f64) {
        self.timer.tick(dt);
        self.registry.borrow_mut().tick(dt);
    }

    /// Stops the timer without completion and fades out all audio.
    pub fn finish(&mut self) {
        self.timer.stop(false);
        let fading = self.registry.borrow_mut().stop_all();
        tracing::debug!("Fading out {} instance(s)", fading);
    }

    pub fn is_complete(&self) -> bool {
        self.completed.get()
    }

    pub fn is_audio_idle(&self) -> bool {
        self.registry.borrow().is_empty()
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn registry(&self) -> Rc<RefCell<AudioInstanceRegistry<P>>> {
        Rc::clone(&self.registry)
    }
}

/// Rewrites the current terminal line with `text`. Write failures are logged, not raised.
fn show_remaining<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = write!(out, "\r{:<12}", text).and_then(|()| out.flush()) {
        tracing::debug!("Display write failed: {}", e);
    }
}

/// Runs a countdown against the default audio device until it completes and
/// the audio has faded out, or until Ctrl-C.
pub async fn run_countdown(
    options: CountdownOptions,
    config: StagehandConfig,
) -> anyhow::Result<()> {
    let mut registry = AudioInstanceRegistry::new(KiraPlaybackPort::new()?, config.audio.clone())?;
    registry.set_muted(options.muted);

    let tick_sound = options
        .tick_sound
        .as_deref()
        .map(KiraSound::from_file)
        .transpose()?;
    let finish_music = options
        .finish_music
        .as_deref()
        .map(KiraSound::from_file)
        .transpose()?;

    let mut session = Session::new(options.seconds, &config, registry, tick_sound, finish_music)?;
    session.set_display(Box::new(|text: &str| show_remaining(&mut std::io::stdout(), text)));
    session.start();
    tracing::info!("Countdown of {:.2}s started", options.seconds);

    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / options.fps.max(1.0)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut clock = SystemFrameClock::new();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut draining = false;
    let mut linger_left = options.linger;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c, if !interrupted => {
                tracing::info!("Interrupted, fading out");
                interrupted = true;
                if !draining {
                    session.finish();
                    draining = true;
                }
            }
        }

        let dt = clock.elapsed_seconds_since_last_tick();
        session.frame(dt);

        if session.is_complete() && !draining {
            linger_left -= dt;
            if linger_left <= 0.0 {
                session.finish();
                draining = true;
            }
        }

        if draining && session.is_audio_idle() {
            break;
        }
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::audio::{Category, PlaybackHandle, PlaybackParams, SoundBuffer};
    use stagehand_core::config::AudioConfig;
    use stagehand_core::timer::TimerState;

    #[derive(Clone)]
    struct FakeBuffer(f64);

    impl SoundBuffer for FakeBuffer {
        fn length_secs(&self) -> f64 {
            self.0
        }

        fn is_empty(&self) -> bool {
            false
        }
    }

    struct FakeHandle;

    impl PlaybackHandle for FakeHandle {
        fn set_volume(&mut self, _volume: f32) {}

        fn stop_and_release(&mut self) {}
    }

    #[derive(Default)]
    struct FakePort {
        started: Vec<PlaybackParams>,
    }

    impl SoundPlaybackPort for FakePort {
        type Buffer = FakeBuffer;
        type Handle = FakeHandle;

        fn start(
            &mut self,
            _buffer: &FakeBuffer,
            params: &PlaybackParams,
        ) -> stagehand_core::Result<FakeHandle> {
            self.started.push(*params);
            Ok(FakeHandle)
        }

        fn set_output_gain(&mut self, _gain: f32) {}
    }

    fn session(tick: Option<f64>, finish: Option<f64>) -> Session<FakePort> {
        let config = StagehandConfig::default();
        let registry = AudioInstanceRegistry::with_seed(FakePort::default(), AudioConfig::default(), 7).unwrap();
        Session::new(3.0, &config, registry, tick.map(FakeBuffer), finish.map(FakeBuffer)).unwrap()
    }

    #[test]
    fn test_milestones_play_tick_sound_and_completion_starts_music() {
        let mut session = session(Some(0.5), Some(10.0));
        session.start();

        session.frame(1.0);
        assert_eq!(session.registry().borrow().port().started.len(), 2);

        session.frame(1.0);
        assert_eq!(session.registry().borrow().port().started.len(), 3);
        assert!(!session.is_complete());

        session.frame(1.0);
        assert!(session.is_complete());
        assert_eq!(session.timer().state(), TimerState::Stopped);

        let registry = session.registry();
        let registry = registry.borrow();
        assert_eq!(registry.port().started.len(), 4);
        let music = registry.active_music().unwrap();
        assert_eq!(registry.snapshot(music).unwrap().category, Category::Music);
    }

    #[test]
    fn test_finish_fades_everything_out() {
        let mut session = session(Some(5.0), Some(10.0));
        session.start();
        for _ in 0..3 {
            session.frame(1.0);
        }
        assert!(!session.is_audio_idle());

        session.finish();
        session.frame(0.2);
        assert!(session.is_audio_idle());
    }

    #[test]
    fn test_without_cues_completes_silently() {
        let mut session = session(None, None);
        session.start();
        session.frame(3.5);

        assert!(session.is_complete());
        assert!(session.is_audio_idle());
        assert!(session.registry().borrow().port().started.is_empty());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_show_remaining_rewrites_line() {
        let mut out = Vec::new();
        show_remaining(&mut out, "2:50");
        assert_eq!(String::from_utf8(out).unwrap(), "\r2:50        ");
    }

    #[test]
    fn test_show_remaining_logs_write_failure() {
        use tracing_subscriber::layer::SubscriberExt;

        let overlay = crate::LogOverlay::new(1000);
        let subscriber = tracing_subscriber::registry().with(overlay.layer());
        tracing::subscriber::with_default(subscriber, || show_remaining(&mut ClosedPipe, "1"));

        assert!(overlay.contents().starts_with("-Display write failed"));
    }

    #[test]
    fn test_restart_clears_completion() {
        let mut session = session(None, None);
        session.start();
        session.frame(3.0);
        assert!(session.is_complete());

        session.start();
        assert!(!session.is_complete());
        assert_eq!(session.timer().time_left(), 3.0);
    }
}
