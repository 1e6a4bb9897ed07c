//! Session runner: walks the user through a plan.
//!
//! Each exercise goes through three phases:
//! 1. **Prep**: announce name, variant, duration and props, then wait
//! 2. **Countdown**: count down to "GO!"
//! 3. **Go**: time the exercise with a halfway call
//!
//! Waiting is done through the `Pacer` trait so sessions can run instantly
//! in tests and with `--instant`. An interrupted pause during the go phase
//! skips the rest of that exercise.

use crate::config::SessionConfig;
use crate::{props_by_location, MusicPlayer, Narrator, PlannedExercise, PropsByLocation, Result, Site};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const PROP_PAUSE: Duration = Duration::from_millis(500);
const POLL_STEP: Duration = Duration::from_millis(100);

/// How a pause ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pause {
    Full,
    /// Cut short by the user after `elapsed`
    Interrupted { elapsed: Duration },
}

/// How the runner waits between prompts
pub trait Pacer {
    /// Let `duration` pass, unless interrupted
    fn pause(&mut self, duration: Duration) -> Pause;
    /// Block until the user confirms they are ready
    fn wait_for_enter(&mut self, prompt: &str) -> Result<()>;
}

/// Wall-clock pacing with keyboard confirmation on stdin
///
/// With an interrupt flag, pauses sleep in short steps and end early once
/// the flag is raised. The flag is cleared when it is consumed.
#[derive(Debug, Default)]
pub struct RealPacer {
    interrupt: Option<Arc<AtomicBool>>,
}

impl RealPacer {
    pub fn with_interrupt(interrupt: Arc<AtomicBool>) -> Self {
        Self {
            interrupt: Some(interrupt),
        }
    }
}

impl Pacer for RealPacer {
    fn pause(&mut self, duration: Duration) -> Pause {
        let Some(interrupt) = &self.interrupt else {
            std::thread::sleep(duration);
            return Pause::Full;
        };

        let started = Instant::now();
        loop {
            if interrupt.swap(false, Ordering::SeqCst) {
                let elapsed = started.elapsed().min(duration);
                tracing::debug!("Pause interrupted after {:?}", elapsed);
                return Pause::Interrupted { elapsed };
            }
            let elapsed = started.elapsed();
            if elapsed >= duration {
                return Pause::Full;
            }
            std::thread::sleep((duration - elapsed).min(POLL_STEP));
        }
    }

    fn wait_for_enter(&mut self, prompt: &str) -> Result<()> {
        print!("{} ", prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(())
    }
}

/// Pacing that never waits
#[derive(Debug, Default)]
pub struct InstantPacer;

impl Pacer for InstantPacer {
    fn pause(&mut self, _duration: Duration) -> Pause {
        Pause::Full
    }

    fn wait_for_enter(&mut self, prompt: &str) -> Result<()> {
        tracing::debug!("Skipping wait: {}", prompt);
        Ok(())
    }
}

/// Timing and interaction settings for one session
#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub prep_seconds: u32,
    pub first_countdown: u32,
    pub countdown: u32,
    pub countdown_step: Duration,
    pub default_duration: u32,
    /// No keyboard: every wait becomes a timed prep
    pub headless: bool,
}

impl SessionSettings {
    pub fn from_config(config: &SessionConfig, headless: bool) -> Self {
        Self {
            prep_seconds: config.prep_seconds,
            first_countdown: config.first_countdown,
            countdown: config.countdown,
            countdown_step: Duration::from_millis(config.countdown_step_ms),
            default_duration: config.default_duration,
            headless,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default(), false)
    }
}

/// Summary of a completed session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub exercises: usize,
    pub total_work_seconds: u32,
}

/// Narrates a plan over background music
pub struct SessionRunner<N, M, P> {
    narrator: N,
    music: M,
    pacer: P,
    settings: SessionSettings,
}

impl<N: Narrator, M: MusicPlayer, P: Pacer> SessionRunner<N, M, P> {
    pub fn new(narrator: N, music: M, pacer: P, settings: SessionSettings) -> Self {
        Self {
            narrator,
            music,
            pacer,
            settings,
        }
    }

    pub fn into_parts(self) -> (N, M, P) {
        (self.narrator, self.music, self.pacer)
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        self.narrator.speak(text)
    }

    /// Wait before starting something at `site`
    ///
    /// Indoors (with a keyboard) the user confirms with Enter; outdoors or
    /// headless there is a short timed prep instead.
    pub fn keywait(&mut self, site: Site) -> Result<()> {
        if !self.settings.headless && site == Site::Indoor {
            self.pacer.wait_for_enter("Press Enter when ready...")
        } else {
            let prep = self.settings.prep_seconds;
            self.speak(&format!("Prep for {} seconds!", prep))?;
            let _ = self.pacer.pause(Duration::from_secs(prep as u64));
            Ok(())
        }
    }

    /// Announce everything the session will need, per location
    pub fn prepare_props(&mut self, props: &PropsByLocation) -> Result<()> {
        self.speak("Prepare your props!")?;

        for (site, site_props) in props {
            self.speak(&format!("{} props:", site))?;
            for prop in site_props {
                self.speak(prop)?;
            }
            let _ = self.pacer.pause(PROP_PAUSE);
        }
        Ok(())
    }

    /// Prep phase before an exercise
    pub fn prep(&mut self, exercise: &PlannedExercise) -> Result<()> {
        self.speak(&format!("Next exercise: {}", exercise.name))?;
        if let Some(variant) = &exercise.assigned_variant {
            self.speak(&format!("Variant: {}", variant))?;
        }
        if let Some(duration) = exercise.assigned_duration {
            self.speak(&format!("Duration: {} seconds", duration))?;
        }
        if !exercise.props.is_empty() {
            self.speak(&format!("Props needed: {}", exercise.props.join(", ")))?;
        }

        self.keywait(exercise.location)
    }

    /// Count down from `seconds` to "GO!"
    pub fn countdown(&mut self, seconds: u32) -> Result<()> {
        for i in (1..=seconds).rev() {
            self.speak(&i.to_string())?;
            let _ = self.pacer.pause(self.settings.countdown_step);
        }
        self.speak("GO!")
    }

    /// Time one exercise; returns the seconds worked
    ///
    /// An interrupted pause skips the rest of the exercise, and only the
    /// whole seconds worked until then count.
    pub fn go(&mut self, exercise: &PlannedExercise) -> Result<u32> {
        let seconds = exercise
            .assigned_duration
            .unwrap_or(self.settings.default_duration);
        let total = Duration::from_secs(seconds as u64);
        let half = total / 2;

        self.speak(&format!("Start {} now!", exercise.name))?;
        self.music.louden()?;

        let skipped_after = match self.pacer.pause(half) {
            Pause::Interrupted { elapsed } => Some(elapsed),
            Pause::Full => {
                self.music.quieten()?;
                self.speak("Halfway there!")?;
                self.music.louden()?;
                match self.pacer.pause(total - half) {
                    Pause::Interrupted { elapsed } => Some(half + elapsed),
                    Pause::Full => None,
                }
            }
        };

        let worked = match skipped_after {
            Some(elapsed) => {
                tracing::info!("Skipped {} after {:?}", exercise.name, elapsed);
                self.speak("Exercise skipped!")?;
                elapsed.as_secs() as u32
            }
            None => seconds,
        };

        self.music.quieten()?;
        self.speak(&format!("Completed {}!", exercise.name))?;
        Ok(worked)
    }

    /// Walk through the whole plan
    pub fn run(&mut self, plan: &[PlannedExercise]) -> Result<SessionReport> {
        let started_at = Utc::now();
        let mut total_work_seconds = 0;

        self.music.play()?;
        self.music.quieten()?;
        self.prepare_props(&props_by_location(plan))?;
        // Gathering props always needs a confirmation, headless or not
        self.pacer.wait_for_enter("Press Enter when ready...")?;

        for (i, exercise) in plan.iter().enumerate() {
            tracing::info!("Exercise {}/{}: {}", i + 1, plan.len(), exercise.name);

            self.music.next_track()?;
            self.music.quieten()?;
            self.prep(exercise)?;

            let countdown = if i == 0 {
                self.settings.first_countdown
            } else {
                self.settings.countdown
            };
            self.countdown(countdown)?;

            total_work_seconds += self.go(exercise)?;

            if i + 1 < plan.len() {
                self.speak("Next exercise coming up!")?;
            }
        }

        self.music.quieten()?;
        self.speak("Routine completed!")?;
        self.music.stop(true)?;

        let report = SessionReport {
            started_at,
            completed_at: Utc::now(),
            exercises: plan.len(),
            total_work_seconds,
        };
        tracing::info!(
            "Session finished: {} exercises, {}s of work",
            report.exercises,
            report.total_work_seconds
        );
        Ok(report)
    }
}
