//! Background music.
//!
//! `PlaylistPlayer` picks random tracks from a directory, remembers where
//! each track was stopped and keeps track of the volume. Actual output is
//! delegated to an optional external player command, e.g.
//! `mpv --no-video --start={start} --volume={volume}`:
//! - `{start}` becomes the resume position in seconds
//! - `{volume}` becomes the volume in percent (0-100)
//! - `{track}` becomes the track path; without it the path is appended
//!
//! The player process is restarted from the current position whenever the
//! volume changes. Without a command the player only keeps its bookkeeping.

use crate::config::MusicConfig;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

const TRACK_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];
const FADE_STEPS: u32 = 4;

/// Controls for the music playing under a session
pub trait MusicPlayer {
    /// Play a random track from its last known position
    fn play(&mut self) -> Result<()>;
    /// Stop the current track, remembering its position
    fn stop(&mut self, fadeout: bool) -> Result<()>;
    /// Stop the current track and play another random one
    fn next_track(&mut self) -> Result<()> {
        self.stop(true)?;
        self.play()
    }
    /// Halve the volume
    fn quieten(&mut self) -> Result<()>;
    /// Double the volume, up to full
    fn louden(&mut self) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn unpause(&mut self) -> Result<()>;
    fn is_playing(&self) -> bool;
}

/// Collect playable tracks from `dir`, sorted by path
///
/// A missing directory yields an empty playlist.
pub fn scan_tracks(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        tracing::debug!("No music directory at {:?}", dir);
        return Ok(Vec::new());
    }

    let mut tracks: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| TRACK_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    tracks.sort();
    Ok(tracks)
}

/// Full argv for the player `command` playing `track`
pub fn player_argv(command: &[String], track: &Path, start: f64, volume: f32) -> Vec<String> {
    let track = track.to_string_lossy();
    let start = format!("{:.1}", start);
    let volume = ((volume.clamp(0.0, 1.0) * 100.0).round() as u32).to_string();

    let mut argv: Vec<String> = command
        .iter()
        .map(|part| {
            part.replace("{start}", &start)
                .replace("{volume}", &volume)
                .replace("{track}", &track)
        })
        .collect();
    if !command.iter().any(|part| part.contains("{track}")) {
        argv.push(track.into_owned());
    }
    argv
}

/// Random-track player over a directory of audio files
pub struct PlaylistPlayer {
    playlist: Vec<PathBuf>,
    command: Option<Vec<String>>,
    fade: Duration,
    quiet_tracks: Vec<String>,
    quiet_volume: f32,
    volume: f32,
    current_track: Option<PathBuf>,
    /// Seconds already played, per track
    positions: HashMap<PathBuf, f64>,
    started: Option<Instant>,
    paused: bool,
    child: Option<Child>,
    rng: StdRng,
}

impl PlaylistPlayer {
    pub fn new(playlist: Vec<PathBuf>, config: &MusicConfig) -> Result<Self> {
        let command = match &config.command {
            Some(command) => {
                let parts: Vec<String> = command.split_whitespace().map(String::from).collect();
                if parts.is_empty() {
                    return Err(Error::Config("music.command is empty".into()));
                }
                Some(parts)
            }
            None => None,
        };

        Ok(Self {
            playlist,
            command,
            fade: Duration::from_millis(config.fade_ms),
            quiet_tracks: config.quiet_tracks.clone(),
            quiet_volume: config.quiet_volume,
            volume: 1.0,
            current_track: None,
            positions: HashMap::new(),
            started: None,
            paused: false,
            child: None,
            rng: StdRng::from_entropy(),
        })
    }

    /// Build a player from the tracks found in `config.dir`
    pub fn from_config(config: &MusicConfig) -> Result<Self> {
        let playlist = scan_tracks(&config.dir)?;
        tracing::info!("Found {} music tracks in {:?}", playlist.len(), config.dir);
        Self::new(playlist, config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn playlist(&self) -> &[PathBuf] {
        &self.playlist
    }

    pub fn current_track(&self) -> Option<&Path> {
        self.current_track.as_deref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Remembered position of `track` in seconds
    pub fn position(&self, track: &Path) -> f64 {
        self.positions.get(track).copied().unwrap_or(0.0)
    }

    fn is_quiet_track(&self, track: &Path) -> bool {
        let name = track.to_string_lossy();
        self.quiet_tracks.iter().any(|q| name.contains(q.as_str()))
    }

    fn spawn(&mut self, track: &Path, start: f64, volume: f32) -> Result<()> {
        let Some(command) = &self.command else {
            return Ok(());
        };
        let argv = player_argv(command, track, start, volume);
        let child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Music(format!("Failed to run {}: {}", argv[0], e)))?;
        tracing::debug!("Started player: {:?}", argv);
        self.child = Some(child);
        Ok(())
    }

    /// Restart the player process from the current position at `volume`
    fn respawn(&mut self, volume: f32) -> Result<()> {
        if self.command.is_none() || !self.is_playing() {
            return Ok(());
        }
        let Some(track) = self.current_track.clone() else {
            return Ok(());
        };
        self.kill_child();
        self.record_position();
        let start = self.position(&track);
        self.spawn(&track, start, volume)?;
        self.started = Some(Instant::now());
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.volume = volume;
        self.respawn(volume)
    }

    /// Step the volume down to silence over the fade time
    fn fade_out(&mut self) -> Result<()> {
        let step = self.fade / FADE_STEPS;
        for i in 1..FADE_STEPS {
            let volume = self.volume * (FADE_STEPS - i) as f32 / FADE_STEPS as f32;
            self.respawn(volume)?;
            std::thread::sleep(step);
        }
        std::thread::sleep(step);
        Ok(())
    }

    fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::warn!("Unable to stop music player: {}", e);
            }
            let _ = child.wait();
        }
    }

    /// Add the time since the last (re)start to the current track's position
    fn record_position(&mut self) {
        if let (Some(track), Some(started)) = (&self.current_track, self.started.take()) {
            let elapsed = started.elapsed().as_secs_f64();
            *self.positions.entry(track.clone()).or_insert(0.0) += elapsed;
        }
    }
}

impl MusicPlayer for PlaylistPlayer {
    fn play(&mut self) -> Result<()> {
        let Some(track) = self.playlist.choose(&mut self.rng).cloned() else {
            return Ok(());
        };

        self.volume = if self.is_quiet_track(&track) {
            tracing::debug!("Quiet track {:?} detected, lowering volume", track);
            self.quiet_volume
        } else {
            1.0
        };

        let start = self.position(&track);
        self.spawn(&track, start, self.volume)?;
        tracing::debug!("Playing track {:?} from {:.1}s", track, start);

        self.current_track = Some(track);
        self.started = Some(Instant::now());
        self.paused = false;
        Ok(())
    }

    fn stop(&mut self, fadeout: bool) -> Result<()> {
        if self.current_track.is_none() {
            return Ok(());
        }
        if fadeout && self.child.is_some() {
            self.fade_out()?;
        }
        self.kill_child();
        self.record_position();
        self.paused = false;
        Ok(())
    }

    fn quieten(&mut self) -> Result<()> {
        let volume = self.volume * 0.5;
        tracing::debug!("Quietening to {}", volume);
        self.set_volume(volume)
    }

    fn louden(&mut self) -> Result<()> {
        let volume = (self.volume * 2.0).min(1.0);
        tracing::debug!("Increasing volume to {}", volume);
        self.set_volume(volume)
    }

    fn pause(&mut self) -> Result<()> {
        if !self.is_playing() {
            return Ok(());
        }
        self.kill_child();
        self.record_position();
        self.paused = true;
        Ok(())
    }

    fn unpause(&mut self) -> Result<()> {
        if !self.paused {
            return Ok(());
        }
        if let Some(track) = self.current_track.clone() {
            let start = self.position(&track);
            self.spawn(&track, start, self.volume)?;
            self.started = Some(Instant::now());
        }
        self.paused = false;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.started.is_some() && !self.paused
    }
}

impl Drop for PlaylistPlayer {
    fn drop(&mut self) {
        self.kill_child();
    }
}
