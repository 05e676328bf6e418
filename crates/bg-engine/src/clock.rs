//! Global clock and transport state shared by every node.

use bg_expr::GlobalValues;

/// Rate of the classic bytebeat `t` counter.
pub const BYTEBEAT_RATE: f64 = 8000.0;

/// Note phase steps per cycle of the note frequency.
pub const PHASE_STEPS: f64 = 256.0;

/// Host transport state, delivered once per audio block.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransportSnapshot {
    pub playing: bool,
    pub beats_per_second: f64,
    pub free_seconds: f64,
    pub free_samples: f64,
    pub position_seconds: f64,
    pub position_samples: f64,
}

/// Advances [`GlobalValues`] by one sample at a time.
#[derive(Clone, Debug)]
pub struct TransportClock {
    globals: GlobalValues,
    playing: bool,
    /// Seconds per sample.
    delta_seconds: f64,
    /// `t` ticks per sample.
    delta_byte_time: f64,
    /// Note phase steps per sample.
    delta_phase: f64,
}

impl TransportClock {
    pub fn new(sample_rate: f64) -> Self {
        let mut clock = Self {
            globals: GlobalValues::default(),
            playing: false,
            delta_seconds: 0.0,
            delta_byte_time: 0.0,
            delta_phase: 0.0,
        };
        clock.prepare(sample_rate);
        clock
    }

    /// Reset every counter for a new sample rate.
    pub fn prepare(&mut self, sample_rate: f64) {
        let note_frequency = self.globals.note_frequency;
        let beats_per_second = self.globals.beats_per_second;
        self.globals = GlobalValues {
            sample_rate,
            note_frequency,
            beats_per_second,
            ..GlobalValues::default()
        };
        self.delta_seconds = 1.0 / sample_rate;
        self.delta_byte_time = BYTEBEAT_RATE / sample_rate;
        self.delta_phase = note_frequency * PHASE_STEPS / sample_rate;
    }

    /// Restart the note-relative counters at `frequency`.
    pub fn start_note(&mut self, frequency: f64) {
        let g = &mut self.globals;
        g.note_seconds = 0.0;
        g.note_samples = 0.0;
        g.note_phase = 0.0;
        g.byte_time = 0.0;
        g.note_frequency = frequency;
        self.delta_phase = frequency * PHASE_STEPS / g.sample_rate;
    }

    /// Adopt the host's transport position.
    pub fn sync(&mut self, snapshot: &TransportSnapshot) {
        self.playing = snapshot.playing;
        let g = &mut self.globals;
        g.beats_per_second = snapshot.beats_per_second;
        g.free_seconds = snapshot.free_seconds;
        g.free_samples = snapshot.free_samples;
        g.position_seconds = snapshot.position_seconds;
        g.position_samples = snapshot.position_samples;
    }

    /// Step every counter forward by one sample.
    pub fn advance(&mut self) {
        let g = &mut self.globals;
        g.free_seconds += self.delta_seconds;
        g.free_samples += 1.0;

        if self.playing {
            g.position_seconds += self.delta_seconds;
            g.position_samples += 1.0;
        }

        g.note_seconds += self.delta_seconds;
        g.note_samples += 1.0;
        g.note_phase += self.delta_phase;
        g.byte_time += self.delta_byte_time;
    }

    pub fn globals(&self) -> &GlobalValues {
        &self.globals
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}
