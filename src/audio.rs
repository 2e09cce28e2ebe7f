//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no sample files needed. The
//! simulation only reports events; everything audible is decided here.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Casualty spike over a city, voice 1 (lowest)
    Scream1,
    /// Casualty spike, voice 2
    Scream2,
    /// Casualty spike, voice 3 (highest)
    Scream3,
    /// A new run spins up
    Surge,
    /// The storm died; run over
    GameOver,
}

impl SoundEffect {
    /// Map a scream variant (1-3) from the simulation to a voice
    pub fn scream(variant: u8) -> Self {
        match variant {
            1 => SoundEffect::Scream1,
            2 => SoundEffect::Scream2,
            _ => SoundEffect::Scream3,
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Scream1 => self.play_scream(ctx, vol, 520.0),
            SoundEffect::Scream2 => self.play_scream(ctx, vol, 660.0),
            SoundEffect::Scream3 => self.play_scream(ctx, vol, 820.0),
            SoundEffect::Surge => self.play_surge(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Scream - a wailing sawtooth that pitches down with a wobble
    fn play_scream(&self, ctx: &AudioContext, vol: f32, base: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, base, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency().set_value_at_time(base, t).ok();
        osc.frequency().set_value_at_time(base * 1.25, t + 0.08).ok();
        osc.frequency().set_value_at_time(base * 0.9, t + 0.16).ok();
        osc.frequency().set_value_at_time(base * 1.1, t + 0.24).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(base * 0.4, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.55).ok();
    }

    /// Run start - rising wind surge
    fn play_surge(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 70.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.01, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(vol * 0.4, t + 0.25)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.6)
            .ok();
        osc.frequency().set_value_at_time(70.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(240.0, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.65).ok();
    }

    /// Game over - a long falling drone with a bass floor
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 1.2)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(55.0, t + 1.1)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 1.3).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 55.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.8)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.9).ok();
        }
    }
}
