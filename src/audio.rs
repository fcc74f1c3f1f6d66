//! Ambient soundtrack playback
//!
//! Audio is fire-and-forget: the simulation asks for music through
//! `GameEvent::AmbientMusic` and the host starts the loop here. The only
//! thing ever read back is whether the track is already playing.

/// A looping background track
pub trait Soundtrack {
    fn is_playing(&self) -> bool;
    /// Start looping at the given volume (0.0 - 1.0)
    fn start_loop(&mut self, volume: f32);
}

/// Start the loop unless it is already running. Returns true if it was started.
pub fn ensure_playing(track: &mut dyn Soundtrack, volume: f32) -> bool {
    if track.is_playing() {
        return false;
    }
    track.start_loop(volume.clamp(0.0, 1.0));
    true
}

/// Soundtrack for hosts without audio output; remembers that it was started
#[derive(Debug, Default)]
pub struct SilentSoundtrack {
    playing: bool,
    starts: u32,
}

impl SilentSoundtrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the loop was (re)started
    pub fn starts(&self) -> u32 {
        self.starts
    }
}

impl Soundtrack for SilentSoundtrack {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn start_loop(&mut self, volume: f32) {
        self.playing = true;
        self.starts += 1;
        log::info!("Soundtrack started (silent, volume {:.1})", volume);
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebSoundtrack;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::HtmlAudioElement;

    use super::Soundtrack;

    /// Soundtrack backed by an `<audio>` element
    pub struct WebSoundtrack {
        element: Option<HtmlAudioElement>,
    }

    impl WebSoundtrack {
        pub fn new(src: &str) -> Self {
            let element = HtmlAudioElement::new_with_src(src).ok();
            if element.is_none() {
                log::warn!("Failed to create audio element - soundtrack disabled");
            }
            Self { element }
        }
    }

    impl Soundtrack for WebSoundtrack {
        fn is_playing(&self) -> bool {
            self.element.as_ref().is_some_and(|e| !e.paused())
        }

        fn start_loop(&mut self, volume: f32) {
            let Some(element) = &self.element else { return };
            element.set_loop(true);
            element.set_volume(volume as f64);
            // A rejected play() leaves the element paused, so `is_playing` stays false
            match element.play() {
                Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                    if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                        log::warn!("Soundtrack playback was blocked: {:?}", e);
                    }
                }),
                Err(e) => log::warn!("Soundtrack playback failed: {:?}", e),
            }
        }
    }
}
