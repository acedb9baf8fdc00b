use crate::services::playback::AudioHandle;
use anyhow::{anyhow, Result};
use log::warn;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{HtmlAudioElement, HtmlMediaElement};

// Inherent media methods are called through `HtmlMediaElement::` so they are
// not shadowed by the trait methods of the same name.
impl AudioHandle for HtmlAudioElement {
    fn source(&self) -> String {
        HtmlMediaElement::src(self)
    }

    fn load(&self, url: &str) {
        HtmlMediaElement::set_src(self, url);
        HtmlMediaElement::load(self);
    }

    /// The returned promise rejects when autoplay is blocked; that is only
    /// logged.
    fn play(&self) -> Result<()> {
        let promise = HtmlMediaElement::play(self).map_err(|e| anyhow!("play() failed: {:?}", e))?;
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                warn!("Playback was not started: {:?}", e);
            }
        });
        Ok(())
    }

    fn pause(&self) {
        if let Err(e) = HtmlMediaElement::pause(self) {
            warn!("pause() failed: {:?}", e);
        }
    }

    fn is_paused(&self) -> bool {
        HtmlMediaElement::paused(self)
    }

    fn current_time(&self) -> f64 {
        HtmlMediaElement::current_time(self)
    }

    fn seek(&self, seconds: f64) {
        HtmlMediaElement::set_current_time(self, seconds);
    }

    fn duration(&self) -> f64 {
        HtmlMediaElement::duration(self)
    }

    fn set_playback_rate(&self, rate: f64) {
        HtmlMediaElement::set_playback_rate(self, rate);
    }
}
