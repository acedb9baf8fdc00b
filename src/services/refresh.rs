use log::debug;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub type TickFn = std::sync::Arc<dyn Fn() + Send + Sync>;
#[cfg(target_arch = "wasm32")]
pub type TickFn = std::rc::Rc<dyn Fn()>;

/// A running periodic timer. Dropping it stops the timer.
pub struct Ticker {
    #[cfg(not(target_arch = "wasm32"))]
    task: tokio::task::JoinHandle<()>,
    #[cfg(target_arch = "wasm32")]
    interval_id: i32,
    #[cfg(target_arch = "wasm32")]
    _callback: wasm_bindgen::closure::Closure<dyn FnMut()>,
}

impl Ticker {
    /// First tick fires one `period` after start, like `setInterval`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn start(period: Duration, tick: TickFn) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick();
            }
        });
        Self { task }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn start(period: Duration, tick: TickFn) -> Self {
        use wasm_bindgen::JsCast;

        let callback = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || tick());
        let interval_id = web_sys::window()
            .and_then(|w| {
                w.set_interval_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    crate::utils::time::timeout_millis(period),
                )
                .ok()
            })
            .unwrap_or(-1);
        Self {
            interval_id,
            _callback: callback,
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.task.abort();
        }
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(self.interval_id);
            }
        }
    }
}

/// Periodic refetch that can be switched off and on without losing its
/// callback. The timer dies with this value.
pub struct AutoRefresh {
    period: Duration,
    tick: TickFn,
    ticker: Option<Ticker>,
}

impl AutoRefresh {
    /// Created disabled; call `set_enabled(true)` to start ticking.
    pub fn new(period: Duration, tick: TickFn) -> Self {
        Self {
            period,
            tick,
            ticker: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match (enabled, self.ticker.is_some()) {
            (true, false) => {
                debug!("Auto-refresh on, every {:?}", self.period);
                self.ticker = Some(Ticker::start(self.period, self.tick.clone()));
            }
            (false, true) => {
                debug!("Auto-refresh off");
                self.ticker = None;
            }
            _ => {}
        }
    }

    pub fn toggle(&mut self) -> bool {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled);
        enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, TickFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let tick: TickFn = Arc::new(move || {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (count, tick)
    }

    async fn advance(duration: Duration) {
        tokio::time::sleep(duration).await;
        // let the ticker task observe the new time
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_period() {
        let (count, tick) = counter();
        let mut refresh = AutoRefresh::new(Duration::from_secs(5), tick);
        refresh.set_enabled(true);

        advance(Duration::from_millis(4_900)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        advance(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        advance(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_stops_ticks() {
        let (count, tick) = counter();
        let mut refresh = AutoRefresh::new(Duration::from_secs(5), tick);
        refresh.set_enabled(true);
        advance(Duration::from_millis(5_100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(!refresh.toggle());
        advance(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(refresh.toggle());
        advance(Duration::from_millis(5_100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_clears_timer() {
        let (count, tick) = counter();
        let mut refresh = AutoRefresh::new(Duration::from_secs(5), tick);
        refresh.set_enabled(true);
        drop(refresh);
        advance(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_twice_keeps_one_timer() {
        let (count, tick) = counter();
        let mut refresh = AutoRefresh::new(Duration::from_secs(5), tick);
        refresh.set_enabled(true);
        refresh.set_enabled(true);
        advance(Duration::from_millis(5_100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
