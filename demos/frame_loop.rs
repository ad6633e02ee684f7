//! # Example: frame_loop
//!
//! Drives a dispatcher from a tokio frame loop, the way a render loop would.
//!
//! Demonstrates how to:
//! - Build a [`Dispatcher`] with a [`FrameSignal`] scheduler and run a [`FrameLoop`].
//! - Coalesce a burst of `scroll` events into one throttled delivery per frame.
//! - Collapse repeated `trigger_latest` calls into a single delivery.
//! - Answer a request issued before its provider existed.
//! - Observe a panicking handler through the fault bus.
//!
//! ## Flow
//! ```text
//! producer ──► trigger("scroll", n) x5 ──► ordinary handler (5 times)
//!                                    └──► mark "scroll" ──► FrameSignal
//! FrameLoop ──► sleep(frame_period) ──► run_frame() ──► throttled handler (once, n = 5)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=eventvisor=trace cargo run --example frame_loop
//! ```

use std::time::Duration;

use eventvisor::{
    Dispatcher, DispatcherConfig, FrameLoop, FrameSignal, Handler, ProviderError, Provided,
    Subscriber,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Viewport {
    name: &'static str,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "eventvisor=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1. Dispatcher wired to a frame signal
    let cfg = DispatcherConfig::default();
    let period = cfg.frame_period;
    let signal = FrameSignal::new();
    let d: Dispatcher<u32> = Dispatcher::builder(cfg).with_scheduler(signal.clone()).build();

    // 2. Subscribers
    let viewport = Subscriber::new(Viewport { name: "main" });
    d.subscribe(
        "scroll",
        Handler::new(|ev| println!("[ordinary] scroll {:?}", ev.data())),
        None,
    )
    .subscribe_throttled(
        "scroll",
        Handler::new(|ev| {
            let name = ev.context::<Viewport>().map_or("?", |v| v.name);
            println!("[throttled:{name}] scroll {:?}", ev.data());
        }),
        Some(&viewport),
    )
    .subscribe(
        "resize",
        Handler::new(|ev| println!("[ordinary] resize {:?}", ev.data())),
        None,
    )
    .subscribe("crash", Handler::new(|_| panic!("handler bug")), None);

    // 3. Faults
    let mut faults = d.faults();

    // 4. Request before provide
    let answer = d.request_with("layout", Some(2), |v| println!("[request] callback got {v}"));

    // 5. Frame loop
    let token = CancellationToken::new();
    let frame_loop = FrameLoop::new(d.clone(), signal, period);

    let producer = async {
        for n in 1..=5 {
            d.trigger("scroll", Some(n));
        }
        for w in [640, 800, 1024] {
            d.trigger_latest("resize", Some(w));
        }
        d.trigger("crash", None);

        d.provide("layout", |columns| match columns {
            Some(c) => Ok(Provided::deferred(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(c * 100)
            })),
            None => Err(ProviderError::new("column count required")),
        })?;
        let width = answer.await?;
        println!("[request] layout width {width}");

        tokio::time::sleep(period * 4).await;
        token.cancel();
        Ok::<_, Box<dyn std::error::Error>>(())
    };

    let (frames, produced) = tokio::join!(frame_loop.run(token.clone()), producer);
    produced?;

    while let Ok(fault) = faults.try_recv() {
        println!("[fault] {} on {:?}: {}", fault.as_label(), fault.source, fault.info);
    }
    println!("frames run: {frames}");
    Ok(())
}
