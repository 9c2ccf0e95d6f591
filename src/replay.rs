//! Feeding recorded pointer motion traces through a [`Counter`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use calloop::EventLoop;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::counter::Counter;
use crate::error::Error;
use crate::parameters::Parameters;
use crate::pointing_motion::PointingMotion;
use crate::scheduler::{LoopScheduler, ManualScheduler, Scheduler};

/// How long a replay keeps running after the last record, so that momentum can play out.
pub const SETTLE_TIME: Duration = Duration::from_secs(1);

/// One pointer motion sample of a recorded trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionRecord {
    /// Nanoseconds since the start of the trace.
    pub time_stamp: u64,
    pub pointing_motion: PointingMotion,
}

impl MotionRecord {
    pub fn new(time: Duration, pointing_motion: PointingMotion) -> Self {
        Self {
            time_stamp: u64::try_from(time.as_nanos()).unwrap_or(u64::MAX),
            pointing_motion,
        }
    }

    pub fn time(&self) -> Duration {
        Duration::from_nanos(self.time_stamp)
    }
}

/// Input trace and the scroll events it is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fixture {
    pub input: PathBuf,
    pub expected: PathBuf,
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("error reading {path:?}"))?;
    serde_json::from_str(&contents).with_context(|| format!("error parsing {path:?}"))
}

pub fn load_records(path: &Path) -> anyhow::Result<Vec<MotionRecord>> {
    load_json(path)
}

pub fn load_motions(path: &Path) -> anyhow::Result<Vec<PointingMotion>> {
    load_json(path)
}

/// Loads a fixture index, resolving the listed files relative to the index.
pub fn load_fixtures(path: &Path) -> anyhow::Result<Vec<Fixture>> {
    let fixtures: Vec<Fixture> = load_json(path)?;
    let dir = path.parent().unwrap_or(Path::new(""));

    Ok(fixtures
        .into_iter()
        .map(|fixture| Fixture {
            input: dir.join(fixture.input),
            expected: dir.join(fixture.expected),
        })
        .collect())
}

/// Runs `records` through a fresh counter on a virtual clock and returns the scroll events.
///
/// The clock is moved to every record's timestamp before feeding it, so momentum ticks happen
/// between records exactly as they would live. A record older than its predecessor is fed
/// without moving the clock. The output is fully deterministic.
pub fn replay(
    records: &[MotionRecord],
    parameters: Parameters,
) -> Result<Vec<PointingMotion>, Error> {
    let _span = tracy_client::span!("replay");

    let scheduler = ManualScheduler::new();
    let counter = Counter::new(Rc::new(scheduler.clone()), parameters);

    let events = Rc::new(RefCell::new(Vec::new()));
    let events_ = events.clone();
    counter.connect(move |event| events_.borrow_mut().push(event));

    for record in records {
        scheduler.advance_to(record.time());
        counter.update(record.pointing_motion, record.time())?;
    }
    scheduler.advance_by(SETTLE_TIME);
    counter.teardown();

    debug!(
        "replayed {} records into {} scroll events",
        records.len(),
        events.borrow().len()
    );

    Ok(events.take())
}

/// Plays `records` on the wall clock, calling `on_event` with every scroll event and the time
/// it was produced at.
///
/// Blocks until the trace and its momentum are over.
pub fn play(
    records: &[MotionRecord],
    parameters: Parameters,
    mut on_event: impl FnMut(PointingMotion, Duration) + 'static,
) -> anyhow::Result<()> {
    let mut event_loop = EventLoop::<()>::try_new().context("error creating event loop")?;
    let scheduler = Rc::new(LoopScheduler::new(event_loop.handle()));
    let counter = Rc::new(Counter::new(scheduler.clone(), parameters));

    let scheduler_ = scheduler.clone();
    counter.connect(move |event| on_event(event, scheduler_.now()));

    // Records are fed in order even when their timestamps are not.
    let mut at = Duration::ZERO;
    for &record in records {
        at = at.max(record.time());
        let counter = counter.clone();
        scheduler.schedule_at(
            at,
            Box::new(move |_| {
                if let Err(err) = counter.update(record.pointing_motion, record.time()) {
                    warn!("error feeding {record:?}: {err}");
                }
            }),
        );
    }

    let signal = event_loop.get_signal();
    scheduler.schedule_at(at + SETTLE_TIME, Box::new(move |_| signal.stop()));

    debug!("playing {} records", records.len());
    event_loop
        .run(None, &mut (), |_| ())
        .context("error running event loop")?;

    counter.teardown();
    Ok(())
}
