//! Multi-touch gesture tracking.
//!
//! [`GestureTracker`] consumes raw touch lists (as a browser `TouchEvent`
//! exposes them: every touch currently on the surface) and turns them into
//! three semantic events delivered to a [`GestureListener`]:
//!
//! - gesture start, when a second simultaneous touch appears
//! - pinch, with a zoom ratio relative to the gesture-start separation
//! - pan, with the incremental single-touch displacement since the last frame
//!
//! The tracker never touches transform state. It only remembers what it needs
//! to compute deltas between consecutive frames, and forgets all of it when
//! the last touch lifts.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// One active touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Stable identifier for the lifetime of the touch.
    pub id: i32,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// What the host should do with the native input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the platform handle the event.
    Default,
    /// Suppress native scrolling and zooming for this event.
    PreventDefault,
}

/// Receiver of semantic gesture events.
pub trait GestureListener {
    /// A second touch appeared. `midpoint` is between the two tracked touches.
    fn on_gesture_start(&mut self, midpoint: Point);

    /// Two-touch separation changed. `zoom_ratio` is relative to the
    /// separation at gesture start.
    fn on_pinch(&mut self, zoom_ratio: f64);

    /// Single touch moved by `(dx, dy)` since the previous frame.
    fn on_pan(&mut self, dx: f64, dy: f64);

    /// The last touch lifted or the sequence was cancelled.
    fn on_gesture_end(&mut self) {}
}

/// Two-touch bookkeeping for the current pinch.
#[derive(Debug, Clone, Copy)]
struct PinchBaseline {
    ids: [i32; 2],
    start_distance: f64,
    last_distance: f64,
}

/// Transient per-session state.
#[derive(Debug, Clone, Default)]
struct GestureState {
    in_session: bool,
    last_single: Option<TouchPoint>,
    pinch: Option<PinchBaseline>,
}

/// Classifies touch input into pan, pinch and gesture-start events.
#[derive(Debug, Default)]
pub struct GestureTracker {
    state: GestureState,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between the first touch-down and the last touch-up.
    pub fn is_active(&self) -> bool {
        self.state.in_session
    }

    /// True while two touches are tracked as a pinch pair.
    pub fn is_pinching(&self) -> bool {
        self.state.pinch.is_some()
    }

    /// Handle a touch-down. `touches` are all touches now on the surface.
    pub fn touch_start(
        &mut self,
        touches: &[TouchPoint],
        listener: &mut dyn GestureListener,
    ) -> Disposition {
        if touches.is_empty() {
            return Disposition::Default;
        }
        self.state.in_session = true;
        self.rebaseline(touches, listener);
        Disposition::Default
    }

    /// Handle a touch-move. `touches` are all touches now on the surface.
    pub fn touch_move(
        &mut self,
        touches: &[TouchPoint],
        listener: &mut dyn GestureListener,
    ) -> Disposition {
        match touches {
            [] => Disposition::Default,
            [single] => {
                self.state.in_session = true;
                if self.state.pinch.take().is_some() {
                    self.state.last_single = Some(*single);
                    return Disposition::PreventDefault;
                }
                match self.state.last_single {
                    Some(last) if last.id == single.id => {
                        let dx = single.position.x - last.position.x;
                        let dy = single.position.y - last.position.y;
                        self.state.last_single = Some(*single);
                        listener.on_pan(dx, dy);
                    }
                    _ => {
                        // First sighting of this touch: baseline only.
                        self.state.last_single = Some(*single);
                    }
                }
                Disposition::PreventDefault
            }
            [..] => {
                self.state.in_session = true;
                let baseline = match self.state.pinch {
                    Some(baseline) => baseline,
                    None => {
                        self.start_pinch(touches, listener);
                        return Disposition::PreventDefault;
                    }
                };
                let Some(distance) = pair_distance(touches, baseline.ids) else {
                    // The tracked pair changed under us; start over with the new pair.
                    self.start_pinch(touches, listener);
                    return Disposition::PreventDefault;
                };

                if distance != baseline.last_distance && baseline.start_distance > 0.0 {
                    listener.on_pinch(distance / baseline.start_distance);
                }
                self.state.pinch = Some(PinchBaseline {
                    last_distance: distance,
                    ..baseline
                });
                Disposition::PreventDefault
            }
        }
    }

    /// Handle a touch-up. `touches` are the touches still on the surface.
    pub fn touch_end(
        &mut self,
        touches: &[TouchPoint],
        listener: &mut dyn GestureListener,
    ) -> Disposition {
        if touches.is_empty() {
            self.end_session(listener);
        } else {
            self.rebaseline(touches, listener);
        }
        Disposition::Default
    }

    /// Handle a platform cancel (e.g. an incoming call). Ends the session.
    pub fn touch_cancel(&mut self, listener: &mut dyn GestureListener) -> Disposition {
        self.end_session(listener);
        Disposition::Default
    }

    /// Drop all state without notifying anyone.
    pub fn reset(&mut self) {
        self.state = GestureState::default();
    }

    fn rebaseline(&mut self, touches: &[TouchPoint], listener: &mut dyn GestureListener) {
        match touches {
            [] => {}
            [single] => {
                self.state.pinch = None;
                self.state.last_single = Some(*single);
            }
            [_, _, ..] => {
                // Browsers may reorder the list; the pair holds while both ids are down.
                let still_tracked = self
                    .state
                    .pinch
                    .is_some_and(|p| pair_distance(touches, p.ids).is_some());
                if !still_tracked {
                    self.start_pinch(touches, listener);
                }
            }
        }
    }

    fn start_pinch(&mut self, touches: &[TouchPoint], listener: &mut dyn GestureListener) {
        let [first, second, ..] = touches else {
            return;
        };
        let ids = [first.id, second.id];
        let distance = Point::distance(first.position, second.position);
        self.state.last_single = None;
        self.state.pinch = Some(PinchBaseline {
            ids,
            start_distance: distance,
            last_distance: distance,
        });
        listener.on_gesture_start(Point::midpoint(first.position, second.position));
    }

    fn end_session(&mut self, listener: &mut dyn GestureListener) {
        let was_active = self.state.in_session;
        self.reset();
        if was_active {
            listener.on_gesture_end();
        }
    }
}

/// Separation of the touches with the given ids, if both are still down.
fn pair_distance(touches: &[TouchPoint], ids: [i32; 2]) -> Option<f64> {
    let a = touches.iter().find(|t| t.id == ids[0])?;
    let b = touches.iter().find(|t| t.id == ids[1])?;
    Some(Point::distance(a.position, b.position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Start(Point),
        Pinch(f64),
        Pan(f64, f64),
        End,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl GestureListener for Recorder {
        fn on_gesture_start(&mut self, midpoint: Point) {
            self.events.push(Event::Start(midpoint));
        }
        fn on_pinch(&mut self, zoom_ratio: f64) {
            self.events.push(Event::Pinch(zoom_ratio));
        }
        fn on_pan(&mut self, dx: f64, dy: f64) {
            self.events.push(Event::Pan(dx, dy));
        }
        fn on_gesture_end(&mut self) {
            self.events.push(Event::End);
        }
    }

    fn t(id: i32, x: f64, y: f64) -> TouchPoint {
        TouchPoint::new(id, x, y)
    }

    #[test]
    fn test_single_touch_pans_incrementally() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 10.0, 10.0)], &mut rec);
        let d = tracker.touch_move(&[t(1, 15.0, 12.0)], &mut rec);
        tracker.touch_move(&[t(1, 18.0, 10.0)], &mut rec);

        assert_eq!(d, Disposition::PreventDefault);
        assert_eq!(rec.events, vec![Event::Pan(5.0, 2.0), Event::Pan(3.0, -2.0)]);
    }

    #[test]
    fn test_second_touch_starts_gesture() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0)], &mut rec);
        tracker.touch_start(&[t(1, 0.0, 0.0), t(2, 100.0, 50.0)], &mut rec);

        assert!(tracker.is_pinching());
        assert_eq!(rec.events, vec![Event::Start(Point::new(50.0, 25.0))]);
    }

    #[test]
    fn test_pinch_ratio_relative_to_start() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0), t(2, 100.0, 0.0)], &mut rec);
        tracker.touch_move(&[t(1, 0.0, 0.0), t(2, 150.0, 0.0)], &mut rec);
        tracker.touch_move(&[t(1, 0.0, 0.0), t(2, 200.0, 0.0)], &mut rec);

        assert_eq!(
            rec.events,
            vec![
                Event::Start(Point::new(50.0, 0.0)),
                Event::Pinch(1.5),
                Event::Pinch(2.0),
            ]
        );
    }

    #[test]
    fn test_reordered_touch_list_keeps_pair() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0), t(2, 100.0, 0.0)], &mut rec);
        // A third finger lands and the list comes back in a different order.
        tracker.touch_start(
            &[t(2, 100.0, 0.0), t(1, 0.0, 0.0), t(3, 50.0, 80.0)],
            &mut rec,
        );
        tracker.touch_move(
            &[t(2, 200.0, 0.0), t(1, 0.0, 0.0), t(3, 50.0, 80.0)],
            &mut rec,
        );

        assert_eq!(
            rec.events,
            vec![Event::Start(Point::new(50.0, 0.0)), Event::Pinch(2.0)]
        );
    }

    #[test]
    fn test_pinch_skipped_when_distance_unchanged() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0), t(2, 100.0, 0.0)], &mut rec);
        // Both fingers translate together: separation is unchanged.
        tracker.touch_move(&[t(1, 10.0, 10.0), t(2, 110.0, 10.0)], &mut rec);

        assert_eq!(rec.events, vec![Event::Start(Point::new(50.0, 0.0))]);
    }

    #[test]
    fn test_two_to_one_rebaselines_pan() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0), t(2, 100.0, 0.0)], &mut rec);
        tracker.touch_move(&[t(1, 0.0, 0.0), t(2, 120.0, 0.0)], &mut rec);
        tracker.touch_end(&[t(2, 120.0, 0.0)], &mut rec);
        rec.events.clear();

        // The remaining finger moves: the delta is measured from where it was
        // when the first finger lifted, not from any two-pointer state.
        tracker.touch_move(&[t(2, 125.0, 3.0)], &mut rec);
        assert_eq!(rec.events, vec![Event::Pan(5.0, 3.0)]);
        assert!(!tracker.is_pinching());
    }

    #[test]
    fn test_two_to_one_without_touch_end_emits_no_stale_pan() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0), t(2, 100.0, 0.0)], &mut rec);
        rec.events.clear();

        // A move arrives with only one touch before any touch-end.
        tracker.touch_move(&[t(1, 40.0, 40.0)], &mut rec);
        assert!(rec.events.is_empty());

        tracker.touch_move(&[t(1, 42.0, 41.0)], &mut rec);
        assert_eq!(rec.events, vec![Event::Pan(2.0, 1.0)]);
    }

    #[test]
    fn test_all_touches_lifted_ends_session() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0)], &mut rec);
        assert!(tracker.is_active());
        tracker.touch_end(&[], &mut rec);

        assert!(!tracker.is_active());
        assert_eq!(rec.events, vec![Event::End]);
    }

    #[test]
    fn test_end_without_session_is_silent() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();
        tracker.touch_end(&[], &mut rec);
        tracker.touch_cancel(&mut rec);
        assert!(rec.events.is_empty());
    }

    #[test]
    fn test_zero_separation_start_suppresses_pinch() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 5.0, 5.0), t(2, 5.0, 5.0)], &mut rec);
        tracker.touch_move(&[t(1, 0.0, 5.0), t(2, 10.0, 5.0)], &mut rec);

        assert_eq!(rec.events, vec![Event::Start(Point::new(5.0, 5.0))]);
    }

    #[test]
    fn test_third_touch_keeps_pair() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0), t(2, 100.0, 0.0)], &mut rec);
        tracker.touch_start(
            &[t(1, 0.0, 0.0), t(2, 100.0, 0.0), t(3, 50.0, 50.0)],
            &mut rec,
        );
        tracker.touch_move(
            &[t(1, 0.0, 0.0), t(2, 50.0, 0.0), t(3, 50.0, 50.0)],
            &mut rec,
        );

        assert_eq!(
            rec.events,
            vec![Event::Start(Point::new(50.0, 0.0)), Event::Pinch(0.5)]
        );
    }

    #[test]
    fn test_new_pair_restarts_gesture() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(
            &[t(1, 0.0, 0.0), t(2, 100.0, 0.0), t(3, 0.0, 100.0)],
            &mut rec,
        );
        // Touch 1 lifts; touches 2 and 3 form the new pair.
        tracker.touch_end(&[t(2, 100.0, 0.0), t(3, 0.0, 100.0)], &mut rec);

        assert_eq!(
            rec.events,
            vec![
                Event::Start(Point::new(50.0, 0.0)),
                Event::Start(Point::new(50.0, 50.0)),
            ]
        );
    }

    #[test]
    fn test_cancel_mid_gesture() {
        let mut tracker = GestureTracker::new();
        let mut rec = Recorder::default();

        tracker.touch_start(&[t(1, 0.0, 0.0), t(2, 10.0, 0.0)], &mut rec);
        tracker.touch_cancel(&mut rec);

        assert!(!tracker.is_active());
        assert!(!tracker.is_pinching());
        assert_eq!(rec.events.last(), Some(&Event::End));
    }
}
