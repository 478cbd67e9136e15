//! Sample-accurate parameter automation.

/*
Scheduled Parameters
====================

A parameter holds a small timeline of events in context time (seconds).
The value at any instant is found by looking at the last event at or before
that instant and, if the next event is a ramp, interpolating toward it.

Event kinds
-----------

  set          jump to `value` at `time`
  exponential  ramp geometrically from the previous event to `value` at
               `time`. Both endpoints must be positive; otherwise the
               value holds until the ramp's end.

A ramp always starts at the previous event (or the default value at t=0
when there is none):

    value
    0.09 ┤          ╭╮
         │          │ ╲
         │          │  ╲__
    0.0  ┼──────────╯     ‾‾‾────────  → time
                    t   t+0.01     t+1.2
                   set  exp ramp   exp ramp

Pruning
-------

Rendering walks the timeline once per sample, so events wholly in the past
are dropped with `prune`. The last past event is kept because any ramp in
progress starts from it.
*/

#[derive(Debug, Clone, Copy, PartialEq)]
enum Curve {
    Set,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ParamEvent {
    time: f64,
    value: f32,
    curve: Curve,
}

/// Automatable parameter with a default and a sorted event timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioParam {
    default: f32,
    events: Vec<ParamEvent>,
}

impl AudioParam {
    pub fn new(default: f32) -> Self {
        Self {
            default,
            events: Vec::new(),
        }
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(ParamEvent {
            time,
            value,
            curve: Curve::Set,
        });
    }

    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(ParamEvent {
            time,
            value,
            curve: Curve::Exponential,
        });
    }

    fn insert(&mut self, event: ParamEvent) {
        // Same-time events keep insertion order.
        let at = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(at, event);
    }

    pub fn value_at(&self, time: f64) -> f32 {
        let mut from_time = 0.0;
        let mut from_value = self.default;

        for event in &self.events {
            if event.time <= time {
                from_time = event.time;
                from_value = event.value;
                continue;
            }
            let span = event.time - from_time;
            let progress = if span > 0.0 {
                ((time - from_time) / span).clamp(0.0, 1.0) as f32
            } else {
                1.0
            };
            return match event.curve {
                Curve::Set => from_value,
                Curve::Exponential if from_value > 0.0 && event.value > 0.0 => {
                    from_value * (event.value / from_value).powf(progress)
                }
                Curve::Exponential => from_value,
            };
        }
        from_value
    }

    /// Fill `out` with values starting at `start` seconds.
    pub fn render(&self, out: &mut [f32], start: f64, sample_rate: f32) {
        if self.events.is_empty() {
            out.fill(self.default);
            return;
        }
        let dt = 1.0 / sample_rate as f64;
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.value_at(start + i as f64 * dt);
        }
    }

    /// Forget events that can no longer affect values at or after `time`.
    pub fn prune(&mut self, time: f64) {
        let past = self.events.partition_point(|e| e.time <= time);
        if past > 1 {
            self.events.drain(..past - 1);
        }
        if self.events.len() == 1 && self.events[0].time <= time {
            self.default = self.events[0].value;
            self.events.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_without_events() {
        let p = AudioParam::new(1.0);
        assert_eq!(p.value_at(0.0), 1.0);
        assert_eq!(p.value_at(10.0), 1.0);
    }

    #[test]
    fn set_value_jumps_at_time() {
        let mut p = AudioParam::new(0.0);
        p.set_value_at_time(0.5, 1.0);
        assert_eq!(p.value_at(0.999), 0.0);
        assert_eq!(p.value_at(1.0), 0.5);
        assert_eq!(p.value_at(3.0), 0.5);
    }

    #[test]
    fn exponential_ramp_is_geometric() {
        let mut p = AudioParam::new(0.0);
        p.set_value_at_time(0.01, 0.0);
        p.exponential_ramp_to_value_at_time(1.0, 1.0);
        // halfway in time = geometric mean of the endpoints
        assert!((p.value_at(0.5) - 0.1).abs() < 1e-4);
    }

    #[test]
    fn exponential_ramp_from_zero_holds() {
        let mut p = AudioParam::new(0.0);
        p.exponential_ramp_to_value_at_time(1.0, 1.0);
        assert_eq!(p.value_at(0.5), 0.0);
        assert_eq!(p.value_at(1.0), 1.0);
    }

    #[test]
    fn prune_keeps_ramp_start() {
        let mut p = AudioParam::new(0.0);
        p.set_value_at_time(0.2, 0.0);
        p.set_value_at_time(0.01, 1.0);
        p.exponential_ramp_to_value_at_time(1.0, 2.0);
        let before = p.value_at(1.5);
        p.prune(1.5);
        assert_eq!(p.value_at(1.5), before);

        p.prune(5.0);
        assert!(p.events.is_empty());
        assert_eq!(p.value_at(6.0), 1.0);
    }

    #[test]
    fn render_fills_block() {
        let mut p = AudioParam::new(0.0);
        p.set_value_at_time(1.0, 0.002);
        let mut out = [9.0; 4];
        p.render(&mut out, 0.0, 1000.0);
        assert_eq!(out, [0.0, 0.0, 1.0, 1.0]);
    }
}
