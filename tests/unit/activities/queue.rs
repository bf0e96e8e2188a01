use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::animation::element::ElementRef;
use crate::events::EventRef;
use crate::timing::ManualClock;

#[derive(Debug)]
struct Stepper {
    id: ActivityId,
    steps_left: u32,
    lag: f64,
    log: Rc<RefCell<Vec<String>>>,
}

impl Stepper {
    fn boxed(steps: u32, lag: f64, log: &Rc<RefCell<Vec<String>>>) -> Box<dyn Activity> {
        Box::new(Self {
            id: ActivityId::next(),
            steps_left: steps,
            lag,
            log: log.clone(),
        })
    }
}

impl Activity for Stepper {
    fn id(&self) -> ActivityId {
        self.id
    }
    fn activate(&mut self, _end_event: EventRef) {}
    fn perform(&mut self, _events: &mut TimerEventQueue) -> bool {
        self.log.borrow_mut().push(format!("perform {}", self.id));
        self.steps_left = self.steps_left.saturating_sub(1);
        self.steps_left > 0
    }
    fn calc_time_lag(&mut self) -> f64 {
        self.lag
    }
    fn is_active(&self) -> bool {
        self.steps_left > 0
    }
    fn dequeued(&mut self) {
        self.log.borrow_mut().push(format!("dequeued {}", self.id));
    }
    fn end(&mut self, _events: &mut TimerEventQueue) {
        self.steps_left = 0;
        self.log.borrow_mut().push(format!("end {}", self.id));
    }
    fn dispose(&mut self) {}
    fn set_targets(&mut self, _target: ElementRef) {}
}

fn setup() -> (ManualClock, TimerEventQueue, ActivityQueue) {
    let clock = ManualClock::new();
    let timer = ElapsedTime::new(Rc::new(clock.clone()));
    (
        clock,
        TimerEventQueue::new(timer.clone()),
        ActivityQueue::new(timer),
    )
}

#[test]
fn reinserts_until_activity_is_done() {
    let (_clock, mut events, mut queue) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let id = queue.insert(Stepper::boxed(2, 0.0, &log));
    assert!(queue.is_empty());
    assert!(queue.add_activity(id));

    queue.process(&mut events);
    assert!(!queue.is_empty());
    queue.process(&mut events);
    assert!(queue.is_empty());
    queue.process_dequeued();

    assert_eq!(
        *log.borrow(),
        vec![
            format!("perform {id}"),
            format!("perform {id}"),
            format!("dequeued {id}")
        ]
    );
    assert_eq!(queue.len(), 1);
}

#[test]
fn unknown_ids_are_not_scheduled() {
    let (_clock, _events, mut queue) = setup();
    assert!(!queue.add_activity(ActivityId::next()));
    assert!(queue.is_empty());
}

#[test]
fn maximal_lag_moves_the_timer_back() {
    let (clock, mut events, mut queue) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = queue.insert(Stepper::boxed(1, 0.25, &log));
    let b = queue.insert(Stepper::boxed(1, 0.5, &log));
    queue.add_activity(a);
    queue.add_activity(b);

    clock.set(2.0);
    queue.process(&mut events);
    assert!((queue.timer().elapsed() - 1.5).abs() < 1e-12);
}

#[test]
fn end_all_ends_scheduled_activities() {
    let (_clock, mut events, mut queue) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = queue.insert(Stepper::boxed(5, 0.0, &log));
    let b = queue.insert(Stepper::boxed(5, 0.0, &log));
    queue.add_activity(a);
    queue.add_activity(b);
    queue.process(&mut events);

    queue.end_all(&mut events);
    assert!(queue.is_empty());
    assert!(log.borrow().contains(&format!("end {a}")));
    assert!(log.borrow().contains(&format!("end {b}")));
}

#[test]
fn remove_unschedules() {
    let (_clock, _events, mut queue) = setup();
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = queue.insert(Stepper::boxed(5, 0.0, &log));
    queue.add_activity(a);
    assert!(queue.remove(a).is_some());
    assert!(queue.is_empty());
    assert!(queue.get(a).is_none());
}
