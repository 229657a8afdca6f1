use super::*;

#[test]
fn one_shot_fires_once_when_due() {
    let mut s = FrameScheduler::new();
    let h = s.after(100.0, "leaf");
    assert!(s.advance(Millis(50.0)).is_empty());
    let fired = s.advance(Millis(100.0));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].handle, h);
    assert_eq!(fired[0].task, "leaf");
    assert!(!s.is_live(h));
    assert!(s.advance(Millis(500.0)).is_empty());
}

#[test]
fn every_frame_fires_until_cancelled() {
    let mut s = FrameScheduler::new();
    let h = s.every_frame(1u8);
    assert_eq!(s.advance(Millis(16.0)).len(), 1);
    assert_eq!(s.advance(Millis(32.0)).len(), 1);
    assert!(s.cancel(h));
    assert!(!s.cancel(h));
    assert!(s.advance(Millis(48.0)).is_empty());
}

#[test]
fn delays_are_relative_to_last_advance() {
    let mut s = FrameScheduler::new();
    s.advance(Millis(1000.0));
    s.after(10.0, ());
    assert!(s.advance(Millis(1005.0)).is_empty());
    assert_eq!(s.advance(Millis(1010.0)).len(), 1);
}

#[test]
fn clock_never_moves_backwards() {
    let mut s = FrameScheduler::<()>::new();
    s.advance(Millis(100.0));
    s.advance(Millis(20.0));
    assert_eq!(s.now(), Millis(100.0));
}

#[test]
fn cancel_all_empties_the_queue() {
    let mut s = FrameScheduler::new();
    s.every_frame('a');
    s.after(5.0, 'b');
    s.after(50.0, 'c');
    assert_eq!(s.cancel_all(), 3);
    assert_eq!(s.live_count(), 0);
}

#[test]
fn fired_tasks_keep_scheduling_order() {
    let mut s = FrameScheduler::new();
    s.after(10.0, 1);
    s.every_frame(2);
    s.after(5.0, 3);
    let order: Vec<i32> = s.advance(Millis(10.0)).into_iter().map(|f| f.task).collect();
    assert_eq!(order, vec![1, 2, 3]);
}
