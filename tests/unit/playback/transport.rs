use super::*;

#[test]
fn stepped_clock_is_shared_between_clones() {
    let a = SteppedClock::new();
    let b = a.clone();
    a.advance(0.5);
    b.advance(0.25);
    assert_eq!(a.now_secs(), 0.75);
    assert_eq!(b.now_secs(), 0.75);
}

#[test]
fn stepped_clock_ignores_backwards_steps() {
    let c = SteppedClock::new();
    c.advance(1.0);
    c.advance(-5.0);
    c.advance(f64::NAN);
    assert_eq!(c.now_secs(), 1.0);
}

#[test]
fn wall_clock_is_monotonic() {
    let c = WallClock::new();
    let a = c.now_secs();
    let b = c.now_secs();
    assert!(b >= a);
}
