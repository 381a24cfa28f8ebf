use super::*;

#[test]
fn break_stops_the_loop() {
    let lp = FrameLoop::unpaced();
    let (ticks, out) = lp.run(|i| {
        if i == 4 {
            ControlFlow::Break("done")
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(ticks, 5);
    assert_eq!(out, Some("done"));
}

#[test]
fn cancel_from_another_thread() {
    let lp = FrameLoop::new(1000.0);
    let handle = lp.handle();
    let t = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        handle.cancel();
    });
    let (ticks, out) = lp.run(|_| ControlFlow::<()>::Continue(()));
    t.join().unwrap();
    assert!(ticks > 0);
    assert_eq!(out, None);
}

#[test]
fn cancelled_before_start_runs_nothing() {
    let lp = FrameLoop::new(60.0);
    lp.handle().cancel();
    let (ticks, _) = lp.run(|_| ControlFlow::<()>::Continue(()));
    assert_eq!(ticks, 0);
}

#[test]
fn paced_loop_respects_interval() {
    let lp = FrameLoop::new(100.0);
    let start = Instant::now();
    lp.run(|i| if i == 4 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) });
    assert!(start.elapsed() >= Duration::from_millis(35));
}
