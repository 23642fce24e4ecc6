// The app advances every animation from per-frame deltas rather than an
// absolute clock. These checks pin down the arithmetic that makes a
// fixed-step frame loop cover a cycle exactly.

#[test]
fn sixty_hz_frames_cover_a_five_second_cycle() {
    let dt = 1.0f32 / 60.0;
    let mut elapsed = 0.0f32;
    let mut frames = 0;
    while elapsed < 5.0 {
        elapsed += dt;
        frames += 1;
    }
    assert_eq!(frames, 300);
}

#[test]
fn staggered_delays_preserve_row_order() {
    let enter_stagger = 0.1f32;
    let delays: Vec<f32> = (0..10).map(|i| i as f32 * enter_stagger).collect();
    for pair in delays.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    assert_eq!(delays[9], 0.9);
}
