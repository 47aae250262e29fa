//! End-to-end settle and reveal timing, driven through the simulator's
//! virtual clock. Default windows: 500ms debounce, 2000ms grace, 8000ms
//! absolute deadline, confidence threshold of 3 items.

use feedgate_runtime::{
    CategoryKind, FeedSimulator, GateState, LayoutMode, NoContentReason, SettleConfig,
};

#[test]
fn burst_settles_one_debounce_after_the_last_arrival() {
    let mut sim = FeedSimulator::with_defaults();
    let token = sim.start_fetch(CategoryKind::Aggregated);

    // Arrivals at 0ms, 100ms, 300ms.
    sim.arrive_item(token);
    sim.advance_ms(100);
    sim.arrive_item(token);
    sim.advance_ms(200);
    sim.arrive_item(token);

    // The naive 500ms mark passes quietly; the window restarted at 300ms.
    sim.advance_ms(499);
    assert!(sim.presenter().reveals.is_empty());

    sim.advance_ms(1);
    assert_eq!(sim.elapsed_ms(), 800);
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::Standard]);
    assert_eq!(sim.presenter().notification_count(), 1);
}

#[test]
fn single_item_feed_reveals_when_grace_expires() {
    let mut sim = FeedSimulator::with_defaults();
    let token = sim.start_fetch(CategoryKind::Category);
    sim.arrive_item(token);

    // Debounce fires at 500ms below the confidence threshold; grace runs
    // until 2500ms and then forces.
    sim.advance_ms(2499);
    assert!(sim.presenter().reveals.is_empty());
    sim.advance_ms(1);
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::Standard]);
    assert!(sim.stats().settled);
}

#[test]
fn empty_feed_fails_at_the_absolute_deadline() {
    let mut sim = FeedSimulator::with_defaults();
    sim.start_fetch(CategoryKind::Aggregated);

    sim.advance_ms(7999);
    assert_eq!(sim.presenter().notification_count(), 0);

    sim.advance_ms(1);
    assert_eq!(sim.presenter().failures.len(), 1);
    assert!(sim.presenter().reveals.is_empty());
    assert_eq!(sim.stats().gate, GateState::Hidden);

    // Much later, nothing further happens.
    sim.advance_ms(60_000);
    assert_eq!(sim.presenter().notification_count(), 1);
}

#[test]
fn item_just_before_the_deadline_is_revealed_not_failed() {
    let mut sim = FeedSimulator::with_defaults();
    let token = sim.start_fetch(CategoryKind::Category);

    sim.advance_ms(7700);
    sim.arrive_item(token);

    // The debounce would run to 8200ms, but the deadline at 8000ms forces
    // the reveal first.
    sim.advance_ms(300);
    assert_eq!(sim.elapsed_ms(), 8000);
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::Standard]);
    assert!(sim.presenter().failures.is_empty());
}

#[test]
fn small_syndicated_feed_commits_hero_cards() {
    let mut sim = FeedSimulator::with_defaults();
    let token = sim.start_fetch(CategoryKind::Syndicated);
    sim.arrive_items(token, 6, 50);

    sim.advance_ms(500);
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::CompactHero]);
    assert_eq!(sim.stats().committed_mode, Some(LayoutMode::CompactHero));
}

#[test]
fn committed_layout_never_flips_on_late_arrivals() {
    let mut sim = FeedSimulator::with_defaults();
    let token = sim.start_fetch(CategoryKind::Syndicated);

    // 20 items >= the hero ceiling of 15: standard layout.
    sim.arrive_items(token, 20, 10);
    sim.advance_ms(500);
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::Standard]);

    // Items landing after the reveal are counted but never re-open the
    // layout decision or re-notify.
    sim.advance_ms(1000);
    sim.arrive_item(token);
    sim.advance_ms(5000);
    assert_eq!(sim.stats().item_count, 21);
    assert_eq!(sim.stats().committed_mode, Some(LayoutMode::Standard));
    assert_eq!(sim.presenter().notification_count(), 1);
}

#[test]
fn layout_hold_defers_reveal_across_settle() {
    let mut sim = FeedSimulator::with_defaults();
    sim.layout_hold().hold();

    let token = sim.start_fetch(CategoryKind::Aggregated);
    sim.arrive_items(token, 4, 20);
    sim.advance_ms(600);

    assert!(sim.stats().settled);
    assert_eq!(sim.stats().gate, GateState::Hidden);
    assert!(sim.presenter().reveals.is_empty());

    sim.release_layout_hold();
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::Standard]);
}

#[test]
fn layout_hold_is_sticky_across_fetch_cycles() {
    let mut sim = FeedSimulator::with_defaults();
    sim.layout_hold().hold();

    let first = sim.start_fetch(CategoryKind::Category);
    sim.arrive_items(first, 3, 10);
    sim.advance_ms(600);
    assert!(sim.presenter().reveals.is_empty());

    // A second fetch does not clear the externally owned flag.
    let second = sim.start_fetch(CategoryKind::Category);
    sim.arrive_items(second, 3, 10);
    sim.advance_ms(600);
    assert!(sim.presenter().reveals.is_empty());

    sim.release_layout_hold();
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::Standard]);
    assert_eq!(sim.presenter().notification_count(), 1);
}

#[test]
fn new_fetch_supersedes_the_previous_cycle() {
    let mut sim = FeedSimulator::with_defaults();
    let old = sim.start_fetch(CategoryKind::Category);
    sim.arrive_items(old, 2, 50);

    sim.advance_ms(100);
    let new = sim.start_fetch(CategoryKind::Syndicated);

    // Stale completions from the superseded fetch are dropped.
    sim.arrive_item(old);
    sim.finish_image(old, true);
    assert_eq!(sim.stats().item_count, 0);
    assert!(!sim.stats().hero_image_loaded);

    sim.arrive_items(new, 2, 10);
    sim.advance_ms(2600);
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::CompactHero]);
    assert_eq!(sim.presenter().notification_count(), 1);
}

#[test]
fn image_straggler_after_text_reveal_is_harmless() {
    let mut sim = FeedSimulator::with_defaults();
    let token = sim.start_fetch(CategoryKind::Category);
    sim.arrive_items(token, 3, 10);
    sim.start_image(token);

    sim.advance_ms(520);
    assert_eq!(sim.presenter().reveals.len(), 1, "text settle reveals");

    sim.advance_ms(3000);
    sim.finish_image(token, true);
    assert_eq!(sim.presenter().notification_count(), 1);
    assert!(sim.stats().hero_image_loaded);
}

#[test]
fn images_draining_reveal_without_waiting_for_debounce() {
    let mut sim = FeedSimulator::with_defaults();
    let token = sim.start_fetch(CategoryKind::Category);
    sim.arrive_item(token);
    sim.start_image(token);

    sim.advance_ms(150);
    sim.finish_image(token, false);

    assert_eq!(sim.elapsed_ms(), 150);
    assert_eq!(sim.presenter().reveals, vec![LayoutMode::Standard]);
}

#[test]
fn tightened_windows_are_respected() {
    let cfg = SettleConfig::default()
        .with_debounce(std::time::Duration::from_millis(100))
        .with_grace(std::time::Duration::from_millis(300))
        .with_absolute_deadline(std::time::Duration::from_millis(1000))
        .with_logging(true);
    let mut sim = FeedSimulator::new(cfg);
    let token = sim.start_fetch(CategoryKind::Category);
    sim.arrive_item(token);

    // Debounce at 100ms (below threshold), grace to 400ms.
    sim.advance_ms(399);
    assert!(sim.presenter().reveals.is_empty());
    sim.advance_ms(1);
    assert_eq!(sim.presenter().reveals.len(), 1);
}

#[test]
fn no_content_reason_strings_round_trip_to_logs() {
    assert_eq!(NoContentReason::EmptyFeed.as_str(), "empty_feed");
    assert_eq!(NoContentReason::NetworkStall.as_str(), "network_stall");
}

#[test]
fn decision_log_jsonl_export_covers_the_whole_cycle() {
    let mut sim = FeedSimulator::with_defaults();
    let token = sim.start_fetch(CategoryKind::Category);
    sim.arrive_items(token, 3, 10);
    sim.advance_ms(600);

    let jsonl = sim.decisions().to_jsonl();
    assert!(jsonl.contains(r#""action":"arm_deadline""#));
    assert!(jsonl.contains(r#""action":"settle""#));
    assert!(jsonl.contains(r#""action":"reveal""#));
    assert!(jsonl.lines().last().unwrap().contains(r#""event":"summary""#));

    let summary = sim.decisions().summary();
    assert_eq!(summary.settle_count, 1);
    assert_eq!(summary.reveal_count, 1);
    assert_ne!(summary.checksum, 0);
}
