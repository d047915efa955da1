//! Engine front end tests: background searches, completion callbacks,
//! cancellation and request rejection.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bitboard_chess::board::{GameStatus, SearchIterationInfo, SearchResult, START_FEN};
use bitboard_chess::engine::EngineStatus;
use bitboard_chess::{Engine, EngineConfig, EngineError, Move};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const TIMEOUT: Duration = Duration::from_secs(60);

fn engine() -> Engine {
    Engine::new(EngineConfig {
        tt_mb: 1,
        ..EngineConfig::default()
    })
    .expect("engine starts")
}

/// Start a search whose result is forwarded to the returned receiver.
fn search_into_channel(
    engine: &mut Engine,
    depth: u32,
    millis: Option<u64>,
) -> mpsc::Receiver<SearchResult> {
    let (tx, rx) = mpsc::channel();
    let on_complete = move |result: SearchResult| {
        let _ = tx.send(result);
    };
    let started = match millis {
        Some(ms) => engine.start_timed_search(depth, ms, on_complete),
        None => engine.start_search(depth, on_complete),
    };
    started.expect("search starts");
    rx
}

#[test]
fn search_completes_and_reports_best_move() {
    let mut engine = engine();
    let rx = search_into_channel(&mut engine, 3, None);

    let result = rx.recv_timeout(TIMEOUT).expect("callback runs");
    assert!(engine.position().is_legal(result.best_move));
    assert_eq!(result.depth, 3);
    assert!(!result.stopped);

    engine.wait();
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert_eq!(engine.best_move(), result.best_move);
    assert_eq!(engine.last_result(), Some(result));
}

#[test]
fn search_does_not_touch_game_position() {
    let mut engine = engine();
    engine.make_user_move("e2e4").unwrap();
    let fen = engine.position().to_fen();

    let rx = search_into_channel(&mut engine, 3, None);
    let result = rx.recv_timeout(TIMEOUT).expect("callback runs");
    engine.wait();

    assert_eq!(engine.position().to_fen(), fen);
    assert!(engine.position().is_legal(result.best_move));
}

#[test]
fn requests_during_search_are_rejected() {
    let mut engine = engine();
    engine.load_position(KIWIPETE).unwrap();
    let rx = search_into_channel(&mut engine, 64, None);
    assert!(engine.is_searching());

    let second = engine.start_search(2, |_| panic!("second search must not run"));
    assert!(matches!(second, Err(EngineError::SearchInProgress)));
    assert!(matches!(
        engine.start_timed_search(2, 10, |_| {}),
        Err(EngineError::SearchInProgress)
    ));
    assert!(matches!(
        engine.load_position(START_FEN),
        Err(EngineError::SearchInProgress)
    ));
    assert!(matches!(
        engine.make_user_move("e1g1"),
        Err(EngineError::SearchInProgress)
    ));
    assert_eq!(engine.position().to_fen(), KIWIPETE);

    engine.cancel_and_wait();
    assert_eq!(engine.status(), EngineStatus::Idle);

    let result = rx.recv_timeout(TIMEOUT).expect("callback runs");
    assert!(result.stopped);
    assert!(engine.position().is_legal(result.best_move));

    // Idle again: requests are accepted.
    engine.make_user_move("e1g1").unwrap();
}

#[test]
fn cancel_search_returns_immediately() {
    let mut engine = engine();
    engine.load_position(KIWIPETE).unwrap();
    let rx = search_into_channel(&mut engine, 64, None);

    std::thread::sleep(Duration::from_millis(100));
    engine.cancel_search();

    let result = rx.recv_timeout(TIMEOUT).expect("callback runs");
    assert!(result.stopped);
    assert!(engine.position().is_legal(result.best_move));
    engine.wait();
    assert!(!engine.is_searching());
}

#[test]
fn cancel_when_idle_is_a_no_op() {
    let engine = engine();
    engine.cancel_search();
    engine.cancel_and_wait();
    engine.wait();
    assert_eq!(engine.status(), EngineStatus::Idle);
    assert_eq!(engine.best_move(), Move::NULL);
}

#[test]
fn timed_search_stops_on_its_own() {
    let mut engine = engine();
    let start = Instant::now();
    let rx = search_into_channel(&mut engine, 64, Some(100));

    let result = rx.recv_timeout(TIMEOUT).expect("callback runs");
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(result.stopped);
    assert!(engine.position().is_legal(result.best_move));
}

#[test]
fn zero_budget_reports_fallback_move() {
    let mut engine = engine();
    let rx = search_into_channel(&mut engine, 64, Some(0));

    let result = rx.recv_timeout(TIMEOUT).expect("callback runs");
    assert!(result.stopped);
    assert_eq!(result.depth, 0);
    assert!(engine.position().is_legal(result.best_move));
}

#[test]
fn finished_game_reports_null_move() {
    let mut engine = engine();
    for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
        engine.make_user_move(m).unwrap();
    }
    assert_eq!(engine.game_status(), GameStatus::Checkmate);

    let rx = search_into_channel(&mut engine, 4, None);
    let result = rx.recv_timeout(TIMEOUT).expect("callback runs");
    assert_eq!(result.best_move, Move::NULL);
    engine.wait();
    assert_eq!(engine.best_move(), Move::NULL);
}

#[test]
fn bad_input_leaves_position_unchanged() {
    let mut engine = engine();
    engine.make_user_move("d2d4").unwrap();
    let fen = engine.position().to_fen();

    assert!(matches!(
        engine.load_position("not a position"),
        Err(EngineError::Fen(_))
    ));
    assert!(matches!(
        engine.make_user_move("e2e5"),
        Err(EngineError::Move(_))
    ));
    assert!(matches!(
        engine.make_user_move("zz"),
        Err(EngineError::Move(_))
    ));
    assert_eq!(engine.position().to_fen(), fen);
}

#[test]
fn user_move_returns_played_move() {
    let mut engine = engine();
    let m = engine.make_user_move("g1f3").unwrap();
    assert_eq!(m.to_string(), "g1f3");
    assert!(engine.position().to_fen().starts_with("rnbqkbnr/pppppppp/8/8/8/5N2/"));
}

#[test]
fn new_game_resets_everything() {
    let mut engine = engine();
    engine.make_user_move("e2e4").unwrap();
    let rx = search_into_channel(&mut engine, 2, None);
    rx.recv_timeout(TIMEOUT).expect("callback runs");
    engine.wait();
    assert_ne!(engine.best_move(), Move::NULL);

    engine.new_game();
    assert_eq!(engine.position().to_fen(), START_FEN);
    assert_eq!(engine.best_move(), Move::NULL);
    assert_eq!(engine.with_search_state(|s| s.hashfull()), 0);
}

#[test]
fn info_callback_sees_every_iteration() {
    let mut engine = engine();
    let depths = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&depths);
    engine.set_info_callback(Some(Arc::new(move |info: &SearchIterationInfo| {
        sink.lock().unwrap().push(info.depth);
    })));

    let rx = search_into_channel(&mut engine, 3, None);
    rx.recv_timeout(TIMEOUT).expect("callback runs");
    assert_eq!(*depths.lock().unwrap(), vec![1, 2, 3]);
}

#[test]
fn panicking_callback_keeps_engine_usable() {
    let mut engine = engine();
    engine
        .start_search(1, |_| panic!("callback failure"))
        .unwrap();
    engine.wait();
    assert_eq!(engine.status(), EngineStatus::Idle);

    let rx = search_into_channel(&mut engine, 1, None);
    let result = rx.recv_timeout(TIMEOUT).expect("search thread survived");
    assert!(engine.position().is_legal(result.best_move));
}

#[test]
fn consecutive_searches_run_in_order() {
    let mut engine = engine();
    let completed = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let counter = Arc::clone(&completed);
        engine
            .start_search(2, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        engine.wait();
    }
    assert_eq!(completed.load(Ordering::SeqCst), 3);
}

#[test]
fn dropping_engine_cancels_search() {
    let mut engine = engine();
    engine.load_position(KIWIPETE).unwrap();
    let rx = search_into_channel(&mut engine, 64, None);

    let start = Instant::now();
    drop(engine);
    assert!(start.elapsed() < Duration::from_secs(10));

    let result = rx.recv_timeout(TIMEOUT).expect("callback runs before drop returns");
    assert!(result.stopped);
}
