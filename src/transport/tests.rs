use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use super::*;
use crate::catalog::Track;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load { generation: u64, source: String, declared: f64 },
    Play(u64),
    Pause(u64),
    Seek(u64, f64),
    Volume(u64, f32),
    Destroy(u64),
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    sinks: Vec<EventSink>,
}

type Shared = Rc<RefCell<Script>>;

struct FakeEngine {
    generation: u64,
    declared: f64,
    script: Shared,
}

impl FakeEngine {
    fn record(&self, call: Call) {
        self.script.borrow_mut().calls.push(call);
    }
}

impl AudioEngine for FakeEngine {
    fn load(&mut self, request: LoadRequest) {
        self.declared = request.declared_duration;
        self.record(Call::Load {
            generation: self.generation,
            source: request.source,
            declared: request.declared_duration,
        });
    }

    fn play(&mut self) {
        self.record(Call::Play(self.generation));
    }

    fn pause(&mut self) {
        self.record(Call::Pause(self.generation));
    }

    fn seek(&mut self, seconds: f64) {
        self.record(Call::Seek(self.generation, seconds));
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(Call::Volume(self.generation, volume));
    }

    fn position(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> f64 {
        self.declared
    }

    fn destroy(&mut self) {
        self.record(Call::Destroy(self.generation));
    }
}

struct FakeFactory {
    script: Shared,
}

impl EngineFactory for FakeFactory {
    fn create(&mut self, events: EventSink) -> Box<dyn AudioEngine> {
        let generation = events.generation().0;
        self.script.borrow_mut().sinks.push(events);
        Box::new(FakeEngine {
            generation,
            declared: 0.0,
            script: Rc::clone(&self.script),
        })
    }
}

fn setup() -> (Transport<FakeFactory>, Player, Shared) {
    let script: Shared = Rc::default();
    let transport = Transport::new(FakeFactory {
        script: Rc::clone(&script),
    });
    (transport, Player::new(0.8), script)
}

fn t(id: &str, duration: f64) -> Arc<Track> {
    Arc::new(Track {
        id: id.to_string(),
        title: id.to_string(),
        duration,
        bpm: 0,
        audio_url: format!("/music/{id}.mp3"),
        album_id: "album".to_string(),
        waveform: vec![0.5; 4],
        is_vocal: false,
        genres: Vec::new(),
        moods: Vec::new(),
        instruments: Vec::new(),
    })
}

fn calls(script: &Shared) -> Vec<Call> {
    std::mem::take(&mut script.borrow_mut().calls)
}

fn emit(script: &Shared, generation: u64, event: EngineEvent) {
    let script = script.borrow();
    let sink = script
        .sinks
        .iter()
        .find(|s| s.generation().0 == generation)
        .expect("no engine with that generation");
    sink.emit(event);
}

fn current_id(p: &Player) -> Option<String> {
    p.current_track().map(|t| t.id.clone())
}

#[test]
fn play_loads_engine_with_volume_and_declared_duration() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 180.0));
    tr.sync(&mut p);

    assert_eq!(
        calls(&script),
        vec![
            Call::Volume(1, 0.8),
            Call::Load {
                generation: 1,
                source: "/music/a.mp3".to_string(),
                declared: 180.0,
            },
            Call::Play(1),
        ]
    );
    assert_eq!(tr.generation(), Generation(1));
    assert_eq!(p.duration(), 180.0);
}

#[test]
fn play_pause_and_volume_changes_never_reload() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 60.0));
    tr.sync(&mut p);
    calls(&script);

    p.pause();
    tr.sync(&mut p);
    p.set_volume(0.3);
    tr.sync(&mut p);
    p.set_progress(12.0);
    tr.sync(&mut p);
    p.resume();
    tr.sync(&mut p);

    assert_eq!(
        calls(&script),
        vec![Call::Pause(1), Call::Volume(1, 0.3), Call::Play(1)]
    );
    assert_eq!(tr.generation(), Generation(1));
}

#[test]
fn sync_is_idempotent() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 60.0));
    tr.sync(&mut p);
    calls(&script);

    tr.sync(&mut p);
    tr.sync(&mut p);
    assert!(calls(&script).is_empty());
}

#[test]
fn track_change_destroys_old_engine_and_loads_new_generation() {
    let (mut tr, mut p, script) = setup();
    p.set_queue(vec![t("a", 60.0), t("b", 90.0)], 0);
    p.resume();
    tr.sync(&mut p);
    calls(&script);

    p.next();
    tr.sync(&mut p);

    let log = calls(&script);
    assert_eq!(log[0], Call::Destroy(1));
    assert!(log.contains(&Call::Load {
        generation: 2,
        source: "/music/b.mp3".to_string(),
        declared: 90.0,
    }));
    assert_eq!(log.last(), Some(&Call::Play(2)));
    assert_eq!(p.duration(), 90.0);
}

#[test]
fn ready_and_progress_update_player() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 60.0));
    tr.sync(&mut p);

    emit(&script, 1, EngineEvent::Ready { duration: 61.5 });
    emit(&script, 1, EngineEvent::Progress { position: 4.2 });
    tr.pump(&mut p);

    assert_eq!(p.duration(), 61.5);
    assert_eq!(p.progress(), 4.2);
}

#[test]
fn finished_advances_and_wraps_to_first_track() {
    let (mut tr, mut p, script) = setup();
    let queue = vec![t("a", 10.0), t("b", 10.0), t("c", 10.0)];
    p.set_queue(queue, 2);
    p.resume();
    tr.sync(&mut p);
    calls(&script);

    emit(&script, 1, EngineEvent::Finished);
    tr.pump(&mut p);

    assert_eq!(p.queue_index(), 0);
    assert_eq!(current_id(&p), Some("a".to_string()));
    assert!(p.is_playing());
    assert_eq!(p.progress(), 0.0);

    let log = calls(&script);
    assert_eq!(log[0], Call::Destroy(1));
    assert!(log.contains(&Call::Load {
        generation: 2,
        source: "/music/a.mp3".to_string(),
        declared: 10.0,
    }));
    assert_eq!(log.last(), Some(&Call::Play(2)));
}

#[test]
fn finished_on_single_track_queue_replays_it() {
    let (mut tr, mut p, script) = setup();
    p.set_queue(vec![t("solo", 10.0)], 0);
    p.resume();
    tr.sync(&mut p);
    calls(&script);

    emit(&script, 1, EngineEvent::Finished);
    tr.pump(&mut p);

    assert_eq!(current_id(&p), Some("solo".to_string()));
    let log = calls(&script);
    assert_eq!(log[0], Call::Destroy(1));
    assert_eq!(log.last(), Some(&Call::Play(2)));
    assert_eq!(tr.generation(), Generation(2));
}

#[test]
fn finished_with_empty_queue_keeps_state_and_replays_on_resume() {
    let (mut tr, mut p, script) = setup();
    p.play(t("adhoc", 10.0));
    tr.sync(&mut p);
    p.set_progress(9.9);

    emit(&script, 1, EngineEvent::Finished);
    tr.pump(&mut p);
    assert_eq!(current_id(&p), Some("adhoc".to_string()));
    assert!(p.is_playing());
    assert_eq!(tr.generation(), Generation(1));
    calls(&script);

    p.toggle();
    tr.sync(&mut p);
    p.toggle();
    tr.sync(&mut p);

    let log = calls(&script);
    assert_eq!(log[0], Call::Pause(1));
    assert!(log.contains(&Call::Destroy(1)));
    assert_eq!(log.last(), Some(&Call::Play(2)));
    assert_eq!(p.progress(), 0.0);
}

#[test]
fn stale_events_are_discarded() {
    let (mut tr, mut p, script) = setup();
    p.set_queue(vec![t("a", 10.0), t("b", 20.0)], 0);
    p.resume();
    tr.sync(&mut p);
    p.next();
    tr.sync(&mut p);

    // Generation 1 belonged to track "a".
    emit(&script, 1, EngineEvent::Ready { duration: 999.0 });
    emit(&script, 1, EngineEvent::Progress { position: 7.0 });
    emit(&script, 1, EngineEvent::Finished);
    tr.pump(&mut p);

    assert_eq!(current_id(&p), Some("b".to_string()));
    assert_eq!(p.duration(), 20.0);
    assert_eq!(p.progress(), 0.0);
    assert_eq!(p.queue_index(), 1);
}

#[test]
fn error_marks_track_unavailable_with_fallback_duration() {
    let (mut tr, mut p, script) = setup();
    p.play(t("broken", 33.0));
    tr.sync(&mut p);
    p.set_duration(0.0);

    emit(&script, 1, EngineEvent::Error {
        cause: "decode failed".to_string(),
    });
    tr.pump(&mut p);

    assert!(tr.is_unavailable());
    assert_eq!(p.duration(), 33.0);

    // Moving on clears the flag.
    p.play(t("fine", 10.0));
    tr.sync(&mut p);
    assert!(!tr.is_unavailable());
}

#[test]
fn summary_event_is_kept_for_current_track_only() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 10.0));
    tr.sync(&mut p);
    assert!(tr.decoded_summary().is_none());

    emit(&script, 1, EngineEvent::Summary(vec![0.1, 0.9]));
    tr.pump(&mut p);
    assert_eq!(tr.decoded_summary(), Some(&[0.1, 0.9][..]));

    p.play(t("b", 10.0));
    tr.sync(&mut p);
    assert!(tr.decoded_summary().is_none());
}

#[test]
fn pause_before_ready_leaves_engine_paused() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 10.0));
    tr.sync(&mut p);
    p.pause();
    tr.sync(&mut p);

    emit(&script, 1, EngineEvent::Ready { duration: 10.0 });
    tr.pump(&mut p);

    let log = calls(&script);
    // Last transport instruction the engine saw was pause.
    let last_intent = log
        .iter()
        .rev()
        .find(|c| matches!(c, Call::Play(_) | Call::Pause(_)));
    assert_eq!(last_intent, Some(&Call::Pause(1)));
    assert!(!p.is_playing());
}

#[test]
fn seek_gesture_suppresses_progress_until_commit() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 100.0));
    tr.sync(&mut p);
    calls(&script);

    tr.begin_seek();
    assert!(tr.is_seeking());
    tr.drag_seek(&mut p, 70.0);
    emit(&script, 1, EngineEvent::Progress { position: 5.0 });
    tr.pump(&mut p);
    assert_eq!(p.progress(), 70.0);
    assert!(calls(&script).is_empty());

    tr.drag_seek(&mut p, 500.0);
    assert_eq!(p.progress(), 100.0);

    tr.drag_seek(&mut p, 42.0);
    tr.commit_seek(&mut p);
    assert!(!tr.is_seeking());
    assert_eq!(calls(&script), vec![Call::Seek(1, 42.0)]);

    emit(&script, 1, EngineEvent::Progress { position: 42.5 });
    tr.pump(&mut p);
    assert_eq!(p.progress(), 42.5);
}

#[test]
fn seek_fraction_and_scrub_forward_to_engine() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 200.0));
    tr.sync(&mut p);
    calls(&script);

    tr.seek_fraction(&mut p, 0.25);
    assert_eq!(p.progress(), 50.0);
    tr.seek_by(&mut p, 5.0);
    assert_eq!(p.progress(), 55.0);
    tr.seek_by(&mut p, -100.0);
    assert_eq!(p.progress(), 0.0);

    assert_eq!(
        calls(&script),
        vec![Call::Seek(1, 50.0), Call::Seek(1, 55.0), Call::Seek(1, 0.0)]
    );
}

#[test]
fn previous_restart_seeks_engine_to_start() {
    let (mut tr, mut p, script) = setup();
    p.set_queue(vec![t("a", 60.0), t("b", 60.0)], 1);
    p.resume();
    tr.sync(&mut p);
    calls(&script);

    p.set_progress(30.0);
    p.previous();
    tr.sync(&mut p);

    assert_eq!(calls(&script), vec![Call::Seek(1, 0.0)]);
    assert_eq!(current_id(&p), Some("b".to_string()));
}

#[test]
fn clearing_queue_tears_engine_down() {
    let (mut tr, mut p, script) = setup();
    p.set_queue(vec![t("a", 60.0)], 0);
    p.resume();
    tr.sync(&mut p);
    calls(&script);

    p.clear_queue();
    tr.pump(&mut p);
    assert_eq!(calls(&script), vec![Call::Destroy(1)]);

    // Events from the torn-down engine go nowhere.
    emit(&script, 1, EngineEvent::Progress { position: 3.0 });
    tr.pump(&mut p);
    assert_eq!(p.progress(), 0.0);
    assert!(calls(&script).is_empty());
}

#[test]
fn shutdown_destroys_engine() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 60.0));
    tr.sync(&mut p);
    calls(&script);

    tr.shutdown();
    assert_eq!(calls(&script), vec![Call::Destroy(1)]);
    tr.shutdown();
    assert!(calls(&script).is_empty());
}

#[test]
fn mute_silences_engine_without_reloading() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 60.0));
    tr.sync(&mut p);
    calls(&script);

    p.toggle_mute();
    tr.sync(&mut p);
    tr.sync(&mut p);
    assert_eq!(calls(&script), vec![Call::Volume(1, 0.0)]);
    assert_eq!(p.volume(), 0.8);

    p.toggle_mute();
    tr.sync(&mut p);
    assert_eq!(calls(&script), vec![Call::Volume(1, 0.8)]);
    assert_eq!(tr.generation(), Generation(1));
}

#[test]
fn raising_volume_while_muted_unmutes_the_engine() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 60.0));
    p.toggle_mute();
    tr.sync(&mut p);
    assert!(calls(&script).contains(&Call::Volume(1, 0.0)));

    p.set_volume(0.5);
    tr.sync(&mut p);
    assert!(!p.is_muted());
    assert_eq!(calls(&script), vec![Call::Volume(1, 0.5)]);
}

#[test]
fn reload_while_muted_starts_silent() {
    let (mut tr, mut p, script) = setup();
    p.toggle_mute();
    p.play(t("a", 60.0));
    tr.sync(&mut p);
    assert_eq!(calls(&script)[0], Call::Volume(1, 0.0));
}

#[test]
fn progress_queued_before_commit_is_dropped() {
    let (mut tr, mut p, script) = setup();
    p.play(t("a", 100.0));
    tr.sync(&mut p);
    calls(&script);

    tr.begin_seek();
    tr.drag_seek(&mut p, 80.0);
    emit(&script, 1, EngineEvent::Progress { position: 10.0 });
    emit(&script, 1, EngineEvent::Ready { duration: 120.0 });
    emit(&script, 1, EngineEvent::Progress { position: 10.1 });
    tr.commit_seek(&mut p);

    tr.pump(&mut p);
    assert_eq!(p.progress(), 80.0);
    // Other events survive the drain.
    assert_eq!(p.duration(), 120.0);
}
